use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use super::domain::{InvestorId, InvestorPreference, OperatorType, PreferenceSubmission};
use super::matches::{MatchQueryOptions, MatchStats, MatchedPropertyQuery};
use super::repository::{MailMessage, MailSender, PreferenceRepository, RepositoryError};
use crate::matching::{normalize_locations, StoredLocation};
use crate::properties::{PropertyRepository, PropertyType};

/// Score floor and page size used for the "initial matches" email sent on
/// an investor's first save.
const INITIAL_MATCHES_MIN_SCORE: u8 = 75;
const INITIAL_MATCHES_LIMIT: usize = 5;

/// Service composing preference validation, the upsert, and the best-effort
/// first-save notification pair.
pub struct PreferenceService<P, L, M> {
    preferences: Arc<P>,
    listings: Arc<L>,
    mail: Arc<M>,
    admin_email: String,
}

/// Read-endpoint view: the record (if any) plus headline match numbers.
#[derive(Debug, Clone)]
pub struct PreferenceSummary {
    pub preferences: Option<InvestorPreference>,
    pub match_stats: Option<MatchStats>,
}

/// Save outcome. `first_save` gates the notification pair.
#[derive(Debug, Clone)]
pub struct SavedPreference {
    pub record: InvestorPreference,
    pub first_save: bool,
}

impl<P, L, M> PreferenceService<P, L, M>
where
    P: PreferenceRepository,
    L: PropertyRepository,
    M: MailSender,
{
    pub fn new(preferences: Arc<P>, listings: Arc<L>, mail: Arc<M>, admin_email: String) -> Self {
        Self {
            preferences,
            listings,
            mail,
            admin_email,
        }
    }

    pub fn query(&self) -> MatchedPropertyQuery<P, L> {
        MatchedPropertyQuery::new(self.preferences.clone(), self.listings.clone())
    }

    /// Current preferences for the read endpoint. "Never set" is a normal
    /// branch, not an error; match stats are best-effort.
    pub fn current(&self, investor: &InvestorId) -> Result<PreferenceSummary, PreferenceServiceError> {
        let record = self
            .preferences
            .fetch(investor)?
            .filter(|record| record.is_active);

        let match_stats = record.as_ref().and_then(|_| match self.query().stats(investor) {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!(investor = %investor.0, error = %err, "match stats unavailable");
                None
            }
        });

        Ok(PreferenceSummary {
            preferences: record,
            match_stats,
        })
    }

    /// Validate and upsert. The returned `first_save` flag is derived from
    /// the repository's own created-vs-updated outcome, so two consecutive
    /// saves can never both report a first save.
    pub fn save(
        &self,
        investor: &InvestorId,
        submission: PreferenceSubmission,
    ) -> Result<SavedPreference, PreferenceServiceError> {
        let locations = validate_submission(&submission)?;

        let mut record = InvestorPreference {
            investor_id: investor.clone(),
            operator_type: submission.operator_type,
            operator_type_other: submission
                .operator_type_other
                .filter(|text| !text.trim().is_empty()),
            properties_managing: submission.properties_managing,
            preference_data: submission.preference_data,
            notification_enabled: submission.notification_enabled,
            is_active: true,
            updated_at: Utc::now(),
        };
        // Persist the normalized current shape so rows written from here on
        // never need migration at rest.
        record.preference_data.locations = locations;

        let outcome = self.preferences.upsert(record)?;
        Ok(SavedPreference {
            record: outcome.record,
            first_save: outcome.created,
        })
    }

    /// The first-save notification pair: an admin heads-up and an "initial
    /// matches" digest for the investor. Both are best-effort; failures are
    /// logged and dropped so a successful save never turns into an error.
    pub fn send_first_save_notifications(
        &self,
        record: &InvestorPreference,
        investor_email: &str,
        investor_name: &str,
    ) {
        let admin = MailMessage {
            to: self.admin_email.clone(),
            subject: "New investor registered".to_string(),
            template: "admin_new_investor".to_string(),
            data: json!({
                "investor_name": investor_name,
                "operator_type": record.operator_type.label(),
                "portfolio_band": record.portfolio_band(),
            }),
        };
        if let Err(err) = self.mail.send(admin) {
            warn!(error = %err, "admin notification failed");
        }

        let matches = self.query().run(
            &record.investor_id,
            MatchQueryOptions {
                min_score: INITIAL_MATCHES_MIN_SCORE,
                limit: INITIAL_MATCHES_LIMIT,
                offset: 0,
            },
        );

        match matches {
            Ok(page) => {
                let summaries: Vec<_> = page
                    .properties
                    .iter()
                    .map(|entry| {
                        json!({
                            "address": entry.property.address,
                            "city": entry.property.city,
                            "monthly_rent_pence": entry.property.monthly_rent_pence,
                            "score": entry.score,
                            "reasons": entry.reasons,
                        })
                    })
                    .collect();

                let message = MailMessage {
                    to: investor_email.to_string(),
                    subject: "Your first property matches".to_string(),
                    template: "investor_initial_matches".to_string(),
                    data: json!({
                        "investor_name": investor_name,
                        "total_matches": page.total,
                        "matches": summaries,
                    }),
                };
                if let Err(err) = self.mail.send(message) {
                    warn!(error = %err, "initial matches notification failed");
                }
            }
            Err(err) => {
                warn!(error = %err, "initial matches query failed; skipping digest");
            }
        }
    }
}

/// Check a submission and return its locations normalized to the current
/// shape with blank authority entries stripped.
fn validate_submission(
    submission: &PreferenceSubmission,
) -> Result<Vec<StoredLocation>, ValidationError> {
    if submission.operator_type == OperatorType::Other
        && submission
            .operator_type_other
            .as_deref()
            .map_or(true, |text| text.trim().is_empty())
    {
        return Err(ValidationError::MissingOperatorDetail);
    }

    let data = &submission.preference_data;
    if data.budget.min >= data.budget.max {
        return Err(ValidationError::InvalidBudget);
    }
    if data.bedrooms.min > data.bedrooms.max {
        return Err(ValidationError::InvalidBedrooms);
    }
    if !data.availability.is_armed() {
        return Err(ValidationError::InvalidAvailability);
    }
    if data.property_types.is_empty() {
        return Err(ValidationError::EmptyPropertyTypes);
    }
    for label in &data.property_types {
        if PropertyType::from_label(label).is_none() {
            return Err(ValidationError::UnknownPropertyType(label.clone()));
        }
    }

    if data.locations.is_empty() {
        if submission.locations_skipped {
            return Ok(Vec::new());
        }
        return Err(ValidationError::MissingLocations);
    }

    let mut normalized = normalize_locations(data.locations.clone());
    for location in &mut normalized {
        location
            .local_authorities
            .retain(|authority| !authority.trim().is_empty());
        if location.local_authorities.is_empty() {
            return Err(ValidationError::EmptyLocationAuthorities {
                city: location.city.clone(),
            });
        }
    }

    Ok(normalized.into_iter().map(StoredLocation::from).collect())
}

/// Field-level validation failures, surfaced as 400s at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("operator_type_other is required when operator_type is 'other'")]
    MissingOperatorDetail,
    #[error("budget minimum must be below maximum")]
    InvalidBudget,
    #[error("bedroom minimum must not exceed maximum")]
    InvalidBedrooms,
    #[error("availability must be either immediate or a specific available_from date")]
    InvalidAvailability,
    #[error("at least one property type is required")]
    EmptyPropertyTypes,
    #[error("unknown property type '{0}'")]
    UnknownPropertyType(String),
    #[error("location '{city}' has no local authorities after removing blank entries")]
    EmptyLocationAuthorities { city: String },
    #[error("at least one location is required unless locations were explicitly skipped")]
    MissingLocations,
}

/// Error raised by the preference service.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

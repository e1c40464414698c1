//! The matched-properties query: scores the full active listing pool against
//! one investor's criteria, filters, sorts, and paginates. Read-only and
//! recomputed per call; nothing here is cached or persisted.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::domain::InvestorId;
use super::repository::{PreferenceRepository, RepositoryError};
use crate::matching::{score_property, ScoringError};
use crate::properties::{Property, PropertyRepository};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Paging and threshold knobs. Defaults: no score floor, first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchQueryOptions {
    pub min_score: u8,
    pub limit: usize,
    pub offset: usize,
}

impl Default for MatchQueryOptions {
    fn default() -> Self {
        Self {
            min_score: 0,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// One page entry: the listing plus its score and match reasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProperty {
    pub property: Property,
    pub score: u8,
    pub reasons: Vec<String>,
}

/// A page of matches plus the pre-pagination total so callers can render
/// "X of Y".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPage {
    pub properties: Vec<ScoredProperty>,
    pub total: usize,
}

/// Headline numbers for the preferences read endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub total_matches: usize,
    pub top_score: Option<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum MatchQueryError {
    /// The investor has never saved criteria. Distinct from "criteria but
    /// zero matches", which is an empty success.
    #[error("investor has no active preferences")]
    NoPreferences,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Criteria(ScoringError),
}

/// Data-access wrapper around the scoring engine.
pub struct MatchedPropertyQuery<P, L> {
    preferences: Arc<P>,
    listings: Arc<L>,
}

impl<P, L> MatchedPropertyQuery<P, L>
where
    P: PreferenceRepository,
    L: PropertyRepository,
{
    pub fn new(preferences: Arc<P>, listings: Arc<L>) -> Self {
        Self {
            preferences,
            listings,
        }
    }

    pub fn run(
        &self,
        investor: &InvestorId,
        options: MatchQueryOptions,
    ) -> Result<MatchPage, MatchQueryError> {
        let preference = self
            .preferences
            .fetch(investor)?
            .filter(|record| record.is_active)
            .ok_or(MatchQueryError::NoPreferences)?;

        let criteria = preference.preference_data.criteria();
        criteria.validate().map_err(MatchQueryError::Criteria)?;

        let mut scored = Vec::new();
        for property in self.listings.active()? {
            match score_property(&property, &criteria) {
                Ok(result) if result.score >= options.min_score => {
                    scored.push(ScoredProperty {
                        property,
                        score: result.score,
                        reasons: result.reasons,
                    });
                }
                Ok(_) => {}
                // One malformed listing must not abort the whole batch.
                Err(err) => {
                    warn!(property_id = %property.id, error = %err, "skipping unscorable listing");
                }
            }
        }

        // Newest-first tiebreak keeps page boundaries deterministic across
        // repeated calls.
        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.property.created_at.cmp(&a.property.created_at))
        });

        let total = scored.len();
        let properties = scored
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect();

        Ok(MatchPage { properties, total })
    }

    /// Summary counts for the preferences read endpoint.
    pub fn stats(&self, investor: &InvestorId) -> Result<MatchStats, MatchQueryError> {
        let page = self.run(investor, MatchQueryOptions::default())?;
        Ok(MatchStats {
            total_matches: page.total,
            top_score: page.properties.first().map(|entry| entry.score),
        })
    }
}

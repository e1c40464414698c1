use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::{normalize_locations, BedroomRange, BudgetRange, MatchCriteria, StoredLocation};

/// Identifier wrapper for investor accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvestorId(pub String);

/// What kind of operation the investor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    SaOperator,
    SupportedLiving,
    SocialHousing,
    Other,
}

impl OperatorType {
    pub const fn label(self) -> &'static str {
        match self {
            OperatorType::SaOperator => "sa_operator",
            OperatorType::SupportedLiving => "supported_living",
            OperatorType::SocialHousing => "social_housing",
            OperatorType::Other => "other",
        }
    }
}

/// Availability expectation. Armed when exactly one of `immediate` or a
/// concrete `available_from` date is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub immediate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
}

impl AvailabilityWindow {
    pub fn is_armed(&self) -> bool {
        self.immediate != self.available_from.is_some()
    }
}

/// The investor's stated criteria. `locations` stays in the stored union
/// shape at rest; [`PreferenceData::criteria`] normalizes on the way into
/// the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceData {
    pub budget: BudgetRange,
    pub bedrooms: BedroomRange,
    pub property_types: Vec<String>,
    #[serde(default)]
    pub locations: Vec<StoredLocation>,
    #[serde(default)]
    pub additional_preferences: Vec<String>,
    pub availability: AvailabilityWindow,
}

impl PreferenceData {
    /// Build the scorer's input, normalizing locations defensively since
    /// rows written before the location migration may still be at rest.
    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            budget: self.budget,
            bedrooms: self.bedrooms,
            property_types: self.property_types.clone(),
            locations: normalize_locations(self.locations.clone()),
        }
    }
}

/// One record per investor; the repository upserts on `investor_id` so a
/// second save supersedes rather than duplicates. No history is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorPreference {
    pub investor_id: InvestorId,
    pub operator_type: OperatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_type_other: Option<String>,
    pub properties_managing: u32,
    pub preference_data: PreferenceData,
    pub notification_enabled: bool,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl InvestorPreference {
    /// Display bucket for the size of the investor's existing portfolio.
    pub fn portfolio_band(&self) -> &'static str {
        match self.properties_managing {
            0 => "none",
            1..=5 => "1-5",
            6..=20 => "6-20",
            _ => "20+",
        }
    }
}

fn default_notification_enabled() -> bool {
    true
}

/// Request body for saving preferences. `locations_skipped` records the
/// explicit onboarding choice to proceed without location criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSubmission {
    pub operator_type: OperatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_type_other: Option<String>,
    #[serde(default)]
    pub properties_managing: u32,
    pub preference_data: PreferenceData,
    #[serde(default)]
    pub locations_skipped: bool,
    #[serde(default = "default_notification_enabled")]
    pub notification_enabled: bool,
}

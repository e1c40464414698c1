//! Listing domain shared by the scoring engine and the matched-properties
//! query service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rental listing as the matcher consumes it. `local_authority` is assigned
/// at listing-creation time when known; the scorer falls back to postcode
/// inference when it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub city: String,
    pub address: String,
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_authority: Option<String>,
    pub monthly_rent_pence: u32,
    pub bedrooms: u8,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub availability: Availability,
    pub created_at: DateTime<Utc>,
}

/// Fixed listing-type enumeration. Free-text types from intake land in
/// `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    Flat,
    House,
    Studio,
    Apartment,
    Terraced,
    SemiDetached,
    Detached,
    Other,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Flat => "flat",
            PropertyType::House => "house",
            PropertyType::Studio => "studio",
            PropertyType::Apartment => "apartment",
            PropertyType::Terraced => "terraced",
            PropertyType::SemiDetached => "semi-detached",
            PropertyType::Detached => "detached",
            PropertyType::Other => "other",
        }
    }

    /// Resolve a label case-insensitively; underscores are accepted in place
    /// of hyphens so older client payloads keep working.
    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "flat" => Some(PropertyType::Flat),
            "house" => Some(PropertyType::House),
            "studio" => Some(PropertyType::Studio),
            "apartment" => Some(PropertyType::Apartment),
            "terraced" => Some(PropertyType::Terraced),
            "semi-detached" => Some(PropertyType::SemiDetached),
            "detached" => Some(PropertyType::Detached),
            "other" => Some(PropertyType::Other),
            _ => None,
        }
    }
}

/// Review lifecycle of a listing. Only `Active` listings are matchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Draft,
    Active,
    Rejected,
    Archived,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::Draft => "draft",
            PropertyStatus::Active => "active",
            PropertyStatus::Rejected => "rejected",
            PropertyStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Vacant,
    Tenanted,
}

/// Storage abstraction over the listing pool so the query service can be
/// exercised in isolation.
pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    /// The full candidate pool: every listing with `Active` status.
    fn active(&self) -> Result<Vec<Property>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_labels_round_trip() {
        for kind in [
            PropertyType::Flat,
            PropertyType::House,
            PropertyType::Studio,
            PropertyType::Apartment,
            PropertyType::Terraced,
            PropertyType::SemiDetached,
            PropertyType::Detached,
            PropertyType::Other,
        ] {
            assert_eq!(PropertyType::from_label(kind.label()), Some(kind));
        }
    }

    #[test]
    fn from_label_accepts_underscores_and_case() {
        assert_eq!(
            PropertyType::from_label("Semi_Detached"),
            Some(PropertyType::SemiDetached)
        );
        assert_eq!(PropertyType::from_label("FLAT"), Some(PropertyType::Flat));
        assert_eq!(PropertyType::from_label("castle"), None);
    }
}

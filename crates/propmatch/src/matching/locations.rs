//! Location preference shape normalization.
//!
//! Investor location preferences were persisted in two incompatible shapes
//! over the product's lifetime: a legacy `{city, areas, radius}` record and
//! the current `{region, city, localAuthorities}` record. Rather than a
//! one-time destructive migration, every read passes through
//! [`normalize_locations`], so nothing past this module ever sees the legacy
//! shape.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::taxonomy;

/// A location preference in the current shape. An empty `local_authorities`
/// list means "all areas within the city".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredLocation {
    pub id: String,
    pub region: String,
    pub city: String,
    pub local_authorities: Vec<String>,
}

/// Union of both persisted eras, deserializable from either. Legacy rows
/// carry `areas`/`radius` and no `region`; current rows carry `region` and
/// `local_authorities`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(
        alias = "localAuthorities",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_authorities: Option<Vec<String>>,
}

impl StoredLocation {
    /// A record needs migration when it looks like the legacy era: a city
    /// with no region and at least one of the retired fields present.
    pub fn needs_migration(&self) -> bool {
        self.city.is_some() && self.region.is_none() && (self.areas.is_some() || self.radius.is_some())
    }
}

impl From<PreferredLocation> for StoredLocation {
    fn from(value: PreferredLocation) -> Self {
        StoredLocation {
            id: Some(value.id),
            region: Some(value.region),
            city: Some(value.city),
            areas: None,
            radius: None,
            local_authorities: Some(value.local_authorities),
        }
    }
}

static LOCATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_location_id() -> String {
    let id = LOCATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("loc-{id:06}")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Convert every stored record to the current shape.
///
/// Legacy records are migrated (`region` derived from the taxonomy or
/// "Unknown", `areas` carried over as authorities, `radius` dropped);
/// current-era records are defensively defaulted so every output element has
/// an id, a region, and an authority list. Running the result through again
/// is a no-op: set ids and regions are never regenerated.
pub fn normalize_locations(locations: Vec<StoredLocation>) -> Vec<PreferredLocation> {
    locations
        .into_iter()
        .map(|entry| {
            if entry.needs_migration() {
                debug!(
                    city = entry.city.as_deref().unwrap_or("<unset>"),
                    "migrating legacy location shape"
                );
            }

            let city = entry.city.unwrap_or_default();
            let region = non_blank(entry.region).unwrap_or_else(|| {
                taxonomy::region_for_city(&city)
                    .unwrap_or("Unknown")
                    .to_string()
            });
            let local_authorities = entry
                .local_authorities
                .or(entry.areas)
                .unwrap_or_default();
            let id = non_blank(entry.id).unwrap_or_else(next_location_id);

            PreferredLocation {
                id,
                region,
                city,
                local_authorities,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(city: &str, areas: &[&str], radius: f64) -> StoredLocation {
        StoredLocation {
            city: Some(city.to_string()),
            areas: Some(areas.iter().map(|area| area.to_string()).collect()),
            radius: Some(radius),
            ..StoredLocation::default()
        }
    }

    #[test]
    fn migrates_legacy_record_and_drops_radius() {
        let output = normalize_locations(vec![legacy("Canterbury", &["Canterbury City"], 10.0)]);

        assert_eq!(output.len(), 1);
        let location = &output[0];
        assert!(location.id.starts_with("loc-"));
        assert_eq!(location.region, "South East");
        assert_eq!(location.city, "Canterbury");
        assert_eq!(location.local_authorities, vec!["Canterbury City"]);
    }

    #[test]
    fn unknown_city_falls_back_to_unknown_region() {
        let output = normalize_locations(vec![legacy("Nowheresville", &[], 5.0)]);
        assert_eq!(output[0].region, "Unknown");
    }

    #[test]
    fn radius_alone_marks_a_record_as_legacy() {
        let record = StoredLocation {
            city: Some("Leeds".to_string()),
            radius: Some(3.0),
            ..StoredLocation::default()
        };
        assert!(record.needs_migration());

        let current = StoredLocation {
            city: Some("Leeds".to_string()),
            region: Some("Yorkshire and the Humber".to_string()),
            local_authorities: Some(vec![]),
            ..StoredLocation::default()
        };
        assert!(!current.needs_migration());
    }

    #[test]
    fn current_records_are_defaulted_not_rewritten() {
        let input = vec![StoredLocation {
            id: Some("loc-keep".to_string()),
            region: Some("North West".to_string()),
            city: Some("Manchester".to_string()),
            local_authorities: Some(vec!["Salford".to_string()]),
            ..StoredLocation::default()
        }];

        let output = normalize_locations(input);
        assert_eq!(output[0].id, "loc-keep");
        assert_eq!(output[0].region, "North West");
        assert_eq!(output[0].local_authorities, vec!["Salford"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = normalize_locations(vec![
            legacy("Canterbury", &["Whitstable"], 10.0),
            StoredLocation {
                city: Some("Manchester".to_string()),
                ..StoredLocation::default()
            },
        ]);

        let second =
            normalize_locations(first.iter().cloned().map(StoredLocation::from).collect());

        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        assert!(normalize_locations(Vec::new()).is_empty());
    }

    #[test]
    fn deserializes_camel_case_authorities() {
        let raw = r#"{"id":"loc-1","region":"London","city":"London","localAuthorities":["Camden"]}"#;
        let stored: StoredLocation = serde_json::from_str(raw).expect("valid stored location");
        assert_eq!(stored.local_authorities, Some(vec!["Camden".to_string()]));
    }
}

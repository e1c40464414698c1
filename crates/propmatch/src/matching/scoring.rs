//! Weighted multi-factor property scoring.
//!
//! Each factor is an independent pure function returning a [`FactorScore`]
//! in 0..=100; [`score_property`] composes them with fixed weights and
//! rounds to an integer. Neutral defaults (no locations or types expressed)
//! score 100 with no reason so they never show up in the match report.

use serde::{Deserialize, Serialize};

use super::locations::PreferredLocation;
use super::postcode;
use crate::properties::Property;

pub const LOCATION_WEIGHT: f64 = 0.50;
pub const PRICE_WEIGHT: f64 = 0.30;
pub const BEDROOM_WEIGHT: f64 = 0.15;
pub const TYPE_WEIGHT: f64 = 0.05;

/// Partial credit when the preferred city matches but the listing's local
/// authority cannot be resolved.
const UNCONFIRMED_AREA_SCORE: f64 = 60.0;

/// Points lost per bedroom of distance from the requested range.
const BEDROOM_STEP_PENALTY: f64 = 25.0;

/// Monthly budget in pounds. `min` must be strictly below `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

/// Requested bedroom count range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedroomRange {
    pub min: u8,
    pub max: u8,
}

/// Normalized scoring input derived from an investor preference record.
/// Locations are guaranteed to be in the current shape by the time they
/// arrive here.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCriteria {
    pub budget: BudgetRange,
    pub bedrooms: BedroomRange,
    pub property_types: Vec<String>,
    pub locations: Vec<PreferredLocation>,
}

impl MatchCriteria {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.budget.min >= self.budget.max {
            return Err(ScoringError::InvalidCriteria(
                "budget minimum must be below maximum".to_string(),
            ));
        }
        if self.bedrooms.min > self.bedrooms.max {
            return Err(ScoringError::InvalidCriteria(
                "bedroom minimum must not exceed maximum".to_string(),
            ));
        }
        Ok(())
    }
}

/// One factor's contribution before weighting. A `None` reason marks a
/// neutral default that is dropped from the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScore {
    pub score: f64,
    pub reason: Option<String>,
}

impl FactorScore {
    fn neutral() -> Self {
        FactorScore {
            score: 100.0,
            reason: None,
        }
    }

    fn new(score: f64, reason: impl Into<String>) -> Self {
        FactorScore {
            score,
            reason: Some(reason.into()),
        }
    }
}

/// Ephemeral match output. Computed fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub property_id: String,
    pub score: u8,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),
    #[error("unscorable property {id}: {detail}")]
    InvalidProperty { id: String, detail: String },
}

/// Score one listing against one set of criteria. Deterministic, no I/O.
pub fn score_property(
    property: &Property,
    criteria: &MatchCriteria,
) -> Result<MatchResult, ScoringError> {
    criteria.validate()?;

    if property.city.trim().is_empty() {
        return Err(ScoringError::InvalidProperty {
            id: property.id.clone(),
            detail: "missing city".to_string(),
        });
    }
    if property.monthly_rent_pence == 0 {
        return Err(ScoringError::InvalidProperty {
            id: property.id.clone(),
            detail: "missing monthly rent".to_string(),
        });
    }

    let location = location_factor(property, &criteria.locations);
    let price = price_factor(
        f64::from(property.monthly_rent_pence) / 100.0,
        &criteria.budget,
    );
    let bedrooms = bedroom_factor(property.bedrooms, &criteria.bedrooms);
    let kind = type_factor(property, &criteria.property_types);

    let weighted = LOCATION_WEIGHT * location.score
        + PRICE_WEIGHT * price.score
        + BEDROOM_WEIGHT * bedrooms.score
        + TYPE_WEIGHT * kind.score;
    let score = weighted.round().clamp(0.0, 100.0) as u8;

    let reasons = [location, price, bedrooms, kind]
        .into_iter()
        .filter_map(|factor| factor.reason)
        .collect();

    Ok(MatchResult {
        property_id: property.id.clone(),
        score,
        reasons,
    })
}

/// Location credit: best outcome over every preferred location. A city match
/// with no requested authorities is full credit; with authorities requested
/// the listing's own authority decides, falling back to partial credit when
/// it cannot be resolved.
pub fn location_factor(property: &Property, locations: &[PreferredLocation]) -> FactorScore {
    if locations.is_empty() {
        return FactorScore::neutral();
    }

    let resolved_authority = property
        .local_authority
        .as_deref()
        .filter(|authority| !authority.trim().is_empty())
        .or_else(|| postcode::infer_local_authority(&property.city, &property.postcode));

    let mut best: Option<FactorScore> = None;
    for location in locations {
        if !location.city.trim().eq_ignore_ascii_case(property.city.trim()) {
            continue;
        }

        let candidate = if location.local_authorities.is_empty() {
            FactorScore::new(100.0, "City match (all areas)")
        } else {
            match resolved_authority {
                Some(authority)
                    if location
                        .local_authorities
                        .iter()
                        .any(|wanted| wanted.eq_ignore_ascii_case(authority)) =>
                {
                    FactorScore::new(100.0, format!("Matches {authority}"))
                }
                Some(_) => FactorScore::new(0.0, "Area does not match preference"),
                None => FactorScore::new(UNCONFIRMED_AREA_SCORE, "City match (area unconfirmed)"),
            }
        };

        let better = best
            .as_ref()
            .map_or(true, |current| candidate.score > current.score);
        if better {
            best = Some(candidate);
        }
    }

    best.unwrap_or_else(|| FactorScore::new(0.0, "City not in preferred locations"))
}

/// Price credit: anything at or under the ceiling is full credit (a bargain
/// is never down-ranked); above the ceiling the score decays linearly and
/// hits zero at 1.5x the budget maximum.
pub fn price_factor(monthly_rent: f64, budget: &BudgetRange) -> FactorScore {
    let min = f64::from(budget.min);
    let max = f64::from(budget.max);

    if monthly_rent < min {
        return FactorScore::new(100.0, "Below budget");
    }
    if monthly_rent <= max {
        return FactorScore::new(100.0, "Within budget");
    }

    let percent_over = (monthly_rent - max) / max * 100.0;
    let score = (100.0 - 2.0 * percent_over).max(0.0);
    FactorScore::new(score, format!("{}% over budget", percent_over.round() as i64))
}

/// Bedroom credit: full inside the range, minus 25 points per bedroom of
/// distance from the nearest bound outside it.
pub fn bedroom_factor(bedrooms: u8, range: &BedroomRange) -> FactorScore {
    if bedrooms >= range.min && bedrooms <= range.max {
        return FactorScore::new(
            100.0,
            format!(
                "{bedrooms} bedroom(s) within requested {}-{}",
                range.min, range.max
            ),
        );
    }

    let distance = if bedrooms < range.min {
        range.min - bedrooms
    } else {
        bedrooms - range.max
    };
    let score = (100.0 - BEDROOM_STEP_PENALTY * f64::from(distance)).max(0.0);
    FactorScore::new(
        score,
        format!(
            "{bedrooms} bedroom(s) outside requested {}-{}",
            range.min, range.max
        ),
    )
}

/// Type credit is categorical: exact label membership or nothing.
pub fn type_factor(property: &Property, preferred: &[String]) -> FactorScore {
    if preferred.is_empty() {
        return FactorScore::neutral();
    }

    let label = property.property_type.label();
    if preferred
        .iter()
        .any(|wanted| wanted.trim().eq_ignore_ascii_case(label))
    {
        FactorScore::new(100.0, "Matches preferred type")
    } else {
        FactorScore::new(0.0, "Type not in preferences")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{Availability, PropertyStatus, PropertyType};
    use chrono::{TimeZone, Utc};

    fn listing() -> Property {
        Property {
            id: "prop-001".to_string(),
            city: "Manchester".to_string(),
            address: "1 Deansgate".to_string(),
            postcode: "M3 4LQ".to_string(),
            local_authority: None,
            monthly_rent_pence: 180_000,
            bedrooms: 2,
            property_type: PropertyType::Flat,
            status: PropertyStatus::Active,
            availability: Availability::Vacant,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    fn criteria() -> MatchCriteria {
        MatchCriteria {
            budget: BudgetRange {
                min: 500,
                max: 2000,
            },
            bedrooms: BedroomRange { min: 1, max: 2 },
            property_types: vec!["flat".to_string()],
            locations: vec![PreferredLocation {
                id: "loc-1".to_string(),
                region: "North West".to_string(),
                city: "Manchester".to_string(),
                local_authorities: vec![],
            }],
        }
    }

    #[test]
    fn full_match_scores_one_hundred() {
        let result = score_property(&listing(), &criteria()).expect("scoreable");
        assert_eq!(result.score, 100);
        assert!(result.reasons.contains(&"City match (all areas)".to_string()));
        assert!(result.reasons.contains(&"Within budget".to_string()));
        assert!(result.reasons.contains(&"Matches preferred type".to_string()));
    }

    #[test]
    fn all_zero_factors_score_zero() {
        let mut property = listing();
        property.city = "Leeds".to_string();
        property.monthly_rent_pence = 300_000; // 1.5x the budget ceiling
        property.bedrooms = 6;
        property.property_type = PropertyType::Detached;

        let result = score_property(&property, &criteria()).expect("scoreable");
        assert_eq!(result.score, 0);
        assert!(result
            .reasons
            .contains(&"City not in preferred locations".to_string()));
    }

    #[test]
    fn empty_locations_and_types_are_neutral_with_no_reasons() {
        let mut criteria = criteria();
        criteria.locations.clear();
        criteria.property_types.clear();
        let mut property = listing();
        property.city = "Timbuktu".to_string();
        property.property_type = PropertyType::Other;

        let result = score_property(&property, &criteria).expect("scoreable");
        assert_eq!(result.score, 100);
        // Only the price and bedroom reasons remain.
        assert_eq!(result.reasons.len(), 2);
    }

    #[test]
    fn price_at_ceiling_scores_full_and_decays_above() {
        let budget = BudgetRange {
            min: 500,
            max: 2000,
        };
        assert_eq!(price_factor(2000.0, &budget).score, 100.0);
        assert_eq!(price_factor(400.0, &budget).reason.as_deref(), Some("Below budget"));

        let quarter_over = price_factor(2500.0, &budget);
        assert!((quarter_over.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(quarter_over.reason.as_deref(), Some("25% over budget"));

        assert_eq!(price_factor(3000.0, &budget).score, 0.0);
        assert_eq!(price_factor(4000.0, &budget).score, 0.0);
    }

    #[test]
    fn price_decay_is_monotonic_above_the_ceiling() {
        let budget = BudgetRange {
            min: 500,
            max: 2000,
        };
        let mut previous = price_factor(2000.0, &budget).score;
        for rent in [2100.0, 2300.0, 2600.0, 2900.0, 3100.0] {
            let current = price_factor(rent, &budget).score;
            assert!(current <= previous, "score rose at rent {rent}");
            previous = current;
        }
    }

    #[test]
    fn bedroom_penalty_is_symmetric_around_the_range() {
        let range = BedroomRange { min: 2, max: 4 };
        let below = bedroom_factor(1, &range);
        let above = bedroom_factor(5, &range);
        assert_eq!(below.score, above.score);
        assert_eq!(below.score, 75.0);

        assert_eq!(bedroom_factor(0, &range).score, 50.0);
        assert_eq!(bedroom_factor(8, &range).score, 0.0);
        assert_eq!(bedroom_factor(3, &range).score, 100.0);
    }

    #[test]
    fn authority_match_uses_the_listing_attribute() {
        let mut property = listing();
        property.local_authority = Some("Salford".to_string());
        let mut criteria = criteria();
        criteria.locations[0].local_authorities = vec!["Salford".to_string()];

        let result = score_property(&property, &criteria).expect("scoreable");
        assert_eq!(result.score, 100);
        assert!(result.reasons.contains(&"Matches Salford".to_string()));
    }

    #[test]
    fn authority_mismatch_zeroes_location_credit() {
        let mut property = listing();
        property.local_authority = Some("Trafford".to_string());
        let mut criteria = criteria();
        criteria.locations[0].local_authorities = vec!["Salford".to_string()];

        let result = score_property(&property, &criteria).expect("scoreable");
        assert!(result
            .reasons
            .contains(&"Area does not match preference".to_string()));
        // 0.5*0 + 0.3*100 + 0.15*100 + 0.05*100 = 50
        assert_eq!(result.score, 50);
    }

    #[test]
    fn unresolved_authority_earns_partial_credit() {
        let mut criteria = criteria();
        criteria.locations[0].local_authorities = vec!["Salford".to_string()];

        let result = score_property(&listing(), &criteria).expect("scoreable");
        assert!(result
            .reasons
            .contains(&"City match (area unconfirmed)".to_string()));
        // 0.5*60 + 0.3*100 + 0.15*100 + 0.05*100 = 80
        assert_eq!(result.score, 80);
    }

    #[test]
    fn london_postcode_inference_feeds_the_authority_check() {
        let mut property = listing();
        property.city = "London".to_string();
        property.postcode = "SE1 7PB".to_string();
        let mut criteria = criteria();
        criteria.locations[0].city = "London".to_string();
        criteria.locations[0].local_authorities = vec!["Southwark".to_string()];

        let result = score_property(&property, &criteria).expect("scoreable");
        assert_eq!(result.score, 100);
        assert!(result.reasons.contains(&"Matches Southwark".to_string()));
    }

    #[test]
    fn best_location_wins_across_multiple_preferences() {
        let mut criteria = criteria();
        criteria.locations = vec![
            PreferredLocation {
                id: "loc-a".to_string(),
                region: "Yorkshire and the Humber".to_string(),
                city: "Leeds".to_string(),
                local_authorities: vec![],
            },
            PreferredLocation {
                id: "loc-b".to_string(),
                region: "North West".to_string(),
                city: "Manchester".to_string(),
                local_authorities: vec![],
            },
        ];

        let result = score_property(&listing(), &criteria).expect("scoreable");
        assert_eq!(result.score, 100);
    }

    #[test]
    fn malformed_criteria_fail_fast() {
        let mut criteria = criteria();
        criteria.budget = BudgetRange {
            min: 2000,
            max: 2000,
        };
        assert!(matches!(
            score_property(&listing(), &criteria),
            Err(ScoringError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn malformed_property_fails_fast_per_item() {
        let mut property = listing();
        property.monthly_rent_pence = 0;
        assert!(matches!(
            score_property(&property, &criteria()),
            Err(ScoringError::InvalidProperty { .. })
        ));

        let mut property = listing();
        property.city = "  ".to_string();
        assert!(matches!(
            score_property(&property, &criteria()),
            Err(ScoringError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn reasons_follow_factor_order() {
        let result = score_property(&listing(), &criteria()).expect("scoreable");
        assert_eq!(result.reasons[0], "City match (all areas)");
        assert_eq!(result.reasons[1], "Within budget");
        assert!(result.reasons[2].contains("bedroom"));
        assert_eq!(result.reasons[3], "Matches preferred type");
    }
}

//! Property-to-preference matching: static UK location reference data, the
//! legacy location shape normalizer, and the weighted scoring engine.

pub mod locations;
pub mod postcode;
pub mod scoring;
pub mod taxonomy;

pub use locations::{normalize_locations, PreferredLocation, StoredLocation};
pub use scoring::{
    score_property, BedroomRange, BudgetRange, FactorScore, MatchCriteria, MatchResult,
    ScoringError,
};

//! Core library for the rental property marketplace matching service.
//!
//! The matching engine scores active listings against an investor's stated
//! preferences; the preference lifecycle modules carry the CRUD surface,
//! repository traits, and the HTTP router the api service mounts.

pub mod config;
pub mod error;
pub mod matching;
pub mod preferences;
pub mod properties;
pub mod telemetry;

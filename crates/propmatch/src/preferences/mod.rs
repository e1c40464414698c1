//! Investor preference lifecycle: the preference record and its submission
//! shape, repository/mail/identity traits, the save/read service with its
//! first-save notification side effects, the matched-properties query, and
//! the HTTP router the api service mounts.

pub mod domain;
pub mod matches;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    AvailabilityWindow, InvestorId, InvestorPreference, OperatorType, PreferenceData,
    PreferenceSubmission,
};
pub use matches::{
    MatchPage, MatchQueryError, MatchQueryOptions, MatchStats, MatchedPropertyQuery,
    ScoredProperty,
};
pub use repository::{
    AuthError, AuthenticatedUser, IdentityProvider, MailError, MailMessage, MailSender,
    PreferenceRepository, UpsertOutcome, UserProfile, UserType,
};
pub use router::{investor_router, InvestorApi};
pub use service::{
    PreferenceService, PreferenceServiceError, PreferenceSummary, SavedPreference,
    ValidationError,
};

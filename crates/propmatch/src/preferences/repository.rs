use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{InvestorId, InvestorPreference};
pub use crate::properties::RepositoryError;

/// Result of an upsert keyed on `investor_id`. `created` is true iff no
/// prior row existed, which gates the first-save notification pair.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub record: InvestorPreference,
    pub created: bool,
}

/// Storage abstraction for preference records. The backing store's own
/// upsert-on-conflict primitive guarantees at most one row per investor.
pub trait PreferenceRepository: Send + Sync {
    fn fetch(&self, investor: &InvestorId) -> Result<Option<InvestorPreference>, RepositoryError>;
    fn upsert(&self, record: InvestorPreference) -> Result<UpsertOutcome, RepositoryError>;
}

/// Outbound notification payload handed to the mail transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub data: Value,
}

/// Trait describing the external mail transport. Failures in the preference
/// save flow are logged by callers and never propagated.
pub trait MailSender: Send + Sync {
    fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Identity resolved from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Investor,
    Landlord,
    Admin,
}

/// Profile record behind an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub user_type: UserType,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// External auth provider boundary. Session issuance lives elsewhere; this
/// crate only resolves credentials and profiles.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError>;
    fn profile(&self, user_id: &str) -> Result<UserProfile, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or invalid credentials")]
    Unauthenticated,
    #[error("user profile not found")]
    UnknownUser,
}

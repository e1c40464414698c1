use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::matches::{MatchQueryError, MatchQueryOptions};
use super::repository::{
    AuthenticatedUser, IdentityProvider, MailSender, PreferenceRepository, UserProfile, UserType,
};
use super::service::{PreferenceService, PreferenceServiceError};
use super::domain::{InvestorId, PreferenceSubmission};
use crate::properties::PropertyRepository;

/// Shared router state: the preference service, the identity boundary, and
/// the paging defaults applied when a request omits them.
pub struct InvestorApi<P, L, M, I> {
    pub service: Arc<PreferenceService<P, L, M>>,
    pub identity: Arc<I>,
    pub defaults: MatchQueryOptions,
}

impl<P, L, M, I> Clone for InvestorApi<P, L, M, I> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            identity: self.identity.clone(),
            defaults: self.defaults,
        }
    }
}

/// Router builder exposing the investor-facing endpoints.
pub fn investor_router<P, L, M, I>(api: InvestorApi<P, L, M, I>) -> Router
where
    P: PreferenceRepository + 'static,
    L: PropertyRepository + 'static,
    M: MailSender + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/investor/preferences",
            get(get_preferences_handler::<P, L, M, I>).post(save_preferences_handler::<P, L, M, I>),
        )
        .route(
            "/api/v1/investor/matched-properties",
            get(matched_properties_handler::<P, L, M, I>),
        )
        .with_state(api)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

/// Resolve the bearer credential to an investor profile, or produce the
/// 401/403 response directly.
fn authenticate_investor<I: IdentityProvider>(
    identity: &I,
    headers: &HeaderMap,
) -> Result<(AuthenticatedUser, UserProfile), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| error_body(StatusCode::UNAUTHORIZED, "missing bearer token"))?;

    let user = identity
        .authenticate(token)
        .map_err(|_| error_body(StatusCode::UNAUTHORIZED, "invalid credentials"))?;

    let profile = identity
        .profile(&user.user_id)
        .map_err(|_| error_body(StatusCode::FORBIDDEN, "user profile not found"))?;

    if profile.user_type != UserType::Investor {
        return Err(error_body(StatusCode::FORBIDDEN, "investor access required"));
    }

    Ok((user, profile))
}

pub(crate) async fn get_preferences_handler<P, L, M, I>(
    State(api): State<InvestorApi<P, L, M, I>>,
    headers: HeaderMap,
) -> Response
where
    P: PreferenceRepository + 'static,
    L: PropertyRepository + 'static,
    M: MailSender + 'static,
    I: IdentityProvider + 'static,
{
    let (user, _profile) = match authenticate_investor(api.identity.as_ref(), &headers) {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    match api.service.current(&InvestorId(user.user_id)) {
        Ok(summary) => {
            let has_preferences = summary.preferences.is_some();
            let payload = json!({
                "preferences": summary.preferences,
                "has_preferences": has_preferences,
                "match_stats": summary.match_stats,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_body(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

pub(crate) async fn save_preferences_handler<P, L, M, I>(
    State(api): State<InvestorApi<P, L, M, I>>,
    headers: HeaderMap,
    payload: Result<axum::Json<PreferenceSubmission>, JsonRejection>,
) -> Response
where
    P: PreferenceRepository + 'static,
    L: PropertyRepository + 'static,
    M: MailSender + 'static,
    I: IdentityProvider + 'static,
{
    let (user, profile) = match authenticate_investor(api.identity.as_ref(), &headers) {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    // Malformed bodies are a client fault, same class as field validation.
    let axum::Json(submission) = match payload {
        Ok(json) => json,
        Err(rejection) => return error_body(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    match api.service.save(&InvestorId(user.user_id), submission) {
        Ok(saved) => {
            if saved.first_save {
                // Best-effort notifications must not delay or fail the save
                // response.
                let service = api.service.clone();
                let record = saved.record.clone();
                let email = profile.email.clone();
                let name = profile.full_name.clone();
                tokio::spawn(async move {
                    service.send_first_save_notifications(&record, &email, &name);
                });
            }
            (StatusCode::OK, axum::Json(saved.record)).into_response()
        }
        Err(PreferenceServiceError::Validation(err)) => {
            error_body(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(other) => error_body(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MatchQueryParams {
    min_score: Option<u8>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl MatchQueryParams {
    fn options(&self, defaults: MatchQueryOptions) -> MatchQueryOptions {
        MatchQueryOptions {
            min_score: self.min_score.unwrap_or(defaults.min_score),
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
        }
    }
}

pub(crate) async fn matched_properties_handler<P, L, M, I>(
    State(api): State<InvestorApi<P, L, M, I>>,
    headers: HeaderMap,
    Query(params): Query<MatchQueryParams>,
) -> Response
where
    P: PreferenceRepository + 'static,
    L: PropertyRepository + 'static,
    M: MailSender + 'static,
    I: IdentityProvider + 'static,
{
    let (user, _profile) = match authenticate_investor(api.identity.as_ref(), &headers) {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    match api
        .service
        .query()
        .run(&InvestorId(user.user_id), params.options(api.defaults))
    {
        Ok(page) => {
            let payload = json!({
                "properties": page.properties,
                "total": page.total,
                "has_preferences": true,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        // "No criteria yet" is an expected steady state, not a fault.
        Err(MatchQueryError::NoPreferences) => {
            let payload = json!({
                "properties": [],
                "total": 0,
                "has_preferences": false,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => error_body(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

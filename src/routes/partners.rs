use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::Matcher;
use crate::models::{
    ErrorResponse, FindPartnersQuery, FindPartnersResponse, HealthResponse, PartnerMatch,
    ProfileResponse, UpdateProfileRequest,
};
use crate::services::{CacheKey, CacheManager, PostgresClient, PostgresError, Session, SessionVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub sessions: Arc<SessionVerifier>,
    pub matcher: Matcher,
    pub default_limit: usize,
}

/// Configure all partner-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/partners/find", web::get().to(find_partners))
        .route("/partners/profile", web::put().to(update_profile));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(error, message, status.as_u16()))
}

/// Authenticate the caller or produce the 401 response
fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Session, HttpResponse> {
    state.sessions.verify(req).map_err(|e| {
        tracing::info!("Rejected unauthenticated request to {}: {}", req.path(), e);
        error_response(StatusCode::UNAUTHORIZED, "Unauthorized", e.to_string())
    })
}

fn repository_error(context: &str, user_id: &str, err: PostgresError) -> HttpResponse {
    match err {
        PostgresError::NotFound(message) => {
            tracing::info!("{} for {}: {}", context, user_id, message);
            error_response(StatusCode::NOT_FOUND, "User not found", message)
        }
        other => {
            tracing::error!("{} for {}: {}", context, user_id, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context, other.to_string())
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find partners endpoint
///
/// GET /api/partners/find?limit=20
///
/// Requires a session. Returns `{"partners": [...]}` sorted by `matchScore`,
/// highest first.
async fn find_partners(
    state: web::Data<AppState>,
    query: web::Query<FindPartnersQuery>,
    http_req: HttpRequest,
) -> HttpResponse {
    let session = match authenticate(&state, &http_req) {
        Ok(session) => session,
        Err(response) => return response,
    };

    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for find_partners query: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let user_id = &session.user_id;
    let limit = query
        .limit
        .map(usize::from)
        .unwrap_or(state.default_limit)
        .min(state.matcher.max_candidates());

    tracing::info!("Finding partners for user: {}, limit: {}", user_id, limit);

    if let Err(e) = state.postgres.touch_last_active(user_id).await {
        tracing::warn!("Failed to record activity for {}: {}", user_id, e);
    }

    let cache_key = CacheKey::partners(user_id, limit);
    match state.cache.get::<Vec<PartnerMatch>>(&cache_key).await {
        Ok(Some(partners)) => {
            tracing::debug!("Serving {} cached partners for {}", partners.len(), user_id);
            return HttpResponse::Ok().json(FindPartnersResponse { partners });
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache read failed for {}: {}", user_id, e),
    }

    let requester = match state.postgres.get_profile(user_id).await {
        Ok(profile) => profile,
        Err(e) => return repository_error("Failed to fetch user profile", user_id, e),
    };

    // Rank the full candidate window so a small limit still returns the best matches
    let candidates = match state
        .postgres
        .list_candidates(user_id, state.matcher.max_candidates())
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => return repository_error("Failed to query candidates", user_id, e),
    };

    let result = state
        .matcher
        .top_partners(&requester, candidates, chrono::Utc::now(), limit);

    if let Err(e) = state.cache.set(&cache_key, &result.partners).await {
        tracing::warn!("Failed to cache partners for {}: {}", user_id, e);
    }

    tracing::info!(
        "Returning {} partners for user {} (from {} candidates)",
        result.partners.len(),
        user_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(FindPartnersResponse {
        partners: result.partners,
    })
}

/// Update partner profile endpoint
///
/// PUT /api/partners/profile
///
/// Request body:
/// ```json
/// {
///   "skillLevel": "INTERMEDIATE",
///   "primaryGoals": ["serve", "strategy"],
///   "coachingStylePreference": "BALANCED",
///   "preferredDays": ["Mon", "Wed"],
///   "location": "Austin",
///   "latitude": 30.27,
///   "longitude": -97.74
/// }
/// ```
async fn update_profile(
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
    http_req: HttpRequest,
) -> HttpResponse {
    let session = match authenticate(&state, &http_req) {
        Ok(session) => session,
        Err(response) => return response,
    };

    if let Err(errors) = body.validate() {
        tracing::info!("Validation failed for update_profile request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let user_id = &session.user_id;

    let profile = match state.postgres.update_partner_profile(user_id, &body).await {
        Ok(profile) => profile,
        Err(e) => return repository_error("Failed to update profile", user_id, e),
    };

    if let Err(e) = state
        .cache
        .invalidate_prefix(&CacheKey::partners_prefix(user_id))
        .await
    {
        tracing::warn!("Failed to invalidate cached partners for {}: {}", user_id, e);
    }

    HttpResponse::Ok().json(ProfileResponse { profile })
}

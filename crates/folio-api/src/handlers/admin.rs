//! Admin auth handlers: login, refresh, logout, verify, and session management.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::Utc;
use serde_json::{Map, Value, json};
use validator::{Validate, ValidationErrors};

use folio_auth::SessionId;
use folio_auth::gate::bearer_token;
use folio_core::error::{AppError, ErrorKind};

use crate::dto::request::LoginRequest;
use crate::dto::response::{
    AdminInfo, LoginResponse, MessageResponse, RefreshResponse, RevokeAllResponse, SessionInfo,
    SessionSummary, SessionsResponse, VerifyResponse, format_lifetime,
};
use crate::error::ApiError;
use crate::extractors::{AdminUser, ClientIp, RequestId, UserAgent};
use crate::state::AppState;

/// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    UserAgent(user_agent): UserAgent,
    RequestId(request_id): RequestId,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        ApiError::new(AppError::validation("Invalid input"), request_id.clone())
            .with_details(json!({ "body": [e.body_text()] }))
    })?;

    if let Err(errors) = req.validate() {
        return Err(
            ApiError::new(AppError::validation("Invalid input"), request_id)
                .with_details(validation_details(&errors)),
        );
    }

    let outcome = state
        .session_manager
        .login(&req.email, &req.password, &ip, user_agent.as_deref())
        .await
        .map_err(|e| {
            let lockout = e.kind == ErrorKind::RateLimited;
            let err = ApiError::new(e, request_id.clone());
            if lockout {
                err.with_retry_after(state.config.rate_limit.login_window_minutes * 60)
            } else {
                err
            }
        })?;

    Ok(Json(LoginResponse {
        admin: AdminInfo::new(&outcome.identity, &outcome.session),
        expires_in: format_lifetime(outcome.token.lifetime_seconds()),
        session_info: SessionInfo {
            user_agent: outcome.session.user_agent.clone(),
            ip: outcome.session.ip.clone(),
            created_at: outcome.session.created_at,
        },
        token: outcome.token.token,
    }))
}

/// POST /admin/refresh
///
/// Accepts an expired token as long as its session is alive.
pub async fn refresh(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    let outcome = state
        .session_manager
        .refresh(token)
        .await
        .map_err(|e| ApiError::new(e, request_id))?;

    Ok(Json(RefreshResponse {
        admin: AdminInfo::new(&outcome.identity, &outcome.session),
        expires_in: format_lifetime(outcome.token.lifetime_seconds()),
        token: outcome.token.token,
    }))
}

/// POST /admin/logout
pub async fn logout(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .session_manager
        .logout(&admin)
        .await
        .map_err(|e| ApiError::new(e, admin.request_id.clone()))?;

    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

/// GET /admin/verify
pub async fn verify(State(state): State<AppState>, admin: AdminUser) -> Json<VerifyResponse> {
    let info = AdminInfo::from_auth(&admin);
    Json(VerifyResponse {
        permissions: info.permissions.clone(),
        admin: info,
        session_valid: true,
        environment: state.config.server.environment.clone(),
        server_time: Utc::now(),
    })
}

/// GET /admin/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Json<SessionsResponse> {
    let current = &admin.session.id;
    let sessions = state
        .session_manager
        .sessions_for(&admin)
        .into_iter()
        .map(|s| SessionSummary::new(s, current))
        .collect();
    Json(SessionsResponse { sessions })
}

/// DELETE /admin/sessions/{sessionId}
pub async fn revoke_session(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .session_manager
        .revoke_session(&admin, &SessionId::from(session_id))
        .await
        .map_err(|e| ApiError::new(e, admin.request_id.clone()))?;

    Ok(Json(MessageResponse::ok("Session revoked")))
}

/// POST /admin/sessions/revoke-all
pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<RevokeAllResponse>, ApiError> {
    let revoked = state
        .session_manager
        .revoke_all(&admin)
        .await
        .map_err(|e| ApiError::new(e, admin.request_id.clone()))?;

    Ok(Json(RevokeAllResponse {
        success: true,
        revoked,
        message: "All sessions revoked".to_string(),
    }))
}

/// Field name → list of messages.
fn validation_details(errors: &ValidationErrors) -> Value {
    let fields: Map<String, Value> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();
    Value::Object(fields)
}

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::{
    auth::{db, models::AuthUser},
    server::{app_state::AppState, error::ServerError},
};

/// Resolves the bearer session token to a user and attaches it to the
/// request. Every mutating route sits behind this.
pub async fn auth_mw(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(header) = extract_header(AUTHORIZATION.as_str(), req.headers()) else {
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Missing authorization header".into(),
        ));
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Missing auth token".into(),
        ));
    };

    let Some(user) = db::get_user_by_session_token(state.get_pool(), token).await? else {
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Session is expired or unknown".into(),
        ));
    };

    if !user.email_verified {
        return Err(ServerError::Api(
            StatusCode::FORBIDDEN,
            "Email address is not verified".into(),
        ));
    }

    info!("Request by user: {}", user.id);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Role gate for the /master prefix. Runs after auth_mw has attached the
/// user.
pub async fn admin_mw(req: Request<Body>, next: Next) -> Result<Response, ServerError> {
    let Some(user) = req.extensions().get::<AuthUser>() else {
        return Err(ServerError::AccessDenied);
    };

    if !user.is_admin() {
        return Err(ServerError::AccessDenied);
    }

    Ok(next.run(req).await)
}

fn extract_header(key: &str, header_map: &HeaderMap) -> Option<String> {
    header_map
        .get(key)
        .and_then(|header| header.to_str().ok())
        .map(|s| s.to_owned())
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::AppState;
use crate::auth::{TOKEN_COOKIE, verify_token};
use crate::error::ApiError;

/// Validate the `token` cookie and expose its claims to the handler.
///
/// A missing cookie is 401; a cookie that fails signature or expiry checks
/// is 403.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar.get(TOKEN_COOKIE).ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(&state.auth.jwt_secret, token.value()).map_err(|e| {
        debug!("Rejected token cookie: {}", e);
        ApiError::Forbidden
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;

use yachiyo_types::api::{Claims, TokenResponse};
use yachiyo_types::models::Extra;

use crate::AppState;
use crate::error::{ApiError, ApiResult};

pub const TOKEN_COOKIE: &str = "token";

const TOKEN_TTL_DAYS: i64 = 1;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Production deployments serve the client from another site, so the
    /// cookie must be `Secure; SameSite=None` there.
    pub secure_cookies: bool,
}

/// POST /jwt: sign whatever object the client sends and hand it back as
/// the `token` cookie.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<Extra>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let Json(payload) = body?;

    let token = create_token(&state.auth.jwt_secret, payload).map_err(ApiError::internal)?;
    info!("Issued access token");

    let cookie = Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .path("/")
        .secure(state.auth.secure_cookies)
        .same_site(if state.auth.secure_cookies {
            SameSite::None
        } else {
            SameSite::Strict
        });

    Ok((jar.add(cookie), Json(TokenResponse { status: true })))
}

pub fn create_token(secret: &str, mut payload: Extra) -> anyhow::Result<String> {
    // The server owns the timestamps
    payload.remove("exp");
    payload.remove("iat");

    let now = chrono::Utc::now();
    let claims = Claims {
        payload,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

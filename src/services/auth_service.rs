use axum::http::{self, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use uuid::Uuid;

use crate::models::CollabError;

/// The identity established once per connection (or request) at handshake.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

// Get the auth token from request headers: Authorization bearer first,
// auth_token cookie as fallback.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().ok()?;
        return Some(
            auth_str
                .strip_prefix("Bearer ")
                .unwrap_or(auth_str)
                .to_string(),
        );
    }

    let cookie_header = headers.get(http::header::COOKIE)?.to_str().ok()?;
    for cookie in cookie::Cookie::split_parse(cookie_header).flatten() {
        if cookie.name() == "auth_token" {
            return Some(cookie.value().to_string());
        }
    }
    None
}

// Validate a JWT token and return the token data
pub fn validate_jwt(
    token: &str,
    secret: &str,
) -> Result<TokenData<serde_json::Value>, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<serde_json::Value>(token, &decoding_key, &validation)
}

/// Verify a credential token and build the connection's identity.
///
/// The `sub` claim carries the user id; an optional `roles` array carries
/// platform roles used by the admin-gated endpoints.
pub fn auth_ctx_from_token(token: &str, secret: &str) -> Result<AuthCtx, CollabError> {
    let token_data =
        validate_jwt(token, secret).map_err(|e| CollabError::Auth(e.to_string()))?;

    let sub = token_data
        .claims
        .get("sub")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CollabError::Auth("token has no 'sub' claim".to_string()))?;
    let user_id = Uuid::parse_str(sub)
        .map_err(|_| CollabError::Auth("'sub' claim is not a user id".to_string()))?;

    let roles = match token_data.claims.get("roles").and_then(|v| v.as_array()) {
        Some(roles_array) => roles_array
            .iter()
            .filter_map(|r| r.as_str().map(|s| s.to_string()))
            .collect(),
        None => Vec::new(),
    };

    Ok(AuthCtx { user_id, roles })
}

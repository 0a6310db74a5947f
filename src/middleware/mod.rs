use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// Ключи HS256. Выдача токенов живёт во внешнем сервисе учётных записей,
/// здесь `issue` нужен для инструментов и тестов.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> jsonwebtoken::errors::Result<String> {
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp: (Utc::now() + self.ttl).timestamp().max(0) as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }
}

// Bearer JWT extractor
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!("rejected bearer token: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        Ok(AuthUser { user_id: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let keys = TokenKeys::new("secret", 1);
        let user = Uuid::new_v4();
        let token = keys.issue(user, "host@example.com").unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.email, "host@example.com");
    }

    #[test]
    fn foreign_and_expired_tokens_are_rejected() {
        let ours = TokenKeys::new("secret", 1);
        let theirs = TokenKeys::new("other-secret", 1);
        let token = theirs.issue(Uuid::new_v4(), "x@example.com").unwrap();
        assert!(ours.verify(&token).is_err());

        let expired = TokenKeys::new("secret", -2)
            .issue(Uuid::new_v4(), "x@example.com")
            .unwrap();
        assert!(ours.verify(&expired).is_err());
    }
}

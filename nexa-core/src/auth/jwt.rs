//! Bearer access-token issuance and validation.
//!
//! Mirrors the teacher's `JwtKeyManager` rotation scheme: the first key in
//! the list signs new tokens, every key is tried on verification so tokens
//! issued before a rotation remain valid until they expire naturally.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::ids::{SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub sid: uuid::Uuid,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtKeyManager {
    keys: RwLock<Vec<String>>,
    access_ttl: Duration,
}

impl JwtKeyManager {
    pub fn new(initial_secret: String, access_ttl: Duration) -> Self {
        Self {
            keys: RwLock::new(vec![initial_secret]),
            access_ttl,
        }
    }

    /// Adds a new signing key, keeping prior keys for verification of
    /// tokens already in flight. Retains at most 5 keys.
    pub fn rotate_key(&self, new_key: String) {
        let mut keys = self.keys.write().unwrap();
        keys.insert(0, new_key);
        keys.truncate(5);
    }

    pub fn issue_access_token(&self, user_id: UserId, session_id: SessionId) -> CoreResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_uuid(),
            sid: session_id.as_uuid(),
            exp: (now + self.access_ttl).timestamp(),
            iat: now.timestamp(),
        };
        let secret = self.keys.read().unwrap()[0].clone();
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| CoreError::internal(format!("token signing failed: {e}")))
    }

    /// Decodes and validates signature + expiry, trying every known key so
    /// a rotation doesn't invalidate tokens issued moments before.
    pub fn decode_access_token(&self, token: &str) -> CoreResult<Claims> {
        let keys = self.keys.read().unwrap().clone();
        let validation = Validation::new(Algorithm::HS256);
        for secret in &keys {
            if let Ok(data) = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
                return Ok(data.claims);
            }
        }
        Err(CoreError::unauthenticated("invalid_token"))
    }
}

pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn hash_refresh_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(token.as_bytes());
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, digest)
}

pub fn session_expiry(lifetime_days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(lifetime_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_decodes_with_matching_claims() {
        let mgr = JwtKeyManager::new("test-secret".into(), Duration::minutes(15));
        let user = UserId::new();
        let session = SessionId::new();
        let token = mgr.issue_access_token(user, session).unwrap();
        let claims = mgr.decode_access_token(&token).unwrap();
        assert_eq!(claims.sub, user.as_uuid());
        assert_eq!(claims.sid, session.as_uuid());
    }

    #[test]
    fn rotated_key_still_verifies_older_tokens() {
        let mgr = JwtKeyManager::new("old-secret".into(), Duration::minutes(15));
        let token = mgr.issue_access_token(UserId::new(), SessionId::new()).unwrap();
        mgr.rotate_key("new-secret".into());
        assert!(mgr.decode_access_token(&token).is_ok());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mgr = JwtKeyManager::new("test-secret".into(), Duration::minutes(15));
        let token = mgr.issue_access_token(UserId::new(), SessionId::new()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(mgr.decode_access_token(&tampered).is_err());
    }
}

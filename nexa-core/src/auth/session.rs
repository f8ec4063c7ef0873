//! Login/refresh/logout orchestration (spec.md §4.F).

use crate::auth::jwt::{generate_refresh_token, hash_refresh_token, session_expiry, JwtKeyManager};
use crate::auth::password::verify_password;
use nexa_contracts::auth::{DeviceRepository, SessionRepository, UserRepository};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::prelude::*;
use std::sync::Arc;

pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub session: Session,
    pub user: User,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    devices: Arc<dyn DeviceRepository>,
    sessions: Arc<dyn SessionRepository>,
    keys: Arc<JwtKeyManager>,
    session_settings: SessionSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        devices: Arc<dyn DeviceRepository>,
        sessions: Arc<dyn SessionRepository>,
        keys: Arc<JwtKeyManager>,
        session_settings: SessionSettings,
    ) -> Self {
        Self { users, devices, sessions, keys, session_settings }
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        registration: DeviceRegistration,
    ) -> CoreResult<LoginResult> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| CoreError::unauthenticated("invalid_credentials"))?;
        if !verify_password(password, &user.password_hash) {
            return Err(CoreError::unauthenticated("invalid_credentials"));
        }

        let device = self.devices.upsert(user.id, registration).await?;
        let refresh_token = generate_refresh_token();
        let session = self
            .sessions
            .create(
                user.id,
                device.id,
                session_expiry(self.session_settings.lifetime_days),
                hash_refresh_token(&refresh_token),
            )
            .await?;
        let access_token = self.keys.issue_access_token(user.id, session.id)?;

        Ok(LoginResult { access_token, refresh_token, session, user })
    }

    pub async fn refresh(&self, refresh_token: &str) -> CoreResult<LoginResult> {
        let hash = hash_refresh_token(refresh_token);
        let session = self
            .sessions
            .find_by_refresh_hash(&hash)
            .await?
            .ok_or_else(|| CoreError::unauthenticated("invalid_token"))?;
        if !session.is_valid(chrono::Utc::now()) {
            return Err(CoreError::unauthenticated("invalid_token"));
        }

        let new_refresh = generate_refresh_token();
        let session = self
            .sessions
            .extend(
                session.id,
                session_expiry(self.session_settings.lifetime_days),
                hash_refresh_token(&new_refresh),
            )
            .await?;
        let user = self.users.get(session.user_id).await?;
        let access_token = self.keys.issue_access_token(user.id, session.id)?;

        Ok(LoginResult { access_token, refresh_token: new_refresh, session, user })
    }

    pub async fn logout(&self, session_id: SessionId) -> CoreResult<()> {
        self.sessions.revoke(session_id).await
    }

    /// Validates a bearer token against both the signature/expiry and the
    /// backing session's revocation state — a revoked session must fail
    /// even while its signed access token has not yet expired.
    pub async fn authenticate(&self, bearer_token: &str) -> CoreResult<(User, Session)> {
        let claims = self
            .keys
            .decode_access_token(bearer_token)
            .map_err(|_| CoreError::unauthenticated("invalid_token"))?;
        let session = self.sessions.get(claims.sid.into()).await?;
        if !session.is_valid(chrono::Utc::now()) {
            return Err(CoreError::unauthenticated("invalid_token"));
        }
        self.sessions.touch(session.id).await?;
        let user = self.users.get(session.user_id).await?;
        Ok((user, session))
    }
}

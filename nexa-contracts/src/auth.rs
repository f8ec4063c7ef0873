use crate::error::CoreResult;
use async_trait::async_trait;
use nexa_model::prelude::*;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;
    async fn get(&self, id: UserId) -> CoreResult<User>;
}

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn upsert(&self, user_id: UserId, registration: DeviceRegistration) -> CoreResult<Device>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        expires_at: chrono::DateTime<chrono::Utc>,
        refresh_token_hash: String,
    ) -> CoreResult<Session>;
    async fn get(&self, id: SessionId) -> CoreResult<Session>;
    async fn find_by_refresh_hash(&self, hash: &str) -> CoreResult<Option<Session>>;
    async fn touch(&self, id: SessionId) -> CoreResult<()>;
    async fn extend(&self, id: SessionId, expires_at: chrono::DateTime<chrono::Utc>, refresh_token_hash: String) -> CoreResult<Session>;
    async fn revoke(&self, id: SessionId) -> CoreResult<()>;
}

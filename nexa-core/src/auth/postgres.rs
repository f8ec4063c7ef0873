use crate::catalog::postgres::{map_tx_error, not_found};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexa_contracts::auth::{DeviceRepository, SessionRepository, UserRepository};
use nexa_contracts::error::CoreResult;
use nexa_model::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    is_administrator: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id.into(),
            email: row.email,
            password_hash: row.password_hash,
            is_administrator: row.is_administrator,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("select id, email, password_hash, is_administrator, created_at from users where email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_tx_error)?;
        Ok(row.map(Into::into))
    }

    async fn get(&self, id: UserId) -> CoreResult<User> {
        let row: Option<UserRow> =
            sqlx::query_as("select id, email, password_hash, is_administrator, created_at from users where id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_tx_error)?;
        row.map(Into::into).ok_or_else(|| not_found("user not found"))
    }
}

pub struct PgDeviceRepository {
    pool: PgPool,
}

impl PgDeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: Uuid,
    user_id: Uuid,
    client_identifier: String,
    friendly_name: String,
    platform: Option<String>,
    version: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Device {
            id: row.id.into(),
            user_id: row.user_id.into(),
            client_identifier: row.client_identifier,
            friendly_name: row.friendly_name,
            platform: row.platform,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn upsert(&self, user_id: UserId, registration: DeviceRegistration) -> CoreResult<Device> {
        let id = DeviceId::new();
        let row: DeviceRow = sqlx::query_as(
            "insert into devices (id, user_id, client_identifier, friendly_name, platform, version) \
             values ($1,$2,$3,$4,$5,$6) \
             on conflict (user_id, client_identifier) do update set \
             friendly_name = excluded.friendly_name, platform = excluded.platform, \
             version = excluded.version, updated_at = now() \
             returning id, user_id, client_identifier, friendly_name, platform, version, \
             created_at, updated_at",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(&registration.client_identifier)
        .bind(&registration.friendly_name)
        .bind(&registration.platform)
        .bind(&registration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(row.into())
    }
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    device_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
    revoked: bool,
    refresh_token_hash: String,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id.into(),
            user_id: row.user_id.into(),
            device_id: row.device_id.into(),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            last_used_at: row.last_used_at,
            revoked: row.revoked,
            refresh_token_hash: row.refresh_token_hash,
        }
    }
}

const SELECT: &str = "select id, user_id, device_id, issued_at, expires_at, last_used_at, \
    revoked, refresh_token_hash from sessions";

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        expires_at: DateTime<Utc>,
        refresh_token_hash: String,
    ) -> CoreResult<Session> {
        let id = SessionId::new();
        let row: SessionRow = sqlx::query_as(&format!(
            "insert into sessions (id, user_id, device_id, expires_at, refresh_token_hash) \
             values ($1,$2,$3,$4,$5) returning {}",
            columns()
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(device_id.as_uuid())
        .bind(expires_at)
        .bind(&refresh_token_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(row.into())
    }

    async fn get(&self, id: SessionId) -> CoreResult<Session> {
        let row: Option<SessionRow> = sqlx::query_as(&format!("{SELECT} where id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_tx_error)?;
        row.map(Into::into).ok_or_else(|| not_found("session not found"))
    }

    async fn find_by_refresh_hash(&self, hash: &str) -> CoreResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!("{SELECT} where refresh_token_hash = $1"))
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(row.map(Into::into))
    }

    async fn touch(&self, id: SessionId) -> CoreResult<()> {
        sqlx::query("update sessions set last_used_at = now() where id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(())
    }

    async fn extend(
        &self,
        id: SessionId,
        expires_at: DateTime<Utc>,
        refresh_token_hash: String,
    ) -> CoreResult<Session> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "update sessions set expires_at = $2, refresh_token_hash = $3, last_used_at = now() \
             where id = $1 returning {}",
            columns()
        ))
        .bind(id.as_uuid())
        .bind(expires_at)
        .bind(&refresh_token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tx_error)?;
        row.map(Into::into).ok_or_else(|| not_found("session not found"))
    }

    async fn revoke(&self, id: SessionId) -> CoreResult<()> {
        sqlx::query("update sessions set revoked = true where id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(())
    }
}

fn columns() -> &'static str {
    "id, user_id, device_id, issued_at, expires_at, last_used_at, revoked, refresh_token_hash"
}

use crate::ids::{DeviceId, SessionId, UserId};
use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated binding of a user to a device with an expiry.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub revoked: bool,
    #[graphql(skip)]
    pub refresh_token_hash: String,
}

impl Session {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

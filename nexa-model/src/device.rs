use crate::ids::{DeviceId, UserId};
use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// (user, client-identifier) registration. Identifier+user is unique.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Device {
    pub id: DeviceId,
    pub user_id: UserId,
    pub client_identifier: String,
    pub friendly_name: String,
    pub platform: Option<String>,
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client device metadata submitted on login, from which a `Device` row is
/// created or updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub client_identifier: String,
    pub friendly_name: String,
    pub platform: Option<String>,
    pub version: Option<String>,
}

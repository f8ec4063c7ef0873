use crate::ids::UserId;
use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account able to authenticate against the server. Authorization is a
/// flat administrator flag rather than a role hierarchy, per spec.md §4.F
/// ("Administrator role gates write endpoints... Authenticated suffices
/// for reads").
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[graphql(skip)]
    pub password_hash: String,
    pub is_administrator: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationPolicy {
    Authenticated,
    Administrator,
}

impl AuthorizationPolicy {
    pub fn permits(self, user: &User) -> bool {
        match self {
            AuthorizationPolicy::Authenticated => true,
            AuthorizationPolicy::Administrator => user.is_administrator,
        }
    }
}

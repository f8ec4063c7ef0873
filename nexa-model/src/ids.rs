//! Strongly typed identifiers.
//!
//! Every catalog entity carries an internal `RowId` for referential joins
//! plus a stable external UUID used on external interfaces, following the
//! split the teacher's `LibraryId`/`MovieId` newtypes establish.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Internal integer identity, never exposed across the GraphQL/HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }

        #[async_graphql::Scalar]
        impl async_graphql::ScalarType for $name {
            fn parse(value: async_graphql::Value) -> async_graphql::InputValueResult<Self> {
                match &value {
                    async_graphql::Value::String(s) => Uuid::parse_str(s)
                        .map($name)
                        .map_err(|e| async_graphql::InputValueError::custom(e.to_string())),
                    _ => Err(async_graphql::InputValueError::expected_type(value)),
                }
            }

            fn to_value(&self) -> async_graphql::Value {
                async_graphql::Value::String(self.0.to_string())
            }
        }

    };
}

uuid_id!(LibrarySectionId);
uuid_id!(MetadataItemId);
uuid_id!(MediaPartId);
uuid_id!(PersonId);
uuid_id!(UserId);
uuid_id!(DeviceId);
uuid_id!(SessionId);
uuid_id!(JobId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_v7_and_distinct() {
        let a = LibrarySectionId::new();
        let b = LibrarySectionId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 7);
    }
}

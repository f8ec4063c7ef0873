use crate::ids::{MetadataItemId, PersonId};
use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

/// The kind of typed edge between two catalog items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    /// Tree edge: Show→Season→Episode, ReleaseGroup→Release→Medium→Track,
    /// Series→EditionGroup→Edition→EditionItem. Forms an acyclic forest
    /// scoped to one library section.
    ParentOf,
    /// Owner item → extra item (trailer, featurette, ...).
    ContainsExtra,
    /// Person → item, with an optional role string (e.g. "Director").
    PersonCredit,
}

/// A typed edge between two items.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Relation {
    pub id: i64,
    pub kind: RelationKind,
    pub parent_item_id: Option<MetadataItemId>,
    pub child_item_id: Option<MetadataItemId>,
    pub person_id: Option<PersonId>,
    pub subject_item_id: Option<MetadataItemId>,
    pub role: Option<String>,
    pub sort_order: i32,
}

/// Credit role kind, used to distinguish `Cast` and `Crew` hub projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditKind {
    Cast,
    Crew,
}

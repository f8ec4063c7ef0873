use crate::ids::{LibrarySectionId, MetadataItemId, PersonId};
use crate::metadata_type::MetadataType;
use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

/// A (provider, value) reference to an item in an external catalog, e.g.
/// `("tmdb", "603")`.
pub type ExternalIds = BTreeMap<String, String>;

/// User-or-agent-extensible typed value bag, stored as JSON.
pub type ExtraFields = BTreeMap<String, JsonValue>;

/// Canonical field names that may be locked against agent overwrite.
/// Kept as plain strings (not an enum) so new agent hint keys don't require
/// a model change — matches the spec's "canonical field names" wording.
pub type LockedFields = BTreeSet<String>;

/// The result of reading an `ExtraFields` entry through a typed accessor.
/// Never throws: absent and uncoercible are both represented values, not
/// errors, per the spec's "sum of states" design note.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraFieldValue {
    Present(String),
    Uncoercible,
    Absent,
}

/// Coerce a JSON extra-field value to its string representation.
/// Strings pass through, numbers print as raw text, booleans coerce to
/// "1"/"0"; anything else (arrays, objects, null) is uncoercible.
pub fn coerce_extra_field(fields: &ExtraFields, key: &str) -> ExtraFieldValue {
    match fields.get(key) {
        None => ExtraFieldValue::Absent,
        Some(JsonValue::String(s)) => ExtraFieldValue::Present(s.clone()),
        Some(JsonValue::Number(n)) => ExtraFieldValue::Present(n.to_string()),
        Some(JsonValue::Bool(b)) => ExtraFieldValue::Present(if *b { "1" } else { "0" }.into()),
        Some(_) => ExtraFieldValue::Uncoercible,
    }
}

/// Polymorphic catalog record. Concrete semantics are driven by `item_type`;
/// per-type structural differences live in `extra_fields` rather than a
/// type hierarchy (see DESIGN.md "Polymorphic item graph").
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct MetadataItem {
    pub id: MetadataItemId,
    pub library_section_id: LibrarySectionId,
    pub item_type: MetadataType,
    pub title: String,
    pub sort_title: String,
    pub original_title: Option<String>,
    pub summary: Option<String>,
    pub tagline: Option<String>,
    pub content_rating: Option<String>,
    pub year: Option<i32>,
    pub originally_available_at: Option<chrono::NaiveDate>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    #[graphql(skip)]
    pub locked_fields: LockedFields,
    pub thumb_uri: Option<String>,
    pub art_uri: Option<String>,
    pub logo_uri: Option<String>,
    pub thumb_blurhash: Option<String>,
    pub art_blurhash: Option<String>,
    pub length_ms: Option<i64>,
    pub primary_person_id: Option<PersonId>,
    #[graphql(skip)]
    pub external_ids: ExternalIds,
    #[graphql(skip)]
    pub extra_fields: ExtraFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[async_graphql::ComplexObject]
impl MetadataItem {
    /// Whether the named field is currently locked against agent writes.
    async fn is_field_locked(&self, field: String) -> bool {
        self.locked_fields.contains(&field)
    }

    async fn locked_field_names(&self) -> Vec<String> {
        self.locked_fields.iter().cloned().collect()
    }

    async fn external_id(&self, provider: String) -> Option<String> {
        self.external_ids.get(&provider).cloned()
    }
}

impl MetadataItem {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Apply an agent-sourced field update, honoring locks. Returns `true`
    /// if the title changed (callers must then regenerate `sort_title`).
    pub fn apply_agent_title(&mut self, new_title: String) -> bool {
        if self.locked_fields.contains("title") {
            return false;
        }
        if self.title != new_title {
            self.title = new_title;
            true
        } else {
            false
        }
    }

    /// Apply a user-initiated edit. Locks never block a user edit.
    pub fn apply_user_title(&mut self, new_title: String) {
        self.title = new_title;
    }

    pub fn lock(&mut self, fields: impl IntoIterator<Item = String>) {
        self.locked_fields.extend(fields);
    }

    pub fn unlock(&mut self, fields: impl IntoIterator<Item = String>) {
        for f in fields {
            self.locked_fields.remove(&f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> MetadataItem {
        MetadataItem {
            id: MetadataItemId::new(),
            library_section_id: LibrarySectionId::new(),
            item_type: MetadataType::Movie,
            title: "Original".into(),
            sort_title: "Original".into(),
            original_title: None,
            summary: None,
            tagline: None,
            content_rating: None,
            year: None,
            originally_available_at: None,
            genres: vec![],
            tags: vec![],
            locked_fields: Default::default(),
            thumb_uri: None,
            art_uri: None,
            logo_uri: None,
            thumb_blurhash: None,
            art_blurhash: None,
            length_ms: None,
            primary_person_id: None,
            external_ids: Default::default(),
            extra_fields: Default::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn locked_field_blocks_agent_but_not_user() {
        let mut m = item();
        m.lock(["title".to_string()]);
        assert!(!m.apply_agent_title("Agent Title".into()));
        assert_eq!(m.title, "Original");
        m.apply_user_title("User Title".into());
        assert_eq!(m.title, "User Title");
    }

    #[test]
    fn lock_and_unlock_are_idempotent() {
        let mut m = item();
        m.lock(["title".to_string()]);
        m.lock(["title".to_string()]);
        assert_eq!(m.locked_fields.len(), 1);
        m.unlock(["title".to_string()]);
        m.unlock(["title".to_string()]);
        assert!(m.locked_fields.is_empty());
    }

    #[test]
    fn extra_field_coercion_never_throws() {
        let mut fields = ExtraFields::new();
        fields.insert("s".into(), JsonValue::String("x".into()));
        fields.insert("n".into(), JsonValue::from(42));
        fields.insert("b".into(), JsonValue::Bool(true));
        fields.insert("arr".into(), JsonValue::Array(vec![]));

        assert_eq!(
            coerce_extra_field(&fields, "s"),
            ExtraFieldValue::Present("x".into())
        );
        assert_eq!(
            coerce_extra_field(&fields, "n"),
            ExtraFieldValue::Present("42".into())
        );
        assert_eq!(
            coerce_extra_field(&fields, "b"),
            ExtraFieldValue::Present("1".into())
        );
        assert_eq!(coerce_extra_field(&fields, "arr"), ExtraFieldValue::Uncoercible);
        assert_eq!(coerce_extra_field(&fields, "missing"), ExtraFieldValue::Absent);
    }
}

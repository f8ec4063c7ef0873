use crate::ids::{LibrarySectionId, MetadataItemId, PersonId};
use crate::metadata_type::MetadataType;
use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

/// The kind of ranked projection a hub surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubType {
    RecentlyAdded,
    ContinueWatching,
    RecentlyReleased,
    TopRated,
    ByGenre,
    ByDirector,
    MoreFromShow,
    Cast,
    Crew,
}

/// Scopes a hub to a page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubContext {
    Home,
    LibraryDiscover,
    ItemDetail,
}

/// A compiled hub definition: what to show, where, and how to rank it.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct HubDefinition {
    pub hub_type: HubType,
    pub title: String,
    pub metadata_type: MetadataType,
    pub hub_context: HubContext,
    pub sort_order: i32,
    pub filter_value: Option<String>,
    pub widget_hint: Option<String>,
}

/// One resolved hub row: either an item or a person, never both.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct HubItem {
    pub item_id: MetadataItemId,
    pub title: String,
    pub thumb_uri: Option<String>,
    pub rank_key: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct HubPerson {
    pub person_id: PersonId,
    pub name: String,
    pub role: Option<String>,
    pub thumb_uri: Option<String>,
}

/// Admin-configured enable/disable list for a hub scope. Unknown hub types
/// added to the system later default to enabled, per spec.md §4.D.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, SimpleObject)]
pub struct HubConfiguration {
    pub scope: HubConfigScope,
    pub enabled: Vec<HubType>,
    pub disabled: Vec<HubType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, SimpleObject)]
pub struct HubConfigScope {
    pub context: Option<HubContext>,
    pub library_section_id: Option<LibrarySectionId>,
    pub metadata_type: Option<MetadataType>,
}

impl HubConfigScope {
    /// Validates context/scope alignment: Home MUST omit library and
    /// metadata-type; LibraryDiscover MUST set library only; ItemDetail
    /// MUST set metadata-type (and omit library).
    pub fn validate(&self) -> Result<(), String> {
        match self.context {
            Some(HubContext::Home) => {
                if self.library_section_id.is_some() || self.metadata_type.is_some() {
                    return Err(
                        "Home hub configuration cannot be scoped to library or metadata type"
                            .to_string(),
                    );
                }
            }
            Some(HubContext::LibraryDiscover) => {
                if self.library_section_id.is_none() {
                    return Err(
                        "LibraryDiscover hub configuration requires a library section".to_string(),
                    );
                }
                if self.metadata_type.is_some() {
                    return Err(
                        "LibraryDiscover hub configuration cannot set a metadata type".to_string(),
                    );
                }
            }
            Some(HubContext::ItemDetail) => {
                if self.metadata_type.is_none() {
                    return Err(
                        "ItemDetail hub configuration requires a metadata type".to_string(),
                    );
                }
                if self.library_section_id.is_some() {
                    return Err(
                        "ItemDetail hub configuration cannot set a library section".to_string(),
                    );
                }
            }
            None => return Err("hub configuration requires a context".to_string()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_scope_rejects_library() {
        let scope = HubConfigScope {
            context: Some(HubContext::Home),
            library_section_id: Some(LibrarySectionId::new()),
            metadata_type: None,
        };
        let err = scope.validate().unwrap_err();
        assert!(err.contains("Home hub configuration cannot be scoped to library"));
    }

    #[test]
    fn library_discover_requires_library() {
        let scope = HubConfigScope {
            context: Some(HubContext::LibraryDiscover),
            library_section_id: None,
            metadata_type: None,
        };
        assert!(scope.validate().is_err());
    }

    #[test]
    fn item_detail_requires_metadata_type_only() {
        let scope = HubConfigScope {
            context: Some(HubContext::ItemDetail),
            library_section_id: None,
            metadata_type: Some(MetadataType::Movie),
        };
        assert!(scope.validate().is_ok());
    }
}

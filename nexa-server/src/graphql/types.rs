//! GraphQL-only shapes: inputs, flattened search hits, and the nested
//! fields `LibrarySection` can't expose itself (spec.md §6). `nexa-model`
//! types only depend on `nexa-contracts` traits one way, so anything a
//! resolver here needs a repository for has to live at this layer instead
//! of as a `ComplexObject` method on the model type.

use async_graphql::{Enum, InputObject, SimpleObject, Union};
use nexa_model::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum SearchPivot {
    Title,
    Person,
}

#[derive(SimpleObject)]
pub struct PersonSearchHit {
    pub person: HubPerson,
}

#[derive(SimpleObject)]
pub struct ItemSearchHit {
    pub item: MetadataItem,
}

#[derive(Union)]
pub enum SearchHit {
    Item(ItemSearchHit),
    Person(PersonSearchHit),
}

#[derive(SimpleObject)]
pub struct FileSystemRoot {
    pub path: String,
    pub label: String,
}

#[derive(SimpleObject)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
}

#[derive(InputObject)]
pub struct HubItemsInput {
    pub hub_type: HubType,
    pub hub_context: HubContext,
    pub library_section_id: Option<LibrarySectionId>,
    pub item_id: Option<MetadataItemId>,
    pub filter_value: Option<String>,
    pub count: Option<u32>,
}

#[derive(InputObject)]
pub struct UpdateMetadataItemInput {
    pub title: Option<String>,
    pub sort_title: Option<String>,
    pub summary: Option<String>,
    pub tagline: Option<String>,
    pub year: Option<i32>,
    pub originally_available_at: Option<chrono::NaiveDate>,
    pub genres: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct HubConfigurationInput {
    pub context: Option<HubContext>,
    pub library_section_id: Option<LibrarySectionId>,
    pub metadata_type: Option<MetadataType>,
    pub enabled: Vec<HubType>,
    pub disabled: Vec<HubType>,
}

#[derive(SimpleObject)]
pub struct ServerInfo {
    pub version: String,
    pub dev_mode: bool,
}

use crate::error::CoreResult;
use async_trait::async_trait;
use nexa_model::prelude::*;

/// Identifies the caller for hub resolution: which user, optionally
/// scoped to one library section or one context item.
#[derive(Debug, Clone)]
pub struct HubQuery {
    pub hub_type: HubType,
    pub context: HubContext,
    pub user_id: UserId,
    pub library_section_id: Option<LibrarySectionId>,
    pub item_id: Option<MetadataItemId>,
    pub filter_value: Option<String>,
    pub count: u32,
}

#[async_trait]
pub trait HubEngine: Send + Sync {
    async fn get_hub_definitions(&self, context: HubContext) -> CoreResult<Vec<HubDefinition>>;
    async fn get_hub_items(&self, query: &HubQuery) -> CoreResult<Vec<HubItem>>;
    async fn get_hub_people(&self, query: &HubQuery) -> CoreResult<Vec<HubPerson>>;
    async fn get_configuration(&self, scope: &HubConfigScope) -> CoreResult<HubConfiguration>;
    async fn set_configuration(&self, config: HubConfiguration) -> CoreResult<HubConfiguration>;
}

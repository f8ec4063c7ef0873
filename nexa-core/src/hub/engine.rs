use crate::hub::definitions::default_definitions;
use async_trait::async_trait;
use nexa_contracts::catalog::{MetadataItemFilter, MetadataItemRepository, MetadataSortField, RelationRepository, SortOrder};
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::hub::{HubEngine, HubQuery};
use nexa_model::prelude::*;
use std::sync::Arc;

const CONFIG_SETTING_PREFIX: &str = "hub_configuration:";

fn config_key(scope: &HubConfigScope) -> String {
    match scope.context {
        Some(HubContext::Home) => format!("{CONFIG_SETTING_PREFIX}home"),
        Some(HubContext::LibraryDiscover) => {
            format!("{CONFIG_SETTING_PREFIX}library:{}", scope.library_section_id.map(|i| i.to_string()).unwrap_or_default())
        }
        Some(HubContext::ItemDetail) => {
            format!("{CONFIG_SETTING_PREFIX}item:{:?}", scope.metadata_type)
        }
        None => format!("{CONFIG_SETTING_PREFIX}unscoped"),
    }
}

/// Resolves hub definitions and hub rows against the catalog repositories.
/// Hub configuration is persisted through `SettingsRepository` as a JSON
/// blob keyed by scope, rather than a dedicated table — it is exactly the
/// "typed option late-bound over a (key, value) row" pattern spec.md §3
/// uses for every other server setting.
pub struct CatalogHubEngine {
    items: Arc<dyn MetadataItemRepository>,
    relations: Arc<dyn RelationRepository>,
    settings: Arc<dyn nexa_contracts::catalog::SettingsRepository>,
}

impl CatalogHubEngine {
    pub fn new(
        items: Arc<dyn MetadataItemRepository>,
        relations: Arc<dyn RelationRepository>,
        settings: Arc<dyn nexa_contracts::catalog::SettingsRepository>,
    ) -> Self {
        Self { items, relations, settings }
    }

    async fn enabled_types(&self, context: HubContext, scope: &HubConfigScope) -> CoreResult<Vec<HubType>> {
        let config = self.get_configuration(scope).await.unwrap_or_else(|_| HubConfiguration {
            scope: scope.clone(),
            enabled: default_definitions(context).into_iter().map(|d| d.hub_type).collect(),
            disabled: Vec::new(),
        });
        Ok(config.enabled.into_iter().filter(|t| !config.disabled.contains(t)).collect())
    }
}

#[async_trait]
impl HubEngine for CatalogHubEngine {
    async fn get_hub_definitions(&self, context: HubContext) -> CoreResult<Vec<HubDefinition>> {
        let scope = HubConfigScope { context: Some(context), library_section_id: None, metadata_type: None };
        let enabled = self.enabled_types(context, &scope).await?;
        let mut defs: Vec<HubDefinition> = default_definitions(context)
            .into_iter()
            .filter(|d| enabled.contains(&d.hub_type))
            .collect();
        defs.sort_by_key(|d| d.sort_order);
        Ok(defs)
    }

    async fn get_hub_items(&self, query: &HubQuery) -> CoreResult<Vec<HubItem>> {
        let rows = match query.hub_type {
            HubType::MoreFromShow => {
                let Some(item_id) = query.item_id else {
                    return Err(CoreError::invalid_argument("MoreFromShow requires an item id"));
                };
                self.relations.children_of(item_id).await?
            }
            _ => {
                let mut filter = MetadataItemFilter { library_section_id: query.library_section_id, ..Default::default() };
                if let Some(genre) = &query.filter_value {
                    if query.hub_type == HubType::ByGenre {
                        filter.genre = Some(genre.clone());
                    }
                }
                let (sort, order) = sort_for(query.hub_type);
                self.items
                    .query(&filter, sort, order, &Pagination::offset(0, query.count))
                    .await?
                    .items
            }
        };

        Ok(rows
            .into_iter()
            .take(query.count as usize)
            .enumerate()
            .map(|(rank, item)| HubItem {
                item_id: item.id,
                title: item.title,
                thumb_uri: item.thumb_uri,
                rank_key: -(rank as f64),
            })
            .collect())
    }

    async fn get_hub_people(&self, query: &HubQuery) -> CoreResult<Vec<HubPerson>> {
        let Some(item_id) = query.item_id else {
            return Err(CoreError::invalid_argument("hub people queries require an item id"));
        };
        let kind = match query.hub_type {
            HubType::Crew => CreditKind::Crew,
            _ => CreditKind::Cast,
        };
        let credits = self.relations.credits_for(item_id, kind).await?;
        Ok(credits
            .into_iter()
            .filter_map(|c| {
                Some(HubPerson {
                    person_id: c.person_id?,
                    name: c.role.clone().unwrap_or_default(),
                    role: c.role,
                    thumb_uri: None,
                })
            })
            .take(query.count as usize)
            .collect())
    }

    async fn get_configuration(&self, scope: &HubConfigScope) -> CoreResult<HubConfiguration> {
        scope.validate().map_err(CoreError::invalid_argument)?;
        let raw = self.settings.get_raw(&config_key(scope)).await?;
        match raw {
            Some(json) => {
                let mut config: HubConfiguration = serde_json::from_str(&json)
                    .map_err(|e| CoreError::internal(format!("corrupt hub configuration: {e}")))?;
                if let Some(context) = scope.context {
                    for hub_type in default_definitions(context).into_iter().map(|d| d.hub_type) {
                        if !config.enabled.contains(&hub_type) && !config.disabled.contains(&hub_type) {
                            config.enabled.push(hub_type);
                        }
                    }
                }
                Ok(config)
            }
            None => {
                let context = scope.context.unwrap();
                Ok(HubConfiguration {
                    scope: scope.clone(),
                    enabled: default_definitions(context).into_iter().map(|d| d.hub_type).collect(),
                    disabled: Vec::new(),
                })
            }
        }
    }

    async fn set_configuration(&self, config: HubConfiguration) -> CoreResult<HubConfiguration> {
        config.scope.validate().map_err(CoreError::invalid_argument)?;
        let json = serde_json::to_string(&config).map_err(|e| CoreError::internal(e.to_string()))?;
        self.settings.set_raw(&config_key(&config.scope), &json).await?;
        Ok(config)
    }
}

fn sort_for(hub_type: HubType) -> (MetadataSortField, SortOrder) {
    match hub_type {
        HubType::RecentlyAdded | HubType::ContinueWatching => (MetadataSortField::AddedAt, SortOrder::Desc),
        HubType::RecentlyReleased => (MetadataSortField::OriginallyAvailableAt, SortOrder::Desc),
        // No rating column exists in the specified data model (spec.md §3);
        // fall back to recency until a rating field is added.
        HubType::TopRated => (MetadataSortField::AddedAt, SortOrder::Desc),
        _ => (MetadataSortField::SortTitle, SortOrder::Asc),
    }
}

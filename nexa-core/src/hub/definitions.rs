use nexa_model::prelude::*;

/// Built-in hub catalog per context. Admin `HubConfiguration` enable/disable
/// lists operate on top of this fixed set; hub types introduced here after
/// an admin has already saved a configuration default to enabled, per
/// spec.md §4.D.
pub fn default_definitions(context: HubContext) -> Vec<HubDefinition> {
    match context {
        HubContext::Home => vec![
            def(HubType::ContinueWatching, "Continue Watching", MetadataType::Movie, context, 0),
            def(HubType::RecentlyAdded, "Recently Added", MetadataType::Movie, context, 1),
            def(HubType::RecentlyReleased, "Recently Released", MetadataType::Movie, context, 2),
        ],
        HubContext::LibraryDiscover => vec![
            def(HubType::RecentlyAdded, "Recently Added", MetadataType::Movie, context, 0),
            def(HubType::TopRated, "Top Rated", MetadataType::Movie, context, 1),
            def(HubType::ByGenre, "By Genre", MetadataType::Movie, context, 2),
        ],
        HubContext::ItemDetail => vec![
            def(HubType::MoreFromShow, "More Like This", MetadataType::Movie, context, 0),
            def(HubType::Cast, "Cast", MetadataType::Person, context, 1),
            def(HubType::Crew, "Crew", MetadataType::Person, context, 2),
        ],
    }
}

fn def(hub_type: HubType, title: &str, metadata_type: MetadataType, context: HubContext, order: i32) -> HubDefinition {
    HubDefinition {
        hub_type,
        title: title.to_string(),
        metadata_type,
        hub_context: context,
        sort_order: order,
        filter_value: None,
        widget_hint: None,
    }
}

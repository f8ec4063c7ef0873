use nexa_config::Config;
use nexa_contracts::agent::MetadataAgent;
use nexa_contracts::auth::{DeviceRepository, SessionRepository, UserRepository};
use nexa_contracts::catalog::{
    LibrarySectionRepository, MediaPartRepository, MetadataItemRepository, RelationRepository, SettingsRepository,
};
use nexa_contracts::hub::HubEngine;
use nexa_contracts::jobs::JobRepository;
use nexa_core::auth::AuthService;
use nexa_core::image::ImageService;
use nexa_core::jobs::JobScheduler;
use nexa_core::streaming::StreamingSessionManager;
use std::sync::Arc;

/// Everything a GraphQL resolver or HTTP handler needs, one `Arc` clone
/// away. Assembled once in `main` and shared across every axum route and
/// the GraphQL schema's context data.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sections: Arc<dyn LibrarySectionRepository>,
    pub items: Arc<dyn MetadataItemRepository>,
    pub media_parts: Arc<dyn MediaPartRepository>,
    pub relations: Arc<dyn RelationRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub users: Arc<dyn UserRepository>,
    pub devices: Arc<dyn DeviceRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub agents: Vec<Arc<dyn MetadataAgent>>,
    pub hub: Arc<dyn HubEngine>,
    pub scheduler: Arc<JobScheduler>,
    pub auth: Arc<AuthService>,
    pub streaming: Arc<StreamingSessionManager>,
    pub images: Arc<ImageService>,
}

//! Nexa Media Server
//!
//! A self-hosted media indexing, metadata, and streaming service. This
//! binary wires together the catalog store, scan pipeline, metadata
//! agents, hub engine, job scheduler, auth/session core, and streaming
//! session manager into one axum process exposing a GraphQL catalog API
//! alongside plain HTTP auth/image/streaming endpoints.
//!
//! ## Architecture
//!
//! - PostgreSQL for persistent storage
//! - `ffmpeg` for technical probing and segment production
//! - A pluggable remote metadata provider for online lookups

mod context;
mod error;
mod graphql;
mod middleware;
mod routes;
mod state;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use axum::extract::{Extension, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use nexa_config::{ConfigLoader, RemoteMetadataConfig};
use nexa_core::agents::{EmbeddedAgent, LocalAgent, RemoteMetadataAgent, SidecarAgent};
use nexa_core::auth::{AuthService, JwtKeyManager, PgDeviceRepository, PgSessionRepository, PgUserRepository};
use nexa_core::catalog::postgres::{
    PgLibrarySectionRepository, PgMediaPartRepository, PgMetadataItemRepository, PgRelationRepository, PgSettingsRepository,
};
use nexa_core::hub::CatalogHubEngine;
use nexa_core::image::{ImageGenerationWorker, ImageService};
use nexa_core::jobs::{DeferredSubmitter, JobScheduler, PgJobRepository};
use nexa_core::scan::{FileAnalysisWorker, LibraryScanWorker, MetadataRefreshWorker};
use nexa_core::streaming::{StreamingSessionManager, TrickplayWorker};
use nexa_model::prelude::*;
use nexa_model::settings::{GenreMappingSettings, TagModerationSettings};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "nexa_server=info,nexa_core=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConfigLoader::load().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        anyhow::anyhow!(e)
    })?;

    for warning in nexa_config::validate(&config) {
        warn!(%warning, "configuration warning");
    }

    config.cache.ensure_directories()?;
    let config = Arc::new(config);

    info!(database = %redact_url(&config.database.url), "connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database migrations applied");

    let sections: Arc<dyn nexa_contracts::catalog::LibrarySectionRepository> = Arc::new(PgLibrarySectionRepository::new(pool.clone()));
    let items: Arc<dyn nexa_contracts::catalog::MetadataItemRepository> = Arc::new(PgMetadataItemRepository::new(pool.clone()));
    let media_parts: Arc<dyn nexa_contracts::catalog::MediaPartRepository> = Arc::new(PgMediaPartRepository::new(pool.clone()));
    let relations: Arc<dyn nexa_contracts::catalog::RelationRepository> = Arc::new(PgRelationRepository::new(pool.clone()));
    let settings: Arc<dyn nexa_contracts::catalog::SettingsRepository> = Arc::new(PgSettingsRepository::new(pool.clone()));
    let users: Arc<dyn nexa_contracts::auth::UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let devices: Arc<dyn nexa_contracts::auth::DeviceRepository> = Arc::new(PgDeviceRepository::new(pool.clone()));
    let sessions: Arc<dyn nexa_contracts::auth::SessionRepository> = Arc::new(PgSessionRepository::new(pool.clone()));
    let job_repo: Arc<dyn nexa_contracts::jobs::JobRepository> = Arc::new(PgJobRepository::new(pool.clone()));

    let agents = build_agents(&config.remote_metadata)?;
    let genre_map = GenreMappingSettings::default();
    let tag_moderation = TagModerationSettings::default();

    let deferred = DeferredSubmitter::new();
    let mut scheduler = JobScheduler::new(job_repo.clone(), Duration::from_millis(config.jobs.flush_interval_ms));
    scheduler.register_worker(Arc::new(LibraryScanWorker::new(
        sections.clone(),
        items.clone(),
        media_parts.clone(),
        agents.clone(),
        genre_map.clone(),
        tag_moderation.clone(),
        deferred.clone(),
    )));
    scheduler.register_worker(Arc::new(MetadataRefreshWorker::new(
        sections.clone(),
        items.clone(),
        media_parts.clone(),
        agents.clone(),
        genre_map.clone(),
        tag_moderation.clone(),
    )));
    scheduler.register_worker(Arc::new(FileAnalysisWorker::new(media_parts.clone())));

    let images = ImageService::new(config.cache.images.clone());
    scheduler.register_worker(Arc::new(ImageGenerationWorker::new(items.clone(), images.clone())));
    scheduler.register_worker(Arc::new(TrickplayWorker::new(
        media_parts.clone(),
        items.clone(),
        config.cache.root.clone(),
        config.trickplay.clone(),
    )));

    let scheduler = Arc::new(scheduler);
    deferred.bind(Arc::downgrade(&scheduler) as std::sync::Weak<dyn nexa_contracts::jobs::JobSubmitter>);

    let hub: Arc<dyn nexa_contracts::hub::HubEngine> = Arc::new(CatalogHubEngine::new(items.clone(), relations.clone(), settings.clone()));

    let keys = Arc::new(JwtKeyManager::new(config.auth.jwt_signing_key.clone(), chrono::Duration::seconds(900)));
    let auth = Arc::new(AuthService::new(users.clone(), devices.clone(), sessions.clone(), keys, config.auth.session));

    let streaming = StreamingSessionManager::new(media_parts.clone(), config.streaming);

    let shutdown = CancellationToken::new();
    tokio::spawn(streaming.clone().run_idle_reaper(shutdown.clone()));
    tokio::spawn(nexa_core::jobs::run_retention_cleanup(
        job_repo.clone(),
        config.jobs.history_retention_days,
        Duration::from_secs(3600),
        shutdown.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        sections,
        items,
        media_parts,
        relations,
        settings,
        users,
        devices,
        sessions,
        jobs: job_repo,
        agents,
        hub,
        scheduler,
        auth,
        streaming,
        images,
    };

    let app = create_app(state);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "starting nexa-server");
    warn!("TLS is not terminated by this process; run it behind a reverse proxy for anything but local development");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}

fn build_agents(remote: &RemoteMetadataConfig) -> anyhow::Result<Vec<Arc<dyn nexa_contracts::agent::MetadataAgent>>> {
    let mut agents: Vec<Arc<dyn nexa_contracts::agent::MetadataAgent>> =
        vec![Arc::new(SidecarAgent), Arc::new(EmbeddedAgent), Arc::new(LocalAgent)];

    if let Some(base_address) = &remote.base_address {
        let remote_agent = RemoteMetadataAgent::new(base_address.clone(), remote.api_key.clone(), Default::default(), &remote.http)?;
        agents.push(Arc::new(remote_agent));
    } else {
        info!("no remote metadata base address configured; remote lookups disabled");
    }

    Ok(agents)
}

async fn shutdown_signal(token: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    token.cancel();
}

fn redact_url(url: &str) -> String {
    match url.find('@') {
        Some(at) => match url.find("://") {
            Some(scheme_end) => format!("{}://***{}", &url[..scheme_end], &url[at..]),
            None => "***".to_string(),
        },
        None => url.to_string(),
    }
}

/// Resolves the caller from the bearer token, if any, and attaches it as
/// GraphQL context data so `Viewer::require` can find it — unauthenticated
/// requests still reach the schema, and fail only at resolvers that demand
/// a viewer.
async fn graphql_handler(
    State(state): State<AppState>,
    Extension(schema): Extension<graphql::NexaSchema>,
    headers: axum::http::HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(token) = headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()).and_then(|v| v.strip_prefix("Bearer ")) {
        if let Ok((user, session)) = state.auth.authenticate(token).await {
            request = request.data(context::Viewer { user, session });
        }
    }

    schema.execute(request).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").subscription_endpoint("/graphql/ws").finish())
}

/// Extracts a bearer token from the `connection_init` payload and resolves
/// it into a `Viewer`, same as `graphql_handler` does from the `Authorization`
/// header — the only way a subscription ever sees an authenticated caller.
async fn subscription_connection_init(state: AppState, payload: serde_json::Value) -> async_graphql::Result<async_graphql::Data> {
    let mut data = async_graphql::Data::default();
    let token = payload
        .get("Authorization")
        .or_else(|| payload.get("authorization"))
        .and_then(|v| v.as_str())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = token {
        if let Ok((user, session)) = state.auth.authenticate(token).await {
            data.insert(context::Viewer { user, session });
        }
    }
    Ok(data)
}

fn create_app(state: AppState) -> Router {
    let schema = graphql::build_schema(state.clone());
    let ws_state = state.clone();
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route_service(
            "/graphql/ws",
            GraphQLSubscription::new(schema.clone())
                .on_connection_init(move |payload| subscription_connection_init(ws_state.clone(), payload)),
        )
        .nest("/api/v1", routes::create_api_router())
        .layer(Extension(schema))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}

use crate::model::{
    AuthConfig, CacheConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig, RemoteMetadataConfig,
    ServerConfig,
};
use crate::util::{parse_bool_var, parse_csv_var, parse_num_var};
use nexa_model::settings::{JobNotificationSettings, RemoteMetadataHttpSettings, SessionSettings, StreamingSettings, TrickplaySettings};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("required environment variable {0} is not set")]
    MissingRequired(&'static str),
    #[error("environment variable {name} has an invalid value: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Loads `.env` (if present) then composes a `Config` from the process
/// environment, falling back to the typed settings' own defaults for
/// everything an operator hasn't overridden. Mirrors the teacher's
/// `ConfigLoader`: a `.env` file is a convenience layer under real
/// environment variables, never a substitute for them.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<Config, ConfigLoadError> {
        let env_file_loaded = dotenvy::dotenv().is_ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigLoadError::MissingRequired("DATABASE_URL"))?;
        let jwt_signing_key = std::env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigLoadError::MissingRequired("JWT_SIGNING_KEY"))?;

        let dev_mode = parse_bool_var("NEXA_DEV_MODE", false);
        let cache_root = std::env::var("NEXA_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/cache"));

        let config = Config {
            server: ServerConfig {
                host: std::env::var("NEXA_HOST").unwrap_or_else(|_| ServerConfig::default().host),
                port: parse_num_var("NEXA_PORT", ServerConfig::default().port),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_num_var("NEXA_DB_MAX_CONNECTIONS", 10),
            },
            auth: AuthConfig {
                jwt_signing_key,
                session: SessionSettings {
                    lifetime_days: parse_num_var("NEXA_SESSION_LIFETIME_DAYS", SessionSettings::default().lifetime_days),
                },
            },
            cache: CacheConfig::new(cache_root),
            cors: CorsConfig {
                allowed_origins: parse_csv_var("NEXA_CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            },
            jobs: JobNotificationSettings {
                flush_interval_ms: parse_num_var(
                    "NEXA_JOB_FLUSH_INTERVAL_MS",
                    JobNotificationSettings::default().flush_interval_ms,
                ),
                history_retention_days: parse_num_var(
                    "NEXA_JOB_RETENTION_DAYS",
                    JobNotificationSettings::default().history_retention_days,
                ),
            },
            streaming: StreamingSettings {
                idle_timeout_secs: parse_num_var(
                    "NEXA_STREAM_IDLE_TIMEOUT_SECS",
                    StreamingSettings::default().idle_timeout_secs,
                ),
                max_concurrent_transcodes: parse_num_var(
                    "NEXA_MAX_CONCURRENT_TRANSCODES",
                    StreamingSettings::default().max_concurrent_transcodes,
                ),
            },
            trickplay: TrickplaySettings {
                snapshot_interval_ms: parse_num_var(
                    "NEXA_TRICKPLAY_INTERVAL_MS",
                    TrickplaySettings::default().snapshot_interval_ms,
                ),
                max_snapshot_width: parse_num_var(
                    "NEXA_TRICKPLAY_MAX_WIDTH",
                    TrickplaySettings::default().max_snapshot_width,
                ),
                jpeg_quality: parse_num_var("NEXA_TRICKPLAY_JPEG_QUALITY", TrickplaySettings::default().jpeg_quality),
                skip_existing: parse_bool_var("NEXA_TRICKPLAY_SKIP_EXISTING", TrickplaySettings::default().skip_existing),
            },
            remote_metadata: RemoteMetadataConfig {
                base_address: std::env::var("NEXA_REMOTE_METADATA_BASE_URL").ok(),
                api_key: std::env::var("NEXA_REMOTE_METADATA_API_KEY").unwrap_or_default(),
                http: RemoteMetadataHttpSettings {
                    timeout_secs: parse_num_var(
                        "NEXA_REMOTE_METADATA_TIMEOUT_SECS",
                        RemoteMetadataHttpSettings::default().timeout_secs,
                    ),
                    max_requests_per_window: std::env::var("NEXA_REMOTE_METADATA_MAX_REQUESTS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .or(RemoteMetadataHttpSettings::default().max_requests_per_window),
                    window_secs: parse_num_var(
                        "NEXA_REMOTE_METADATA_WINDOW_SECS",
                        RemoteMetadataHttpSettings::default().window_secs,
                    ),
                    accept_insecure_tls: parse_bool_var("NEXA_REMOTE_METADATA_INSECURE_TLS", false),
                },
            },
            dev_mode,
            metadata: ConfigMetadata { env_file_loaded, config_path: None },
        };

        Ok(config)
    }
}

use nexa_model::settings::{
    JobNotificationSettings, RemoteMetadataHttpSettings, SessionSettings, StreamingSettings,
    TrickplaySettings,
};
use std::path::PathBuf;

/// The fully-resolved configuration a `nexa-server` process starts with.
/// `ConfigLoader::load` builds one of these from environment variables
/// (and an optional `.env` file); everything past this point is a plain
/// struct, following the split the teacher's `Config`/`ConfigLoader`
/// establish between "how config arrives" and "what config is".
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub jobs: JobNotificationSettings,
    pub streaming: StreamingSettings,
    pub trickplay: TrickplaySettings,
    pub remote_metadata: RemoteMetadataConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_signing_key: String,
    pub session: SessionSettings,
}

impl AuthConfig {
    pub fn is_insecure_default_key(&self) -> bool {
        self.jwt_signing_key == crate::constants::DEFAULT_JWT_SIGNING_KEY
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub root: PathBuf,
    pub images: PathBuf,
    pub trickplay: PathBuf,
    pub transcode: PathBuf,
}

impl CacheConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            images: root.join("images"),
            trickplay: root.join("trickplay"),
            transcode: root.join("transcode"),
            root,
        }
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.images)?;
        std::fs::create_dir_all(&self.trickplay)?;
        std::fs::create_dir_all(&self.transcode)
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

/// Remote metadata provider wiring: the generic rate/timeout knobs from
/// `nexa-model::settings` plus the address and credential an operator
/// points at one specific provider.
#[derive(Debug, Clone)]
pub struct RemoteMetadataConfig {
    pub base_address: Option<String>,
    pub api_key: String,
    pub http: RemoteMetadataHttpSettings,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub env_file_loaded: bool,
    pub config_path: Option<PathBuf>,
}

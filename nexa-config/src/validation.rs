use crate::model::Config;

/// A non-fatal configuration concern surfaced at startup. Unlike
/// `ConfigLoadError`, a warning never stops the server from starting —
/// it is logged once so an operator notices before it becomes an
/// incident, following the teacher's guard-rail/warning split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    InsecureDefaultJwtKey,
    WildcardCorsOrigin,
    DevModeEnabled,
    RemoteMetadataMissingBaseAddress,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ConfigWarning::InsecureDefaultJwtKey => {
                "JWT_SIGNING_KEY is still the value nexa-init generates by default; sessions are forgeable"
            }
            ConfigWarning::WildcardCorsOrigin => "NEXA_CORS_ALLOWED_ORIGINS includes \"*\"; any origin may call the API",
            ConfigWarning::DevModeEnabled => "NEXA_DEV_MODE is enabled; do not run this in production",
            ConfigWarning::RemoteMetadataMissingBaseAddress => {
                "no NEXA_REMOTE_METADATA_BASE_URL set; remote metadata agents are disabled"
            }
        };
        write!(f, "{msg}")
    }
}

pub fn validate(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    if config.auth.is_insecure_default_key() {
        warnings.push(ConfigWarning::InsecureDefaultJwtKey);
    }
    if config.cors.is_wildcard() {
        warnings.push(ConfigWarning::WildcardCorsOrigin);
    }
    if config.dev_mode {
        warnings.push(ConfigWarning::DevModeEnabled);
    }
    if config.remote_metadata.base_address.is_none() {
        warnings.push(ConfigWarning::RemoteMetadataMissingBaseAddress);
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthConfig, CacheConfig, ConfigMetadata, CorsConfig, DatabaseConfig, RemoteMetadataConfig, ServerConfig};
    use nexa_model::settings::{JobNotificationSettings, RemoteMetadataHttpSettings, SessionSettings, StreamingSettings, TrickplaySettings};

    fn base_config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig { url: "postgresql://localhost/nexa".into(), max_connections: 10 },
            auth: AuthConfig { jwt_signing_key: "a-real-secret".into(), session: SessionSettings::default() },
            cache: CacheConfig::new("./data/cache".into()),
            cors: CorsConfig { allowed_origins: vec!["https://example.com".into()] },
            jobs: JobNotificationSettings::default(),
            streaming: StreamingSettings::default(),
            trickplay: TrickplaySettings::default(),
            remote_metadata: RemoteMetadataConfig {
                base_address: Some("https://example.invalid".into()),
                api_key: String::new(),
                http: RemoteMetadataHttpSettings::default(),
            },
            dev_mode: false,
            metadata: ConfigMetadata::default(),
        }
    }

    #[test]
    fn clean_config_has_no_warnings() {
        assert!(validate(&base_config()).is_empty());
    }

    #[test]
    fn flags_default_jwt_key_and_wildcard_cors() {
        let mut config = base_config();
        config.auth.jwt_signing_key = crate::constants::DEFAULT_JWT_SIGNING_KEY.to_string();
        config.cors.allowed_origins = vec!["*".into()];
        let warnings = validate(&config);
        assert!(warnings.contains(&ConfigWarning::InsecureDefaultJwtKey));
        assert!(warnings.contains(&ConfigWarning::WildcardCorsOrigin));
    }
}

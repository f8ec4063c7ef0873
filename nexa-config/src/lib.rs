//! Configuration loading, validation, and `.env` generation shared by
//! `nexa-server` and the `nexa-init` binary.

pub mod constants;
pub mod loader;
pub mod model;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoadError, ConfigLoader};
pub use model::{AuthConfig, CacheConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig, RemoteMetadataConfig, ServerConfig};
pub use validation::{validate, ConfigWarning};

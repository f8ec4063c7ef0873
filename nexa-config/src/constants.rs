/// Shipped as the JWT signing key only in `nexa-init`'s generated `.env`
/// placeholder, never as a runtime fallback; `ConfigLoader::load` treats a
/// deployment still using this value as a validation warning.
pub const DEFAULT_JWT_SIGNING_KEY: &str = "change-me-insecure-development-key";

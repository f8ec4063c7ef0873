//! Metadata extraction agents: sidecar, embedded, filename, remote
//! (spec.md §4.C).

mod embedded;
mod local;
mod rate_limit;
mod remote;
mod sidecar;

pub use embedded::EmbeddedAgent;
pub use local::LocalAgent;
pub use rate_limit::RemoteRateLimiter;
pub use remote::RemoteMetadataAgent;
pub use sidecar::SidecarAgent;

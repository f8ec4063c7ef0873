//! Trait surfaces and domain contracts built atop `nexa-model`.
//!
//! `nexa-core` implements these traits; `nexa-server` wires concrete
//! implementations into request handlers and background workers. Keeping
//! the traits here (rather than directly on `nexa-core` structs) lets
//! tests substitute in-memory fakes without depending on `sqlx`.

pub mod agent;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod hub;
pub mod jobs;
pub mod streaming;

pub mod prelude {
    pub use crate::agent::*;
    pub use crate::auth::*;
    pub use crate::catalog::*;
    pub use crate::error::*;
    pub use crate::hub::*;
    pub use crate::jobs::*;
    pub use crate::streaming::*;
}

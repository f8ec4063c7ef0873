//! Shared data types for the Nexa media platform.
//!
//! This crate holds plain data: identifiers, enums, and DTO-shaped structs
//! that cross the boundary between `nexa-core`, `nexa-contracts`, and
//! `nexa-server`. It intentionally carries no business logic.

pub mod device;
pub mod error;
pub mod hub;
pub mod ids;
pub mod job;
pub mod library;
pub mod media_part;
pub mod metadata_item;
pub mod metadata_type;
pub mod pagination;
pub mod relation;
pub mod session;
pub mod settings;
pub mod user;

pub mod prelude {
    pub use crate::device::*;
    pub use crate::error::*;
    pub use crate::hub::*;
    pub use crate::ids::*;
    pub use crate::job::*;
    pub use crate::library::*;
    pub use crate::media_part::*;
    pub use crate::metadata_item::*;
    pub use crate::metadata_type::*;
    pub use crate::pagination::*;
    pub use crate::relation::*;
    pub use crate::session::*;
    pub use crate::settings::*;
    pub use crate::user::*;
}

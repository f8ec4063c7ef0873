//! Core library for Nexa Media Server: catalog store, scan pipeline,
//! metadata agents, hub engine, job scheduler, auth/session core, and
//! streaming session manager.

pub mod agents;
pub mod auth;
pub mod catalog;
pub mod hub;
pub mod image;
pub mod jobs;
pub mod scan;
pub mod streaming;

pub use nexa_contracts::error::{CoreError, CoreResult};

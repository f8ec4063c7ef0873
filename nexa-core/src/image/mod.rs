//! Source resolution, format negotiation, and on-disk derivative-image
//! cache (spec.md §4.H).

mod cache;
mod format;
mod service;

pub use cache::ImageCache;
pub use format::ImageFormat;
pub use service::{ImageGenerationWorker, ImageService};

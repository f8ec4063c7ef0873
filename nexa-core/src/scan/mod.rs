//! Library scan pipeline: discover → filter → classify → match → extract
//! → normalize → persist (spec.md §4.B).

mod analysis;
mod classify;
mod discover;
mod extract;
mod filter;
mod matcher;
mod normalize;
mod persist;
mod pipeline;
mod refresh;

pub use analysis::{FileAnalysisWorker, TechnicalProbe};
pub use discover::{families, CandidateFile};
pub use pipeline::LibraryScanWorker;
pub use refresh::MetadataRefreshWorker;

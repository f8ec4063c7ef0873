//! Streaming session manager: capability matching, stream plan
//! resolution, DASH/HLS segment cache with idle teardown, BIF trickplay
//! generation (spec.md §4.G).

mod bif;
mod capability;
mod session;
mod trickplay;

pub use bif::{Bif, BifEntry};
pub use capability::{resolve_plan, select_part, CAPABILITY_PROTOCOL_VERSION};
pub use session::{StreamSession, StreamingSessionManager};
pub use trickplay::TrickplayWorker;

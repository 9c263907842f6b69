//! Face Counting Library
//!
//! Replays per-frame face detections (with optional identity embeddings)
//! through the `reidtrack` proximity tracker and identity resolver, and writes
//! one record per person who came and went.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::CounterConfig;
pub use error::{CounterError, Result};
pub use pipeline::{CounterPipeline, PipelineStats};
pub use types::{Detection, FrameInput, FrameSummary};

/// Get library version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

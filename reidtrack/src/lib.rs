//! Proximity tracking and embedding-based re-identification
//!
//! This crate turns independent per-frame observations into persistent identities:
//!
//! - [`ProximityTracker`] matches detector boxes to [`Tracklet`]s by center
//!   distance, smooths their display boxes and ages them out through a hit/miss
//!   state machine with an exit animation.
//! - [`IdentityResolver`] matches embedding vectors to [`IdentitySession`]s,
//!   confirms sessions once their history fills up and writes a
//!   [`SessionRecord`] when one expires.
//!
//! Both go through the same threshold-bounded [`GreedyMatcher`].
//!
//! # Unified Interface
//!
//! Region trackers implement the `RegionTracker` trait:
//!
//! ```rust,ignore
//! use reidtrack::{ProximityTracker, Region, RegionTracker, TrackerConfig};
//!
//! let mut tracker: Box<dyn RegionTracker> = Box::new(ProximityTracker::new(TrackerConfig::default())?);
//!
//! let detections = vec![Region::new(10, 50, 10, 50).into()];
//! let dead = tracker.process(&detections, 0)?;
//! let boxes = tracker.live_regions();
//! ```

pub mod assignment;
pub mod config;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod presentation;
pub mod resolver;
pub mod session;
pub mod state;
pub mod store;
pub mod trackers;
pub mod tracklet;

pub use assignment::{cost_matrix, try_cost_matrix, AssignmentResult, GreedyMatcher, Match};
pub use config::{SessionConfig, StorageConfig, TrackerConfig};
pub use error::{ReidError, Result};
pub use filter::SmoothingFilter;
pub use geometry::{Region, TrackingRegion};
pub use presentation::{Color, FadeStyle, Palette};
pub use resolver::{IdentityResolver, ResolverReport, SessionView};
pub use session::{Embedding, IdentitySession, SessionRecord};
pub use state::{AnimationState, TrackState};
pub use store::{FileSessionCounter, MemoryCounter, MemoryRecordSink, RecordSink, RecordStore, SessionCounter};
pub use trackers::{ProximityTracker, RegionTracker};
pub use tracklet::{TrackFrame, Tracklet, TrackletParams, KILL_ANIMATION_STEPS};

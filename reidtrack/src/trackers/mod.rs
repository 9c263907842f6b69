//! Region trackers
//!
//! Trackers turn per-frame detector boxes into persistent [`Tracklet`]s. The
//! `RegionTracker` trait gives visualizers one interface regardless of how the
//! association is done.

use crate::error::Result;
use crate::geometry::{Region, TrackingRegion};
use crate::presentation::{Color, Palette};
use crate::tracklet::Tracklet;

mod proximity;

pub use proximity::ProximityTracker;

/// Common interface for region trackers
pub trait RegionTracker: Send {
    /// Feed one frame of detections.
    ///
    /// # Returns
    /// The tracklets that died this frame (lost and no longer displayable)
    fn process(&mut self, regions: &[TrackingRegion], frame_index: u64) -> Result<Vec<Tracklet>>;

    /// Tracklets still held by the tracker
    fn tracklets(&self) -> &[Tracklet];

    /// Drop every tracklet
    fn reset(&mut self);

    /// Number of processed frames
    fn get_step_count(&self) -> u64;

    fn tracklet_count(&self) -> usize {
        self.tracklets().len()
    }

    /// Display boxes of activated tracklets that are not lost
    fn live_regions(&self) -> Vec<Region> {
        self.tracklets()
            .iter()
            .filter(|t| t.is_live())
            .filter_map(|t| t.display_region().ok())
            .collect()
    }

    /// Display boxes of lost tracklets still fading out
    fn lost_regions(&self) -> Vec<Region> {
        self.tracklets()
            .iter()
            .filter(|t| t.is_lost())
            .filter_map(|t| t.display_region().ok())
            .collect()
    }

    /// Raw detector boxes of tracklets hit in the latest frame
    fn raw_regions(&self) -> Vec<Region> {
        self.tracklets()
            .iter()
            .filter(|t| t.is_recent())
            .filter_map(|t| t.raw_region().ok())
            .collect()
    }

    /// Displayable boxes with their current colour
    fn painted_regions(&self, palette: &Palette) -> Vec<(u32, Region, Color)> {
        self.tracklets()
            .iter()
            .filter(|t| t.is_displayable())
            .filter_map(|t| {
                t.display_region()
                    .ok()
                    .map(|region| (t.id, region, palette.color_for(t)))
            })
            .collect()
    }
}

//! Proximity tracking: nearest-center greedy association with a size-scaled reach

use super::RegionTracker;
use crate::assignment::{try_cost_matrix, GreedyMatcher};
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::geometry::{Region, TrackingRegion};
use crate::tracklet::{TrackFrame, Tracklet, TrackletParams};

/// Frame-by-frame tracker matching new boxes to the nearest surviving tracklet
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    config: TrackerConfig,
    params: TrackletParams,
    next_track_id: u32,
    pub tracklets: Vec<Tracklet>,
    pub n_steps: u64,
}

impl ProximityTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Creating ProximityTracker: reach={:.2}, ratio_lock={:.2}, scale_factor={:.2}, hit_limit={}, miss_limit={}",
            config.reach,
            config.ratio_lock,
            config.scale_factor,
            config.hit_limit,
            config.miss_limit
        );

        Ok(Self {
            params: config.tracklet_params(),
            config,
            next_track_id: 1,
            tracklets: Vec::new(),
            n_steps: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Wrap raw detections into track frames stamped with `frame_index`
    pub fn convert_to_track_frames(&self, regions: &[TrackingRegion], frame_index: u64) -> Vec<TrackFrame> {
        regions
            .iter()
            .map(|region| {
                TrackFrame::new(
                    region.clone(),
                    self.config.ratio_lock,
                    self.config.scale_factor,
                    frame_index,
                )
            })
            .collect()
    }

    /// Match frames against every tracklet that is not lost, then apply hits,
    /// misses and births.
    fn associate(&mut self, frames: Vec<TrackFrame>) -> Result<()> {
        let candidates: Vec<usize> = self
            .tracklets
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_lost())
            .map(|(i, _)| i)
            .collect();
        let candidate_tracklets: Vec<&Tracklet> =
            candidates.iter().map(|&i| &self.tracklets[i]).collect();

        let distances = try_cost_matrix(&candidate_tracklets, &frames, |tracklet, frame| {
            let old = tracklet.last_frame()?;
            Ok(Region::distance(frame.raw_region(), old.raw_region()))
        })?;

        // The search radius follows the size of the new detection
        let reaches: Vec<f32> = frames
            .iter()
            .map(|f| f.raw_region().biggest_edge() as f32 * self.config.reach)
            .collect();
        let result = GreedyMatcher::solve_by(distances.view(), |_, col, distance| {
            distance < reaches[col]
        });

        log::debug!(
            "frame {}: {} tracklets, {} detections, {} matched",
            self.n_steps,
            candidates.len(),
            frames.len(),
            result.matches.len()
        );

        let mut slots: Vec<Option<TrackFrame>> = frames.into_iter().map(Some).collect();
        let mut hit = vec![false; self.tracklets.len()];

        for m in &result.matches {
            let index = candidates[m.row];
            if let Some(frame) = slots[m.col].take() {
                self.tracklets[index].add(frame)?;
                hit[index] = true;
            }
        }

        // Decay everything that was not hit, lost tracklets included
        for (tracklet, was_hit) in self.tracklets.iter_mut().zip(hit) {
            if !was_hit {
                tracklet.update(false)?;
            }
        }

        for frame in slots.into_iter().flatten() {
            self.create_tracklet(frame)?;
        }

        Ok(())
    }

    fn create_tracklet(&mut self, frame: TrackFrame) -> Result<()> {
        let mut tracklet = Tracklet::new(self.next_track_id, self.params)?;
        tracklet.add(frame)?;
        self.tracklets.push(tracklet);
        self.next_track_id += 1;
        Ok(())
    }

    /// Remove and return tracklets that are lost and finished fading out
    pub fn remove_dead_tracklets(&mut self) -> Vec<Tracklet> {
        let (dead, alive): (Vec<Tracklet>, Vec<Tracklet>) = self
            .tracklets
            .drain(..)
            .partition(|t| t.is_lost() && !t.is_displayable());
        self.tracklets = alive;

        for tracklet in &dead {
            log::debug!("removing {}", tracklet);
        }
        dead
    }
}

impl RegionTracker for ProximityTracker {
    fn process(&mut self, regions: &[TrackingRegion], frame_index: u64) -> Result<Vec<Tracklet>> {
        let frames = self.convert_to_track_frames(regions, frame_index);
        self.associate(frames)?;
        self.n_steps += 1;
        Ok(self.remove_dead_tracklets())
    }

    fn tracklets(&self) -> &[Tracklet] {
        &self.tracklets
    }

    fn reset(&mut self) {
        self.tracklets.clear();
        self.n_steps = 0;
    }

    fn get_step_count(&self) -> u64 {
        self.n_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AnimationState;

    fn region(left: i32, top: i32, size: i32) -> TrackingRegion {
        Region::new(left, left + size, top, top + size).into()
    }

    fn tracker() -> ProximityTracker {
        ProximityTracker::new(TrackerConfig::default()).unwrap()
    }

    #[test]
    fn test_first_frame_spawns_tracklets() {
        let mut tracker = tracker();
        let dead = tracker
            .process(&[region(0, 0, 20), region(200, 200, 20)], 0)
            .unwrap();

        assert!(dead.is_empty());
        assert_eq!(tracker.tracklet_count(), 2);
        assert_eq!(tracker.tracklets[0].id, 1);
        assert_eq!(tracker.tracklets[1].id, 2);
        // Not activated yet
        assert!(tracker.live_regions().is_empty());
        assert_eq!(tracker.raw_regions().len(), 2);
    }

    #[test]
    fn test_nearer_box_wins_and_other_spawns() {
        let mut tracker = tracker();
        tracker.process(&[region(0, 0, 10)], 0).unwrap();

        // Two detections 2px apart; the second is nearer the existing tracklet
        tracker
            .process(&[region(4, 0, 10), region(2, 0, 10)], 1)
            .unwrap();

        assert_eq!(tracker.tracklet_count(), 2);
        let original = &tracker.tracklets[0];
        assert_eq!(original.id, 1);
        assert_eq!(original.frame_count(), 2);
        assert_eq!(original.raw_region().unwrap(), Region::new(2, 12, 0, 10));

        let spawned = &tracker.tracklets[1];
        assert_eq!(spawned.id, 2);
        assert_eq!(spawned.raw_region().unwrap(), Region::new(4, 14, 0, 10));
    }

    #[test]
    fn test_reach_scales_with_new_detection() {
        let mut tracker = tracker();
        tracker.process(&[region(0, 0, 100)], 0).unwrap();

        // Small detection 21px from the big box's center, reach is 1.5 * 10
        tracker.process(&[region(30, 30, 10)], 1).unwrap();
        assert_eq!(tracker.tracklet_count(), 2);
        assert_eq!(tracker.tracklets[0].frame_count(), 1);

        // A big detection gets a big reach even when the old box was small
        let mut grown = self::tracker();
        grown.process(&[region(0, 0, 10)], 0).unwrap();
        grown.process(&[region(0, 0, 100)], 1).unwrap();
        assert_eq!(grown.tracklet_count(), 1);
    }

    #[test]
    fn test_activation_and_live_regions() {
        let mut tracker = tracker();
        for i in 0..3 {
            tracker.process(&[region(i as i32, 0, 20)], i).unwrap();
        }
        assert_eq!(tracker.tracklet_count(), 1);
        assert!(tracker.tracklets[0].is_activated());
        assert_eq!(tracker.live_regions().len(), 1);
        assert!(tracker.lost_regions().is_empty());
    }

    #[test]
    fn test_lost_tracklet_fades_then_is_harvested() {
        let mut tracker = tracker();
        for i in 0..3 {
            tracker.process(&[region(0, 0, 20)], i).unwrap();
        }

        // 7 misses to lose it
        for i in 3..10 {
            let dead = tracker.process(&[], i).unwrap();
            assert!(dead.is_empty());
        }
        assert!(tracker.tracklets[0].is_lost());
        assert_eq!(tracker.lost_regions().len(), 1);
        assert!(tracker.live_regions().is_empty());

        // A lost tracklet no longer takes part in matching
        tracker.process(&[region(0, 0, 20)], 10).unwrap();
        assert_eq!(tracker.tracklet_count(), 2);

        // Killed on the tenth update after being lost
        for i in 11..19 {
            assert!(tracker.process(&[region(0, 0, 20)], i).unwrap().is_empty());
        }
        let dead = tracker.process(&[region(0, 0, 20)], 19).unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, 1);
        assert_eq!(dead[0].animation(), AnimationState::Killed);
        assert_eq!(tracker.tracklet_count(), 1);
        assert_eq!(tracker.tracklets[0].id, 2);
    }

    #[test]
    fn test_unconfirmed_tracklet_harvested_immediately() {
        let mut tracker = tracker();
        tracker.process(&[region(0, 0, 20)], 0).unwrap();
        for i in 1..7 {
            assert!(tracker.process(&[], i).unwrap().is_empty());
        }
        let dead = tracker.process(&[], 7).unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(tracker.tracklet_count(), 0);
    }

    #[test]
    fn test_matching_is_deterministic() {
        let frames: Vec<Vec<TrackingRegion>> = (0..6)
            .map(|f| {
                (0..5)
                    .map(|i| region(i * 15 + f as i32, (i * 7) % 20, 12))
                    .collect()
            })
            .collect();

        let run = || {
            let mut tracker = tracker();
            for (i, regions) in frames.iter().enumerate() {
                tracker.process(regions, i as u64).unwrap();
            }
            tracker
                .tracklets
                .iter()
                .map(|t| (t.id, t.raw_region().unwrap(), t.frame_count()))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_reset_clears_tracklets() {
        let mut tracker = tracker();
        tracker.process(&[region(0, 0, 20)], 0).unwrap();
        tracker.reset();
        assert_eq!(tracker.tracklet_count(), 0);
        assert_eq!(tracker.get_step_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig {
            position_smoothing: -1.0,
            ..TrackerConfig::default()
        };
        assert!(ProximityTracker::new(config).is_err());
    }
}

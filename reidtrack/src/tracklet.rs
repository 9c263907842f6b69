//! A single spatially tracked identity and the frames it is built from

use crate::error::{ReidError, Result};
use crate::filter::SmoothingFilter;
use crate::geometry::{Region, TrackingRegion};
use crate::state::{AnimationState, TrackState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of updates a lost tracklet stays displayable while fading out
pub const KILL_ANIMATION_STEPS: u32 = 10;

/// One observed detection, with the raw box and the box shown to observers
#[derive(Debug, Clone)]
pub struct TrackFrame {
    raw: TrackingRegion,
    display: Region,
    frame_index: u64,
}

impl TrackFrame {
    /// Wrap a detection. The display box is aspect-locked to `ratio_lock`
    /// (skipped when zero) and then scaled by `scale_factor`.
    pub fn new(region: TrackingRegion, ratio_lock: f32, scale_factor: f32, frame_index: u64) -> Self {
        let mut display = region.region;
        if ratio_lock != 0.0 {
            display.expand_to_ratio(ratio_lock);
        }
        display.scale(scale_factor);

        Self {
            raw: region,
            display,
            frame_index,
        }
    }

    pub fn raw(&self) -> &TrackingRegion {
        &self.raw
    }

    pub fn raw_region(&self) -> &Region {
        &self.raw.region
    }

    pub fn display_region(&self) -> &Region {
        &self.display
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackletParams {
    /// Consecutive hits needed before the tracklet is activated
    pub hit_limit: u32,
    /// Consecutive misses after which the tracklet is lost
    pub miss_limit: u32,
    pub position_smoothing: f32,
    pub size_smoothing: f32,
}

impl Default for TrackletParams {
    fn default() -> Self {
        Self {
            hit_limit: 3,
            miss_limit: 7,
            position_smoothing: 0.5,
            size_smoothing: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tracklet {
    /// track id
    pub id: u32,
    frames: Vec<TrackFrame>,
    position_filter: SmoothingFilter,
    size_filter: SmoothingFilter,
    /// number of consecutive steps with a matched box
    hit_counter: u32,
    /// number of consecutive steps without a matched box
    miss_counter: u32,
    hit_limit: u32,
    miss_limit: u32,
    state: TrackState,
    animation: AnimationState,
    kill_counter: u32,
}

impl Tracklet {
    pub fn new(id: u32, params: TrackletParams) -> Result<Self> {
        Ok(Self {
            id,
            frames: Vec::new(),
            position_filter: SmoothingFilter::new(params.position_smoothing)?,
            size_filter: SmoothingFilter::new(params.size_smoothing)?,
            hit_counter: 0,
            miss_counter: 0,
            hit_limit: params.hit_limit,
            miss_limit: params.miss_limit,
            state: TrackState::Tentative,
            animation: AnimationState::Normal,
            kill_counter: 0,
        })
    }

    /// Smooth the frame against the previous one, append it and register a hit
    pub fn add(&mut self, mut frame: TrackFrame) -> Result<()> {
        self.smooth(&mut frame);
        self.frames.push(frame);
        self.update(true)
    }

    /// Register a hit or a miss. Called once per processed frame.
    pub fn update(&mut self, hit: bool) -> Result<()> {
        if self.state.is_lost() {
            return self.step_kill_animation();
        }

        if hit {
            self.hit_counter += 1;
            self.miss_counter = 0;
        } else {
            self.miss_counter += 1;
            self.hit_counter = 0;
        }

        self.check_and_activate()?;
        self.check_and_kill()
    }

    fn smooth(&self, frame: &mut TrackFrame) {
        let Some(previous) = self.frames.last() else {
            return;
        };
        let old = previous.display;
        let new = frame.display;

        let x = self.position_filter.process(new.x() as f32, old.x() as f32);
        let y = self.position_filter.process(new.y() as f32, old.y() as f32);
        let width = self.size_filter.process(new.width() as f32, old.width() as f32);
        let height = self.size_filter.process(new.height() as f32, old.height() as f32);

        frame.display.set_x(x.round() as i32);
        frame.display.set_y(y.round() as i32);
        frame.display.set_width(width.round() as i32);
        frame.display.set_height(height.round() as i32);
    }

    fn check_and_activate(&mut self) -> Result<()> {
        if !self.state.is_activated() && self.hit_counter >= self.hit_limit {
            self.state = self.state.transition(TrackState::Active)?;
            self.animation = self.animation.advance_to(AnimationState::Showing)?;
        }
        Ok(())
    }

    fn check_and_kill(&mut self) -> Result<()> {
        if !self.state.is_lost() && self.miss_counter >= self.miss_limit {
            let lost = self.state.lose();
            self.state = self.state.transition(lost)?;

            // Never confirmed, so there is nothing to fade out
            let next = if lost.is_activated() {
                AnimationState::Killing
            } else {
                AnimationState::Killed
            };
            self.animation = self.animation.advance_to(next)?;
        }
        Ok(())
    }

    fn step_kill_animation(&mut self) -> Result<()> {
        if self.animation == AnimationState::Killed {
            return Ok(());
        }
        self.kill_counter += 1;
        if self.kill_counter >= KILL_ANIMATION_STEPS {
            self.animation = self.animation.advance_to(AnimationState::Killed)?;
        }
        Ok(())
    }

    /// Received a hit in the latest update cycle
    pub fn is_recent(&self) -> bool {
        self.hit_counter > 0
    }

    /// Activated and not yet lost
    pub fn is_live(&self) -> bool {
        self.state == TrackState::Active
    }

    pub fn is_activated(&self) -> bool {
        self.state.is_activated()
    }

    pub fn is_lost(&self) -> bool {
        self.state.is_lost()
    }

    /// Activated and the exit animation has not finished
    pub fn is_displayable(&self) -> bool {
        self.is_activated() && self.animation != AnimationState::Killed
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    /// Fraction of the exit animation already played, in `[0, 1]`
    pub fn kill_progress(&self) -> f32 {
        (self.kill_counter as f32 / KILL_ANIMATION_STEPS as f32).min(1.0)
    }

    pub fn kill_counter(&self) -> u32 {
        self.kill_counter
    }

    pub fn hit_limit(&self) -> u32 {
        self.hit_limit
    }

    pub fn miss_limit(&self) -> u32 {
        self.miss_limit
    }

    pub fn frames(&self) -> &[TrackFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn first_frame(&self) -> Result<&TrackFrame> {
        self.frames.first().ok_or(ReidError::EmptyHistory(self.id))
    }

    pub fn last_frame(&self) -> Result<&TrackFrame> {
        self.frames.last().ok_or(ReidError::EmptyHistory(self.id))
    }

    /// Latest raw detector box
    pub fn raw_region(&self) -> Result<Region> {
        Ok(*self.last_frame()?.raw_region())
    }

    /// Latest smoothed display box
    pub fn display_region(&self) -> Result<Region> {
        Ok(*self.last_frame()?.display_region())
    }
}

impl fmt::Display for Tracklet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "Tracklet [ID: {} Frames: {}-{} Size: {}]",
                self.id,
                first.frame_index,
                last.frame_index,
                self.frames.len()
            ),
            _ => write!(f, "Tracklet [ID: {} Empty!]", self.id),
        }
    }
}

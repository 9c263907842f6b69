//! Display colours for tracklets. Purely visual; nothing here feeds back into tracking.

use crate::tracklet::{Tracklet, KILL_ANIMATION_STEPS};
use serde::{Deserialize, Serialize};

pub type Color = [u8; 3];

pub const PINK: Color = [80, 30, 255];
pub const DARK_RED: Color = [0, 0, 100];
pub const RED: Color = [0, 0, 255];
pub const BLACK: Color = [0, 0, 0];

/// How a lost tracklet fades out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeStyle {
    /// Flash for the first half of the exit window, then fade red to black
    Flash,
    /// Dim the base colour towards black
    Dim,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub base: Color,
    pub fade: FadeStyle,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base: [255, 150, 30],
            fade: FadeStyle::Flash,
        }
    }
}

impl Palette {
    /// Colour for the tracklet's current display box
    pub fn color_for(&self, tracklet: &Tracklet) -> Color {
        if !tracklet.is_lost() {
            return self.base;
        }

        let progress = tracklet.kill_progress();
        match self.fade {
            FadeStyle::Flash if progress < 0.5 => {
                if tracklet.kill_counter() % 2 == 0 {
                    PINK
                } else {
                    DARK_RED
                }
            }
            FadeStyle::Flash => lerp_color(RED, BLACK, progress),
            FadeStyle::Dim => lerp_color(self.base, BLACK, 0.5 + progress * 0.5),
        }
    }

    /// Number of distinct animation frames a fade takes
    pub fn fade_steps(&self) -> u32 {
        KILL_ANIMATION_STEPS
    }
}

pub fn lerp(a: f32, b: f32, factor: f32) -> f32 {
    a + (b - a) * factor
}

/// Channel-wise linear interpolation
pub fn lerp_color(a: Color, b: Color, factor: f32) -> Color {
    let mut out = [0u8; 3];
    for (i, channel) in out.iter_mut().enumerate() {
        *channel = lerp(a[i] as f32, b[i] as f32, factor).clamp(0.0, 255.0) as u8;
    }
    out
}

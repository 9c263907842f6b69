//! Single-pole exponential smoothing

use crate::error::{ReidError, Result};

/// Blends a new observation with the previous one: `new * factor + old * (1 - factor)`.
///
/// The filter keeps no history; callers supply the previous value each time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFilter {
    factor: f32,
    r_factor: f32,
}

impl SmoothingFilter {
    /// Rejects factors outside `[0, 1]`
    pub fn new(factor: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(ReidError::config(format!(
                "smoothing factor must be within [0, 1], got {}",
                factor
            )));
        }

        Ok(Self {
            factor,
            r_factor: 1.0 - factor,
        })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn process(&self, new_value: f32, old_value: f32) -> f32 {
        new_value * self.factor + old_value * self.r_factor
    }
}

//! Integer bounding boxes and the center distance used for proximity matching

use serde::Serialize;
use std::fmt;

/// Axis-aligned box in pixel coordinates.
///
/// `left <= right` and `top <= bottom` always hold; every constructor and setter
/// normalises its input to keep them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Region {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl Region {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        let mut region = Self::default();
        region.set_rect(left, right, top, bottom);
        region
    }

    /// Replace all four edges at once
    pub fn set_rect(&mut self, left: i32, right: i32, top: i32, bottom: i32) {
        self.left = left.min(right);
        self.right = left.max(right);
        self.top = top.min(bottom);
        self.bottom = top.max(bottom);
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Horizontal center, rounded down
    pub fn x(&self) -> i32 {
        self.left + self.width() / 2
    }

    /// Vertical center, rounded down
    pub fn y(&self) -> i32 {
        self.top + self.height() / 2
    }

    pub fn biggest_edge(&self) -> i32 {
        self.width().max(self.height())
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Exact center as floats, used by [`Region::distance`]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) as f32 / 2.0,
            (self.top + self.bottom) as f32 / 2.0,
        )
    }

    /// Move horizontally so that the center lands on `x`
    pub fn set_x(&mut self, x: i32) {
        let width = self.width();
        self.left = x - width / 2;
        self.right = self.left + width;
    }

    /// Move vertically so that the center lands on `y`
    pub fn set_y(&mut self, y: i32) {
        let height = self.height();
        self.top = y - height / 2;
        self.bottom = self.top + height;
    }

    /// Resize horizontally around the current center
    pub fn set_width(&mut self, width: i32) {
        let width = width.max(0);
        let x = self.x();
        self.left = x - width / 2;
        self.right = self.left + width;
    }

    /// Resize vertically around the current center
    pub fn set_height(&mut self, height: i32) {
        let height = height.max(0);
        let y = self.y();
        self.top = y - height / 2;
        self.bottom = self.top + height;
    }

    /// Grow the shorter side so that `width / height == ratio`, keeping the center.
    /// Non-positive ratios leave the box untouched.
    pub fn expand_to_ratio(&mut self, ratio: f32) {
        if ratio <= 0.0 || !ratio.is_finite() {
            return;
        }

        let width = self.width() as f32;
        let height = self.height() as f32;

        if height == 0.0 || width / height > ratio {
            self.set_height((width / ratio).round() as i32);
        } else {
            self.set_width((height * ratio).round() as i32);
        }
    }

    /// Uniform resize around the center
    pub fn scale(&mut self, factor: f32) {
        let width = (self.width() as f32 * factor).round() as i32;
        let height = (self.height() as f32 * factor).round() as i32;
        self.set_width(width);
        self.set_height(height);
    }

    /// Euclidean distance between the centers of two boxes
    pub fn distance(a: &Region, b: &Region) -> f32 {
        let (ax, ay) = a.center();
        let (bx, by) = b.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region(l={}, r={}, t={}, b={})",
            self.left, self.right, self.top, self.bottom
        )
    }
}

/// A detector box together with what the detector said about it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingRegion {
    pub region: Region,
    pub confidence: f32,
    pub label: Option<String>,
}

impl TrackingRegion {
    pub fn new(region: Region, confidence: f32) -> Self {
        Self {
            region,
            confidence,
            label: None,
        }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl From<Region> for TrackingRegion {
    fn from(region: Region) -> Self {
        Self::new(region, 1.0)
    }
}

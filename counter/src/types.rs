//! Type definitions for replayed frames and per-frame results

use ndarray::Array1;
use reidtrack::{Color, Region, ResolverReport, SessionView, TrackingRegion};
use serde::{Deserialize, Serialize};

/// One detected face as produced by the external detector and embedder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,

    /// Confidence score (0-1)
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    #[serde(default)]
    pub label: Option<String>,

    /// Identity embedding, when the embedder ran on this face
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            confidence: 1.0,
            label: None,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn region(&self) -> Region {
        Region::new(self.left, self.right, self.top, self.bottom)
    }

    pub fn tracking_region(&self) -> TrackingRegion {
        let region = TrackingRegion::new(self.region(), self.confidence);
        match &self.label {
            Some(label) => region.with_label(label.clone()),
            None => region,
        }
    }

    pub fn embedding_vector(&self) -> Option<Array1<f32>> {
        self.embedding.as_ref().map(|v| Array1::from_vec(v.clone()))
    }
}

/// Everything the detector saw in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub frame_index: u64,

    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Result of processing one frame
#[derive(Debug, Clone)]
pub struct FrameSummary {
    pub frame_index: u64,

    /// Faces large enough to track
    pub valid_regions: Vec<Region>,

    /// Faces below the minimum size
    pub invalid_regions: Vec<Region>,

    /// Activated tracklets still in view
    pub live_regions: Vec<Region>,

    /// Tracklets fading out
    pub lost_regions: Vec<Region>,

    /// Displayable tracklets with their colour
    pub painted: Vec<(u32, Region, Color)>,

    /// Tracklet ids removed this frame
    pub removed_tracklets: Vec<u32>,

    pub sessions: Vec<SessionView>,

    pub resolver: ResolverReport,

    pub elapsed_ms: f32,
}

impl FrameSummary {
    pub fn face_count(&self) -> usize {
        self.valid_regions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_input_from_json() {
        let frame: FrameInput = serde_json::from_str(
            r#"{
                "frame_index": 3,
                "detections": [
                    { "left": 10, "right": 60, "top": 5, "bottom": 55, "embedding": [0.1, 0.2] },
                    { "left": 0, "right": 20, "top": 0, "bottom": 20, "confidence": 0.4, "label": "face" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(frame.frame_index, 3);
        assert_eq!(frame.detections.len(), 2);
        assert_eq!(frame.detections[0].confidence, 1.0);
        assert_eq!(frame.detections[0].region().width(), 50);
        assert_eq!(frame.detections[0].embedding_vector().unwrap().len(), 2);
        assert!(frame.detections[1].embedding_vector().is_none());

        let tracking = frame.detections[1].tracking_region();
        assert_eq!(tracking.label.as_deref(), Some("face"));
        assert_eq!(tracking.confidence, 0.4);
    }

    #[test]
    fn test_missing_detections_is_empty_frame() {
        let frame: FrameInput = serde_json::from_str(r#"{ "frame_index": 0 }"#).unwrap();
        assert!(frame.detections.is_empty());
    }
}

/// Per-frame counting pipeline: size gating, proximity tracking, identity resolution
use crate::config::CounterConfig;
use crate::error::Result;
use crate::types::{Detection, FrameInput, FrameSummary};
use reidtrack::{
    FileSessionCounter, IdentityResolver, ProximityTracker, RecordSink, RecordStore,
    RegionTracker, ResolverReport, SessionCounter,
};
use std::time::Instant;

/// Running totals across all processed frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub frames: u64,
    pub faces: u64,
    pub sessions_created: u64,
    pub records_written: u64,
    pub sessions_dropped: u64,
}

pub struct CounterPipeline {
    config: CounterConfig,
    tracker: ProximityTracker,
    resolver: IdentityResolver,
    stats: PipelineStats,
}

impl CounterPipeline {
    /// Pipeline persisting session ids and records where `config.storage` says
    pub fn new(config: CounterConfig) -> Result<Self> {
        config.validate()?;
        let counter = FileSessionCounter::new(config.storage.counter_file.clone());
        let store = RecordStore::from_config(&config.storage)?;
        Self::with_services(config, Box::new(counter), Box::new(store))
    }

    /// Pipeline with injected id and record services
    pub fn with_services(
        config: CounterConfig,
        counter: Box<dyn SessionCounter>,
        sink: Box<dyn RecordSink>,
    ) -> Result<Self> {
        config.validate()?;
        let tracker = ProximityTracker::new(config.tracker.clone())?;
        let resolver = IdentityResolver::new(config.sessions.clone(), counter, sink)?;

        Ok(Self {
            config,
            tracker,
            resolver,
            stats: PipelineStats::default(),
        })
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ProximityTracker {
        &self.tracker
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Split detections into those wide enough to track and those that are not
    pub fn gate<'a>(&self, detections: &'a [Detection]) -> (Vec<&'a Detection>, Vec<&'a Detection>) {
        detections
            .iter()
            .partition(|d| d.region().width() >= self.config.min_face_size)
    }

    pub fn process(&mut self, frame: &FrameInput) -> Result<FrameSummary> {
        let start = Instant::now();

        let (valid, invalid) = self.gate(&frame.detections);

        let regions: Vec<_> = valid.iter().map(|d| d.tracking_region()).collect();
        let dead = self.tracker.process(&regions, frame.frame_index)?;

        let vectors: Vec<_> = valid.iter().filter_map(|d| d.embedding_vector()).collect();
        let report = self.resolver.process(vectors, 1)?;

        self.stats.frames += 1;
        self.stats.faces += valid.len() as u64;
        self.stats.sessions_created += report.created as u64;
        self.stats.records_written += report.records.len() as u64;
        self.stats.sessions_dropped += report.dropped as u64;

        let summary = FrameSummary {
            frame_index: frame.frame_index,
            valid_regions: valid.iter().map(|d| d.region()).collect(),
            invalid_regions: invalid.iter().map(|d| d.region()).collect(),
            live_regions: self.tracker.live_regions(),
            lost_regions: self.tracker.lost_regions(),
            painted: self.tracker.painted_regions(&self.config.palette),
            removed_tracklets: dead.iter().map(|t| t.id).collect(),
            sessions: self.resolver.views(),
            resolver: report,
            elapsed_ms: start.elapsed().as_secs_f32() * 1000.0,
        };

        log::debug!(
            "frame {}: {} faces ({} too small), {} live tracklets, {} sessions, {:.2}ms",
            summary.frame_index,
            summary.valid_regions.len(),
            summary.invalid_regions.len(),
            summary.live_regions.len(),
            summary.sessions.len(),
            summary.elapsed_ms
        );

        Ok(summary)
    }

    /// Write records for every confirmed session still open once input ends
    pub fn finish(&mut self) -> ResolverReport {
        let report = self.resolver.finish();
        self.stats.records_written += report.records.len() as u64;
        self.stats.sessions_dropped += report.dropped as u64;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reidtrack::{MemoryCounter, MemoryRecordSink, SessionConfig};
    use tempfile::TempDir;

    fn face(left: i32, size: i32, embedding: f32) -> Detection {
        Detection::new(left, left + size, 0, size).with_embedding(vec![embedding, 0.0])
    }

    fn pipeline(config: CounterConfig) -> CounterPipeline {
        CounterPipeline::with_services(
            config,
            Box::new(MemoryCounter::default()),
            Box::new(MemoryRecordSink::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_small_faces_are_not_tracked() {
        let mut pipeline = pipeline(CounterConfig::default());
        let frame = FrameInput {
            frame_index: 0,
            detections: vec![face(0, 50, 0.0), face(200, 20, 5.0)],
        };

        let summary = pipeline.process(&frame).unwrap();
        assert_eq!(summary.face_count(), 1);
        assert_eq!(summary.invalid_regions.len(), 1);
        assert_eq!(pipeline.tracker().tracklet_count(), 1);
        assert_eq!(pipeline.resolver().session_count(), 1);
        assert_eq!(summary.resolver.created, 1);
    }

    #[test]
    fn test_same_face_keeps_one_tracklet_and_session() {
        let mut pipeline = pipeline(CounterConfig::default());
        for i in 0..5 {
            let frame = FrameInput {
                frame_index: i,
                detections: vec![face(i as i32 * 2, 60, 0.01 * i as f32)],
            };
            pipeline.process(&frame).unwrap();
        }

        assert_eq!(pipeline.tracker().tracklet_count(), 1);
        assert_eq!(pipeline.resolver().session_count(), 1);
        assert_eq!(pipeline.resolver().sessions()[0].vectors().len(), 5);
        assert_eq!(pipeline.stats().frames, 5);
        assert_eq!(pipeline.stats().faces, 5);
        assert_eq!(pipeline.stats().sessions_created, 1);
    }

    #[test]
    fn test_departed_face_written_to_disk() {
        let dir = TempDir::new().unwrap();
        let mut config = CounterConfig::default();
        config.sessions = SessionConfig {
            max_vectors: 2,
            long_life: 3,
            ..SessionConfig::default()
        };
        config.storage.counter_file = dir.path().join("session_index.txt");
        config.storage.output_dir = dir.path().join("output");

        let mut pipeline = CounterPipeline::new(config).unwrap();
        let mut written = 0;
        for i in 0..2 {
            let frame = FrameInput {
                frame_index: i,
                detections: vec![face(100, 60, 0.0)],
            };
            written += pipeline.process(&frame).unwrap().resolver.records.len();
        }
        for i in 2..6 {
            let frame = FrameInput {
                frame_index: i,
                detections: vec![],
            };
            written += pipeline.process(&frame).unwrap().resolver.records.len();
        }

        assert_eq!(written, 1);
        assert_eq!(pipeline.stats().records_written, 1);
        assert!(dir.path().join("output").join("session_0000001.json").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("session_index.txt")).unwrap(),
            "1"
        );
    }

    #[test]
    fn test_finish_records_visitor_still_in_view() {
        let dir = TempDir::new().unwrap();
        let mut config = CounterConfig::default();
        config.sessions.max_vectors = 2;
        config.storage.counter_file = dir.path().join("session_index.txt");
        config.storage.output_dir = dir.path().join("output");

        let mut pipeline = CounterPipeline::new(config).unwrap();
        for i in 0..3 {
            let frame = FrameInput {
                frame_index: i,
                detections: vec![face(100, 60, 0.0), face(300, 60, 10.0 + i as f32 * 5.0)],
            };
            assert!(pipeline.process(&frame).unwrap().resolver.records.is_empty());
        }

        // One confirmed session; the other face never repeated its embedding
        let report = pipeline.finish();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.dropped, 3);
        assert_eq!(pipeline.stats().records_written, 1);
        assert_eq!(pipeline.resolver().session_count(), 0);
        assert!(dir.path().join("output").join("session_0000001.json").exists());
    }
}

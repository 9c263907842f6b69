//! Embedding-based identity sessions
//!
//! A session collects the most recent embedding vectors seen for one person.
//! It is confirmed (activated) once its history fills up, counts down between
//! sightings, and writes a [`SessionRecord`] when it ends.

use crate::config::SessionConfig;
use crate::error::{ReidError, Result};
use crate::state::TrackState;
use crate::store::{RecordSink, SessionCounter};
use chrono::{DateTime, Local};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

pub type Embedding = Array1<f32>;

/// Euclidean norm of the difference
pub fn euclidean_distance(a: &Embedding, b: &Embedding) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Result written once per ended session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: u64,
    pub face_id: String,
    /// Unix seconds
    pub timestamp_start: i64,
    /// Unix seconds
    pub timestamp_end: i64,
    pub duration_in_seconds: f64,
    pub date: String,
    pub readable_time_start: String,
    pub readable_time_end: String,
}

impl SessionRecord {
    fn build(session_id: u64, face_id: &str, start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            session_id,
            face_id: face_id.to_string(),
            timestamp_start: start.timestamp(),
            timestamp_end: end.timestamp(),
            duration_in_seconds: (end - start).num_milliseconds() as f64 / 1000.0,
            date: readable_date(&end),
            readable_time_start: readable_time(&start),
            readable_time_end: readable_time(&end),
        }
    }
}

/// `DD/M/YYYY`
pub fn readable_date(time: &DateTime<Local>) -> String {
    time.format("%d/%-m/%Y").to_string()
}

/// `HH:MM`
pub fn readable_time(time: &DateTime<Local>) -> String {
    time.format("%H:%M").to_string()
}

#[derive(Debug, Clone)]
pub struct IdentitySession {
    pub face_id: String,
    session_id: Option<u64>,
    vectors: VecDeque<Embedding>,
    dimension: Option<usize>,
    state: TrackState,
    time_left: u32,
    started_at: DateTime<Local>,
    max_vectors: usize,
    compare_window: usize,
    long_life: u32,
    pending_life: u32,
    active_fraction: f32,
}

impl IdentitySession {
    pub fn new(config: &SessionConfig) -> Self {
        Self::starting_at(config, Local::now())
    }

    pub fn starting_at(config: &SessionConfig, started_at: DateTime<Local>) -> Self {
        Self {
            face_id: Uuid::new_v4().simple().to_string(),
            session_id: None,
            vectors: VecDeque::with_capacity(config.max_vectors + 1),
            dimension: None,
            state: TrackState::Tentative,
            time_left: 0,
            started_at,
            max_vectors: config.max_vectors,
            compare_window: config.compare_window,
            long_life: config.long_life,
            pending_life: config.pending_life,
            active_fraction: config.active_fraction,
        }
    }

    /// Append a vector, evicting the oldest once the history is over capacity.
    ///
    /// # Returns
    /// `true` if this call activated the session
    pub fn add_vector(&mut self, vector: Embedding) -> Result<bool> {
        self.check_dimension(&vector)?;
        self.dimension = Some(vector.len());

        self.vectors.push_back(vector);
        while self.vectors.len() > self.max_vectors {
            self.vectors.pop_front();
        }

        let mut activated = false;
        if !self.state.is_activated() && self.is_full() {
            self.state = self.state.transition(TrackState::Active)?;
            log::info!("Session {} activated", self.label());
            activated = true;
        }

        self.time_left = if self.is_full() {
            self.long_life
        } else {
            self.pending_life
        };
        Ok(activated)
    }

    fn check_dimension(&self, vector: &Embedding) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != vector.len() => Err(ReidError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Average distance between `vector` and the most recent stored vectors
    pub fn get_distance(&self, vector: &Embedding) -> Result<f32> {
        if self.vectors.is_empty() {
            return Err(ReidError::EmptySession(self.face_id.clone()));
        }
        self.check_dimension(vector)?;

        let window = self.vectors.len().min(self.compare_window);
        let total: f32 = self
            .vectors
            .iter()
            .rev()
            .take(window)
            .map(|stored| euclidean_distance(stored, vector))
            .sum();
        Ok(total / window as f32)
    }

    /// Count down by `delta`, stopping at zero
    pub fn update(&mut self, delta: u32) {
        self.time_left = self.time_left.saturating_sub(delta);
    }

    pub fn is_full(&self) -> bool {
        self.vectors.len() >= self.max_vectors
    }

    pub fn is_activated(&self) -> bool {
        self.state.is_activated()
    }

    pub fn is_expired(&self) -> bool {
        self.time_left == 0
    }

    /// Remaining time relative to the long-life window
    pub fn time_left_percent(&self) -> f32 {
        self.time_left as f32 / self.long_life as f32
    }

    /// Seen recently enough to count as freshly active
    pub fn is_active(&self) -> bool {
        self.time_left_percent() > self.active_fraction
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn vectors(&self) -> &VecDeque<Embedding> {
        &self.vectors
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Short tag shown next to the face
    pub fn label(&self) -> String {
        let short: String = self.face_id.chars().take(8).collect();
        if self.is_activated() {
            short
        } else {
            format!("{}?", short)
        }
    }

    /// Id issued by the first call to [`end`](Self::end), if any
    pub fn session_id(&self) -> Option<u64> {
        self.session_id
    }

    /// Issue a session id, build the record and hand it to `sink`.
    ///
    /// The id is issued once. If `sink` fails the session stays unended and a
    /// later call writes the record under the same id.
    pub fn end(
        &mut self,
        counter: &mut dyn SessionCounter,
        sink: &mut dyn RecordSink,
        ended_at: DateTime<Local>,
    ) -> Result<SessionRecord> {
        let session_id = match self.session_id {
            Some(id) => id,
            None => {
                let id = counter.next()?;
                self.session_id = Some(id);
                id
            }
        };

        let record = SessionRecord::build(session_id, &self.face_id, self.started_at, ended_at);
        sink.persist(&record)?;
        self.state = self.state.transition(self.state.lose())?;

        log::info!(
            "Session {} ended as #{} after {:.1}s",
            self.label(),
            session_id,
            record.duration_in_seconds
        );
        Ok(record)
    }
}

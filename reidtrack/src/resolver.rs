//! Per-frame identity resolution over embedding vectors

use crate::assignment::{try_cost_matrix, GreedyMatcher};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::session::{Embedding, IdentitySession, SessionRecord};
use crate::store::{RecordSink, SessionCounter};
use chrono::Local;

/// What happened during one call to [`IdentityResolver::process`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverReport {
    /// Vectors merged into an existing session
    pub matched: usize,
    /// Sessions created from unmatched vectors
    pub created: usize,
    /// Sessions that became activated this frame
    pub activated: usize,
    /// Records written for sessions that ended
    pub records: Vec<SessionRecord>,
    /// Expired sessions dropped without a record
    pub dropped: usize,
    /// Sessions whose record could not be written; they stay live and are retried
    pub failed: usize,
}

/// Observer view of one live session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub label: String,
    pub time_left_percent: f32,
    pub is_active: bool,
    pub is_activated: bool,
}

pub struct IdentityResolver {
    config: SessionConfig,
    sessions: Vec<IdentitySession>,
    counter: Box<dyn SessionCounter>,
    sink: Box<dyn RecordSink>,
    n_steps: u64,
}

impl IdentityResolver {
    pub fn new(
        config: SessionConfig,
        counter: Box<dyn SessionCounter>,
        sink: Box<dyn RecordSink>,
    ) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Creating IdentityResolver: max_vectors={}, compare_window={}, threshold={:.2}",
            config.max_vectors,
            config.compare_window,
            config.match_threshold
        );

        Ok(Self {
            config,
            sessions: Vec::new(),
            counter,
            sink,
            n_steps: 0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sessions(&self) -> &[IdentitySession] {
        &self.sessions
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn get_step_count(&self) -> u64 {
        self.n_steps
    }

    pub fn views(&self) -> Vec<SessionView> {
        self.sessions
            .iter()
            .map(|s| SessionView {
                label: s.label(),
                time_left_percent: s.time_left_percent(),
                is_active: s.is_active(),
                is_activated: s.is_activated(),
            })
            .collect()
    }

    /// Assign `vectors` to sessions, tick every session by `delta` and end the
    /// ones that ran out of time.
    pub fn process(&mut self, vectors: Vec<Embedding>, delta: u32) -> Result<ResolverReport> {
        let mut report = ResolverReport::default();

        let distances = try_cost_matrix(&self.sessions, &vectors, |session, vector| {
            session.get_distance(vector)
        })?;
        let result = GreedyMatcher::solve(distances.view(), self.config.match_threshold);

        log::debug!(
            "step {}: {} sessions, {} vectors, {} matched",
            self.n_steps,
            self.sessions.len(),
            vectors.len(),
            result.matches.len()
        );

        let mut slots: Vec<Option<Embedding>> = vectors.into_iter().map(Some).collect();
        for m in &result.matches {
            if let Some(vector) = slots[m.col].take() {
                if self.sessions[m.row].add_vector(vector)? {
                    report.activated += 1;
                }
                report.matched += 1;
            }
        }

        for vector in slots.into_iter().flatten() {
            let mut session = IdentitySession::new(&self.config);
            if session.add_vector(vector)? {
                report.activated += 1;
            }
            self.sessions.push(session);
            report.created += 1;
        }

        for session in &mut self.sessions {
            session.update(delta);
        }

        let (expired, alive): (Vec<IdentitySession>, Vec<IdentitySession>) = self
            .sessions
            .drain(..)
            .partition(|s| s.is_expired());
        self.sessions = alive;

        self.end_sessions(expired, &mut report);

        self.n_steps += 1;
        Ok(report)
    }

    /// End every session still open, as when the input stream runs out.
    /// Unconfirmed sessions are dropped unless `keep_unconfirmed` is set.
    pub fn finish(&mut self) -> ResolverReport {
        let mut report = ResolverReport::default();
        let open: Vec<IdentitySession> = self.sessions.drain(..).collect();
        self.end_sessions(open, &mut report);
        log::info!(
            "Finished with {} records, {} dropped, {} failed",
            report.records.len(),
            report.dropped,
            report.failed
        );
        report
    }

    /// Write records for `sessions`. A failed write is logged and the session
    /// goes back into the live set; it does not stop the remaining ones.
    fn end_sessions(&mut self, sessions: Vec<IdentitySession>, report: &mut ResolverReport) {
        let now = Local::now();
        for mut session in sessions {
            if !(session.is_full() || self.config.keep_unconfirmed) {
                log::debug!(
                    "Dropping unconfirmed session {} with {} vectors",
                    session.label(),
                    session.vectors().len()
                );
                report.dropped += 1;
                continue;
            }

            match session.end(self.counter.as_mut(), self.sink.as_mut(), now) {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    log::warn!("Failed to end session {}: {}", session.label(), e);
                    report.failed += 1;
                    self.sessions.push(session);
                }
            }
        }
    }

    /// Drop every session without writing records
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.n_steps = 0;
    }
}

//! Lifecycle states shared by tracklets and identity sessions.
//!
//! Both enums only move forward. Transition functions return an error instead of
//! silently reverting a confirmed or lost entity.

use crate::error::{ReidError, Result};
use serde::Serialize;

/// Confirmation and loss of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackState {
    /// Seen, but not yet confirmed by enough consecutive hits
    Tentative,
    /// Confirmed and still being observed
    Active,
    /// Missed for too long. `activated` records whether it was ever confirmed.
    Lost { activated: bool },
}

impl TrackState {
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Active | Self::Lost { activated: true })
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Self::Lost { .. })
    }

    /// Validated transition. Staying in the same state is always allowed.
    pub fn transition(self, next: TrackState) -> Result<TrackState> {
        use TrackState::*;

        match (self, next) {
            (a, b) if a == b => Ok(next),
            (Tentative, Active)
            | (Tentative, Lost { activated: false })
            | (Active, Lost { activated: true }) => Ok(next),
            _ => Err(ReidError::transition(self, next)),
        }
    }

    /// Confirm the entity. No-op once confirmed or lost.
    pub fn activate(self) -> TrackState {
        match self {
            Self::Tentative => Self::Active,
            other => other,
        }
    }

    /// Mark the entity lost, remembering whether it was confirmed
    pub fn lose(self) -> TrackState {
        match self {
            Self::Tentative => Self::Lost { activated: false },
            Self::Active => Self::Lost { activated: true },
            lost => lost,
        }
    }
}

/// Exit animation phase of a tracklet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AnimationState {
    Normal,
    Showing,
    Killing,
    Killed,
}

impl AnimationState {
    /// Move to `next`, rejecting any backward step
    pub fn advance_to(self, next: AnimationState) -> Result<AnimationState> {
        if next < self {
            return Err(ReidError::transition(self, next));
        }
        Ok(next)
    }
}

use chrono::{DateTime, Utc};

use review_core::model::{AnswerResult, Card, SessionSummary};

/// Coarse phase of a controller, for callers that only branch on where the
/// machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Setup,
    Active,
    Completed,
    Exited,
}

/// Tagged state of a review session controller.
///
/// The card sequence of an active session is fixed at start and never
/// re-ordered; the cursor only moves forward, and the results list always
/// holds exactly one entry per answered question.
#[derive(Debug)]
pub enum SessionState {
    /// No session running; `start_session` is the only accepted command.
    Setup,
    Active(ActiveSession),
    /// Terminal. The summary is produced once and immutable afterwards.
    Completed(SessionSummary),
    /// Terminal. Reached by explicit cancellation; partial progress is
    /// discarded and no summary exists.
    Exited,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Setup => SessionPhase::Setup,
            SessionState::Active(_) => SessionPhase::Active,
            SessionState::Completed(_) => SessionPhase::Completed,
            SessionState::Exited => SessionPhase::Exited,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Setup => "setup",
            SessionState::Active(_) => "active",
            SessionState::Completed(_) => "completed",
            SessionState::Exited => "exited",
        }
    }
}

/// Payload of the `Active` state.
#[derive(Debug)]
pub struct ActiveSession {
    pub(crate) cards: Vec<Card>,
    pub(crate) cursor: usize,
    pub(crate) results: Vec<AnswerResult>,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) question_started_at: DateTime<Utc>,
    /// Countdown in whole seconds; `None` for untimed sessions.
    pub(crate) remaining_seconds: Option<u32>,
    /// Text currently held for the question at the cursor, used by timeout
    /// auto-submission.
    pub(crate) pending_answer: String,
}

impl ActiveSession {
    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    #[must_use]
    pub fn results(&self) -> &[AnswerResult] {
        &self.results
    }
}

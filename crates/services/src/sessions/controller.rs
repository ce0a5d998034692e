use chrono::{DateTime, Utc};

use review_core::model::{AnswerResult, Card, SessionSpec, SessionSummary};
use review_core::{compose, score};

use super::grading::{FuzzyTextGrader, GradeAnswers};
use super::progress::SessionProgress;
use super::state::{ActiveSession, SessionPhase, SessionState};
use crate::error::SessionError;

//
// ─── COMMAND OUTCOMES ──────────────────────────────────────────────────────────
//

/// Outcome of submitting one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub result: AnswerResult,
    pub is_complete: bool,
}

/// Outcome of one cooperative timer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick arrived outside `Active` or the session is untimed; nothing
    /// happened. Stale ticks land here, never in transition logic.
    Ignored,
    CountedDown { remaining_seconds: u32 },
    /// Time ran out; the held answer was auto-submitted.
    TimedOut(SubmitOutcome),
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine driving one review session from setup through active
/// answering to its terminal state.
///
/// The controller is UI-independent: a presentation layer observes the state
/// and drives it through commands (`start_session`, `submit_answer`, `tick`,
/// `exit`). Timestamps come from the caller so the machine stays
/// deterministic under test.
///
/// A controller owns exactly one session at a time and shares no mutable
/// state with other controllers.
pub struct ReviewSessionController {
    grader: Box<dyn GradeAnswers>,
    state: SessionState,
}

impl ReviewSessionController {
    #[must_use]
    pub fn new(grader: Box<dyn GradeAnswers>) -> Self {
        Self {
            grader,
            state: SessionState::Setup,
        }
    }

    /// Controller grading locally through the approximate text matcher.
    #[must_use]
    pub fn with_fuzzy_grading() -> Self {
        Self::new(Box::new(FuzzyTextGrader))
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// The card at the cursor, while a session is active.
    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        match &self.state {
            SessionState::Active(session) => session.current_card(),
            _ => None,
        }
    }

    /// The summary of a completed session. `None` in every other state, in
    /// particular after `exit()`.
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        match &self.state {
            SessionState::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        match &self.state {
            SessionState::Active(session) => session.remaining_seconds(),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        match &self.state {
            SessionState::Active(session) => SessionProgress {
                total: session.total_cards(),
                answered: session.answered_count(),
                remaining: session.total_cards() - session.answered_count(),
                remaining_seconds: session.remaining_seconds(),
                is_complete: false,
            },
            SessionState::Completed(summary) => {
                let total = summary.total() as usize;
                SessionProgress {
                    total,
                    answered: total,
                    remaining: 0,
                    remaining_seconds: None,
                    is_complete: true,
                }
            }
            SessionState::Setup | SessionState::Exited => SessionProgress {
                total: 0,
                answered: 0,
                remaining: 0,
                remaining_seconds: None,
                is_complete: false,
            },
        }
    }

    /// Compose a card sequence from the spec and move to `Active`.
    ///
    /// When composition yields no cards the controller stays in `Setup` and
    /// the caller gets `SessionError::Empty` — "nothing to review" is a
    /// reportable condition, not a crash.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Setup`,
    /// `SessionError::Compose` for an invalid requested size, and
    /// `SessionError::Empty` when the pool has nothing to offer.
    pub fn start_session(
        &mut self,
        spec: SessionSpec,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Setup) {
            return Err(self.invalid("start_session"));
        }

        let cards = compose(spec.pool(), spec.size(), now)?;
        if cards.is_empty() {
            return Err(SessionError::Empty);
        }

        tracing::debug!(cards = cards.len(), timed = spec.time_limit().is_some(), "session started");
        self.state = SessionState::Active(ActiveSession {
            cards,
            cursor: 0,
            results: Vec::new(),
            started_at: now,
            question_started_at: now,
            remaining_seconds: spec.time_limit(),
            pending_answer: String::new(),
        });
        Ok(())
    }

    /// Replace the answer text held for the current question. Timeout
    /// auto-submission uses whatever is held here.
    pub fn set_pending_answer(&mut self, text: impl Into<String>) {
        if let SessionState::Active(session) = &mut self.state {
            session.pending_answer = text.into();
        }
    }

    /// Grade and record an answer for the current question, then advance.
    ///
    /// Answering the last question transitions to `Completed` and produces
    /// the summary exactly once; otherwise the question start timestamp
    /// resets to `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session finished and
    /// `SessionError::InvalidTransition` in `Setup` or `Exited`.
    pub fn submit_answer(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, SessionError> {
        match self.state.phase() {
            SessionPhase::Active => self.submit_inner(text.to_string(), now),
            SessionPhase::Completed => Err(SessionError::Completed),
            SessionPhase::Setup | SessionPhase::Exited => Err(self.invalid("submit_answer")),
        }
    }

    /// One cooperative timer tick. Ticks are ignored in every state but
    /// `Active` and in untimed sessions, so a stale tick can never fire into
    /// a closed session.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let SessionState::Active(session) = &mut self.state else {
            return TickOutcome::Ignored;
        };
        let Some(remaining) = session.remaining_seconds.as_mut() else {
            return TickOutcome::Ignored;
        };

        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return TickOutcome::CountedDown {
                remaining_seconds: *remaining,
            };
        }

        // Time is up: auto-submit whatever text is held, exactly as a manual
        // submit would. With questions left the session stays active at zero
        // and each further tick submits the next one.
        let pending = std::mem::take(&mut session.pending_answer);
        match self.submit_inner(pending, now) {
            Ok(outcome) => TickOutcome::TimedOut(outcome),
            // Unreachable while Active; keep the tick harmless regardless.
            Err(_) => TickOutcome::Ignored,
        }
    }

    /// Cancel the session immediately. Valid from every state except
    /// `Completed`; idempotent once `Exited`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` when the session already finished.
    pub fn exit(&mut self) -> Result<(), SessionError> {
        match self.state.phase() {
            SessionPhase::Completed => Err(SessionError::Completed),
            SessionPhase::Exited => Ok(()),
            SessionPhase::Setup | SessionPhase::Active => {
                tracing::debug!(from = self.state.name(), "session exited");
                self.state = SessionState::Exited;
                Ok(())
            }
        }
    }

    fn submit_inner(
        &mut self,
        response: String,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, SessionError> {
        let SessionState::Active(session) = &mut self.state else {
            return Err(SessionError::Completed);
        };
        let Some(card) = session.cards.get(session.cursor) else {
            return Err(SessionError::Completed);
        };

        let verdict = self.grader.grade(card, &response);
        let result = AnswerResult {
            card: card.clone(),
            response,
            is_correct: verdict.is_correct,
            elapsed: now - session.question_started_at,
            points_earned: verdict.points_earned,
            points_possible: verdict.points_possible,
        };
        session.results.push(result.clone());
        session.cursor += 1;
        session.pending_answer.clear();

        if session.cursor >= session.cards.len() {
            let results = std::mem::take(&mut session.results);
            let summary = score(results, session.started_at, now)?;
            tracing::debug!(score = summary.score(), "session completed");
            self.state = SessionState::Completed(summary);
            return Ok(SubmitOutcome {
                result,
                is_complete: true,
            });
        }

        session.question_started_at = now;
        Ok(SubmitOutcome {
            result,
            is_complete: false,
        })
    }

    fn invalid(&self, command: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            command,
            state: self.state.name(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

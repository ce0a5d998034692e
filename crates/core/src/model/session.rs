use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::card::{Card, Difficulty};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("a summary requires at least one answered question")]
    NoResults,
}

//
// ─── SESSION SPEC ──────────────────────────────────────────────────────────────
//

/// Request for one review session: how many cards, from which pool, and an
/// optional time limit in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
    size: u32,
    time_limit_seconds: Option<u32>,
    pool: Vec<Card>,
}

impl SessionSpec {
    #[must_use]
    pub fn new(size: u32, pool: Vec<Card>) -> Self {
        Self {
            size,
            time_limit_seconds: None,
            pool,
        }
    }

    /// Set a whole-second time limit. Zero means untimed.
    #[must_use]
    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Effective time limit; absent or zero both mean untimed.
    #[must_use]
    pub fn time_limit(&self) -> Option<u32> {
        self.time_limit_seconds.filter(|s| *s > 0)
    }

    #[must_use]
    pub fn pool(&self) -> &[Card] {
        &self.pool
    }

    #[must_use]
    pub fn into_pool(self) -> Vec<Card> {
        self.pool
    }
}

//
// ─── ANSWER RESULT ─────────────────────────────────────────────────────────────
//

/// Graded outcome of a single question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub card: Card,
    /// Raw user-entered text; empty when the question was skipped or timed out
    /// with nothing held.
    pub response: String,
    pub is_correct: bool,
    pub elapsed: Duration,
    pub points_earned: u32,
    pub points_possible: u32,
}

impl AnswerResult {
    /// True when no answer text was entered for this question.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.response.trim().is_empty()
    }
}

//
// ─── DIFFICULTY BREAKDOWN ──────────────────────────────────────────────────────
//

/// Per-difficulty slice of a session summary. Groups with zero members are
/// never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyStat {
    pub difficulty: Difficulty,
    pub total: u32,
    pub correct: u32,
    /// `correct / total`, rounded to an integer percentage.
    pub percent: u32,
}

//
// ─── SESSION SUMMARY ───────────────────────────────────────────────────────────
//

/// Aggregate report for a completed review session.
///
/// Produced exactly once when a session completes; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    correct: u32,
    score: u32,
    results: Vec<AnswerResult>,
    by_difficulty: Vec<DifficultyStat>,
}

impl SessionSummary {
    pub(crate) fn from_parts(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total: u32,
        correct: u32,
        score: u32,
        results: Vec<AnswerResult>,
        by_difficulty: Vec<DifficultyStat>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if total == 0 {
            return Err(SessionSummaryError::NoResults);
        }

        Ok(Self {
            started_at,
            completed_at,
            total,
            correct,
            score,
            results,
            by_difficulty,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total - self.correct
    }

    /// `correct / total`, rounded to an integer percentage.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Wall-clock duration of the whole session.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.completed_at - self.started_at
    }

    #[must_use]
    pub fn results(&self) -> &[AnswerResult] {
        &self.results
    }

    #[must_use]
    pub fn by_difficulty(&self) -> &[DifficultyStat] {
        &self.by_difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn summary_rejects_inverted_time_range() {
        let now = fixed_now();
        let err = SessionSummary::from_parts(
            now,
            now - Duration::seconds(1),
            1,
            1,
            100,
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn summary_rejects_zero_questions() {
        let now = fixed_now();
        let err =
            SessionSummary::from_parts(now, now, 0, 0, 0, Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, SessionSummaryError::NoResults);
    }

    #[test]
    fn spec_normalizes_zero_time_limit() {
        let spec = SessionSpec::new(5, Vec::new()).with_time_limit(0);
        assert_eq!(spec.time_limit(), None);

        let spec = SessionSpec::new(5, Vec::new()).with_time_limit(90);
        assert_eq!(spec.time_limit(), Some(90));
    }
}

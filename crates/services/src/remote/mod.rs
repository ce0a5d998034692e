//! Contracts for the external collaborators the engine consumes.
//!
//! Payload shapes are owned by the remote service; only the fields the
//! engine reads are modeled here. Scheduling parameters (ease, interval,
//! next review date) are computed remotely and never touched locally.

mod http;

pub use http::{HttpRemoteClient, RemoteConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use review_core::model::{Card, CardId, Difficulty, QuizId};

use crate::error::RemoteError;

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Filter for fetching a candidate card pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// The external spaced-repetition scheduler.
///
/// Its acknowledgements are never required for local session progress;
/// `submit_answer_result` is fired best-effort after local state has already
/// advanced.
#[async_trait]
pub trait SchedulerClient: Send + Sync {
    /// Fetch candidate cards, each carrying its due-ness.
    async fn fetch_pool(&self, filter: &PoolFilter) -> Result<Vec<Card>, RemoteError>;

    /// Inform the scheduler of a graded outcome so it can recompute the
    /// card's scheduling parameters.
    async fn submit_answer_result(
        &self,
        card_id: CardId,
        correct: bool,
        time_taken_ms: u64,
    ) -> Result<(), RemoteError>;
}

//
// ─── QUIZ SERVICE ──────────────────────────────────────────────────────────────
//

/// Options for requesting a generated quiz.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizOptions {
    pub count: u32,
    /// Requested number of questions per difficulty tag.
    pub difficulty_mix: BTreeMap<Difficulty, u32>,
    /// Optional Bloom's-taxonomy level mix, passed through opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_mix: Option<BTreeMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<u32>,
}

/// One question of a generated quiz, in the shape the quiz service returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: u64,
    pub prompt: String,
    /// Reference answer text; for multiple-choice questions the correct
    /// choice. Display-only in the server-graded variant.
    pub answer: String,
    #[serde(default)]
    pub choices: Vec<String>,
    pub difficulty: Difficulty,
}

/// A generated quiz as returned by the quiz service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedQuiz {
    pub quiz_id: QuizId,
    pub questions: Vec<QuizQuestion>,
}

/// One raw answer of a quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptAnswer {
    pub question_id: u64,
    pub response: String,
}

/// Server verdict for one question of a graded attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionVerdict {
    pub question_id: u64,
    pub correct: bool,
    pub points_earned: u32,
    pub points_possible: u32,
}

/// Server-graded result of a whole quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GradedAttempt {
    pub quiz_id: QuizId,
    pub verdicts: Vec<QuestionVerdict>,
}

/// The external quiz generation and grading service. Grading authority for
/// generated quizzes lies entirely on its side.
#[async_trait]
pub trait QuizClient: Send + Sync {
    async fn request_quiz(
        &self,
        source_id: &str,
        options: &QuizOptions,
    ) -> Result<GeneratedQuiz, RemoteError>;

    async fn submit_attempt(
        &self,
        quiz_id: &QuizId,
        answers: &[AttemptAnswer],
        time_taken_seconds: u64,
    ) -> Result<GradedAttempt, RemoteError>;
}

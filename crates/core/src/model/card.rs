use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("card prompt must not be empty")]
    EmptyPrompt,

    #[error("card answer must not be empty")]
    EmptyAnswer,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tag attached to a card by the content source.
///
/// The engine never changes a card's difficulty; it only groups results by it
/// when building the per-difficulty breakdown of a session summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All difficulty tags in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(CardError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// A single learning card as handed over by the external scheduler.
///
/// All scheduling fields (`due`, `next_review_at`, `review_count`) are owned
/// by that service; the engine only reads them. A count advanced by a
/// submitted result shows up on the next pool fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    prompt: String,
    answer: String,
    difficulty: Difficulty,
    due: bool,
    next_review_at: DateTime<Utc>,
    review_count: u32,
}

impl Card {
    /// Create a card, validating that prompt and answer carry text.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyPrompt` or `CardError::EmptyAnswer` when the
    /// respective field is empty or whitespace-only.
    pub fn new(
        id: CardId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        difficulty: Difficulty,
        due: bool,
        next_review_at: DateTime<Utc>,
    ) -> Result<Self, CardError> {
        let prompt = prompt.into();
        let answer = answer.into();
        if prompt.trim().is_empty() {
            return Err(CardError::EmptyPrompt);
        }
        if answer.trim().is_empty() {
            return Err(CardError::EmptyAnswer);
        }

        Ok(Self {
            id,
            prompt,
            answer,
            difficulty,
            due,
            next_review_at,
            review_count: 0,
        })
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Reference answer used by the grader.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn next_review_at(&self) -> DateTime<Utc> {
        self.next_review_at
    }

    #[must_use]
    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    /// True when the external scheduler flagged the card as due, or its next
    /// scheduled review is at or before `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due || self.next_review_at <= now
    }

    /// Rehydrate the review counter from a remote payload.
    #[must_use]
    pub fn with_review_count(mut self, review_count: u32) -> Self {
        self.review_count = review_count;
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn card_fails_if_prompt_empty() {
        let err = Card::new(
            CardId::new(1),
            "   ",
            "answer",
            Difficulty::Easy,
            false,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, CardError::EmptyPrompt);
    }

    #[test]
    fn card_fails_if_answer_empty() {
        let err = Card::new(
            CardId::new(1),
            "prompt",
            "",
            Difficulty::Easy,
            false,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, CardError::EmptyAnswer);
    }

    #[test]
    fn due_flag_overrides_timestamp() {
        let now = fixed_now();
        let future = now + chrono::Duration::days(3);
        let card = Card::new(
            CardId::new(1),
            "Q",
            "A",
            Difficulty::Medium,
            true,
            future,
        )
        .unwrap();
        assert!(card.is_due(now));
    }

    #[test]
    fn past_timestamp_makes_card_due() {
        let now = fixed_now();
        let card = Card::new(
            CardId::new(1),
            "Q",
            "A",
            Difficulty::Medium,
            false,
            now - chrono::Duration::hours(1),
        )
        .unwrap();
        assert!(card.is_due(now));
        assert!(!card.is_due(now - chrono::Duration::hours(2)));
    }

    #[test]
    fn review_count_rehydrates_from_remote_payloads() {
        let card = Card::new(
            CardId::new(1),
            "Q",
            "A",
            Difficulty::Hard,
            false,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(card.review_count(), 0);
        assert_eq!(card.with_review_count(4).review_count(), 4);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(matches!(
            "extreme".parse::<Difficulty>(),
            Err(CardError::UnknownDifficulty(_))
        ));
    }
}

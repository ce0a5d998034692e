use review_core::model::Card;

/// Verdict produced by a grading strategy for one answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedAnswer {
    pub is_correct: bool,
    pub points_earned: u32,
    pub points_possible: u32,
}

/// Pluggable grading authority for a session.
///
/// Free-text flashcard review grades locally; generated quizzes defer to the
/// server, which grades the whole attempt after completion. The controller is
/// identical in both cases.
pub trait GradeAnswers: Send + Sync {
    fn grade(&self, card: &Card, response: &str) -> GradedAnswer;
}

/// Local grading through the approximate free-text matcher, one point per
/// question.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyTextGrader;

impl GradeAnswers for FuzzyTextGrader {
    fn grade(&self, card: &Card, response: &str) -> GradedAnswer {
        let is_correct = review_core::grade(response, card.answer());
        GradedAnswer {
            is_correct,
            points_earned: u32::from(is_correct),
            points_possible: 1,
        }
    }
}

/// Records answers without a verdict; grading authority is the remote quiz
/// service, which replaces these provisional results after the attempt is
/// submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredGrader;

impl GradeAnswers for DeferredGrader {
    fn grade(&self, _card: &Card, _response: &str) -> GradedAnswer {
        GradedAnswer {
            is_correct: false,
            points_earned: 0,
            points_possible: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::model::{CardId, Difficulty};
    use review_core::time::fixed_now;

    fn card(answer: &str) -> Card {
        Card::new(
            CardId::new(1),
            "What is the capital of France?",
            answer,
            Difficulty::Easy,
            true,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn fuzzy_grader_awards_one_point() {
        let verdict = FuzzyTextGrader.grade(&card("Paris"), "paris");
        assert!(verdict.is_correct);
        assert_eq!(verdict.points_earned, 1);
        assert_eq!(verdict.points_possible, 1);
    }

    #[test]
    fn fuzzy_grader_marks_miss_as_zero_points() {
        let verdict = FuzzyTextGrader.grade(&card("Paris"), "london");
        assert!(!verdict.is_correct);
        assert_eq!(verdict.points_earned, 0);
    }

    #[test]
    fn deferred_grader_leaves_answers_ungraded() {
        let verdict = DeferredGrader.grade(&card("Paris"), "paris");
        assert!(!verdict.is_correct);
        assert_eq!(verdict.points_earned, 0);
    }
}

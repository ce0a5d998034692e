use chrono::{DateTime, Utc};

use crate::model::{
    AnswerResult, Difficulty, DifficultyStat, SessionSummary, SessionSummaryError,
};

/// Reduce a finished session's answer results into a [`SessionSummary`].
///
/// `started_at` and `completed_at` are the session boundaries recorded by the
/// controller; the summary's total time is their difference, which equals the
/// sum of per-question elapsed times.
///
/// # Errors
///
/// Returns `SessionSummaryError::NoResults` for an empty result list — a
/// session cannot complete with zero cards, so this is a programming error at
/// the call site. Returns `SessionSummaryError::InvalidTimeRange` when
/// `completed_at` precedes `started_at`.
pub fn score(
    results: Vec<AnswerResult>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> Result<SessionSummary, SessionSummaryError> {
    if results.is_empty() {
        return Err(SessionSummaryError::NoResults);
    }

    let total = u32::try_from(results.len()).unwrap_or(u32::MAX);
    let correct = u32::try_from(results.iter().filter(|r| r.is_correct).count())
        .unwrap_or(u32::MAX);

    let by_difficulty = breakdown(&results);

    SessionSummary::from_parts(
        started_at,
        completed_at,
        total,
        correct,
        percentage(correct, total),
        results,
        by_difficulty,
    )
}

/// Group results by card difficulty; groups with zero members are omitted.
fn breakdown(results: &[AnswerResult]) -> Vec<DifficultyStat> {
    Difficulty::ALL
        .iter()
        .filter_map(|&difficulty| {
            let group: Vec<&AnswerResult> = results
                .iter()
                .filter(|r| r.card.difficulty() == difficulty)
                .collect();
            if group.is_empty() {
                return None;
            }

            let total = u32::try_from(group.len()).unwrap_or(u32::MAX);
            let correct = u32::try_from(group.iter().filter(|r| r.is_correct).count())
                .unwrap_or(u32::MAX);

            Some(DifficultyStat {
                difficulty,
                total,
                correct,
                percent: percentage(correct, total),
            })
        })
        .collect()
}

fn percentage(correct: u32, total: u32) -> u32 {
    debug_assert!(total > 0);
    let pct = (100.0 * f64::from(correct)) / f64::from(total);

    // Bounded by 100, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = pct.round() as u32;
    rounded
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

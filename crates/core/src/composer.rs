use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::Card;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("session size must be greater than zero")]
    InvalidSize,
}

//
// ─── COMPOSER ──────────────────────────────────────────────────────────────────
//

/// Select and order at most `n` cards from `pool` for one session.
///
/// Due cards (per [`Card::is_due`] at `now`) come first, in pool order; any
/// remaining slots are filled with not-due cards, also in pool order. A pool
/// smaller than `n` yields everything available — a short session is valid.
/// An empty pool yields an empty sequence, which callers must treat as
/// "nothing to review", not a failure.
///
/// Pure selection over its input; no shuffling. If the caller wants a
/// randomized fill it randomizes the pool upstream.
///
/// # Errors
///
/// Returns `ComposeError::InvalidSize` when `n` is zero. That is a
/// programming error at the call site, not a recoverable condition.
pub fn compose(
    pool: &[Card],
    n: u32,
    now: DateTime<Utc>,
) -> Result<Vec<Card>, ComposeError> {
    if n == 0 {
        return Err(ComposeError::InvalidSize);
    }
    let n = n as usize;

    let (due, not_due): (Vec<&Card>, Vec<&Card>) =
        pool.iter().partition(|card| card.is_due(now));

    let mut selected: Vec<Card> = due.into_iter().take(n).cloned().collect();
    if selected.len() < n {
        let remaining = n - selected.len();
        selected.extend(not_due.into_iter().take(remaining).cloned());
    }

    Ok(selected)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

//! Approximate grading of free-text answers.
//!
//! Free-text answers rarely match a reference verbatim, so grading is a
//! lenient, order-independent token match rather than edit distance.

/// Fraction of key tokens that must match for an answer to count as correct.
const MATCH_THRESHOLD_NUM: usize = 7;
const MATCH_THRESHOLD_DEN: usize = 10;

/// Reference-answer tokens of this length or shorter are treated as noise.
const NOISE_TOKEN_LEN: usize = 2;

/// Compare a user's free-text answer against a card's reference answer.
///
/// 1. Both strings are lowercased and trimmed; an exact normalized match is
///    correct.
/// 2. Otherwise the reference is tokenized on whitespace and tokens of length
///    ≤ 2 are discarded, leaving the key tokens.
/// 3. A key token is matched when it is a substring of any user token or any
///    user token is a substring of it. Containment is deliberately checked in
///    both directions to tolerate minor inflection and typos, and that rule
///    must not be narrowed.
/// 4. Correct iff matched key tokens ≥ ceil(0.7 × key tokens).
///
/// A reference with zero key tokens is degenerate (such cards should not
/// occur); it grades correct only through the exact-match step.
#[must_use]
pub fn grade(user_answer: &str, reference_answer: &str) -> bool {
    let user = normalize(user_answer);
    let reference = normalize(reference_answer);

    if user == reference {
        return true;
    }

    let key_tokens: Vec<&str> = reference
        .split_whitespace()
        .filter(|token| token.len() > NOISE_TOKEN_LEN)
        .collect();
    if key_tokens.is_empty() {
        return false;
    }

    let user_tokens: Vec<&str> = user.split_whitespace().collect();

    let matched = key_tokens
        .iter()
        .filter(|key| {
            user_tokens
                .iter()
                .any(|token| token.contains(*key) || key.contains(token))
        })
        .count();

    let needed = (key_tokens.len() * MATCH_THRESHOLD_NUM).div_ceil(MATCH_THRESHOLD_DEN);
    matched >= needed
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

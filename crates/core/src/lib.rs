#![forbid(unsafe_code)]

//! Domain logic of the adaptive review session engine: the card and session
//! data model, due-first session composition, approximate free-text grading,
//! and session scoring. Everything here is pure and clock-injected; the
//! state machine and remote collaborators live in the `services` crate.

pub mod composer;
pub mod grader;
pub mod model;
pub mod scorer;
pub mod time;

pub use composer::{ComposeError, compose};
pub use grader::grade;
pub use scorer::score;
pub use time::Clock;

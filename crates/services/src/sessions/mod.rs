mod controller;
mod grading;
mod progress;
mod quiz;
mod state;
mod timer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{ReviewSessionController, SubmitOutcome, TickOutcome};
pub use grading::{DeferredGrader, FuzzyTextGrader, GradeAnswers, GradedAnswer};
pub use progress::SessionProgress;
pub use quiz::{QuizSession, QuizWorkflow};
pub use state::{ActiveSession, SessionPhase, SessionState};
pub use timer::SessionTimer;
pub use workflow::{ReviewSession, ReviewWorkflow, SessionEvent};

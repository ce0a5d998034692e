#![forbid(unsafe_code)]

pub mod error;
pub mod remote;
pub mod sessions;

pub use review_core::Clock;

pub use error::{RemoteError, SessionError};

pub use remote::{
    AttemptAnswer, GeneratedQuiz, GradedAttempt, HttpRemoteClient, PoolFilter, QuestionVerdict,
    QuizClient, QuizOptions, QuizQuestion, RemoteConfig, SchedulerClient,
};

pub use sessions::{
    QuizSession, QuizWorkflow, ReviewSession, ReviewSessionController, ReviewWorkflow,
    SessionEvent, SessionPhase, SessionProgress, SessionState, SessionTimer, SubmitOutcome,
    TickOutcome,
};

mod card;
mod ids;
mod session;

pub use card::{Card, CardError, Difficulty};
pub use ids::{CardId, ParseIdError, QuizId};
pub use session::{
    AnswerResult, DifficultyStat, SessionSpec, SessionSummary, SessionSummaryError,
};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use review_core::Clock;
use review_core::model::{Card, CardId, QuizId, SessionSpec, SessionSummary};
use review_core::score;

use super::controller::{ReviewSessionController, SubmitOutcome, TickOutcome};
use super::grading::DeferredGrader;
use super::timer::SessionTicks;
use crate::error::SessionError;
use crate::remote::{AttemptAnswer, QuizClient, QuizOptions, QuizQuestion};

/// A generated-quiz session: the same controller and timer as free-text
/// review, but grading deferred to the quiz service.
pub struct QuizSession {
    quiz_id: QuizId,
    pub controller: ReviewSessionController,
    ticks: Option<SessionTicks>,
}

impl QuizSession {
    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    /// Wait for the next timer emission. Resolves to `None` for untimed
    /// quizzes and once the timer has been cancelled.
    pub async fn next_tick(&mut self) -> Option<()> {
        match &mut self.ticks {
            Some(ticks) => ticks.recv().await,
            None => None,
        }
    }

    fn stop_timer(&mut self) {
        if let Some(ticks) = self.ticks.take() {
            ticks.stop();
        }
    }
}

/// Orchestrates the Bloom's-taxonomy quiz variant against the quiz service.
#[derive(Clone)]
pub struct QuizWorkflow {
    clock: Clock,
    client: Arc<dyn QuizClient>,
}

impl QuizWorkflow {
    #[must_use]
    pub fn new(clock: Clock, client: Arc<dyn QuizClient>) -> Self {
        Self { clock, client }
    }

    /// Request a generated quiz and start a session over its questions.
    ///
    /// Questions are adapted into the card shape the controller consumes;
    /// the quiz's own time limit applies when the options carry one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Remote` when generation fails and
    /// `SessionError::Empty` when the service returned no usable questions.
    pub async fn start(
        &self,
        source_id: &str,
        options: &QuizOptions,
    ) -> Result<QuizSession, SessionError> {
        let quiz = self.client.request_quiz(source_id, options).await?;
        let now = self.clock.now();

        let cards = adapt_questions(&quiz.questions, now);
        if cards.is_empty() {
            return Err(SessionError::Empty);
        }

        #[allow(clippy::cast_possible_truncation)]
        let size = cards.len() as u32;
        let mut spec = SessionSpec::new(size, cards);
        if let Some(seconds) = options.time_limit_seconds {
            spec = spec.with_time_limit(seconds);
        }

        let mut controller = ReviewSessionController::new(Box::new(DeferredGrader));
        controller.start_session(spec, now)?;
        let ticks = controller.remaining_seconds().map(|_| SessionTicks::start());

        Ok(QuizSession {
            quiz_id: quiz.quiz_id,
            controller,
            ticks,
        })
    }

    /// Record an answer (ungraded until [`Self::finish`]); answering the last
    /// question cancels the timer.
    ///
    /// # Errors
    ///
    /// Propagates controller transition errors.
    pub fn submit_answer(
        &self,
        session: &mut QuizSession,
        text: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let outcome = session.controller.submit_answer(text, self.clock.now())?;
        if outcome.is_complete {
            session.stop_timer();
        }
        Ok(outcome)
    }

    /// Forward one timer tick; the timeout that completes the quiz also
    /// cancels the timer.
    pub fn tick(&self, session: &mut QuizSession) -> TickOutcome {
        let outcome = session.controller.tick(self.clock.now());
        if let TickOutcome::TimedOut(submitted) = &outcome {
            if submitted.is_complete {
                session.stop_timer();
            }
        }
        outcome
    }

    /// Abandon the quiz and cancel its timer. The attempt is never submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` when the quiz already finished.
    pub fn exit(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        session.controller.exit()?;
        session.stop_timer();
        Ok(())
    }

    /// Submit the completed attempt for server-side grading and return the
    /// authoritative summary.
    ///
    /// Local state stays `Completed` either way; there is no local grading
    /// authority to fall back on, so a remote failure surfaces as an error
    /// and the caller may retry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` when the session has not
    /// completed and `SessionError::Remote` when attempt submission fails.
    pub async fn finish(&self, session: &QuizSession) -> Result<SessionSummary, SessionError> {
        let Some(provisional) = session.controller.summary() else {
            return Err(SessionError::InvalidTransition {
                command: "finish",
                state: session.controller.state().name(),
            });
        };

        let answers: Vec<AttemptAnswer> = provisional
            .results()
            .iter()
            .map(|result| AttemptAnswer {
                question_id: result.card.id().value(),
                response: result.response.clone(),
            })
            .collect();
        #[allow(clippy::cast_sign_loss)]
        let time_taken_seconds = provisional.total_time().num_seconds().max(0) as u64;

        let graded = self
            .client
            .submit_attempt(&session.quiz_id, &answers, time_taken_seconds)
            .await?;

        let verdicts: HashMap<u64, _> = graded
            .verdicts
            .iter()
            .map(|verdict| (verdict.question_id, verdict))
            .collect();

        let results = provisional
            .results()
            .iter()
            .cloned()
            .map(|mut result| {
                if let Some(verdict) = verdicts.get(&result.card.id().value()) {
                    result.is_correct = verdict.correct;
                    result.points_earned = verdict.points_earned;
                    result.points_possible = verdict.points_possible;
                }
                result
            })
            .collect();

        Ok(score(
            results,
            provisional.started_at(),
            provisional.completed_at(),
        )?)
    }
}

/// Adapt quiz questions into the card shape the controller steps through.
/// Malformed questions are dropped with a warning rather than failing the
/// whole quiz.
fn adapt_questions(questions: &[QuizQuestion], now: DateTime<Utc>) -> Vec<Card> {
    questions
        .iter()
        .filter_map(|question| {
            match Card::new(
                CardId::new(question.id),
                question.prompt.clone(),
                question.answer.clone(),
                question.difficulty,
                true,
                now,
            ) {
                Ok(card) => Some(card),
                Err(err) => {
                    tracing::warn!(question = question.id, %err, "discarding malformed quiz question");
                    None
                }
            }
        })
        .collect()
}

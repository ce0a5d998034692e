use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;
use tokio::sync::mpsc;

use review_core::Clock;
use review_core::model::{AnswerResult, CardId, SessionSpec};

use super::controller::{ReviewSessionController, SubmitOutcome, TickOutcome};
use super::timer::SessionTicks;
use crate::error::SessionError;
use crate::remote::{PoolFilter, SchedulerClient};

/// Informational events surfaced by best-effort side effects. Never part of
/// the state machine's transition logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Reporting a graded answer to the external scheduler failed; the
    /// session has already moved on.
    SubmitFailed { card_id: CardId, error: String },
}

/// One running free-text review session: the controller plus, for timed
/// sessions, the tick source driving its countdown.
///
/// The timer is cancelled on every transition out of `Active` — completion,
/// exit, or drop — so no tick can arrive after the session closed.
pub struct ReviewSession {
    pub controller: ReviewSessionController,
    ticks: Option<SessionTicks>,
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("state", self.controller.state())
            .field("timed", &self.is_timed())
            .finish_non_exhaustive()
    }
}

impl ReviewSession {
    fn new(controller: ReviewSessionController) -> Self {
        let ticks = controller.remaining_seconds().map(|_| SessionTicks::start());
        Self { controller, ticks }
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.ticks.is_some()
    }

    /// Wait for the next timer emission. Resolves to `None` for untimed
    /// sessions and once the timer has been cancelled.
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

/// Orchestrates free-text review sessions against the external scheduler.
///
/// Local session state always commits first; the remote result submission is
/// fired afterwards as a detached task. A failed submission is logged and
/// reported on the event channel, and never blocks or rolls back the
/// session.
#[derive(Clone)]
pub struct ReviewWorkflow {
    clock: Clock,
    scheduler: Arc<dyn SchedulerClient>,
    events: mpsc::UnboundedSender<SessionEvent>,
    shuffle_fill: bool,
}

impl ReviewWorkflow {
    /// Create the workflow and the receiving end of its event channel.
    #[must_use]
    pub fn new(
        clock: Clock,
        scheduler: Arc<dyn SchedulerClient>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                clock,
                scheduler,
                events,
                shuffle_fill: false,
            },
            rx,
        )
    }

    /// Shuffle the fetched pool before composition. Due cards still come
    /// first; this only randomizes order within the due and fill portions.
    #[must_use]
    pub fn with_shuffle_fill(mut self, shuffle_fill: bool) -> Self {
        self.shuffle_fill = shuffle_fill;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the candidate pool and start a session of `size` cards. A time
    /// limit also starts the once-per-second timer; drive it by forwarding
    /// each [`ReviewSession::next_tick`] emission to [`Self::tick`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Remote` when the pool cannot be fetched and
    /// `SessionError::Empty` when there is nothing to review.
    pub async fn start_session(
        &self,
        filter: &PoolFilter,
        size: u32,
        time_limit_seconds: Option<u32>,
    ) -> Result<ReviewSession, SessionError> {
        let mut pool = self.scheduler.fetch_pool(filter).await?;
        if self.shuffle_fill {
            pool.shuffle(&mut rng());
        }

        let mut spec = SessionSpec::new(size, pool);
        if let Some(seconds) = time_limit_seconds {
            spec = spec.with_time_limit(seconds);
        }

        let mut controller = ReviewSessionController::with_fuzzy_grading();
        controller.start_session(spec, self.clock.now())?;
        Ok(ReviewSession::new(controller))
    }

    /// Submit an answer: commit local state, then report the graded result
    /// to the scheduler best-effort.
    ///
    /// # Errors
    ///
    /// Propagates controller transition errors; remote failures never
    /// surface here.
    pub fn submit_answer(
        &self,
        session: &mut ReviewSession,
        text: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let outcome = session.controller.submit_answer(text, self.clock.now())?;
        if outcome.is_complete {
            session.stop_timer();
        }
        self.report_result(&outcome.result);
        Ok(outcome)
    }

    /// Forward one timer tick. A timeout auto-submission is reported to the
    /// scheduler the same way a manual submit is; the last one also cancels
    /// the timer.
    pub fn tick(&self, session: &mut ReviewSession) -> TickOutcome {
        let outcome = session.controller.tick(self.clock.now());
        if let TickOutcome::TimedOut(submitted) = &outcome {
            if submitted.is_complete {
                session.stop_timer();
            }
            self.report_result(&submitted.result);
        }
        outcome
    }

    /// Cancel the session and its timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` when the session already finished.
    pub fn exit(&self, session: &mut ReviewSession) -> Result<(), SessionError> {
        session.controller.exit()?;
        session.stop_timer();
        Ok(())
    }

    fn report_result(&self, result: &AnswerResult) {
        let scheduler = Arc::clone(&self.scheduler);
        let events = self.events.clone();
        let card_id = result.card.id();
        let correct = result.is_correct;
        #[allow(clippy::cast_sign_loss)]
        let time_taken_ms = result.elapsed.num_milliseconds().max(0) as u64;

        tokio::spawn(async move {
            if let Err(err) = scheduler
                .submit_answer_result(card_id, correct, time_taken_ms)
                .await
            {
                tracing::warn!(card = %card_id, %err, "answer result submission failed");
                let _ = events.send(SessionEvent::SubmitFailed {
                    card_id,
                    error: err.to_string(),
                });
            }
        });
    }
}

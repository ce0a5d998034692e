use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;

use review_core::model::{Card, CardId, Difficulty, QuizId};
use review_core::time::{fixed_clock, fixed_now};
use services::{
    AttemptAnswer, GeneratedQuiz, GradedAttempt, PoolFilter, QuestionVerdict, QuizClient,
    QuizOptions, QuizQuestion, QuizWorkflow, RemoteError, ReviewWorkflow, SchedulerClient,
    SessionEvent, SessionPhase, TickOutcome,
};

fn card(id: u64, answer: &str, due: bool) -> Card {
    let now = fixed_now();
    let next = if due {
        now - Duration::hours(1)
    } else {
        now + Duration::days(1)
    };
    Card::new(
        CardId::new(id),
        format!("Q{id}"),
        answer,
        Difficulty::Medium,
        false,
        next,
    )
    .unwrap()
}

#[derive(Default)]
struct FakeScheduler {
    pool: Vec<Card>,
    fail_submissions: bool,
    submissions: Mutex<Vec<(CardId, bool, u64)>>,
}

#[async_trait]
impl SchedulerClient for FakeScheduler {
    async fn fetch_pool(&self, _filter: &PoolFilter) -> Result<Vec<Card>, RemoteError> {
        Ok(self.pool.clone())
    }

    async fn submit_answer_result(
        &self,
        card_id: CardId,
        correct: bool,
        time_taken_ms: u64,
    ) -> Result<(), RemoteError> {
        if self.fail_submissions {
            return Err(RemoteError::Disabled);
        }
        self.submissions
            .lock()
            .unwrap()
            .push((card_id, correct, time_taken_ms));
        Ok(())
    }
}

async fn drain_spawned_tasks() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn review_loop_completes_and_reports_results() {
    let scheduler = Arc::new(FakeScheduler {
        pool: vec![card(1, "paris", true), card(2, "berlin", false)],
        ..FakeScheduler::default()
    });
    let (workflow, _events) = ReviewWorkflow::new(fixed_clock(), scheduler.clone());

    let mut session = workflow
        .start_session(&PoolFilter::default(), 2, None)
        .await
        .unwrap();
    assert!(!session.is_timed());
    // Due card first.
    assert_eq!(session.controller.current_card().unwrap().id(), CardId::new(1));

    workflow.submit_answer(&mut session, "Paris").unwrap();
    let outcome = workflow.submit_answer(&mut session, "munich").unwrap();
    assert!(outcome.is_complete);
    assert_eq!(session.controller.phase(), SessionPhase::Completed);

    let summary = session.controller.summary().unwrap();
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.correct(), 1);
    assert_eq!(summary.score(), 50);

    drain_spawned_tasks().await;
    let submissions = scheduler.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].0, CardId::new(1));
    assert!(submissions[0].1);
    assert!(!submissions[1].1);
}

#[tokio::test]
async fn failed_submission_never_blocks_the_session() {
    let scheduler = Arc::new(FakeScheduler {
        pool: vec![card(1, "paris", true)],
        fail_submissions: true,
        ..FakeScheduler::default()
    });
    let (workflow, mut events) = ReviewWorkflow::new(fixed_clock(), scheduler);

    let mut session = workflow
        .start_session(&PoolFilter::default(), 1, None)
        .await
        .unwrap();
    let outcome = workflow.submit_answer(&mut session, "paris").unwrap();

    // Local state committed regardless of the remote failure.
    assert!(outcome.is_complete);
    assert_eq!(session.controller.phase(), SessionPhase::Completed);
    assert!(session.controller.summary().is_some());

    drain_spawned_tasks().await;
    let event = events.try_recv().unwrap();
    assert!(matches!(
        event,
        SessionEvent::SubmitFailed { card_id, .. } if card_id == CardId::new(1)
    ));
}

#[tokio::test]
async fn empty_pool_reports_nothing_to_review() {
    let scheduler = Arc::new(FakeScheduler::default());
    let (workflow, _events) = ReviewWorkflow::new(fixed_clock(), scheduler);

    let err = workflow
        .start_session(&PoolFilter::default(), 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, services::SessionError::Empty));
}

#[tokio::test(start_paused = true)]
async fn timed_session_runs_off_the_real_timer() {
    let scheduler = Arc::new(FakeScheduler {
        pool: vec![card(1, "paris", true)],
        ..FakeScheduler::default()
    });
    let (workflow, _events) = ReviewWorkflow::new(fixed_clock(), scheduler.clone());

    let mut session = workflow
        .start_session(&PoolFilter::default(), 1, Some(1))
        .await
        .unwrap();
    assert!(session.is_timed());
    session.controller.set_pending_answer("paris");

    session.next_tick().await.unwrap();
    let outcome = workflow.tick(&mut session);
    assert!(matches!(&outcome, TickOutcome::TimedOut(o) if o.is_complete));
    assert_eq!(session.controller.phase(), SessionPhase::Completed);
    assert_eq!(session.controller.summary().unwrap().correct(), 1);

    // Completing the session cancelled the timer; its channel closes instead
    // of delivering further ticks.
    assert!(session.next_tick().await.is_none());

    drain_spawned_tasks().await;
    let submissions = scheduler.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].1);
}

#[tokio::test(start_paused = true)]
async fn exiting_a_timed_session_cancels_its_timer() {
    let scheduler = Arc::new(FakeScheduler {
        pool: vec![card(1, "paris", true), card(2, "berlin", false)],
        ..FakeScheduler::default()
    });
    let (workflow, _events) = ReviewWorkflow::new(fixed_clock(), scheduler);

    let mut session = workflow
        .start_session(&PoolFilter::default(), 2, Some(30))
        .await
        .unwrap();
    workflow.exit(&mut session).unwrap();

    assert_eq!(session.controller.phase(), SessionPhase::Exited);
    assert!(session.next_tick().await.is_none());
}

//
// ─── QUIZ VARIANT ──────────────────────────────────────────────────────────────
//

struct FakeQuizService {
    questions: Vec<QuizQuestion>,
}

#[async_trait]
impl QuizClient for FakeQuizService {
    async fn request_quiz(
        &self,
        _source_id: &str,
        _options: &QuizOptions,
    ) -> Result<GeneratedQuiz, RemoteError> {
        Ok(GeneratedQuiz {
            quiz_id: QuizId::new("quiz-7"),
            questions: self.questions.clone(),
        })
    }

    async fn submit_attempt(
        &self,
        quiz_id: &QuizId,
        answers: &[AttemptAnswer],
        _time_taken_seconds: u64,
    ) -> Result<GradedAttempt, RemoteError> {
        // The server grades by comparing against its own answer key; the
        // fake marks every non-empty response correct.
        Ok(GradedAttempt {
            quiz_id: quiz_id.clone(),
            verdicts: answers
                .iter()
                .map(|answer| QuestionVerdict {
                    question_id: answer.question_id,
                    correct: !answer.response.is_empty(),
                    points_earned: u32::from(!answer.response.is_empty()),
                    points_possible: 1,
                })
                .collect(),
        })
    }
}

fn quiz_question(id: u64, difficulty: Difficulty) -> QuizQuestion {
    QuizQuestion {
        id,
        prompt: format!("Question {id}"),
        answer: format!("Answer {id}"),
        choices: Vec::new(),
        difficulty,
    }
}

#[tokio::test]
async fn quiz_loop_defers_grading_to_the_server() {
    let client = Arc::new(FakeQuizService {
        questions: vec![
            quiz_question(1, Difficulty::Easy),
            quiz_question(2, Difficulty::Hard),
        ],
    });
    let workflow = QuizWorkflow::new(fixed_clock(), client);

    let mut session = workflow.start("doc-1", &QuizOptions::default()).await.unwrap();
    assert_eq!(session.quiz_id(), &QuizId::new("quiz-7"));

    workflow.submit_answer(&mut session, "something").unwrap();
    workflow.submit_answer(&mut session, "").unwrap();
    assert_eq!(session.controller.phase(), SessionPhase::Completed);

    // The provisional summary holds no verdicts yet.
    assert_eq!(session.controller.summary().unwrap().correct(), 0);

    let summary = workflow.finish(&session).await.unwrap();
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.correct(), 1);
    assert_eq!(summary.score(), 50);

    let by_difficulty = summary.by_difficulty();
    assert_eq!(by_difficulty.len(), 2);
    assert_eq!(by_difficulty[0].difficulty, Difficulty::Easy);
    assert_eq!(by_difficulty[0].percent, 100);
}

#[tokio::test(start_paused = true)]
async fn timed_quiz_auto_submits_on_timeout() {
    let client = Arc::new(FakeQuizService {
        questions: vec![quiz_question(1, Difficulty::Medium)],
    });
    let workflow = QuizWorkflow::new(fixed_clock(), client);
    let options = QuizOptions {
        time_limit_seconds: Some(1),
        ..QuizOptions::default()
    };

    let mut session = workflow.start("doc-1", &options).await.unwrap();
    session.next_tick().await.unwrap();
    let outcome = workflow.tick(&mut session);
    assert!(matches!(&outcome, TickOutcome::TimedOut(o) if o.is_complete));
    assert!(session.next_tick().await.is_none());

    // The empty auto-submitted response is graded incorrect by the server.
    let summary = workflow.finish(&session).await.unwrap();
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.correct(), 0);
}

#[tokio::test]
async fn quiz_finish_requires_completion() {
    let client = Arc::new(FakeQuizService {
        questions: vec![quiz_question(1, Difficulty::Easy)],
    });
    let workflow = QuizWorkflow::new(fixed_clock(), client);

    let session = workflow.start("doc-1", &QuizOptions::default()).await.unwrap();
    let err = workflow.finish(&session).await.unwrap_err();
    assert!(matches!(
        err,
        services::SessionError::InvalidTransition { command: "finish", .. }
    ));
}

use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use review_core::model::{Card, CardError, CardId, Difficulty, QuizId};

use super::{
    AttemptAnswer, GeneratedQuiz, GradedAttempt, PoolFilter, QuizClient, QuizOptions,
    SchedulerClient,
};
use crate::error::RemoteError;

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RemoteConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("REVIEW_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("REVIEW_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".into());
        Some(Self { base_url, api_key })
    }
}

/// HTTP implementation of both remote collaborators.
#[derive(Clone)]
pub struct HttpRemoteClient {
    client: Client,
    config: Option<RemoteConfig>,
}

impl HttpRemoteClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RemoteConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<RemoteConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&RemoteConfig, RemoteError> {
        self.config.as_ref().ok_or(RemoteError::Disabled)
    }

    fn url(&self, path: &str) -> Result<String, RemoteError> {
        let config = self.config()?;
        Ok(format!("{}/{path}", config.base_url.trim_end_matches('/')))
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        payload: &Req,
    ) -> Result<Resp, RemoteError> {
        let config = self.config()?;
        let response = self
            .client
            .post(self.url(path)?)
            .bearer_auth(&config.api_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::HttpStatus(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SchedulerClient for HttpRemoteClient {
    async fn fetch_pool(&self, filter: &PoolFilter) -> Result<Vec<Card>, RemoteError> {
        let payloads: Vec<CardPayload> = self.post_json("flashcards/pool", filter).await?;
        Ok(payloads
            .into_iter()
            .filter_map(|payload| match payload.into_card() {
                Ok(card) => Some(card),
                Err(err) => {
                    tracing::warn!(%err, "discarding malformed card payload");
                    None
                }
            })
            .collect())
    }

    async fn submit_answer_result(
        &self,
        card_id: CardId,
        correct: bool,
        time_taken_ms: u64,
    ) -> Result<(), RemoteError> {
        let payload = SubmitResultPayload {
            card_id: card_id.value(),
            correct,
            time_taken_ms,
        };
        let _: Ack = self.post_json("flashcards/results", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl QuizClient for HttpRemoteClient {
    async fn request_quiz(
        &self,
        source_id: &str,
        options: &QuizOptions,
    ) -> Result<GeneratedQuiz, RemoteError> {
        let payload = QuizRequestPayload { source_id, options };
        self.post_json("quizzes/generate", &payload).await
    }

    async fn submit_attempt(
        &self,
        quiz_id: &QuizId,
        answers: &[AttemptAnswer],
        time_taken_seconds: u64,
    ) -> Result<GradedAttempt, RemoteError> {
        let payload = AttemptPayload {
            answers,
            time_taken_seconds,
        };
        let path = format!("quizzes/{}/attempt", quiz_id.as_str());
        self.post_json(&path, &payload).await
    }
}

//
// ─── WIRE PAYLOADS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct CardPayload {
    id: u64,
    prompt: String,
    answer: String,
    difficulty: Difficulty,
    #[serde(default)]
    due: bool,
    next_review_at: DateTime<Utc>,
    #[serde(default)]
    review_count: u32,
}

impl CardPayload {
    fn into_card(self) -> Result<Card, CardError> {
        Ok(Card::new(
            CardId::new(self.id),
            self.prompt,
            self.answer,
            self.difficulty,
            self.due,
            self.next_review_at,
        )?
        .with_review_count(self.review_count))
    }
}

#[derive(Debug, Serialize)]
struct SubmitResultPayload {
    card_id: u64,
    correct: bool,
    time_taken_ms: u64,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    #[allow(dead_code)]
    ok: bool,
}

#[derive(Debug, Serialize)]
struct QuizRequestPayload<'a> {
    source_id: &'a str,
    options: &'a QuizOptions,
}

#[derive(Debug, Serialize)]
struct AttemptPayload<'a> {
    answers: &'a [AttemptAnswer],
    time_taken_seconds: u64,
}

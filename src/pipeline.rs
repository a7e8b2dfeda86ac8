//! The fixed question pipeline: ask the completion service, fetch the NEO feed.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::llm_interaction::CompletionClient;
use crate::message::Message;
use crate::nasa::FeedClient;
use crate::session::Transcript;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please enter a question!")]
    EmptyQuestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Complete,
    FetchFeed,
}

/// Output order is this order, whatever order the calls finish in.
pub const STEPS: [Step; 2] = [Step::Complete, Step::FetchFeed];

/// How a submission shows up on the page. The transcript itself is always
/// appended to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Accumulate {
    /// Each submission replaces the displayed run; earlier turns move to the
    /// sidebar history.
    Replace,
    /// Each submission is appended to the displayed chat.
    #[default]
    Append,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    completion: CompletionClient,
    feed: FeedClient,
}

impl Pipeline {
    pub fn new(completion: CompletionClient, feed: FeedClient) -> Self {
        Self { completion, feed }
    }

    /// Builds both service clients on one HTTP client with the configured timeout.
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self::new(
            CompletionClient::new(client.clone(), config),
            FeedClient::new(client, config),
        ))
    }

    async fn run_step(&self, step: Step, question: &str) -> Message {
        match step {
            Step::Complete => match self.completion.complete(question).await {
                Ok(reply) => Message::assistant(reply),
                Err(e) => {
                    warn!("Completion step failed: {}", e);
                    Message::assistant_failed(e.to_string())
                }
            },
            Step::FetchFeed => Message::feed_data(self.feed.fetch().await),
        }
    }

    /// Runs every step for `question` and returns their messages in step
    /// order. The steps are independent, so they run concurrently.
    #[instrument(skip(self))]
    pub async fn run(&self, question: &str) -> Vec<Message> {
        let outputs = join_all(STEPS.iter().map(|step| self.run_step(*step, question))).await;
        info!(
            failed = outputs.iter().filter(|m| m.is_error()).count(),
            "Pipeline run finished"
        );
        outputs
    }

    /// Validates the question and returns the user echo followed by the run's
    /// outputs, ready to append to a transcript.
    pub async fn submit(&self, question: &str) -> Result<Vec<Message>, SubmitError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }
        let mut messages = Vec::with_capacity(STEPS.len() + 1);
        messages.push(Message::user(question));
        messages.extend(self.run(question).await);
        Ok(messages)
    }

    pub async fn submit_to(
        &self,
        transcript: &mut Transcript,
        question: &str,
    ) -> Result<(), SubmitError> {
        let messages = self.submit(question).await?;
        transcript.extend(messages);
        Ok(())
    }
}

pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

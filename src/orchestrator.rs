//! Run orchestration: configuration intake, dispatch and the retry loop.
//!
//! One attempt loads the inputs, builds fresh clients, reads the event and
//! runs every enabled collaborator in a fixed order. Attempts are repeated
//! while the error is recognized and budget remains.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::ai::{BedrockClient, ModelClient};
use crate::config::{ModelConfig, RetryConfig};
use crate::error::{ActionError, CollaboratorKind};
use crate::event::EventSource;
use crate::generate::Collaborators;
use crate::github::{GhClient, SourceControl};
use crate::inputs::{InputSource, RunConfiguration};
use crate::workflow;

const NO_PULL_REQUEST: &str =
    "No pull request found in the context. This action should be run only on pull request events.";
const UNKNOWN_FAILURE: &str = "An unknown error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first failure.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.delay(),
        }
    }
}

/// Clients used by a single attempt.
pub struct AttemptClients {
    pub model: Arc<dyn ModelClient>,
    pub github: Arc<dyn SourceControl>,
}

pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &RunConfiguration) -> Result<AttemptClients, ActionError>;
}

/// Builds the CLI-backed clients (`aws` for the model, `gh` for GitHub).
#[derive(Debug, Clone, Default)]
pub struct CliClientFactory {
    model: ModelConfig,
}

impl CliClientFactory {
    pub fn new(model: ModelConfig) -> Self {
        Self { model }
    }
}

impl ClientFactory for CliClientFactory {
    fn build(&self, config: &RunConfiguration) -> Result<AttemptClients, ActionError> {
        Ok(AttemptClients {
            model: Arc::new(BedrockClient::new(&config.aws_region, self.model.clone())),
            github: Arc::new(GhClient::new(&config.github_token)),
        })
    }
}

/// How a successful attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptDisposition {
    Completed { invoked: Vec<CollaboratorKind> },
    NoPullRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded {
        attempts: u32,
        disposition: AttemptDisposition,
    },
    TerminalFailure {
        attempts: u32,
        kind: &'static str,
        message: String,
    },
}

impl RunOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::TerminalFailure { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Clone)]
pub struct Runner {
    inputs: Arc<dyn InputSource>,
    events: Arc<dyn EventSource>,
    clients: Arc<dyn ClientFactory>,
    collaborators: Arc<dyn Collaborators>,
    policy: RetryPolicy,
}

impl Runner {
    pub fn new(
        inputs: Arc<dyn InputSource>,
        events: Arc<dyn EventSource>,
        clients: Arc<dyn ClientFactory>,
        collaborators: Arc<dyn Collaborators>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            inputs,
            events,
            clients,
            collaborators,
            policy,
        }
    }

    /// Run attempts until one succeeds, an unknown error occurs or the retry
    /// budget is spent. Never exits the process.
    pub async fn run(&self) -> RunOutcome {
        let mut attempts = 0;
        let mut remaining = self.policy.max_retries;

        loop {
            attempts += 1;
            let runner = self.clone();
            let result = match tokio::spawn(async move { runner.attempt().await }).await {
                Ok(result) => result,
                Err(join_error) => Err(unknown_from_join(join_error)),
            };

            let err = match result {
                Ok(disposition) => {
                    return RunOutcome::Succeeded {
                        attempts,
                        disposition,
                    }
                }
                Err(err) => err,
            };

            error!(attempt = attempts, kind = err.kind(), "{}", err);
            if let Some(detail) = err.detail() {
                error!("{}", detail);
            }

            if !err.is_recognized() {
                return RunOutcome::TerminalFailure {
                    attempts,
                    kind: err.kind(),
                    message: UNKNOWN_FAILURE.to_string(),
                };
            }
            if remaining == 0 {
                return RunOutcome::TerminalFailure {
                    attempts,
                    kind: err.kind(),
                    message: format!("Action failed after multiple retries: {}", err),
                };
            }

            let notice = format!("Retrying... Attempts remaining: {}", remaining);
            warn!("{}", notice);
            workflow::warning(&notice);
            tokio::time::sleep(self.policy.delay).await;
            remaining -= 1;
        }
    }

    async fn attempt(&self) -> Result<AttemptDisposition, ActionError> {
        let config = RunConfiguration::load(self.inputs.as_ref())?;
        let clients = self.clients.build(&config)?;
        let model = clients.model.as_ref();
        let github = clients.github.as_ref();

        let context = self.events.load()?;
        let Some(pr) = context.pull_request()? else {
            info!("{}", NO_PULL_REQUEST);
            return Ok(AttemptDisposition::NoPullRequest);
        };
        info!("Reviewing PR #{} in {}", pr.number, pr.repo);
        if !config.flags.any() {
            info!("No generation step is enabled");
        }

        let mut invoked = Vec::new();

        if config.flags.generate_pr_description {
            self.collaborators
                .describe_pull_request(model, &config.model_id, github, &pr)
                .await
                .map_err(|e| ActionError::from_collaborator(CollaboratorKind::PrDescription, e))?;
            invoked.push(CollaboratorKind::PrDescription);
        }

        if config.flags.generate_code_review {
            self.collaborators
                .review_pull_request(
                    model,
                    &config.model_id,
                    github,
                    &pr,
                    &config.exclude_patterns,
                    &config.review_level,
                    &config.output_language,
                )
                .await
                .map_err(|e| ActionError::from_collaborator(CollaboratorKind::CodeReview, e))?;
            invoked.push(CollaboratorKind::CodeReview);
        }

        if config.flags.generate_unit_test {
            if config.unit_test_source_folder.is_empty() {
                return Err(ActionError::configuration(
                    "Test folder path is not specified",
                ));
            }
            self.collaborators
                .generate_unit_tests(
                    model,
                    &config.model_id,
                    github,
                    &pr.repo,
                    pr.number,
                    &config.unit_test_source_folder,
                    &config.unit_test_exclude_patterns,
                )
                .await
                .map_err(|e| ActionError::from_collaborator(CollaboratorKind::UnitTests, e))?;
            invoked.push(CollaboratorKind::UnitTests);
        }

        Ok(AttemptDisposition::Completed { invoked })
    }
}

fn unknown_from_join(err: JoinError) -> ActionError {
    if err.is_panic() {
        ActionError::Unknown(panic_message(err.into_panic()))
    } else {
        ActionError::Unknown("attempt was cancelled".to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

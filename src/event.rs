//! Triggering event context.
//!
//! Mirrors what the Actions runner provides to a step: the event payload at
//! `GITHUB_EVENT_PATH`, the event name and the `owner/repo` slug. Only the
//! pieces the orchestrator needs are parsed.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinates {
    /// Parse an `owner/repo` slug.
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// `owner/repo`, as used in REST endpoints.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// The pull request that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub number: u64,
    pub repo: RepoCoordinates,
    /// Head commit from the payload, used to anchor review comments.
    pub head_sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    #[serde(default)]
    head: Option<HeadPayload>,
}

#[derive(Debug, Deserialize)]
struct HeadPayload {
    sha: String,
}

/// Event name, payload and repository slug of the current workflow run.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    pub event_name: String,
    pub payload: Value,
    pub repository: Option<String>,
}

impl ActionContext {
    /// Build from the runner environment.
    ///
    /// A missing `GITHUB_EVENT_PATH` yields an empty payload (no pull request);
    /// an unreadable or malformed payload file is an error.
    pub fn from_env() -> Result<Self, ActionError> {
        let payload = match env::var("GITHUB_EVENT_PATH") {
            Ok(path) if !path.is_empty() => read_payload(Path::new(&path))?,
            _ => {
                debug!("GITHUB_EVENT_PATH is not set, using an empty event payload");
                Value::Object(Default::default())
            }
        };

        Ok(Self {
            event_name: env::var("GITHUB_EVENT_NAME").unwrap_or_default(),
            payload,
            repository: env::var("GITHUB_REPOSITORY").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Repository coordinates: `GITHUB_REPOSITORY` first, then the payload.
    pub fn repo(&self) -> Result<RepoCoordinates, ActionError> {
        if let Some(slug) = &self.repository {
            return RepoCoordinates::parse(slug).ok_or_else(|| {
                ActionError::configuration(format!("Invalid GITHUB_REPOSITORY value '{}'", slug))
            });
        }

        let repository = &self.payload["repository"];
        match (
            repository["owner"]["login"].as_str(),
            repository["name"].as_str(),
        ) {
            (Some(owner), Some(repo)) => Ok(RepoCoordinates {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(ActionError::configuration(
                "context.repo requires a GITHUB_REPOSITORY environment variable like 'owner/repo'",
            )),
        }
    }

    /// The pull request carried by the payload, if any.
    ///
    /// `Ok(None)` is the benign "not a pull request event" case.
    pub fn pull_request(&self) -> Result<Option<PullRequestContext>, ActionError> {
        let raw = match self.payload.get("pull_request") {
            None | Some(Value::Null) => return Ok(None),
            Some(raw) => raw,
        };

        let pr: PullRequestPayload = serde_json::from_value(raw.clone()).map_err(|e| {
            ActionError::configuration(format!("Malformed pull_request payload: {}", e))
        })?;

        Ok(Some(PullRequestContext {
            number: pr.number,
            repo: self.repo()?,
            head_sha: pr.head.map(|h| h.sha),
        }))
    }
}

fn read_payload(path: &Path) -> Result<Value, ActionError> {
    if !path.exists() {
        warn!("GITHUB_EVENT_PATH {} does not exist", path.display());
        return Ok(Value::Object(Default::default()));
    }
    let content = fs::read_to_string(path).map_err(|e| {
        ActionError::configuration(format!(
            "Failed to read event payload {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        ActionError::configuration(format!(
            "Failed to parse event payload {}: {}",
            path.display(),
            e
        ))
    })
}

/// Supplies the event context for each attempt.
pub trait EventSource: Send + Sync {
    fn load(&self) -> Result<ActionContext, ActionError>;
}

/// Reads the context from the runner environment on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvEventSource;

impl EventSource for EnvEventSource {
    fn load(&self) -> Result<ActionContext, ActionError> {
        ActionContext::from_env()
    }
}

impl EventSource for ActionContext {
    fn load(&self) -> Result<ActionContext, ActionError> {
        Ok(self.clone())
    }
}

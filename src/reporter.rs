//! Maps the run outcome to workflow annotations, step outputs and the exit code.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CollaboratorKind;
use crate::orchestrator::{AttemptDisposition, RunOutcome};
use crate::workflow;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Result kind for step outputs (serialized as snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Success,
    Skipped,
    Failure,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Failure => "failure",
        }
    }
}

/// JSON summary exposed as the `report` step output.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub result: ResultKind,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invoked: Vec<CollaboratorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunReport {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Succeeded {
                attempts,
                disposition: AttemptDisposition::Completed { invoked },
            } => Self {
                result: ResultKind::Success,
                attempts: *attempts,
                invoked: invoked.clone(),
                error_kind: None,
                message: None,
            },
            RunOutcome::Succeeded {
                attempts,
                disposition: AttemptDisposition::NoPullRequest,
            } => Self {
                result: ResultKind::Skipped,
                attempts: *attempts,
                invoked: Vec::new(),
                error_kind: None,
                message: None,
            },
            RunOutcome::TerminalFailure {
                attempts,
                kind,
                message,
            } => Self {
                result: ResultKind::Failure,
                attempts: *attempts,
                invoked: Vec::new(),
                error_kind: Some(*kind),
                message: Some(message.clone()),
            },
        }
    }
}

pub fn exit_status(outcome: &RunOutcome) -> u8 {
    if outcome.is_success() {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

/// Report the outcome to the runner and return the process exit status.
pub fn report(outcome: &RunOutcome) -> u8 {
    let report = RunReport::from_outcome(outcome);

    match outcome {
        RunOutcome::TerminalFailure { message, .. } => workflow::error(message),
        RunOutcome::Succeeded { attempts, .. } => {
            info!(attempts, result = report.result.as_str(), "Action completed")
        }
    }

    if let Err(e) = write_outputs(&report) {
        warn!("Failed to write step outputs: {:#}", e);
    }

    exit_status(outcome)
}

fn write_outputs(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string(report).context("Failed to serialize run report")?;
    workflow::set_outputs(&[
        ("result", report.result.as_str().to_string()),
        ("attempts", report.attempts.to_string()),
        ("report", json),
    ])
}

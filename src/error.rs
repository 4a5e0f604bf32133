//! Error taxonomy for a single action attempt.
//!
//! | Kind          | Retried | Produced by                                   |
//! |---------------|---------|-----------------------------------------------|
//! | Configuration | yes     | input loading, event context, dispatch checks |
//! | Collaborator  | yes     | description / review / unit-test generation   |
//! | Unknown       | no      | a panic inside the attempt                    |
//!
//! The retry loop only asks [`ActionError::is_recognized`]; it never inspects
//! the payload of a collaborator failure.

use std::fmt;

use thiserror::Error;

/// Which generation step produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorKind {
    PrDescription,
    CodeReview,
    UnitTests,
}

impl fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrDescription => write!(f, "PR description"),
            Self::CodeReview => write!(f, "code review"),
            Self::UnitTests => write!(f, "unit test suite"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Configuration(String),

    #[error("{collaborator} generation failed: {source:#}")]
    Collaborator {
        collaborator: CollaboratorKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Unknown(String),
}

impl ActionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wrap a collaborator failure at the dispatch boundary.
    ///
    /// Errors that already carry an `ActionError` (for example a configuration
    /// problem detected inside a generator) keep their original kind.
    pub fn from_collaborator(collaborator: CollaboratorKind, err: anyhow::Error) -> Self {
        match err.downcast::<ActionError>() {
            Ok(action_error) => action_error,
            Err(source) => Self::Collaborator {
                collaborator,
                source,
            },
        }
    }

    /// Whether the retry protocol may account for this error.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Extra detail logged next to the message, if any.
    ///
    /// For collaborator failures this is the full cause chain (and the
    /// backtrace when `RUST_BACKTRACE` is enabled).
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Collaborator { source, .. } => Some(format!("{:?}", source)),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Collaborator { .. } => "collaborator",
            Self::Unknown(_) => "unknown",
        }
    }
}

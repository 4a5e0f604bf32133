//! The three generation steps the orchestrator dispatches.

mod description;
mod review;

#[cfg(test)]
pub(crate) mod fakes;

use anyhow::Result;
use async_trait::async_trait;

use crate::ai::ModelClient;
use crate::config::UnitTestConfig;
use crate::event::{PullRequestContext, RepoCoordinates};
use crate::github::SourceControl;

pub use description::{DESCRIPTION_END, DESCRIPTION_START};

/// Call contract between the orchestrator and the generation steps.
///
/// Every operation receives its clients explicitly and is awaited to
/// completion before the next one starts.
#[async_trait]
pub trait Collaborators: Send + Sync {
    async fn describe_pull_request(
        &self,
        model: &dyn ModelClient,
        model_id: &str,
        github: &dyn SourceControl,
        pr: &PullRequestContext,
    ) -> Result<()>;

    #[allow(clippy::too_many_arguments)]
    async fn review_pull_request(
        &self,
        model: &dyn ModelClient,
        model_id: &str,
        github: &dyn SourceControl,
        pr: &PullRequestContext,
        exclude_patterns: &[String],
        review_level: &str,
        output_language: &str,
    ) -> Result<()>;

    #[allow(clippy::too_many_arguments)]
    async fn generate_unit_tests(
        &self,
        model: &dyn ModelClient,
        model_id: &str,
        github: &dyn SourceControl,
        repo: &RepoCoordinates,
        pull_number: u64,
        source_folder: &str,
        exclude_patterns: &[String],
    ) -> Result<()>;
}

/// Model-backed implementation of [`Collaborators`].
#[derive(Debug, Clone, Default)]
pub struct Generators {
    unit_test: UnitTestConfig,
}

impl Generators {
    pub fn new(unit_test: UnitTestConfig) -> Self {
        Self { unit_test }
    }
}

#[async_trait]
impl Collaborators for Generators {
    async fn describe_pull_request(
        &self,
        model: &dyn ModelClient,
        model_id: &str,
        github: &dyn SourceControl,
        pr: &PullRequestContext,
    ) -> Result<()> {
        description::describe(model, model_id, github, pr).await
    }

    async fn review_pull_request(
        &self,
        model: &dyn ModelClient,
        model_id: &str,
        github: &dyn SourceControl,
        pr: &PullRequestContext,
        exclude_patterns: &[String],
        review_level: &str,
        output_language: &str,
    ) -> Result<()> {
        review::review(
            model,
            model_id,
            github,
            pr,
            exclude_patterns,
            review_level,
            output_language,
        )
        .await
    }

    async fn generate_unit_tests(
        &self,
        model: &dyn ModelClient,
        model_id: &str,
        github: &dyn SourceControl,
        repo: &RepoCoordinates,
        pull_number: u64,
        source_folder: &str,
        exclude_patterns: &[String],
    ) -> Result<()> {
        unit_tests::generate(
            model,
            model_id,
            github,
            repo,
            pull_number,
            source_folder,
            exclude_patterns,
            self.unit_test.max_files,
        )
        .await
    }
}

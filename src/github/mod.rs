mod client;
mod comment;
mod pr;

use anyhow::Result;
use async_trait::async_trait;

use crate::event::RepoCoordinates;

pub use client::GhClient;
pub use comment::DraftComment;
pub use pr::{Branch, ChangedFile, PullRequest};

/// The source-control operations the generators rely on.
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn pull_request(&self, repo: &RepoCoordinates, number: u64) -> Result<PullRequest>;

    async fn changed_files(&self, repo: &RepoCoordinates, number: u64)
        -> Result<Vec<ChangedFile>>;

    async fn update_pull_request_body(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<()>;

    /// Submit a `COMMENT` review with inline comments.
    async fn create_review(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        commit_id: &str,
        body: &str,
        comments: &[DraftComment],
    ) -> Result<()>;

    async fn create_issue_comment(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<()>;

    async fn file_contents(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<String>;
}

#[async_trait]
impl SourceControl for GhClient {
    async fn pull_request(&self, repo: &RepoCoordinates, number: u64) -> Result<PullRequest> {
        pr::fetch_pr(self, repo, number).await
    }

    async fn changed_files(
        &self,
        repo: &RepoCoordinates,
        number: u64,
    ) -> Result<Vec<ChangedFile>> {
        pr::fetch_changed_files(self, repo, number).await
    }

    async fn update_pull_request_body(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<()> {
        pr::update_body(self, repo, number, body).await
    }

    async fn create_review(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        commit_id: &str,
        body: &str,
        comments: &[DraftComment],
    ) -> Result<()> {
        comment::create_review(self, repo, number, commit_id, body, comments).await
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<()> {
        comment::create_issue_comment(self, repo, number, body).await
    }

    async fn file_contents(
        &self,
        repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<String> {
        pr::fetch_file_contents(self, repo, path, git_ref).await
    }
}

//! In-memory model and source-control doubles shared by generator tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::ai::ModelClient;
use crate::event::{PullRequestContext, RepoCoordinates};
use crate::github::{Branch, ChangedFile, DraftComment, PullRequest, SourceControl};

/// Replays canned responses in order and records every prompt.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn converse(&self, _model_id: &str, _system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted response left"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedReview {
    pub commit_id: String,
    pub body: String,
    pub comments: Vec<DraftComment>,
}

/// A single pull request held in memory.
pub struct FakeRepo {
    pub pull: PullRequest,
    pub files: Vec<ChangedFile>,
    pub contents: HashMap<String, String>,
    pub updated_bodies: Mutex<Vec<String>>,
    pub reviews: Mutex<Vec<PostedReview>>,
    pub issue_comments: Mutex<Vec<String>>,
    pub pull_fetches: AtomicU32,
}

impl FakeRepo {
    pub fn new(title: &str, body: Option<&str>, files: Vec<ChangedFile>) -> Self {
        Self {
            pull: PullRequest {
                number: 7,
                title: title.to_string(),
                body: body.map(str::to_string),
                head: Branch {
                    ref_name: "feature".to_string(),
                    sha: "headsha".to_string(),
                },
                base: Branch {
                    ref_name: "main".to_string(),
                    sha: "basesha".to_string(),
                },
            },
            files,
            contents: HashMap::new(),
            updated_bodies: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            issue_comments: Mutex::new(Vec::new()),
            pull_fetches: AtomicU32::new(0),
        }
    }

    pub fn with_contents(mut self, path: &str, source: &str) -> Self {
        self.contents.insert(path.to_string(), source.to_string());
        self
    }

    pub fn pull_fetches(&self) -> u32 {
        self.pull_fetches.load(Ordering::SeqCst)
    }

    pub fn context(&self) -> PullRequestContext {
        PullRequestContext {
            number: self.pull.number,
            repo: repo(),
            head_sha: Some(self.pull.head.sha.clone()),
        }
    }
}

pub fn repo() -> RepoCoordinates {
    RepoCoordinates {
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
    }
}

pub fn changed(filename: &str, status: &str, patch: Option<&str>) -> ChangedFile {
    ChangedFile {
        filename: filename.to_string(),
        status: status.to_string(),
        additions: 1,
        deletions: 0,
        patch: patch.map(str::to_string),
    }
}

#[async_trait]
impl SourceControl for FakeRepo {
    async fn pull_request(&self, _repo: &RepoCoordinates, _number: u64) -> Result<PullRequest> {
        self.pull_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.pull.clone())
    }

    async fn changed_files(
        &self,
        _repo: &RepoCoordinates,
        _number: u64,
    ) -> Result<Vec<ChangedFile>> {
        Ok(self.files.clone())
    }

    async fn update_pull_request_body(
        &self,
        _repo: &RepoCoordinates,
        _number: u64,
        body: &str,
    ) -> Result<()> {
        self.updated_bodies.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn create_review(
        &self,
        _repo: &RepoCoordinates,
        _number: u64,
        commit_id: &str,
        body: &str,
        comments: &[DraftComment],
    ) -> Result<()> {
        self.reviews.lock().unwrap().push(PostedReview {
            commit_id: commit_id.to_string(),
            body: body.to_string(),
            comments: comments.to_vec(),
        });
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        _repo: &RepoCoordinates,
        _number: u64,
        body: &str,
    ) -> Result<()> {
        self.issue_comments.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn file_contents(
        &self,
        _repo: &RepoCoordinates,
        path: &str,
        git_ref: &str,
    ) -> Result<String> {
        if git_ref != self.pull.head.sha {
            return Err(anyhow!("unexpected ref {}", git_ref));
        }
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("404 Not Found: {}", path))
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{GhClient, Method};
use crate::event::RepoCoordinates;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub head: Branch,
    pub base: Branch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    pub patch: Option<String>,
}

impl ChangedFile {
    pub fn is_removed(&self) -> bool {
        self.status == "removed"
    }
}

pub(super) async fn fetch_pr(
    client: &GhClient,
    repo: &RepoCoordinates,
    number: u64,
) -> Result<PullRequest> {
    let endpoint = format!("repos/{}/pulls/{}", repo.slug(), number);
    let json = client.api(&endpoint).await?;
    serde_json::from_value(json).context("Failed to parse PR response")
}

pub(super) async fn fetch_changed_files(
    client: &GhClient,
    repo: &RepoCoordinates,
    number: u64,
) -> Result<Vec<ChangedFile>> {
    let endpoint = format!("repos/{}/pulls/{}/files?per_page=100", repo.slug(), number);
    let json = client.api_paginate(&endpoint).await?;
    serde_json::from_value(json).context("Failed to parse changed files response")
}

pub(super) async fn update_body(
    client: &GhClient,
    repo: &RepoCoordinates,
    number: u64,
    body: &str,
) -> Result<()> {
    let endpoint = format!("repos/{}/pulls/{}", repo.slug(), number);
    client
        .api_json(Method::Patch, &endpoint, &json!({ "body": body }))
        .await?;
    Ok(())
}

pub(super) async fn fetch_file_contents(
    client: &GhClient,
    repo: &RepoCoordinates,
    path: &str,
    git_ref: &str,
) -> Result<String> {
    let endpoint = contents_endpoint(repo, path, git_ref);
    client
        .api_raw(&endpoint)
        .await
        .with_context(|| format!("Failed to fetch {} at {}", path, git_ref))
}

/// `repos/{owner}/{repo}/contents/{path}?ref={ref}` with every path segment
/// and the ref percent-encoded.
fn contents_endpoint(repo: &RepoCoordinates, path: &str, git_ref: &str) -> String {
    let encoded_path = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "repos/{}/contents/{}?ref={}",
        repo.slug(),
        encoded_path,
        urlencoding::encode(git_ref)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoCoordinates {
        RepoCoordinates {
            owner: "octo".to_string(),
            repo: "widgets".to_string(),
        }
    }

    #[test]
    fn test_contents_endpoint_plain_path() {
        assert_eq!(
            contents_endpoint(&repo(), "src/math.ts", "abc123"),
            "repos/octo/widgets/contents/src/math.ts?ref=abc123"
        );
    }

    #[test]
    fn test_contents_endpoint_encodes_special_characters() {
        assert_eq!(
            contents_endpoint(&repo(), "src/a#b.ts", "abc"),
            "repos/octo/widgets/contents/src/a%23b.ts?ref=abc"
        );
        assert_eq!(
            contents_endpoint(&repo(), "docs/my file?.md", "feature/x"),
            "repos/octo/widgets/contents/docs/my%20file%3F.md?ref=feature%2Fx"
        );
        assert_eq!(
            contents_endpoint(&repo(), "100%/x.rs", "abc"),
            "repos/octo/widgets/contents/100%25/x.rs?ref=abc"
        );
    }

    #[test]
    fn test_pull_request_deserialize() {
        let json = serde_json::json!({
            "number": 7,
            "title": "Add retry loop",
            "body": null,
            "state": "open",
            "head": { "ref": "feature", "sha": "abc" },
            "base": { "ref": "main", "sha": "def" },
            "user": { "login": "octocat" }
        });
        let pr: PullRequest = serde_json::from_value(json).unwrap();
        assert_eq!(pr.number, 7);
        assert!(pr.body.is_none());
        assert_eq!(pr.head.sha, "abc");
        assert_eq!(pr.base.ref_name, "main");
    }

    #[test]
    fn test_changed_file_without_patch() {
        let json = serde_json::json!({
            "filename": "assets/logo.png",
            "status": "removed",
            "additions": 0,
            "deletions": 0
        });
        let file: ChangedFile = serde_json::from_value(json).unwrap();
        assert!(file.patch.is_none());
        assert!(file.is_removed());
    }
}

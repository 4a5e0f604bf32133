use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use super::client::{GhClient, Method};
use crate::event::RepoCoordinates;

/// Inline comment submitted as part of a review.
///
/// `position` is the offset inside the file's patch, see
/// [`crate::diff::line_number_to_position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftComment {
    pub path: String,
    pub position: u32,
    pub body: String,
}

pub(super) async fn create_review(
    client: &GhClient,
    repo: &RepoCoordinates,
    number: u64,
    commit_id: &str,
    body: &str,
    comments: &[DraftComment],
) -> Result<()> {
    let endpoint = format!("repos/{}/pulls/{}/reviews", repo.slug(), number);
    let request = json!({
        "commit_id": commit_id,
        "body": body,
        "event": "COMMENT",
        "comments": comments,
    });
    client.api_json(Method::Post, &endpoint, &request).await?;
    Ok(())
}

pub(super) async fn create_issue_comment(
    client: &GhClient,
    repo: &RepoCoordinates,
    number: u64,
    body: &str,
) -> Result<()> {
    let endpoint = format!("repos/{}/issues/{}/comments", repo.slug(), number);
    client
        .api_json(Method::Post, &endpoint, &json!({ "body": body }))
        .await?;
    Ok(())
}

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::ai::prompts::{build_review_prompt, REVIEW_SYSTEM};
use crate::ai::{extract_json_array, ModelClient};
use crate::diff::{annotate_patch, line_number_to_position};
use crate::event::PullRequestContext;
use crate::filter::ExcludeFilter;
use crate::github::{ChangedFile, DraftComment, SourceControl};

const REVIEW_BODY: &str = "Automated review by pr-assist.";

#[derive(Debug, Deserialize)]
struct ModelComment {
    line: u32,
    body: String,
}

pub(super) async fn review(
    model: &dyn ModelClient,
    model_id: &str,
    github: &dyn SourceControl,
    pr: &PullRequestContext,
    exclude_patterns: &[String],
    review_level: &str,
    output_language: &str,
) -> Result<()> {
    let filter = ExcludeFilter::new(exclude_patterns);
    let files = github
        .changed_files(&pr.repo, pr.number)
        .await
        .context("Failed to fetch changed files")?;

    let mut comments = Vec::new();
    for (file, patch) in reviewable(&files, &filter) {
        let prompt = build_review_prompt(
            &file.filename,
            &annotate_patch(patch),
            review_level,
            output_language,
        );
        let response = model
            .converse(model_id, REVIEW_SYSTEM, &prompt)
            .await
            .with_context(|| format!("Failed to review {}", file.filename))?;

        for c in parse_comments(&file.filename, &response) {
            match line_number_to_position(patch, c.line) {
                Some(position) => comments.push(DraftComment {
                    path: file.filename.clone(),
                    position,
                    body: c.body,
                }),
                None => debug!(file = %file.filename, line = c.line, "Dropping comment outside the diff"),
            }
        }
    }

    if comments.is_empty() {
        info!(pr = pr.number, "No review comments to post");
        return Ok(());
    }

    let commit_id = match &pr.head_sha {
        Some(sha) => sha.clone(),
        None => {
            github
                .pull_request(&pr.repo, pr.number)
                .await
                .context("Failed to fetch pull request")?
                .head
                .sha
        }
    };

    github
        .create_review(&pr.repo, pr.number, &commit_id, REVIEW_BODY, &comments)
        .await
        .context("Failed to submit review")?;
    info!(pr = pr.number, comments = comments.len(), "Review submitted");
    Ok(())
}

/// Files worth sending to the model, paired with their patch.
fn reviewable<'a>(
    files: &'a [ChangedFile],
    filter: &'a ExcludeFilter,
) -> impl Iterator<Item = (&'a ChangedFile, &'a str)> + 'a {
    files.iter().filter_map(move |f| {
        if f.is_removed() || filter.is_excluded(&f.filename) {
            return None;
        }
        f.patch.as_deref().map(|p| (f, p))
    })
}

/// Parse the model's JSON array leniently. Unparseable output means no
/// comments for that file.
fn parse_comments(filename: &str, response: &str) -> Vec<ModelComment> {
    let Some(json) = extract_json_array(response) else {
        warn!(file = %filename, "Model response did not contain a JSON array");
        return Vec::new();
    };
    match serde_json::from_str::<Vec<ModelComment>>(json) {
        Ok(comments) => comments
            .into_iter()
            .filter(|c| !c.body.trim().is_empty())
            .collect(),
        Err(e) => {
            warn!(file = %filename, error = %e, "Failed to parse review comments");
            Vec::new()
        }
    }
}

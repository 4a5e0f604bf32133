use anyhow::{Context, Result};
use tracing::info;

use crate::ai::prompts::{build_description_prompt, DESCRIPTION_SYSTEM};
use crate::ai::{strip_code_fence, ModelClient};
use crate::event::PullRequestContext;
use crate::github::SourceControl;

pub const DESCRIPTION_START: &str = "<!-- pr-assist:description:start -->";
pub const DESCRIPTION_END: &str = "<!-- pr-assist:description:end -->";

pub(super) async fn describe(
    model: &dyn ModelClient,
    model_id: &str,
    github: &dyn SourceControl,
    pr: &PullRequestContext,
) -> Result<()> {
    let pull = github
        .pull_request(&pr.repo, pr.number)
        .await
        .context("Failed to fetch pull request")?;
    let files = github
        .changed_files(&pr.repo, pr.number)
        .await
        .context("Failed to fetch changed files")?;

    let prompt = build_description_prompt(&pull.title, &files);
    let generated = model
        .converse(model_id, DESCRIPTION_SYSTEM, &prompt)
        .await
        .context("Failed to generate PR description")?;

    let body = merge_description(pull.body.as_deref().unwrap_or(""), strip_code_fence(&generated));
    github
        .update_pull_request_body(&pr.repo, pr.number, &body)
        .await
        .context("Failed to update PR description")?;

    info!(pr = pr.number, files = files.len(), "PR description updated");
    Ok(())
}

/// Put `generated` into the marked block of `existing`, replacing a previous
/// block if there is one. Text outside the markers is left untouched.
fn merge_description(existing: &str, generated: &str) -> String {
    let block = format!("{}\n{}\n{}", DESCRIPTION_START, generated.trim(), DESCRIPTION_END);

    if let Some(start) = existing.find(DESCRIPTION_START) {
        if let Some(end_offset) = existing[start..].find(DESCRIPTION_END) {
            let end = start + end_offset + DESCRIPTION_END.len();
            return format!("{}{}{}", &existing[..start], block, &existing[end..]);
        }
    }

    let existing = existing.trim_end();
    if existing.is_empty() {
        block
    } else {
        format!("{}\n\n{}", existing, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::fakes::{changed, FakeRepo, ScriptedModel};

    #[test]
    fn test_merge_into_empty_body() {
        assert_eq!(
            merge_description("", "### Summary\nHi\n"),
            format!("{}\n### Summary\nHi\n{}", DESCRIPTION_START, DESCRIPTION_END)
        );
    }

    #[test]
    fn test_merge_appends_after_author_text() {
        let merged = merge_description("Fixes #12\n", "generated");
        assert!(merged.starts_with("Fixes #12\n\n<!-- pr-assist"));
        assert!(merged.ends_with(DESCRIPTION_END));
    }

    #[test]
    fn test_merge_replaces_existing_block() {
        let existing = format!(
            "Intro\n{}\nold text\n{}\nFooter",
            DESCRIPTION_START, DESCRIPTION_END
        );
        let merged = merge_description(&existing, "new text");
        assert_eq!(
            merged,
            format!(
                "Intro\n{}\nnew text\n{}\nFooter",
                DESCRIPTION_START, DESCRIPTION_END
            )
        );
        // Running again yields the same body.
        assert_eq!(merge_description(&merged, "new text"), merged);
    }

    #[test]
    fn test_merge_unterminated_block_appends() {
        let existing = format!("{}\ndangling", DESCRIPTION_START);
        let merged = merge_description(&existing, "x");
        assert!(merged.starts_with(&existing));
        assert_eq!(merged.matches(DESCRIPTION_END).count(), 1);
    }

    #[tokio::test]
    async fn test_describe_updates_body() {
        let github = FakeRepo::new(
            "Add retries",
            Some("Author notes"),
            vec![changed("src/run.rs", "modified", Some("@@ -1 +1 @@\n-a\n+b"))],
        );
        let model = ScriptedModel::new(&["```markdown\n### Summary\nAdds retries.\n```"]);

        describe(&model, "model", &github, &github.context())
            .await
            .unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Add retries"));
        assert!(prompts[0].contains("src/run.rs"));

        let bodies = github.updated_bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].starts_with("Author notes\n\n"));
        assert!(bodies[0].contains("### Summary\nAdds retries."));
        assert!(!bodies[0].contains("```"));
    }

    #[tokio::test]
    async fn test_describe_model_failure_leaves_body() {
        let github = FakeRepo::new("t", None, Vec::new());
        let model = ScriptedModel::new(&[]);

        let err = describe(&model, "model", &github, &github.context())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to generate PR description"));
        assert!(github.updated_bodies.lock().unwrap().is_empty());
    }
}

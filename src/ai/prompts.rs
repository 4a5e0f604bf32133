use crate::github::ChangedFile;

/// Upper bound on patch text per file sent to the model.
const MAX_PATCH_CHARS: usize = 12_000;

pub const DESCRIPTION_SYSTEM: &str =
    "You are an experienced software engineer who writes clear, factual pull request descriptions.";

pub const REVIEW_SYSTEM: &str =
    "You are a meticulous code reviewer. You only comment on lines present in the diff you are given.";

pub const UNIT_TEST_SYSTEM: &str =
    "You are an expert in software testing. You write idiomatic, runnable unit tests.";

pub fn build_description_prompt(title: &str, files: &[ChangedFile]) -> String {
    let changes = files
        .iter()
        .map(|f| {
            let patch = f
                .patch
                .as_deref()
                .map(|p| truncate_chars(p, MAX_PATCH_CHARS))
                .unwrap_or_else(|| "(binary or too large to display)".to_string());
            format!(
                "### {} ({}, +{} -{})\n```diff\n{}\n```",
                f.filename, f.status, f.additions, f.deletions, patch
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Write a description for the pull request titled "{title}".

## Changes
{changes}

## Output format
Respond in Markdown with exactly these sections:
### Summary
One or two sentences describing the purpose of the change.
### Changes
A bullet list of the notable changes, grouped by area.
### Impact
Risks, migrations or follow-ups reviewers should know about, or "None".

Do not wrap the answer in a code fence."#,
        title = title,
        changes = changes,
    )
}

pub fn build_review_prompt(
    filename: &str,
    annotated_patch: &str,
    review_level: &str,
    output_language: &str,
) -> String {
    let focus = if review_level.eq_ignore_ascii_case("detailed") {
        "Comment on every bug, risky construct, missing error handling, naming or readability issue you find."
    } else {
        "Only comment on real bugs, security problems and significant design issues. Skip style nits."
    };
    let language = if output_language.is_empty() {
        "English"
    } else {
        output_language
    };

    format!(
        r#"Review the following change to `{filename}`.

Every line that can receive a comment is prefixed with its line number in the new file, followed by `|`.

```diff
{patch}
```

## Your Task
{focus}

Respond with a JSON array and nothing else. Each element must look like:
{{"line": <line number from the prefix>, "body": "<comment>"}}
Write every comment body in {language}. Respond with [] when there is nothing worth commenting on."#,
        filename = filename,
        patch = truncate_chars(annotated_patch, MAX_PATCH_CHARS),
        focus = focus,
        language = language,
    )
}

pub fn build_unit_test_prompt(path: &str, source: &str) -> String {
    format!(
        r#"Write a unit test suite for the source file `{path}`.

```
{source}
```

## Requirements
1. Use the testing framework that is conventional for this language and project layout.
2. Cover the public behaviour, including edge cases and error paths.
3. Mock external I/O instead of performing it.

Respond with the complete test file only, inside a single code fence."#,
        path = path,
        source = truncate_chars(source, MAX_PATCH_CHARS * 2),
    )
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_end, _)) => format!("{}\n... (truncated)", &s[..byte_end]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: name.to_string(),
            status: "modified".to_string(),
            additions: 1,
            deletions: 0,
            patch: patch.map(str::to_string),
        }
    }

    #[test]
    fn test_description_prompt_lists_files() {
        let prompt = build_description_prompt(
            "Add retries",
            &[
                file("src/run.rs", Some("@@ -1 +1,2 @@\n a\n+b")),
                file("logo.png", None),
            ],
        );
        assert!(prompt.contains("titled \"Add retries\""));
        assert!(prompt.contains("### src/run.rs (modified, +1 -0)"));
        assert!(prompt.contains("+b"));
        assert!(prompt.contains("(binary or too large to display)"));
    }

    #[test]
    fn test_review_prompt_level_and_language() {
        let detailed = build_review_prompt("a.rs", "    1 |+x", "Detailed", "ja");
        assert!(detailed.contains("Comment on every bug"));
        assert!(detailed.contains("in ja."));
        assert!(detailed.contains("{\"line\": <line number from the prefix>"));

        let concise = build_review_prompt("a.rs", "    1 |+x", "summarized", "");
        assert!(concise.contains("Skip style nits"));
        assert!(concise.contains("in English."));
    }

    #[test]
    fn test_unit_test_prompt() {
        let prompt = build_unit_test_prompt("src/math.ts", "export const add = (a, b) => a + b;");
        assert!(prompt.contains("`src/math.ts`"));
        assert!(prompt.contains("export const add"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel\n... (truncated)");
        // multibyte boundary must not panic
        assert_eq!(truncate_chars("あいう", 2), "あい\n... (truncated)");
    }
}

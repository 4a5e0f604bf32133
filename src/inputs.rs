use std::collections::HashMap;
use std::env;

use tracing::info;

use crate::error::ActionError;

pub const DEFAULT_AWS_REGION: &str = "us-east-1";

pub const INPUT_GITHUB_TOKEN: &str = "github-token";
pub const INPUT_AWS_REGION: &str = "aws-region";
pub const INPUT_MODEL_ID: &str = "model-id";
pub const INPUT_GENERATE_CODE_REVIEW: &str = "generate-code-review";
pub const INPUT_CODE_REVIEW_EXCLUDE_FILES: &str = "generate-code-review-exclude-files";
pub const INPUT_CODE_REVIEW_LEVEL: &str = "generate-code-review-level";
pub const INPUT_GENERATE_PR_DESCRIPTION: &str = "generate-pr-description";
pub const INPUT_GENERATE_UNIT_TEST: &str = "generate-unit-test";
pub const INPUT_UNIT_TEST_SOURCE_FOLDER: &str = "generate-unit-test-source-folder";
pub const INPUT_UNIT_TEST_EXCLUDE_FILES: &str = "generate-unit-test-exclude-files";
pub const INPUT_OUTPUT_LANGUAGE: &str = "output-language";

/// Source of named action inputs.
///
/// Implementations return the trimmed value, or an empty string when the
/// input was not provided.
pub trait InputSource: Send + Sync {
    fn get_input(&self, name: &str) -> String;
}

/// Reads inputs the way the Actions runner exposes them: `INPUT_<NAME>` with
/// spaces replaced by underscores and the name upper-cased.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvInputs;

impl EnvInputs {
    pub fn variable_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputs {
    fn get_input(&self, name: &str) -> String {
        env::var(Self::variable_name(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}

impl InputSource for HashMap<String, String> {
    fn get_input(&self, name: &str) -> String {
        self.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub generate_code_review: bool,
    pub generate_pr_description: bool,
    pub generate_unit_test: bool,
}

impl FeatureFlags {
    pub fn any(&self) -> bool {
        self.generate_code_review || self.generate_pr_description || self.generate_unit_test
    }
}

/// Configuration for one attempt, rebuilt from the inputs every time.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub github_token: String,
    pub aws_region: String,
    pub model_id: String,
    pub exclude_patterns: Vec<String>,
    pub review_level: String,
    pub flags: FeatureFlags,
    pub output_language: String,
    pub unit_test_source_folder: String,
    pub unit_test_exclude_patterns: Vec<String>,
}

// Keeps the token out of `{:?}` output.
impl std::fmt::Debug for RunConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfiguration")
            .field("github_token", &token_status(&self.github_token))
            .field("aws_region", &self.aws_region)
            .field("model_id", &self.model_id)
            .field("exclude_patterns", &self.exclude_patterns)
            .field("review_level", &self.review_level)
            .field("flags", &self.flags)
            .field("output_language", &self.output_language)
            .field("unit_test_source_folder", &self.unit_test_source_folder)
            .field("unit_test_exclude_patterns", &self.unit_test_exclude_patterns)
            .finish()
    }
}

impl RunConfiguration {
    /// Read every input, log it, and validate the token.
    pub fn load(inputs: &dyn InputSource) -> Result<Self, ActionError> {
        let github_token = inputs.get_input(INPUT_GITHUB_TOKEN);
        let aws_region = inputs.get_input(INPUT_AWS_REGION);
        let model_id = inputs.get_input(INPUT_MODEL_ID);
        let exclude_files = inputs.get_input(INPUT_CODE_REVIEW_EXCLUDE_FILES);
        let review_level = inputs.get_input(INPUT_CODE_REVIEW_LEVEL);
        let code_review = inputs.get_input(INPUT_GENERATE_CODE_REVIEW);
        let pr_description = inputs.get_input(INPUT_GENERATE_PR_DESCRIPTION);
        let unit_test = inputs.get_input(INPUT_GENERATE_UNIT_TEST);
        let output_language = inputs.get_input(INPUT_OUTPUT_LANGUAGE);
        let unit_test_source_folder = inputs.get_input(INPUT_UNIT_TEST_SOURCE_FOLDER);
        let unit_test_exclude_files = inputs.get_input(INPUT_UNIT_TEST_EXCLUDE_FILES);

        info!("GitHub Token: {}", token_status(&github_token));
        info!("AWS Region: {}", aws_region);
        info!("Model ID: {}", model_id);
        info!("Excluded files: {}", exclude_files);
        info!("Code review: {}", code_review);
        info!("Output language: {}", output_language);
        info!("Review level: {}", review_level);
        info!("Generate PR description: {}", pr_description);
        info!("Generate unit test suite: {}", unit_test);
        info!("Generate unit test source folder: {}", unit_test_source_folder);
        info!("Generate unit test exclude files: {}", unit_test_exclude_files);

        if github_token.is_empty() {
            return Err(ActionError::configuration("GitHub token is not set"));
        }

        let flags = FeatureFlags {
            generate_code_review: parse_flag(INPUT_GENERATE_CODE_REVIEW, &code_review)?,
            generate_pr_description: parse_flag(INPUT_GENERATE_PR_DESCRIPTION, &pr_description)?,
            generate_unit_test: parse_flag(INPUT_GENERATE_UNIT_TEST, &unit_test)?,
        };

        Ok(Self {
            github_token,
            aws_region: if aws_region.is_empty() {
                DEFAULT_AWS_REGION.to_string()
            } else {
                aws_region
            },
            model_id,
            exclude_patterns: split_patterns(&exclude_files),
            review_level,
            flags,
            output_language,
            unit_test_source_folder,
            unit_test_exclude_patterns: split_patterns(&unit_test_exclude_files),
        })
    }
}

fn token_status(token: &str) -> &'static str {
    if token.is_empty() {
        "Token is not set"
    } else {
        "Token is set"
    }
}

/// Parse a boolean input. Empty means `false`; anything other than
/// `true`/`false` (case-insensitive) is rejected.
pub fn parse_flag(name: &str, value: &str) -> Result<bool, ActionError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else {
        Err(ActionError::configuration(format!(
            "Input '{}' must be 'true' or 'false', got '{}'",
            name, value
        )))
    }
}

/// Split a comma-separated pattern list, trimming each entry.
pub fn split_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

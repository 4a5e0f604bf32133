use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use super::ModelClient;
use crate::config::ModelConfig;

/// Amazon Bedrock Converse client backed by the AWS CLI.
///
/// Credentials and profile resolution are left to the CLI, so whatever the
/// workflow configured (OIDC role, env keys) applies unchanged.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    region: String,
    settings: ModelConfig,
    program: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest<'a> {
    model_id: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<TextBlock<'a>>,
    inference_config: InferenceConfig,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    output: ConverseOutput,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: OutputMessage,
}

#[derive(Debug, Deserialize)]
struct OutputMessage {
    content: Vec<OutputBlock>,
}

#[derive(Debug, Deserialize)]
struct OutputBlock {
    #[serde(default)]
    text: Option<String>,
}

impl BedrockClient {
    pub fn new(region: &str, settings: ModelConfig) -> Self {
        Self {
            region: region.to_string(),
            settings,
            program: "aws".to_string(),
        }
    }

    fn build_request<'a>(
        &self,
        model_id: &'a str,
        system: &'a str,
        prompt: &'a str,
    ) -> ConverseRequest<'a> {
        ConverseRequest {
            model_id,
            messages: vec![Message {
                role: "user",
                content: vec![TextBlock { text: prompt }],
            }],
            system: if system.is_empty() {
                Vec::new()
            } else {
                vec![TextBlock { text: system }]
            },
            inference_config: InferenceConfig {
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            },
        }
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn converse(&self, model_id: &str, system: &str, prompt: &str) -> Result<String> {
        if model_id.is_empty() {
            anyhow::bail!("model-id is not set");
        }

        let request = self.build_request(model_id, system, prompt);
        let body = serde_json::to_vec(&request).context("Failed to serialize converse request")?;

        // Prompts carry whole diffs; pass them through a file instead of argv.
        let mut request_file =
            NamedTempFile::new().context("Failed to create converse request file")?;
        request_file
            .write_all(&body)
            .context("Failed to write converse request file")?;
        request_file
            .flush()
            .context("Failed to flush converse request file")?;

        debug!(
            model_id,
            region = %self.region,
            prompt_len = prompt.len(),
            "bedrock converse: start"
        );

        let output = Command::new(&self.program)
            .arg("bedrock-runtime")
            .arg("converse")
            .arg("--cli-input-json")
            .arg(format!("file://{}", request_file.path().display()))
            .arg("--region")
            .arg(&self.region)
            .arg("--output")
            .arg("json")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow!(
                        "'{}' not found in PATH. The AWS CLI is required to call Bedrock.",
                        self.program
                    )
                } else {
                    anyhow!("Failed to execute {}: {}", self.program, e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("bedrock converse failed: {}", stderr.trim());
        }

        parse_converse_output(&output.stdout)
    }
}

fn parse_converse_output(stdout: &[u8]) -> Result<String> {
    let response: ConverseResponse =
        serde_json::from_slice(stdout).context("Failed to parse converse response")?;

    if response.stop_reason.as_deref() == Some("max_tokens") {
        warn!("Model output was truncated at max_tokens");
    }

    let text = response
        .output
        .message
        .content
        .into_iter()
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        anyhow::bail!("Model returned an empty response");
    }
    Ok(text)
}

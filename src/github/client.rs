use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// HTTP method for `gh api --method`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Patch,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

/// Thin wrapper around the `gh` CLI, authenticated with an explicit token.
///
/// The token is passed to each child process through `GH_TOKEN`; the parent
/// environment is left untouched.
#[derive(Clone)]
pub struct GhClient {
    token: String,
    program: String,
}

impl std::fmt::Debug for GhClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhClient")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl GhClient {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            program: "gh".to_string(),
        }
    }

    /// Execute a gh command and return stdout, optionally feeding `stdin`.
    pub async fn gh_command(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .env("GH_TOKEN", &self.token)
            .env("GH_PROMPT_DISABLED", "1")
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow!(
                    "'{}' not found in PATH. The GitHub CLI is required to talk to the GitHub API.",
                    self.program
                )
            } else {
                anyhow!("Failed to execute {}: {}", self.program, e)
            }
        })?;

        if let Some(input) = stdin {
            let mut pipe = child
                .stdin
                .take()
                .context("gh stdin was not captured")?;
            pipe.write_all(input)
                .await
                .context("Failed to write request body to gh")?;
            // Close stdin so gh sees EOF.
            drop(pipe);
        }

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for gh")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("gh command failed: {}", stderr.trim());
        }

        String::from_utf8(output.stdout).context("gh output contains invalid UTF-8")
    }

    /// `gh api <endpoint>` parsed as JSON
    pub async fn api(&self, endpoint: &str) -> Result<Value> {
        let output = self.gh_command(&["api", endpoint], None).await?;
        serde_json::from_str(&output).context("Failed to parse gh api response as JSON")
    }

    /// `gh api --paginate --slurp`, flattening the pages of a list endpoint.
    pub async fn api_paginate(&self, endpoint: &str) -> Result<Value> {
        let output = self
            .gh_command(&["api", "--paginate", "--slurp", endpoint], None)
            .await?;
        let pages: Value =
            serde_json::from_str(&output).context("Failed to parse paginated gh api response")?;
        Ok(flatten_pages(pages))
    }

    /// `gh api` with a raw media type, returning the body as text.
    pub async fn api_raw(&self, endpoint: &str) -> Result<String> {
        self.gh_command(
            &["api", "-H", "Accept: application/vnd.github.raw+json", endpoint],
            None,
        )
        .await
    }

    /// `gh api --method <m> <endpoint> --input -` with a JSON body.
    pub async fn api_json(&self, method: Method, endpoint: &str, body: &Value) -> Result<Value> {
        let payload = serde_json::to_vec(body).context("Failed to serialize request body")?;
        let output = self
            .gh_command(
                &["api", "--method", method.as_str(), endpoint, "--input", "-"],
                Some(&payload),
            )
            .await?;
        if output.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&output).context("Failed to parse gh api response as JSON")
    }
}

/// `--slurp` wraps every page in an outer array; list pages are merged.
fn flatten_pages(pages: Value) -> Value {
    match pages {
        Value::Array(pages) if pages.iter().all(Value::is_array) => Value::Array(
            pages
                .into_iter()
                .flat_map(|page| match page {
                    Value::Array(items) => items,
                    _ => Vec::new(),
                })
                .collect(),
        ),
        other => other,
    }
}

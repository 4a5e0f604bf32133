mod bedrock;
pub mod prompts;

use anyhow::Result;
use async_trait::async_trait;

pub use bedrock::BedrockClient;

/// A chat-style model backend.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one user turn (with an optional system prompt) and return the
    /// assistant's text.
    async fn converse(&self, model_id: &str, system: &str, prompt: &str) -> Result<String>;
}

/// Extract the outermost JSON array from a model response.
///
/// Models often wrap JSON in prose or code fences; everything between the
/// first `[` and the last `]` is returned.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Strip a single surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```rust) up to the first newline.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_array() {
        assert_eq!(extract_json_array("[1, 2]"), Some("[1, 2]"));
        assert_eq!(
            extract_json_array("Here you go:\n```json\n[{\"line\": 3}]\n```"),
            Some("[{\"line\": 3}]")
        );
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("plain text"), "plain text");
        assert_eq!(strip_code_fence("```rust\nfn a() {}\n```"), "fn a() {}");
        assert_eq!(strip_code_fence("```\nx\n```\n"), "x");
        assert_eq!(strip_code_fence("```python\nunterminated"), "unterminated");
    }
}

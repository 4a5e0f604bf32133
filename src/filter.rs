//! Exclude lists for review and test generation.

use glob::Pattern;
use tracing::warn;

/// A set of glob patterns matched against repository-relative paths.
///
/// `*` also crosses `/`, so `*.md` excludes `docs/guide.md`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<Pattern>,
}

impl ExcludeFilter {
    /// Compile `patterns`. Entries that are not valid globs are logged and ignored.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "Ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

//! Patch helpers for placing review comments.
//!
//! GitHub returns one patch per changed file. The model is shown that patch
//! with new-file line numbers, answers with line numbers, and those are mapped
//! back to the `position` the review API expects.

/// Represents the type of a line in a diff patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Line added in the new version (starts with +)
    Added,
    /// Line removed from the old version (starts with -)
    Removed,
    /// Context line, unchanged (starts with space)
    Context,
    /// Hunk header (@@ ... @@)
    Header,
    /// Metadata lines (diff --, +++, index, etc.)
    Meta,
}

/// Parse a hunk header to extract the starting line number for new file
/// Format: @@ -old_start,old_count +new_start,new_count @@
fn parse_hunk_header(line: &str) -> Option<u32> {
    let plus_pos = line.find('+')?;
    let after_plus = &line[plus_pos + 1..];

    let end_pos = after_plus.find([',', ' ']).unwrap_or(after_plus.len());
    after_plus[..end_pos].parse().ok()
}

/// Classify a line and extract its content without the prefix.
///
/// File headers (`diff `, `index `, `---`, `+++`) only exist before the first
/// hunk. Inside a hunk the first character alone decides, so an added `++i;`
/// (`+++i;`) or a removed `-- note` (`--- note`) stays a code line.
pub fn classify_line(line: &str, in_hunk: bool) -> (LineType, &str) {
    if line.starts_with("@@") {
        return (LineType::Header, line);
    }
    if !in_hunk {
        return (LineType::Meta, line);
    }
    if line.starts_with('\\') {
        (LineType::Meta, line)
    } else if let Some(content) = line.strip_prefix('+') {
        (LineType::Added, content)
    } else if let Some(content) = line.strip_prefix('-') {
        (LineType::Removed, content)
    } else if let Some(content) = line.strip_prefix(' ') {
        (LineType::Context, content)
    } else {
        (LineType::Context, line)
    }
}

/// Convert a new-file line number to a patch position.
///
/// Meta lines are skipped, the first `@@` is not counted (position 1 is the
/// line below it) and subsequent `@@` headers are counted. Only Added and
/// Context lines can be targeted.
pub fn line_number_to_position(patch: &str, target_line: u32) -> Option<u32> {
    let mut new_line_number: Option<u32> = None;
    let mut position_counter: Option<u32> = None;

    for line in patch.lines() {
        let (line_type, _) = classify_line(line, position_counter.is_some());

        match line_type {
            LineType::Meta => continue,
            LineType::Header => {
                new_line_number = parse_hunk_header(line);
                position_counter = Some(position_counter.map_or(0, |p| p + 1));
            }
            LineType::Added | LineType::Context => {
                position_counter = position_counter.map(|p| p + 1);
                if new_line_number == Some(target_line) {
                    return position_counter;
                }
                new_line_number = new_line_number.map(|n| n + 1);
            }
            LineType::Removed => {
                position_counter = position_counter.map(|p| p + 1);
            }
        }
    }
    None
}

/// Render a patch with the new-file line number in front of every line that
/// can receive a comment.
///
/// ```text
/// @@ -1,2 +1,3 @@
///    1 | fn main() {
///    2 |+    run();
///      |-    old();
/// ```
pub fn annotate_patch(patch: &str) -> String {
    let mut out = Vec::new();
    let mut new_line_number: Option<u32> = None;
    let mut in_hunk = false;

    for line in patch.lines() {
        let (line_type, _) = classify_line(line, in_hunk);
        match line_type {
            LineType::Header => {
                in_hunk = true;
                new_line_number = parse_hunk_header(line);
                out.push(line.to_string());
            }
            LineType::Meta => out.push(line.to_string()),
            LineType::Added | LineType::Context => match new_line_number {
                Some(n) => {
                    out.push(format!("{:>5} |{}", n, line));
                    new_line_number = Some(n + 1);
                }
                None => out.push(format!("      |{}", line)),
            },
            LineType::Removed => out.push(format!("      |{}", line)),
        }
    }

    out.join("\n")
}

//! Markdown-fence normalization for backend responses.
//!
//! Backends are told not to fence their answers; some do anyway. This
//! strips leading fence lines (with or without a language tag) and the
//! trailing fence, to a fixed point, so running the transform twice is
//! always a no-op.

fn is_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// Remove markdown code-block delimiter lines from `text`.
///
/// Idempotent for any input: `strip_fences(&strip_fences(x)) ==
/// strip_fences(x)`.
pub fn strip_fences(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();

    while lines.first().is_some_and(|line| is_fence(line)) {
        lines.remove(0);
    }

    // Drop the trailing fence along with any blank lines after it
    while let Some(last_non_empty) = lines.iter().rposition(|line| !line.trim().is_empty()) {
        if is_fence(lines[last_non_empty]) {
            lines.truncate(last_non_empty);
        } else {
            break;
        }
    }

    lines.join("\n")
}

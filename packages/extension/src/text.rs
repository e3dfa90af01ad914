//! Text normalization for multi-line spec content.

/// Normalize a block of text taken from between tags.
///
/// - Strips trailing whitespace from every line
/// - Drops leading and trailing blank lines
/// - Removes the indentation common to all non-blank lines
///
/// # Examples
/// ```
/// use codegen_extension::text::linetrim;
///
/// let text = "\n    first\n      second\n    ";
/// assert_eq!(linetrim(text), "first\n  second");
/// ```
#[must_use]
pub fn linetrim(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    let Some(first) = lines.iter().position(|l| !l.is_empty()) else {
        return String::new();
    };
    let last = lines.iter().rposition(|l| !l.is_empty()).unwrap_or(first);
    let body = &lines[first..=last];

    let indent = body
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

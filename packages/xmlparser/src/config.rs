//! Configuration constants and parser settings.

/// Namespace URI that marks document inclusion directives.
pub const XINCLUDE_NAMESPACE: &str = "http://www.w3.org/2001/XInclude";

/// Local name of the inclusion directive element.
pub const XINCLUDE_ELEMENT: &str = "include";

/// Value of the `parse` attribute that selects literal text inclusion.
pub const XINCLUDE_PARSE_TEXT: &str = "text";

/// Processing instruction target treated like a CDATA section.
pub const DATA_INSTRUCTION: &str = "data";

/// Separator used when joining tag-path elements into registry keys.
pub const PATH_SEPARATOR: char = '/';

/// Default size of the chunks read from an input stream.
///
/// Any value works, chunk boundaries never have to line up with markup
/// boundaries.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default limit on nested inclusion depth.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Settings for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Capacity of the buffered reader that feeds the tokenizer.
    pub chunk_size: usize,

    /// Maximum number of nested inclusions below the root document.
    pub max_include_depth: usize,
}

impl ParserConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Set the read chunk size. Zero is bumped to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the maximum inclusion depth.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a tag-path suffix into its registry key form.
///
/// Leading, trailing and repeated separators are dropped and surrounding
/// whitespace on each element is trimmed.
///
/// # Examples
/// ```
/// use codegen_xmlparser::config::normalize_path;
///
/// assert_eq!(normalize_path("/release/version/"), "release/version");
/// assert_eq!(normalize_path("maintainer"), "maintainer");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.max_include_depth, DEFAULT_MAX_INCLUDE_DEPTH);
    }

    #[test]
    fn test_zero_chunk_size_is_bumped() {
        let config = ParserConfig::new().with_chunk_size(0);
        assert_eq!(config.chunk_size, 1);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a//b"), "a/b");
        assert_eq!(normalize_path(" a / b "), "a/b");
        assert_eq!(normalize_path("/"), "");
    }
}

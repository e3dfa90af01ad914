//! Error types for the parser.
//!
//! Uses the dual-error pattern: `ParseError` is what a parse returns,
//! carrying an `ErrorKind` plus the chain of positions it was detected
//! at, while `HandlerError` is the narrow type tag handlers return.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A position inside a source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Identifier of the source (usually a file path).
    pub source: Arc<str>,

    /// 1-based line number.
    pub line: usize,

    /// 1-based column number, counted in bytes.
    pub column: usize,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(source: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on line {}:{}", self.source, self.line, self.column)
    }
}

/// Failure reported by a tag handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type returned by tag handlers.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Classification of parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// No start or end handler matches any suffix of the tag path.
    #[error("no matching tag handler for {path}")]
    UnknownTag { path: String },

    /// A handler signalled a domain-level failure.
    #[error("{0}")]
    Handler(#[from] HandlerError),

    /// An inclusion target could not be opened.
    #[error("can't open included resource '{href}': {reason}")]
    Resource { href: String, reason: String },

    /// Malformed markup reported by the tokenizer.
    #[error("malformed markup: {message}")]
    Structural { message: String },

    /// A processing instruction without a known target.
    #[error("unknown processing instruction '<?{target}'")]
    UnknownInstruction { target: String },
}

/// Error returned from a parse.
///
/// `trace` holds the position the error was detected at first, followed
/// by the location of every inclusion directive it propagated through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{}", render_trace(.trace))]
pub struct ParseError {
    pub kind: ErrorKind,
    pub trace: Vec<Location>,
}

impl ParseError {
    /// Create an error detected at `location`.
    #[must_use]
    pub fn at(kind: ErrorKind, location: Location) -> Self {
        Self {
            kind,
            trace: vec![location],
        }
    }

    /// Create an error that has no position (e.g. the root document
    /// could not be opened).
    #[must_use]
    pub fn detached(kind: ErrorKind) -> Self {
        Self {
            kind,
            trace: Vec::new(),
        }
    }

    /// Record that the error surfaced through an inclusion directive.
    pub fn included_from(&mut self, location: Location) {
        self.trace.push(location);
    }

    /// Position where the error was detected.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.trace.first()
    }
}

fn render_trace(trace: &[Location]) -> String {
    let mut out = String::new();
    for (i, location) in trace.iter().enumerate() {
        if i == 0 {
            out.push_str(&format!(" in {location}"));
        } else {
            out.push_str(&format!(", included from {location}"));
        }
    }
    out
}

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

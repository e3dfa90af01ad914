//! Error types for the extension model and tool.
//!
//! `ModelError` is what the model setters return; handlers hand it to the
//! parser as a `HandlerError`. `ExtensionError` is the library-facing
//! error of the whole tool.

use codegen_xmlparser::{HandlerError, ParseError};
use thiserror::Error;

/// Rejection of a value by one of the model setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Extension name is not a C identifier.
    #[error("'{0}' is not a valid extension name")]
    InvalidName(String),

    /// Name prefix is not a C identifier.
    #[error("'{0}' is not a valid name prefix")]
    InvalidPrefix(String),

    /// Version string format not recognised.
    #[error("'{0}' is not a valid version string")]
    InvalidVersion(String),

    /// Date not in YYYY-MM-DD format or not a real date.
    #[error("'{0}' is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Implementation language not supported.
    #[error("'{0}' is not a supported implementation language")]
    UnsupportedLanguage(String),

    /// Platform name not recognised.
    #[error("'{0}' is not a valid platform, expected 'all', 'unix' or 'win32'")]
    InvalidPlatform(String),

    /// License short name not recognised.
    #[error("'{0}' is not a known license")]
    UnknownLicense(String),

    /// The GPL can't be used for PHP extensions.
    #[error("The GPL is no valid choice for PHP extensions due to license incompatibilities")]
    ForbiddenLicense,

    /// Maintainer role not recognised.
    #[error("'{0}' is not a valid maintainer role")]
    InvalidRole(String),

    /// Maintainer email address malformed.
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    /// Maintainer without a user name.
    #[error("maintainer has no <user> name")]
    MissingUser,

    /// Code block role not recognised.
    #[error("'{0}' is not a valid code role, expected 'code' or 'header'")]
    InvalidCodeRole(String),

    /// Code block position not recognised.
    #[error("'{0}' is not a valid code position, expected 'top' or 'bottom'")]
    InvalidCodePosition(String),

    /// Required attribute missing from a tag.
    #[error("needed attribute '{attribute}' for <{tag}> not given")]
    MissingAttribute { tag: String, attribute: String },

    /// Attribute not allowed on a tag.
    #[error("'{attribute}' is not a valid attribute for <{tag}>")]
    UnexpectedAttribute { tag: String, attribute: String },

    /// A tag that older spec formats used.
    #[error("{0}")]
    Unsupported(String),

    /// A nested tag without the helper its parent should have pushed.
    #[error("<{0}> is not allowed here")]
    MissingHelper(String),

    /// An external file referenced by the spec could not be read.
    #[error("can't read '{path}': {reason}")]
    Unreadable { path: String, reason: String },
}

impl From<ModelError> for HandlerError {
    fn from(err: ModelError) -> Self {
        HandlerError::new(err.to_string())
    }
}

/// Main error type for the extension tool.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Parsing the spec failed.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

/// Result type alias for extension operations.
pub type Result<T> = std::result::Result<T, ExtensionError>;

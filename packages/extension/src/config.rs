//! Configuration constants and validation functions for extension specs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ModelError;

/// Name used until the spec provides one.
pub const DEFAULT_EXTENSION_NAME: &str = "unknown";

/// Summary used until the spec provides one.
pub const DEFAULT_SUMMARY: &str = "The unknown extension";

/// Version of a release block that has no `<version>`.
pub const DEFAULT_RELEASE_VERSION: &str = "0.0.1";

/// State of a release block that has no `<state>`.
pub const DEFAULT_RELEASE_STATE: &str = "unknown";

/// Spec format version assumed when `<extension>` has no `version`.
pub const DEFAULT_SPEC_VERSION: &str = "1.0.0";

/// Attributes accepted on `<extension>`.
pub const EXTENSION_ATTRIBUTES: &[&str] = &["name", "prefix", "version"];

/// C identifier pattern used for extension names and prefixes.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Dotted version pattern with an optional alpha/beta/RC suffix.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)*(-?(dev|alpha|beta|a|b|RC|rc|pl)\d*)?$").expect("valid regex")
});

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Check whether `name` is a valid C identifier.
///
/// # Examples
/// ```
/// use codegen_extension::config::is_name;
///
/// assert!(is_name("my_ext"));
/// assert!(!is_name("1bad"));
/// ```
#[must_use]
pub fn is_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Validate a version string such as `1.2.0` or `0.9.1beta2`.
///
/// # Errors
/// Returns `ModelError::InvalidVersion` if the format is not recognised.
pub fn validate_version(version: &str) -> Result<(), ModelError> {
    if VERSION_PATTERN.is_match(version) {
        Ok(())
    } else {
        Err(ModelError::InvalidVersion(version.to_string()))
    }
}

/// Validate a date in YYYY-MM-DD format.
///
/// # Examples
/// ```
/// use codegen_extension::config::validate_date;
///
/// assert!(validate_date("2025-01-01").is_ok());
/// assert!(validate_date("2025-13-01").is_err());
/// assert!(validate_date("01.01.2025").is_err());
/// ```
///
/// # Errors
/// Returns `ModelError::InvalidDate` for anything that is not a real date.
pub fn validate_date(date_str: &str) -> Result<(), ModelError> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(ModelError::InvalidDate(date_str.to_string()));
    }

    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ModelError::InvalidDate(date_str.to_string()))
}

/// Today's date in YYYY-MM-DD format.
#[must_use]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

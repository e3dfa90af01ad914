//! Core data types populated from an extension specification.
//!
//! Setters validate their input and return a `ModelError` on rejection;
//! the spec handlers pass that straight back to the parser.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::{
    is_name, today, validate_date, validate_version, DEFAULT_EXTENSION_NAME,
    DEFAULT_RELEASE_STATE, DEFAULT_RELEASE_VERSION, DEFAULT_SPEC_VERSION, DEFAULT_SUMMARY,
};
use crate::error::ModelError;

/// Implementation language of the generated extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    C,
    Cpp,
}

impl Language {
    /// Parse a language name, accepting the common C++ spellings.
    ///
    /// # Errors
    /// Returns `ModelError::UnsupportedLanguage` for anything else.
    pub fn parse(lang: &str) -> Result<Self, ModelError> {
        match lang.to_lowercase().as_str() {
            "c" => Ok(Self::C),
            "cpp" | "cxx" | "c++" => Ok(Self::Cpp),
            _ => Err(ModelError::UnsupportedLanguage(lang.to_string())),
        }
    }

    /// Get the string value for output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
        }
    }
}

/// Set of platforms something applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub unix: bool,
    pub windows: bool,
}

impl Platform {
    /// Applies everywhere.
    pub const ALL: Self = Self {
        unix: true,
        windows: true,
    };

    /// Parse a whitespace separated list of `all`, `unix` and `win32`.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidPlatform` for unknown names or an
    /// empty list.
    pub fn parse(spec: &str) -> Result<Self, ModelError> {
        let mut platform = Self {
            unix: false,
            windows: false,
        };
        for word in spec.split_whitespace() {
            match word.to_lowercase().as_str() {
                "all" => platform = Self::ALL,
                "unix" => platform.unix = true,
                "win32" | "windows" => platform.windows = true,
                _ => return Err(ModelError::InvalidPlatform(spec.to_string())),
            }
        }
        if !platform.unix && !platform.windows {
            return Err(ModelError::InvalidPlatform(spec.to_string()));
        }
        Ok(platform)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::ALL
    }
}

/// License of the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum License {
    Php,
    Bsd,
    Lgpl,
    Mit,
    Gpl,
}

impl License {
    /// Look up a license by short name.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownLicense` if the name is not known.
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        match name.to_uppercase().as_str() {
            "PHP" => Ok(Self::Php),
            "BSD" => Ok(Self::Bsd),
            "LGPL" => Ok(Self::Lgpl),
            "MIT" => Ok(Self::Mit),
            "GPL" => Ok(Self::Gpl),
            _ => Err(ModelError::UnknownLicense(name.to_string())),
        }
    }

    /// Short name of the license.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Php => "PHP",
            Self::Bsd => "BSD",
            Self::Lgpl => "LGPL",
            Self::Mit => "MIT",
            Self::Gpl => "GPL",
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A person working on the extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Maintainer {
    pub user: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Maintainer {
    /// Create an empty maintainer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&mut self, user: &str) -> Result<(), ModelError> {
        self.user = user.to_string();
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ModelError> {
        self.name = name.to_string();
        Ok(())
    }

    /// Set the email address; it must at least look like `local@domain`.
    pub fn set_email(&mut self, email: &str) -> Result<(), ModelError> {
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                self.email = email.to_string();
                Ok(())
            }
            _ => Err(ModelError::InvalidEmail(email.to_string())),
        }
    }

    /// Set the role: `lead`, `developer`, `contributor` or `helper`.
    pub fn set_role(&mut self, role: &str) -> Result<(), ModelError> {
        match role {
            "lead" | "developer" | "contributor" | "helper" => {
                self.role = role.to_string();
                Ok(())
            }
            _ => Err(ModelError::InvalidRole(role.to_string())),
        }
    }
}

/// Release information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub version: String,
    pub date: String,
    pub state: String,
    pub notes: String,
}

impl Release {
    /// Create a release dated today.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: DEFAULT_RELEASE_VERSION.to_string(),
            date: today(),
            state: DEFAULT_RELEASE_STATE.to_string(),
            notes: String::new(),
        }
    }

    pub fn set_version(&mut self, version: &str) -> Result<(), ModelError> {
        validate_version(version)?;
        self.version = version.to_string();
        Ok(())
    }

    pub fn set_date(&mut self, date: &str) -> Result<(), ModelError> {
        validate_date(date)?;
        self.date = date.to_string();
        Ok(())
    }

    pub fn set_state(&mut self, state: &str) -> Result<(), ModelError> {
        self.state = state.to_string();
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<(), ModelError> {
        self.notes = notes.to_string();
        Ok(())
    }
}

impl Default for Release {
    fn default() -> Self {
        Self::new()
    }
}

/// Which generated file a code block goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeRole {
    Code,
    Header,
}

impl CodeRole {
    /// Parse a role attribute value.
    pub fn parse(role: &str) -> Result<Self, ModelError> {
        match role {
            "code" => Ok(Self::Code),
            "header" => Ok(Self::Header),
            _ => Err(ModelError::InvalidCodeRole(role.to_string())),
        }
    }
}

/// Where in the generated file a code block goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodePosition {
    Top,
    Bottom,
}

impl CodePosition {
    /// Parse a position attribute value.
    pub fn parse(position: &str) -> Result<Self, ModelError> {
        match position {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ModelError::InvalidCodePosition(position.to_string())),
        }
    }
}

/// Literal code to paste into the generated sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub role: CodeRole,
    pub position: CodePosition,
    pub text: String,
}

/// External library the extension links against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    pub name: String,
    pub platform: Platform,
}

/// Header file the extension needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// An extension described by a spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    pub version: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Maintainers keyed by user name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub maintainers: BTreeMap<String, Maintainer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<CodeBlock>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub libraries: BTreeMap<String, Library>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
}

impl Extension {
    /// Create an extension with default name and summary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: DEFAULT_EXTENSION_NAME.to_string(),
            prefix: String::new(),
            version: DEFAULT_SPEC_VERSION.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
            description: None,
            license: None,
            release: None,
            changelog: None,
            language: Language::default(),
            platform: None,
            maintainers: BTreeMap::new(),
            code: Vec::new(),
            source_files: Vec::new(),
            libraries: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Set the extension name, which must be a C identifier.
    pub fn set_name(&mut self, name: &str) -> Result<(), ModelError> {
        if !is_name(name) {
            return Err(ModelError::InvalidName(name.to_string()));
        }
        self.name = name.to_string();
        Ok(())
    }

    /// Set the prefix used for generated C names.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<(), ModelError> {
        if !is_name(prefix) {
            return Err(ModelError::InvalidPrefix(prefix.to_string()));
        }
        self.prefix = prefix.to_string();
        Ok(())
    }

    /// Set the spec format version the file was written for.
    pub fn set_version(&mut self, version: &str) -> Result<(), ModelError> {
        validate_version(version)?;
        self.version = version.to_string();
        Ok(())
    }

    pub fn set_summary(&mut self, text: &str) -> Result<(), ModelError> {
        self.summary = text.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, text: &str) -> Result<(), ModelError> {
        self.description = Some(text.to_string());
        Ok(())
    }

    pub fn set_language(&mut self, lang: &str) -> Result<(), ModelError> {
        self.language = Language::parse(lang)?;
        Ok(())
    }

    pub fn set_platform(&mut self, platform: &str) -> Result<(), ModelError> {
        self.platform = Some(Platform::parse(platform)?);
        Ok(())
    }

    /// Add a maintainer, replacing any earlier entry for the same user.
    pub fn add_maintainer(&mut self, maintainer: Maintainer) -> Result<(), ModelError> {
        if maintainer.user.is_empty() {
            return Err(ModelError::MissingUser);
        }
        self.maintainers.insert(maintainer.user.clone(), maintainer);
        Ok(())
    }

    pub fn set_release(&mut self, release: Release) -> Result<(), ModelError> {
        self.release = Some(release);
        Ok(())
    }

    /// Set the license; the GPL is refused.
    pub fn set_license(&mut self, license: License) -> Result<(), ModelError> {
        if license == License::Gpl {
            return Err(ModelError::ForbiddenLicense);
        }
        self.license = Some(license);
        Ok(())
    }

    pub fn set_changelog(&mut self, text: &str) -> Result<(), ModelError> {
        self.changelog = Some(text.to_string());
        Ok(())
    }

    pub fn add_code(
        &mut self,
        role: CodeRole,
        position: CodePosition,
        text: &str,
    ) -> Result<(), ModelError> {
        self.code.push(CodeBlock {
            role,
            position,
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn add_source_file(&mut self, name: &str) -> Result<(), ModelError> {
        self.source_files.push(name.to_string());
        Ok(())
    }

    pub fn add_library(&mut self, library: Library) -> Result<(), ModelError> {
        self.libraries.insert(library.name.clone(), library);
        Ok(())
    }

    pub fn add_header(&mut self, header: Header) -> Result<(), ModelError> {
        self.headers.insert(header.name.clone(), header);
        Ok(())
    }
}

impl Default for Extension {
    fn default() -> Self {
        Self::new()
    }
}

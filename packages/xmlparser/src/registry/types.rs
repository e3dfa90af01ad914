//! Types shared by the registry and the dispatch loop.

use std::fmt;

use crate::config::PATH_SEPARATOR;

/// Which side of an element a handler is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Invoked when the tag opens, with its attributes.
    Start,
    /// Invoked when the tag closes, with attributes and collected text.
    End,
}

impl Phase {
    /// Get the string value used in log output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Ordered tag names from the document root to the current element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPath {
    tags: Vec<String>,
}

impl TagPath {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element.
    pub fn push(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// Leave the innermost element.
    pub fn pop(&mut self) -> Option<String> {
        self.tags.pop()
    }

    /// Number of open elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True when no element is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Name of the innermost element.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.tags.last().map(String::as_str)
    }

    /// The tag names, root first.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// Registry keys for every suffix of the path, longest first.
    pub fn suffixes(&self) -> impl Iterator<Item = String> + '_ {
        let sep = PATH_SEPARATOR.to_string();
        (0..self.tags.len()).map(move |start| self.tags[start..].join(&sep))
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tags.join(":"))
    }
}

impl<S: Into<String>> FromIterator<S> for TagPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single attribute as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name (`prefix:local` or `local`).
    pub name: String,
    /// Local part of the name.
    pub local: String,
    /// Unescaped value.
    pub value: String,
}

/// Attributes of one element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, local: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Attribute {
            name: name.into(),
            local: local.into(),
            value: value.into(),
        });
    }

    /// Look up a value by qualified name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Look up a value by local name, ignoring any prefix.
    #[must_use]
    pub fn get_local(&self, local: &str) -> Option<&str> {
        self.get(local).or_else(|| {
            self.entries
                .iter()
                .find(|a| a.local == local)
                .map(|a| a.value.as_str())
        })
    }

    /// True if an attribute with this qualified name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate attributes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    /// Names not contained in `allowed`, in document order.
    #[must_use]
    pub fn unexpected<'a>(&'a self, allowed: &[&str]) -> Vec<&'a str> {
        self.entries
            .iter()
            .map(|a| a.name.as_str())
            .filter(|name| !allowed.contains(name))
            .collect()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            let local = name.rsplit(':').next().unwrap_or(name);
            attrs.push(name, local, value);
        }
        attrs
    }
}

/// Everything an end handler receives about the element that closed.
#[derive(Debug, Clone, Copy)]
pub struct TagData<'a> {
    /// Attributes captured when the tag opened.
    pub attributes: &'a Attributes,
    /// Character data collected since the last structural event, or the
    /// serialized subtree when verbatim capture was active.
    pub text: &'a str,
    /// Line the text started on, if any text was seen.
    pub line: Option<usize>,
    /// Identifier of the document the close tag was read from.
    pub source: &'a str,
}

//! Handler registry mapping tag-path suffixes to handlers.

use std::collections::HashMap;

use super::handler::{EndFn, HandlerContext, StartFn};
use super::types::{Attributes, Phase, TagData, TagPath};
use crate::config::normalize_path;
use crate::error::HandlerResult;

/// Registry of start and end handlers keyed by tag-path suffix.
///
/// A suffix such as `"release/version"` matches any `<version>` whose
/// parent is `<release>`; a bare `"version"` matches every `<version>`.
/// When several registered suffixes match, the longest one wins. The
/// table is built once and is read-only while parsing, so one registry
/// can serve any number of parses.
pub struct HandlerRegistry<T, H = ()> {
    start: HashMap<String, Box<StartFn<T, H>>>,
    end: HashMap<String, Box<EndFn<T, H>>>,
}

impl<T, H> HandlerRegistry<T, H> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: HashMap::new(),
            end: HashMap::new(),
        }
    }

    /// Register a start handler for a tag-path suffix.
    pub fn on_start<F>(&mut self, suffix: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut HandlerContext<'_, T, H>, &Attributes) -> HandlerResult + Send + Sync + 'static,
    {
        self.start.insert(normalize_path(suffix), Box::new(handler));
        self
    }

    /// Register an end handler for a tag-path suffix.
    pub fn on_end<F>(&mut self, suffix: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut HandlerContext<'_, T, H>, &TagData<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.end.insert(normalize_path(suffix), Box::new(handler));
        self
    }

    /// Find the most specific start handler for `path`.
    #[must_use]
    pub fn resolve_start(&self, path: &TagPath) -> Option<&StartFn<T, H>> {
        resolve(&self.start, path).map(|(_, h)| h.as_ref())
    }

    /// Find the most specific end handler for `path`.
    #[must_use]
    pub fn resolve_end(&self, path: &TagPath) -> Option<&EndFn<T, H>> {
        resolve(&self.end, path).map(|(_, h)| h.as_ref())
    }

    /// Registry key of the handler `path` resolves to in `phase`.
    #[must_use]
    pub fn matched_suffix(&self, phase: Phase, path: &TagPath) -> Option<&str> {
        match phase {
            Phase::Start => resolve(&self.start, path).map(|(key, _)| key),
            Phase::End => resolve(&self.end, path).map(|(key, _)| key),
        }
    }

    /// True if any start or end handler matches `path`.
    #[must_use]
    pub fn has_handler(&self, path: &TagPath) -> bool {
        self.resolve_start(path).is_some() || self.resolve_end(path).is_some()
    }

    /// Registered suffixes for a phase, sorted.
    #[must_use]
    pub fn registered(&self, phase: Phase) -> Vec<&str> {
        let mut keys: Vec<&str> = match phase {
            Phase::Start => self.start.keys().map(String::as_str).collect(),
            Phase::End => self.end.keys().map(String::as_str).collect(),
        };
        keys.sort_unstable();
        keys
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.start.len() + self.end.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }
}

impl<T, H> Default for HandlerRegistry<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Try the full path, then drop root-most elements until a registered
/// suffix is found.
fn resolve<'r, V>(table: &'r HashMap<String, V>, path: &TagPath) -> Option<(&'r str, &'r V)> {
    path.suffixes()
        .find_map(|key| table.get_key_value(&key))
        .map(|(key, value)| (key.as_str(), value))
}

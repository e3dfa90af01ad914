//! Document inclusion: resolving and opening included resources and the
//! stack of tokenizer frames that inclusion nests.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::tokenizer::Tokenizer;

/// Locates and opens documents by identifier.
pub trait SourceResolver {
    /// Turn an `href` found in the document identified by `base` (or the
    /// root reference when `base` is `None`) into a source identifier.
    fn resolve(&self, href: &str, base: Option<&str>) -> String;

    /// Open the source with the given identifier.
    fn open(&self, id: &str) -> io::Result<Box<dyn Read>>;
}

/// Resolves hrefs as file paths relative to the including document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

impl SourceResolver for FileResolver {
    fn resolve(&self, href: &str, base: Option<&str>) -> String {
        let href_path = Path::new(href);
        let joined = match base.and_then(|b| Path::new(b).parent()) {
            Some(dir) if !href_path.is_absolute() && !dir.as_os_str().is_empty() => {
                dir.join(href_path)
            }
            _ => href_path.to_path_buf(),
        };
        // Canonical ids make `a/../a/x.xml` and `x.xml` the same document
        // for cycle detection; missing files keep the lexical path.
        fs::canonicalize(&joined)
            .unwrap_or(joined)
            .display()
            .to_string()
    }

    fn open(&self, id: &str) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(id)?))
    }
}

/// Serves named documents from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    documents: HashMap<String, String>,
}

impl MemoryResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under `id`.
    #[must_use]
    pub fn with_document(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(id, content);
        self
    }

    /// Add or replace a document.
    pub fn insert(&mut self, id: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(id.into(), content.into());
    }
}

impl SourceResolver for MemoryResolver {
    fn resolve(&self, href: &str, _base: Option<&str>) -> String {
        href.to_string()
    }

    fn open(&self, id: &str) -> io::Result<Box<dyn Read>> {
        self.documents
            .get(id)
            .map(|content| Box::new(io::Cursor::new(content.clone().into_bytes())) as Box<dyn Read>)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no document named '{id}'")))
    }
}

/// One entry of the inclusion stack: a tokenizer with its input stream.
///
/// Dropping the frame releases the stream.
pub struct ParserFrame {
    pub(crate) tokenizer: Tokenizer,
    /// TagPath length when this frame started; tags opened in this
    /// frame must all be closed before its input ends.
    pub(crate) entry_depth: usize,
    /// Whether this frame produced at least one element.
    pub(crate) saw_element: bool,
    /// Whether the frame's top-level element has closed; anything but
    /// whitespace after it is malformed.
    pub(crate) root_closed: bool,
}

impl ParserFrame {
    pub(crate) fn new(tokenizer: Tokenizer, entry_depth: usize) -> Self {
        Self {
            tokenizer,
            entry_depth,
            saw_element: false,
            root_closed: false,
        }
    }

    /// Identifier of the frame's source.
    #[must_use]
    pub fn source(&self) -> &Arc<str> {
        self.tokenizer.source()
    }
}

/// LIFO stack of active parser frames; the top frame is the document
/// currently being read.
#[derive(Default)]
pub struct InclusionStack {
    frames: Vec<ParserFrame>,
}

impl InclusionStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `frame` the active frame.
    pub fn push(&mut self, frame: ParserFrame) {
        tracing::debug!(source = %frame.source(), depth = self.frames.len(), "entering document");
        self.frames.push(frame);
    }

    /// Remove the active frame, restoring the one below it.
    pub fn pop(&mut self) -> Option<ParserFrame> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            tracing::debug!(source = %frame.source(), "leaving document");
        }
        frame
    }

    /// The active frame.
    #[must_use]
    pub fn current(&self) -> Option<&ParserFrame> {
        self.frames.last()
    }

    /// The active frame, mutably.
    pub fn current_mut(&mut self) -> Option<&mut ParserFrame> {
        self.frames.last_mut()
    }

    /// Identifier of the active document.
    #[must_use]
    pub fn current_source(&self) -> Option<&str> {
        self.current().map(|f| &**f.source())
    }

    /// True if a document with this identifier is already being read.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.frames.iter().any(|f| &**f.source() == id)
    }

    /// Number of active frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when no document is being read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

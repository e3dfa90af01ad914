//! Low-level event source: a streaming `quick-xml` reader turned into
//! owned tokens with source positions.

use std::cell::RefCell;
use std::io::{BufReader, Read};
use std::rc::Rc;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{ErrorKind, Location, ParseError};
use crate::position::{LineIndex, LineTracker};
use crate::registry::Attributes;

/// An opening or closing tag with its namespace split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    /// Namespace URI the prefix resolved to, if any.
    pub namespace: Option<String>,
    /// Qualified name as written.
    pub name: String,
    /// Local part of the name.
    pub local: String,
    /// Attributes in document order (empty for closing tags).
    pub attributes: Attributes,
    /// Position of the tag's `<`.
    pub location: Location,
}

impl TagEvent {
    /// Create an un-namespaced tag event, mostly useful in tests.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        let name = name.into();
        Self {
            namespace: None,
            local: name.clone(),
            name,
            attributes,
            location: Location::new("<memory>", 1, 1),
        }
    }

    /// True if the tag lives in the given namespace.
    #[must_use]
    pub fn in_namespace(&self, uri: &str) -> bool {
        self.namespace.as_deref() == Some(uri)
    }
}

/// One owned event produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(TagEvent),
    End(TagEvent),
    /// Character data (text or CDATA), entity references resolved.
    Text { text: String, line: usize },
    /// A processing instruction other than the XML declaration.
    Instruction { target: String, content: String, location: Location },
    /// Comments, doctype and declarations.
    Ignored,
    Eof,
}

/// Streaming tokenizer bound to one input.
pub struct Tokenizer {
    reader: NsReader<BufReader<LineTracker<Box<dyn Read>>>>,
    lines: Rc<RefCell<LineIndex>>,
    source: Arc<str>,
}

impl Tokenizer {
    /// Create a tokenizer reading `input` in chunks of `chunk_size` bytes.
    pub fn new(source: impl Into<Arc<str>>, input: Box<dyn Read>, chunk_size: usize) -> Self {
        let tracker = LineTracker::new(input);
        let lines = tracker.index();
        let mut reader = NsReader::from_reader(BufReader::with_capacity(chunk_size, tracker));
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text(false);

        Self {
            reader,
            lines,
            source: source.into(),
        }
    }

    /// Identifier of the input.
    #[must_use]
    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// Location of a byte offset in the input.
    #[must_use]
    pub fn location(&self, offset: u64) -> Location {
        let (line, column) = self.lines.borrow().position(offset);
        Location {
            source: Arc::clone(&self.source),
            line,
            column,
        }
    }

    /// Location of the most recently read position.
    #[must_use]
    pub fn current_location(&self) -> Location {
        self.location(self.reader.buffer_position() as u64)
    }

    /// Read the next token. `buf` is scratch space owned by the caller.
    pub fn next_token(&mut self, buf: &mut Vec<u8>) -> Result<Token, ParseError> {
        buf.clear();
        let offset = self.reader.buffer_position() as u64;

        let read = self
            .reader
            .read_resolved_event_into(buf)
            .map(|(ns, event)| (owned_namespace(ns), event));
        let (namespace, event) = match read {
            Ok(resolved) => resolved,
            Err(e) => {
                let at = self.location(self.reader.error_position() as u64);
                return Err(structural(e.to_string(), at));
            }
        };
        let location = self.location(offset);
        let namespace = namespace.map_err(|msg| structural(msg, location.clone()))?;

        let token = match event {
            Event::Start(e) => Token::Start(
                start_tag(namespace, &e, location.clone())
                    .map_err(|msg| structural(msg, location))?,
            ),
            Event::End(e) => {
                let name = decode(e.name().as_ref());
                let local = decode(e.local_name().as_ref());
                match (name, local) {
                    (Ok(name), Ok(local)) => Token::End(TagEvent {
                        namespace,
                        name,
                        local,
                        attributes: Attributes::new(),
                        location,
                    }),
                    (Err(msg), _) | (_, Err(msg)) => return Err(structural(msg, location)),
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| structural(err.to_string(), location.clone()))?;
                Token::Text {
                    text: text.into_owned(),
                    line: location.line,
                }
            }
            Event::CData(e) => Token::Text {
                text: decode(&e).map_err(|msg| structural(msg, location.clone()))?,
                line: location.line,
            },
            Event::PI(e) => {
                let target = decode(e.target()).map_err(|msg| structural(msg, location.clone()))?;
                let content = decode(e.content()).map_err(|msg| structural(msg, location.clone()))?;
                Token::Instruction {
                    target,
                    content: content.trim_start().to_string(),
                    location,
                }
            }
            Event::Eof => Token::Eof,
            _ => Token::Ignored,
        };

        Ok(token)
    }
}

fn structural(message: String, location: Location) -> ParseError {
    ParseError::at(ErrorKind::Structural { message }, location)
}

fn decode(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| format!("invalid UTF-8: {e}"))
}

fn owned_namespace(ns: ResolveResult<'_>) -> Result<Option<String>, String> {
    match ns {
        ResolveResult::Bound(ns) => decode(ns.as_ref()).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(format!(
            "unknown namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        )),
    }
}

fn start_tag(
    namespace: Option<String>,
    e: &BytesStart<'_>,
    location: Location,
) -> Result<TagEvent, String> {
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        // Namespace declarations are consumed by the reader.
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        attributes.push(
            decode(attr.key.as_ref())?,
            decode(attr.key.local_name().as_ref())?,
            value.into_owned(),
        );
    }

    Ok(TagEvent {
        namespace,
        name: decode(e.name().as_ref())?,
        local: decode(e.local_name().as_ref())?,
        attributes,
        location,
    })
}

//! Per-document parse state and the dispatch loop.

use std::io::{self, Read};
use std::sync::Arc;

use crate::buffer::CharacterBuffer;
use crate::config::{
    ParserConfig, DATA_INSTRUCTION, XINCLUDE_ELEMENT, XINCLUDE_NAMESPACE, XINCLUDE_PARSE_TEXT,
};
use crate::error::{ErrorKind, Location, ParseError, Result};
use crate::helper::HelperStack;
use crate::inclusion::{FileResolver, InclusionStack, ParserFrame, SourceResolver};
use crate::registry::{Attributes, HandlerContext, HandlerRegistry, Phase, TagData, TagPath};
use crate::tokenizer::{TagEvent, Token, Tokenizer};
use crate::verbatim::VerbatimCapture;

/// State of one parse: the tag path and attribute stacks, the character
/// buffer, verbatim capture, helper stack, inclusion stack and the
/// latched error.
///
/// Events are normally produced by [`ParserContext::parse`] and friends,
/// but the `*_element` / `character_data` entry points are public so any
/// other event source can drive the same dispatch.
///
/// Once a handler fails (or any other error is detected) the error is
/// latched: later events are ignored and no handler runs again. The
/// first error is the one returned.
pub struct ParserContext<'p, T, H = ()> {
    registry: &'p HandlerRegistry<T, H>,
    target: &'p mut T,
    resolver: Box<dyn SourceResolver + 'p>,
    config: ParserConfig,
    tags: TagPath,
    attributes: Vec<Attributes>,
    buffer: CharacterBuffer,
    verbatim: VerbatimCapture,
    helpers: HelperStack<H>,
    inclusions: InclusionStack,
    error: Option<ParseError>,
}

impl<'p, T, H> ParserContext<'p, T, H> {
    /// Create a context that dispatches to `registry` and populates
    /// `target`. Inclusions are resolved as files.
    pub fn new(registry: &'p HandlerRegistry<T, H>, target: &'p mut T) -> Self {
        Self {
            registry,
            target,
            resolver: Box::new(FileResolver),
            config: ParserConfig::default(),
            tags: TagPath::new(),
            attributes: Vec::new(),
            buffer: CharacterBuffer::new(),
            verbatim: VerbatimCapture::new(),
            helpers: HelperStack::new(),
            inclusions: InclusionStack::new(),
            error: None,
        }
    }

    /// Use a different resolver for the root document and inclusions.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl SourceResolver + 'p) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Use different parser settings.
    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve `reference` through the resolver, open it and parse it.
    ///
    /// # Errors
    /// Returns the first error latched during the parse, or a
    /// `Resource` error without position if the document can't be opened.
    pub fn parse(mut self, reference: &str) -> Result<()> {
        let id = self.resolver.resolve(reference, None);
        let input = self.resolver.open(&id).map_err(|e| {
            ParseError::detached(ErrorKind::Resource {
                href: reference.to_string(),
                reason: e.to_string(),
            })
        })?;
        self.feed(id, input);
        self.finish()
    }

    /// Parse a document read from `input`.
    ///
    /// # Errors
    /// Returns the first error latched during the parse.
    pub fn parse_reader(mut self, id: impl Into<Arc<str>>, input: impl Read + 'static) -> Result<()> {
        self.feed(id, Box::new(input));
        self.finish()
    }

    /// Parse a document held in memory.
    ///
    /// # Errors
    /// Returns the first error latched during the parse.
    pub fn parse_str(self, id: impl Into<Arc<str>>, text: &str) -> Result<()> {
        self.parse_reader(id, io::Cursor::new(text.as_bytes().to_vec()))
    }

    /// End the parse, surfacing the latched error if there is one.
    ///
    /// # Errors
    /// Returns the first latched error.
    pub fn finish(self) -> Result<()> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.helpers.is_empty() {
            tracing::warn!(
                depth = self.helpers.depth(),
                "helper stack not balanced at end of parse"
            );
        }
        Ok(())
    }

    /// The latched error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Tags currently open.
    #[must_use]
    pub fn tag_path(&self) -> &TagPath {
        &self.tags
    }

    /// The helper stack.
    #[must_use]
    pub fn helpers(&self) -> &HelperStack<H> {
        &self.helpers
    }

    /// True while a verbatim capture is running.
    #[must_use]
    pub fn is_verbatim(&self) -> bool {
        self.verbatim.is_active()
    }

    /// Handle an opening tag.
    pub fn start_element(&mut self, tag: TagEvent) {
        if self.error.is_some() {
            return;
        }

        if tag.in_namespace(XINCLUDE_NAMESPACE) {
            self.include(&tag);
            return;
        }

        if self.verbatim.is_active() {
            self.verbatim.open(&tag, &mut self.buffer);
            return;
        }

        self.buffer.clear();
        let TagEvent {
            local,
            attributes,
            location,
            ..
        } = tag;
        self.tags.push(local);
        self.attributes.push(attributes);
        debug_assert_eq!(self.tags.len(), self.attributes.len());
        tracing::trace!(path = %self.tags, phase = Phase::Start.as_str(), "dispatch");

        let registry = self.registry;
        let Some(handler) = registry.resolve_start(&self.tags) else {
            if registry.resolve_end(&self.tags).is_none() {
                self.latch(ParseError::at(
                    ErrorKind::UnknownTag {
                        path: self.tags.to_string(),
                    },
                    location,
                ));
            }
            return;
        };

        let Some(attrs) = self.attributes.last() else {
            return;
        };
        let mut cx = HandlerContext::new(
            &mut *self.target,
            &mut self.helpers,
            &mut self.verbatim,
            &location.source,
            self.tags.len(),
            Phase::Start,
        );
        let result = handler(&mut cx, attrs);

        if let Err(err) = result {
            self.latch(ParseError::at(err.into(), location));
        }
    }

    /// Handle a closing tag.
    pub fn end_element(&mut self, tag: TagEvent) {
        if self.error.is_some() || tag.in_namespace(XINCLUDE_NAMESPACE) {
            return;
        }

        if self.verbatim.is_active() && self.verbatim.close(&tag, &mut self.buffer) {
            return;
        }

        let registry = self.registry;
        let handler = registry.resolve_end(&self.tags);
        let depth = self.tags.len();
        if self.tags.pop().is_none() {
            self.latch(ParseError::at(
                ErrorKind::Structural {
                    message: format!("unexpected close tag </{}>", tag.name),
                },
                tag.location,
            ));
            return;
        }
        let attributes = self.attributes.pop().unwrap_or_default();
        debug_assert_eq!(self.tags.len(), self.attributes.len());
        tracing::trace!(tag = %tag.local, phase = Phase::End.as_str(), "dispatch");

        if let Some(handler) = handler {
            let data = TagData {
                attributes: &attributes,
                text: self.buffer.text(),
                line: self.buffer.line(),
                source: &tag.location.source,
            };
            let mut cx = HandlerContext::new(
                &mut *self.target,
                &mut self.helpers,
                &mut self.verbatim,
                &tag.location.source,
                depth,
                Phase::End,
            );
            let result = handler(&mut cx, &data);

            if let Err(err) = result {
                self.latch(ParseError::at(err.into(), tag.location));
            }
        }

        self.buffer.clear();
    }

    /// Collect character data for the next end handler.
    pub fn character_data(&mut self, text: &str, line: usize) {
        if self.error.is_some() {
            return;
        }
        self.buffer.push(text, line);
    }

    /// Handle a processing instruction. `<?data ...?>` contributes its
    /// content as character data; other targets are errors.
    pub fn processing_instruction(&mut self, target: &str, content: &str, location: Location) {
        if self.error.is_some() {
            return;
        }
        if target == DATA_INSTRUCTION {
            self.character_data(content, location.line);
        } else {
            self.latch(ParseError::at(
                ErrorKind::UnknownInstruction {
                    target: target.to_string(),
                },
                location,
            ));
        }
    }

    fn latch(&mut self, err: ParseError) {
        if self.error.is_none() {
            tracing::debug!(error = %err, "parse error latched");
            self.error = Some(err);
        }
    }

    fn feed(&mut self, id: impl Into<Arc<str>>, input: Box<dyn Read>) {
        let tokenizer = Tokenizer::new(id, input, self.config.chunk_size);
        let entry_depth = self.tags.len();
        self.run(ParserFrame::new(tokenizer, entry_depth));
    }

    /// Drive one frame to its end or to the first latched error, then
    /// release it.
    fn run(&mut self, frame: ParserFrame) {
        self.inclusions.push(frame);
        let mut buf = Vec::new();

        while self.error.is_none() {
            let Some(frame) = self.inclusions.current_mut() else {
                break;
            };
            let token = match frame.tokenizer.next_token(&mut buf) {
                Ok(token) => token,
                Err(err) => {
                    self.latch(err);
                    break;
                }
            };

            match token {
                Token::Start(tag) => {
                    let second_root = frame.root_closed && self.tags.len() == frame.entry_depth;
                    frame.saw_element = true;
                    if second_root {
                        self.latch(outside_root("junk after document element", tag.location));
                    } else {
                        self.start_element(tag);
                    }
                }
                Token::End(tag) => {
                    let entry_depth = frame.entry_depth;
                    self.end_element(tag);
                    if self.tags.len() == entry_depth {
                        if let Some(frame) = self.inclusions.current_mut() {
                            frame.root_closed = true;
                        }
                    }
                }
                Token::Text { text, line } => {
                    if self.tags.len() == frame.entry_depth && !text.trim().is_empty() {
                        let message = if frame.root_closed {
                            "junk after document element"
                        } else {
                            "text before document element"
                        };
                        let location = frame.tokenizer.current_location();
                        self.latch(outside_root(message, location));
                    } else {
                        self.character_data(&text, line);
                    }
                }
                Token::Instruction {
                    target,
                    content,
                    location,
                } => self.processing_instruction(&target, &content, location),
                Token::Ignored => {}
                Token::Eof => {
                    self.check_frame_end();
                    break;
                }
            }
        }

        self.inclusions.pop();
    }

    fn check_frame_end(&mut self) {
        let Some(frame) = self.inclusions.current() else {
            return;
        };
        let location = frame.tokenizer.current_location();
        let message = if !frame.saw_element {
            Some("document contains no element".to_string())
        } else if self.tags.len() > frame.entry_depth {
            Some(format!(
                "unclosed tag <{}> at end of input",
                self.tags.current().unwrap_or_default()
            ))
        } else {
            None
        };

        if let Some(message) = message {
            self.latch(ParseError::at(ErrorKind::Structural { message }, location));
        }
    }

    /// Divert parsing into the resource named by an inclusion directive.
    fn include(&mut self, tag: &TagEvent) {
        if tag.local != XINCLUDE_ELEMENT {
            return;
        }

        let resource_error = |href: &str, reason: String| {
            ParseError::at(
                ErrorKind::Resource {
                    href: href.to_string(),
                    reason,
                },
                tag.location.clone(),
            )
        };

        let Some(href) = tag.attributes.get_local("href") else {
            self.latch(resource_error("", "missing 'href' attribute".to_string()));
            return;
        };

        let id = self.resolver.resolve(href, Some(&*tag.location.source));
        if self.inclusions.contains(&id) {
            self.latch(resource_error(
                href,
                "inclusion cycle, document is already being parsed".to_string(),
            ));
            return;
        }
        if self.inclusions.depth() > self.config.max_include_depth {
            self.latch(resource_error(
                href,
                format!(
                    "inclusion depth limit of {} exceeded",
                    self.config.max_include_depth
                ),
            ));
            return;
        }

        let mut input = match self.resolver.open(&id) {
            Ok(input) => input,
            Err(e) => {
                self.latch(resource_error(href, e.to_string()));
                return;
            }
        };

        if tag.attributes.get_local("parse") == Some(XINCLUDE_PARSE_TEXT) {
            let mut text = String::new();
            match input.read_to_string(&mut text) {
                Ok(_) => self.character_data(&text, tag.location.line),
                Err(e) => self.latch(resource_error(href, e.to_string())),
            }
            return;
        }

        tracing::debug!(href, id = %id, "including document");
        self.feed(id, input);

        if let Some(err) = self.error.as_mut() {
            err.included_from(tag.location.clone());
        }
    }
}

fn outside_root(message: &str, location: Location) -> ParseError {
    ParseError::at(
        ErrorKind::Structural {
            message: message.to_string(),
        },
        location,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::inclusion::MemoryResolver;
    use pretty_assertions::assert_eq;

    type Log = Vec<String>;

    fn logging_registry() -> HandlerRegistry<Log> {
        let mut registry: HandlerRegistry<Log> = HandlerRegistry::new();
        registry
            .on_start("doc", |cx, _| {
                cx.target.push("start doc".to_string());
                Ok(())
            })
            .on_end("item", |cx, data| {
                cx.target.push(format!("item={}", data.text));
                Ok(())
            })
            .on_end("group/item", |cx, data| {
                cx.target.push(format!("group item={}", data.text));
                Ok(())
            })
            .on_end("group", |_, _| Ok(()));
        registry
    }

    #[test]
    fn test_dispatch_most_specific() {
        let registry = logging_registry();
        let mut log = Log::new();
        let result = ParserContext::new(&registry, &mut log).parse_str(
            "t.xml",
            "<doc><item>a</item><group><item>b</item></group></doc>",
        );

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["start doc", "item=a", "group item=b"]);
    }

    #[test]
    fn test_unknown_tag_latches() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc>\n  <bogus/><item>x</item></doc>")
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::at(
                ErrorKind::UnknownTag {
                    path: "doc:bogus".to_string()
                },
                Location::new("t.xml", 2, 3)
            )
        );
        assert_eq!(log, vec!["start doc"]);
    }

    #[test]
    fn test_events_after_error_are_ignored() {
        let mut registry: HandlerRegistry<Log> = HandlerRegistry::new();
        registry
            .on_start("a", |_, _| Err(HandlerError::new("first")))
            .on_start("b", |cx, _| {
                cx.target.push("b".to_string());
                Err(HandlerError::new("second"))
            });
        let mut log = Log::new();
        let mut cx = ParserContext::new(&registry, &mut log);

        cx.start_element(TagEvent::new("a", Attributes::new()));
        let first = cx.error().cloned();
        cx.start_element(TagEvent::new("b", Attributes::new()));
        cx.character_data("text", 1);
        cx.end_element(TagEvent::new("b", Attributes::new()));
        cx.processing_instruction("bogus", "", Location::new("x", 1, 1));

        assert_eq!(cx.error().cloned(), first);
        assert_eq!(
            cx.finish().map_err(|e| e.kind),
            Err(ErrorKind::Handler(HandlerError::new("first")))
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_text_line_marker() {
        let mut registry: HandlerRegistry<Vec<Option<usize>>> = HandlerRegistry::new();
        registry
            .on_end("t", |cx, data| {
                cx.target.push(data.line);
                Ok(())
            })
            .on_end("r", |_, _| Ok(()));
        let mut lines = Vec::new();
        let result = ParserContext::new(&registry, &mut lines)
            .parse_str("t.xml", "<r>\n<t>\nabc</t><t/></r>");

        assert_eq!(result, Ok(()));
        assert_eq!(lines, vec![Some(2), None]);
    }

    #[test]
    fn test_data_instruction_is_text() {
        let registry = logging_registry();
        let mut log = Log::new();
        let result = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc><item><?data a<b ?></item></doc>");

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["start doc", "item=a<b "]);
    }

    #[test]
    fn test_unknown_instruction() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc><?php echo 1; ?></doc>")
            .unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::UnknownInstruction {
                target: "php".to_string()
            }
        );
    }

    #[test]
    fn test_unclosed_tag_is_structural() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc><item>")
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::Structural { .. }));
    }

    #[test]
    fn test_empty_document_is_structural() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<?xml version='1.0'?>\n")
            .unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::Structural {
                message: "document contains no element".to_string()
            }
        );
    }

    #[test]
    fn test_second_root_element_rejected() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc/>\n<doc/>")
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::at(
                ErrorKind::Structural {
                    message: "junk after document element".to_string()
                },
                Location::new("t.xml", 2, 1)
            )
        );
        assert_eq!(log, vec!["start doc"]);
    }

    #[test]
    fn test_text_after_root_rejected() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc><item>a</item></doc>\n  trailing junk\n")
            .unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::Structural {
                message: "junk after document element".to_string()
            }
        );
        assert_eq!(log, vec!["start doc", "item=a"]);
    }

    #[test]
    fn test_text_before_root_rejected() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "stray <doc/>")
            .unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::Structural {
                message: "text before document element".to_string()
            }
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_whitespace_around_root_allowed() {
        let registry = logging_registry();
        let mut log = Log::new();
        let result = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "\n  <doc/>\n\n");

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_capture_verbatim_ignored_in_end_handler() {
        let mut registry: HandlerRegistry<Log> = HandlerRegistry::new();
        registry
            .on_end("doc", |_, _| Ok(()))
            .on_end("a", |cx, _| {
                cx.capture_verbatim();
                Ok(())
            })
            .on_end("b", |cx, data| {
                cx.target.push(format!("b={}", data.text));
                Ok(())
            });
        let mut log = Log::new();
        let result = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc><a/><b>x</b></doc>");

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["b=x"]);
    }

    #[test]
    fn test_handler_sees_depth_and_phase() {
        let mut registry: HandlerRegistry<Log> = HandlerRegistry::new();
        registry
            .on_start("doc", |cx, _| {
                cx.target.push(format!("{} {}", cx.phase().as_str(), cx.depth()));
                Ok(())
            })
            .on_end("doc/item", |cx, _| {
                cx.target.push(format!("{} {}", cx.phase().as_str(), cx.depth()));
                Ok(())
            });
        let mut log = Log::new();
        let result = ParserContext::new(&registry, &mut log)
            .parse_str("t.xml", "<doc><item/></doc>");

        assert_eq!(result, Ok(()));
        assert_eq!(log, vec!["start 1", "end 2"]);
    }

    #[test]
    fn test_state_accessors_follow_events() {
        let mut registry: HandlerRegistry<Log, u32> = HandlerRegistry::new();
        registry
            .on_start("doc", |cx, _| {
                cx.helpers.push(7);
                Ok(())
            })
            .on_start("doc/raw", |cx, _| {
                cx.capture_verbatim();
                Ok(())
            })
            .on_end("doc/raw", |_, _| Ok(()));
        let mut log = Log::new();
        let mut cx = ParserContext::new(&registry, &mut log);

        cx.start_element(TagEvent::new("doc", Attributes::new()));
        assert_eq!(cx.tag_path().as_slice(), ["doc".to_string()]);
        assert_eq!(cx.helpers().current(), Some(&7));

        cx.start_element(TagEvent::new("raw", Attributes::new()));
        assert!(cx.is_verbatim());
        cx.start_element(TagEvent::new("inner", Attributes::new()));
        assert_eq!(cx.tag_path().len(), 2);

        cx.end_element(TagEvent::new("inner", Attributes::new()));
        cx.end_element(TagEvent::new("raw", Attributes::new()));
        assert!(!cx.is_verbatim());
        assert_eq!(cx.tag_path().as_slice(), ["doc".to_string()]);
        assert!(cx.error().is_none());
    }

    #[test]
    fn test_missing_root_document() {
        let registry = logging_registry();
        let mut log = Log::new();
        let err = ParserContext::new(&registry, &mut log)
            .with_resolver(MemoryResolver::new())
            .parse("nowhere.xml")
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::Resource { ref href, .. } if href == "nowhere.xml"));
        assert!(err.trace.is_empty());
    }
}

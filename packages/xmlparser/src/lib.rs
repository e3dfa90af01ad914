//! CodeGen XML parser - streaming XML parser that dispatches on tag paths.
//!
//! Handlers are registered for tag-path suffixes and the most specific
//! registration wins: a handler for `function/name` takes precedence over
//! one for `name` inside a `<function>`. Character data is collected and
//! handed to the end handler together with the attributes captured at the
//! opening tag.
//!
//! # Example
//!
//! ```
//! use codegen_xmlparser::{HandlerRegistry, ParserContext};
//!
//! #[derive(Default)]
//! struct Doc {
//!     title: String,
//! }
//!
//! let mut registry: HandlerRegistry<Doc> = HandlerRegistry::new();
//! registry
//!     .on_start("doc", |_, _| Ok(()))
//!     .on_end("doc/title", |cx, data| {
//!         cx.target.title = data.text.trim().to_string();
//!         Ok(())
//!     });
//!
//! let mut doc = Doc::default();
//! ParserContext::new(&registry, &mut doc)
//!     .parse_str("doc.xml", "<doc><title> Hello </title></doc>")
//!     .unwrap();
//! assert_eq!(doc.title, "Hello");
//! ```
//!
//! # Architecture
//!
//! - [`registry`]: handler table and most-specific-suffix resolution
//! - [`context`]: per-parse state and the dispatch loop
//! - [`inclusion`]: XInclude handling and the stack of parser frames
//! - [`verbatim`]: serializing a subtree back to markup
//! - [`helper`]: stack of child objects under construction
//! - [`tokenizer`]: streaming `quick-xml` event source
//! - [`position`]: byte offset to line/column mapping
//! - [`error`]: error types and Result alias
//! - [`config`]: constants and parser settings

pub mod buffer;
pub mod config;
pub mod context;
pub mod error;
pub mod helper;
pub mod inclusion;
pub mod position;
pub mod registry;
pub mod tokenizer;
pub mod verbatim;

pub use config::ParserConfig;
pub use context::ParserContext;
pub use error::{ErrorKind, HandlerError, HandlerResult, Location, ParseError, Result};
pub use helper::HelperStack;
pub use inclusion::{FileResolver, MemoryResolver, SourceResolver};
pub use registry::{Attributes, HandlerContext, HandlerRegistry, Phase, TagData, TagPath};

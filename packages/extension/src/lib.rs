//! CodeGen extension specs - Read XML extension descriptions into a model.
//!
//! An extension spec is an XML document rooted at `<extension>`. This
//! crate binds the spec vocabulary to handlers of the
//! [`codegen_xmlparser`] dispatch engine and collects the result in an
//! [`Extension`].
//!
//! # Example
//!
//! ```
//! use codegen_extension::parse_extension_str;
//!
//! let ext = parse_extension_str(
//!     "spec.xml",
//!     r#"<extension name="demo" version="1.0.0">
//!          <summary>Demo extension</summary>
//!          <maintainer><user>jdoe</user><name>J. Doe</name></maintainer>
//!        </extension>"#,
//! )
//! .unwrap();
//!
//! assert_eq!(ext.name, "demo");
//! assert_eq!(ext.maintainers["jdoe"].name, "J. Doe");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Defaults and validation patterns
//! - [`types`]: The extension model (Extension, Maintainer, Release, ...)
//! - [`error`]: Error types and Result alias
//! - [`text`]: Whitespace normalization of tag content
//! - [`parser`]: The handler table for the spec vocabulary
//! - [`output`]: YAML output
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod text;
pub mod types;

pub use error::{ExtensionError, ModelError, Result};
pub use parser::{create_extension_registry, parse_extension_file, parse_extension_str};
pub use types::{Extension, License, Maintainer, Release};

//! Handler registry: the explicit table of tag-path suffixes to handlers
//! and the most-specific-suffix lookup over it.

mod core;
mod handler;
mod types;

pub use self::core::HandlerRegistry;
pub use handler::{EndFn, HandlerContext, StartFn};
pub use types::{Attribute, Attributes, Phase, TagData, TagPath};

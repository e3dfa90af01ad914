//! Verbatim capture: serializing a subtree back to markup instead of
//! dispatching it.

use quick_xml::escape::escape;

use crate::buffer::CharacterBuffer;
use crate::tokenizer::TagEvent;

/// Depth-tracked verbatim mode for one parse.
#[derive(Debug, Default)]
pub struct VerbatimCapture {
    depth: usize,
}

impl VerbatimCapture {
    /// Create an inactive capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start capturing the subtree of the element whose start handler is
    /// running. Has no effect if a capture is already active.
    pub fn begin(&mut self) {
        if self.depth == 0 {
            tracing::debug!("entering verbatim mode");
            self.depth = 1;
        }
    }

    /// True while descendants are being serialized.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    /// Current nesting depth relative to the capturing element.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Serialize an opening tag into the buffer.
    pub fn open(&mut self, tag: &TagEvent, buffer: &mut CharacterBuffer) {
        self.depth += 1;
        let mut markup = format!("<{}", tag.name);
        for attr in tag.attributes.iter() {
            markup.push_str(&format!(" {}=\"{}\"", attr.name, escape(attr.value.as_str())));
        }
        markup.push('>');
        buffer.push_markup(&markup);
    }

    /// Handle a closing tag.
    ///
    /// Returns `true` if the tag belonged to a descendant and was
    /// serialized, `false` if it closes the capturing element itself, in
    /// which case verbatim mode is over and the caller dispatches it.
    pub fn close(&mut self, tag: &TagEvent, buffer: &mut CharacterBuffer) -> bool {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            buffer.push_markup(&format!("</{}>", tag.name));
            true
        } else {
            tracing::debug!(tag = %tag.name, "leaving verbatim mode");
            false
        }
    }
}

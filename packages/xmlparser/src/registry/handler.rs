//! Handler signatures and the context every handler receives.

use crate::error::HandlerResult;
use crate::helper::HelperStack;
use crate::verbatim::VerbatimCapture;

use super::types::{Attributes, Phase, TagData};

/// Function type for start-tag handlers.
pub type StartFn<T, H> =
    dyn Fn(&mut HandlerContext<'_, T, H>, &Attributes) -> HandlerResult + Send + Sync;

/// Function type for end-tag handlers.
pub type EndFn<T, H> =
    dyn Fn(&mut HandlerContext<'_, T, H>, &TagData<'_>) -> HandlerResult + Send + Sync;

/// Mutable view of the parse state handed to a handler.
///
/// `target` is the object graph being populated, `helpers` the stack of
/// child objects under construction.
pub struct HandlerContext<'a, T, H> {
    pub target: &'a mut T,
    pub helpers: &'a mut HelperStack<H>,
    verbatim: &'a mut VerbatimCapture,
    source: &'a str,
    depth: usize,
    phase: Phase,
}

impl<'a, T, H> HandlerContext<'a, T, H> {
    pub(crate) fn new(
        target: &'a mut T,
        helpers: &'a mut HelperStack<H>,
        verbatim: &'a mut VerbatimCapture,
        source: &'a str,
        depth: usize,
        phase: Phase,
    ) -> Self {
        Self {
            target,
            helpers,
            verbatim,
            source,
            depth,
            phase,
        }
    }

    /// Capture the subtree of the current element as markup text; its
    /// end handler receives the serialized descendants instead of them
    /// being dispatched. Ignored outside a start handler, since the
    /// element has already closed by then.
    pub fn capture_verbatim(&mut self) {
        if self.phase != Phase::Start {
            tracing::warn!(
                phase = self.phase.as_str(),
                depth = self.depth,
                "verbatim capture requested after the element closed, ignored"
            );
            return;
        }
        self.verbatim.begin();
    }

    /// Identifier of the document the current tag was read from.
    #[must_use]
    pub fn source(&self) -> &str {
        self.source
    }

    /// Number of open elements, including the current one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the handler runs for the opening or the closing tag.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

//! Stack of objects under construction by nested tag handlers.
//!
//! A repeatable child element's start handler pushes a fresh object,
//! end handlers of its descendants fill in fields on the current helper,
//! and the element's own end handler pops it and attaches it to its
//! parent. Pushes and pops must pair up per element; an imbalance is a
//! bug in the handler table and is not repaired at runtime.

/// LIFO stack of helpers owned by a single parse.
#[derive(Debug)]
pub struct HelperStack<H> {
    frames: Vec<H>,
}

impl<H> HelperStack<H> {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Make `helper` current; the previously current helper becomes
    /// reachable through [`HelperStack::previous`].
    pub fn push(&mut self, helper: H) {
        self.frames.push(helper);
    }

    /// Remove and return the current helper, restoring the one that was
    /// current before the matching push.
    pub fn pop(&mut self) -> Option<H> {
        self.frames.pop()
    }

    /// The current helper.
    #[must_use]
    pub fn current(&self) -> Option<&H> {
        self.frames.last()
    }

    /// The current helper, mutably.
    pub fn current_mut(&mut self) -> Option<&mut H> {
        self.frames.last_mut()
    }

    /// The helper that was current before the most recent push.
    #[must_use]
    pub fn previous(&self) -> Option<&H> {
        self.frames.iter().rev().nth(1)
    }

    /// The previous helper, mutably.
    pub fn previous_mut(&mut self) -> Option<&mut H> {
        self.frames.iter_mut().rev().nth(1)
    }

    /// Number of helpers on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when no helper is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<H> Default for HelperStack<H> {
    fn default() -> Self {
        Self::new()
    }
}

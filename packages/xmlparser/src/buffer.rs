//! Character data collected between structural events.

/// Text accumulated since the last open or close tag.
#[derive(Debug, Default)]
pub struct CharacterBuffer {
    text: String,
    line: Option<usize>,
}

impl CharacterBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append character data seen on `line`. The first append after a
    /// reset fixes the start line.
    pub fn push(&mut self, text: &str, line: usize) {
        self.text.push_str(text);
        if self.line.is_none() {
            self.line = Some(line);
        }
    }

    /// Append serialized markup without touching the start line.
    pub fn push_markup(&mut self, markup: &str) {
        self.text.push_str(markup);
    }

    /// Collected text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line the first character data was seen on.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Reset text and line marker.
    pub fn clear(&mut self) {
        self.text.clear();
        self.line = None;
    }
}

//! A single line of child output.

/// One line read from a stream.
///
/// The text never contains the trailing `\n`; whether the source had one is
/// kept separately so output can reproduce it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    terminated: bool,
}

impl Line {
    /// Create a line from its text and terminator flag.
    #[must_use]
    pub fn new(text: impl Into<String>, terminated: bool) -> Self {
        Self {
            text: text.into(),
            terminated,
        }
    }

    /// Create a line that ended with a newline.
    #[must_use]
    pub fn terminated(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// Create a trailing fragment that had no newline.
    #[must_use]
    pub fn unterminated(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    /// Build a line from raw bytes as read from a stream, `\n` included.
    ///
    /// Invalid UTF-8 is replaced rather than dropped.
    #[must_use]
    pub fn from_raw(raw: &[u8]) -> Self {
        let (body, terminated) = match raw.strip_suffix(b"\n") {
            Some(body) => (body, true),
            None => (raw, false),
        };
        Self::new(String::from_utf8_lossy(body), terminated)
    }

    /// The line content without its terminator.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the source had a trailing newline.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Replace the text, keeping the terminator flag.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(text, self.terminated)
    }

    /// The line as it should be written out.
    #[must_use]
    pub fn to_output(&self) -> String {
        if self.terminated {
            format!("{}\n", self.text)
        } else {
            self.text.clone()
        }
    }
}

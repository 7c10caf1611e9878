//! # Command Stream
//!
//! An ordered, append-only sequence of byte/text fragments making up one
//! complete print job. Built once per print call, flushed to the transport
//! as a whole, never partially replayed.
//!
//! Control fragments carry raw ESC/POS bytes; text fragments stay as
//! strings until [`CommandStream::to_bytes`], where they are sanitized to
//! the ASCII charset the RFCOMM channel is opened with (anything outside
//! ASCII prints as `?` rather than as stray control bytes).

/// One fragment of a print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Raw control bytes, passed through untouched.
    Control(Vec<u8>),
    /// Printable text, ASCII-sanitized at flush time.
    Text(String),
}

/// Append-only fragment sequence for one job.
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    fragments: Vec<Fragment>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw control bytes.
    pub fn control(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.fragments.push(Fragment::Control(bytes));
        self
    }

    /// Append printable text.
    pub fn text(&mut self, s: impl Into<String>) -> &mut Self {
        self.fragments.push(Fragment::Text(s.into()));
        self
    }

    /// Append a text line (text plus line feed).
    pub fn line(&mut self, s: impl Into<String>) -> &mut Self {
        let mut s = s.into();
        s.push('\n');
        self.text(s)
    }

    /// Append an empty line.
    pub fn newline(&mut self) -> &mut Self {
        self.text("\n")
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// All printable text in order, for tests and previews.
    pub fn rendered_text(&self) -> String {
        self.fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Text(s) => Some(s.as_str()),
                Fragment::Control(_) => None,
            })
            .collect()
    }

    /// Flatten the job into the byte stream handed to the transport.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Control(bytes) => out.extend_from_slice(bytes),
                Fragment::Text(s) => {
                    out.extend(s.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }));
                }
            }
        }
        out
    }
}

//! Error values and the frames they carry
//!
//! Anything the writer renders implements [`Traceable`]. Host runtimes
//! implement the trait over their own exception objects; [`TracedErr`] is
//! the owned implementation used when the caller just has data.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Kind reported when an error does not name one
pub const DEFAULT_KIND: &str = "Error";

/// One entry of a captured call trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Function, method or block label
    pub label: String,

    /// Source location, e.g. `a.src:10`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Frame {
    /// Frame without a source location
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: None,
        }
    }

    /// Frame with a source location
    pub fn at(label: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: Some(location.into()),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.label, location),
            None => f.write_str(&self.label),
        }
    }
}

/// An error value whose trace can be rendered.
///
/// Implementations must be immutable for the duration of a render: the
/// writer reads `frames()` and `cause()` more than once.
pub trait Traceable {
    /// Short kind name printed before the message
    fn kind(&self) -> Cow<'_, str> {
        Cow::Borrowed(DEFAULT_KIND)
    }

    /// Human-readable message
    fn message(&self) -> Cow<'_, str>;

    /// Captured frames, innermost first
    fn frames(&self) -> &[Frame];

    /// The underlying error, if any. May form a cycle.
    fn cause(&self) -> Option<&dyn Traceable> {
        None
    }
}

/// Owned error value with a captured trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedErr {
    kind: String,
    message: String,
    #[serde(default)]
    frames: Vec<Frame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<Box<TracedErr>>,
}

impl TracedErr {
    /// Create an error of the default kind with no frames
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: DEFAULT_KIND.to_string(),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Set the kind name
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Append a frame
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Append a frame with a location
    pub fn at(self, label: impl Into<String>, location: impl Into<String>) -> Self {
        self.with_frame(Frame::at(label, location))
    }

    /// Append several frames in order
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Frame>) -> Self {
        self.frames.extend(frames);
        self
    }

    /// Attach the underlying error
    pub fn caused_by(mut self, cause: TracedErr) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Kind name
    pub fn kind_name(&self) -> &str {
        &self.kind
    }

    /// Message text
    pub fn message_text(&self) -> &str {
        &self.message
    }

    /// Owned cause, if any
    pub fn cause_err(&self) -> Option<&TracedErr> {
        self.cause.as_deref()
    }

    /// Convert a `source()` chain into an owned chain.
    ///
    /// Rust errors carry no frames, so every link has an empty trace.
    pub fn from_std(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::from_chain(std::iter::successors(Some(err), |e| e.source()))
    }

    fn from_chain<'a>(chain: impl Iterator<Item = &'a (dyn std::error::Error + 'static)>) -> Self {
        let messages: Vec<String> = chain.map(|e| e.to_string()).collect();

        let mut links = messages.into_iter().rev().map(TracedErr::new);
        // successors always yields at least the head
        let mut current = links.next().unwrap_or_else(|| TracedErr::new(""));
        for outer in links {
            current = outer.caused_by(current);
        }
        current
    }
}

impl From<&anyhow::Error> for TracedErr {
    fn from(err: &anyhow::Error) -> Self {
        Self::from_chain(err.chain())
    }
}

impl Traceable for TracedErr {
    fn kind(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.kind)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }

    fn frames(&self) -> &[Frame] {
        &self.frames
    }

    fn cause(&self) -> Option<&dyn Traceable> {
        self.cause.as_deref().map(|c| c as &dyn Traceable)
    }
}

impl fmt::Display for TracedErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TracedErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

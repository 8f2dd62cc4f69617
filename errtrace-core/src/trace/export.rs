//! Trace Export

use serde::{Deserialize, Serialize};

use super::chain::{self, Cut};
use crate::config::{TraceFormat, TraceOptions};
use crate::traceable::{Frame, Traceable};

/// Marker placed before every cause
pub const CAUSED_BY: &str = "Caused by: ";

/// Prefix of every frame line
pub const FRAME_PREFIX: &str = "    at ";

/// One error of a rendered chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Kind name
    pub kind: String,
    /// Message text
    pub message: String,
    /// Frames that are printed
    pub frames: Vec<Frame>,
    /// Frames collapsed into `... N more`
    pub omitted_frames: usize,
}

fn header(kind: &str, message: &str) -> String {
    if message.is_empty() {
        kind.to_string()
    } else {
        format!("{}: {}", kind, message)
    }
}

/// Why the chain was cut short
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Truncation {
    /// The chain loops back to an error already printed
    Circular {
        /// Kind of the repeated error
        kind: String,
        /// Message of the repeated error
        message: String,
    },
    /// More causes than `max_causes`
    Depth {
        /// Causes printed before stopping
        limit: usize,
    },
}

/// A rendered error chain, root first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceReport {
    /// The root error followed by its causes
    pub errors: Vec<ErrorEntry>,
    /// Set when the cause chain did not reach its end
    pub truncation: Option<Truncation>,
}

impl TraceReport {
    /// Build a report for `root` under `options`
    pub fn build<E>(root: &E, options: &TraceOptions) -> Self
    where
        E: Traceable + ?Sized,
    {
        let chain = chain::walk(root, options);

        let mut errors = Vec::with_capacity(chain.causes().len() + 1);
        errors.push(entry(
            root.kind().into_owned(),
            root.message().into_owned(),
            root.frames(),
            None,
            options,
        ));

        let mut enclosing = root.frames();
        for &cause in chain.causes() {
            errors.push(entry(
                cause.kind().into_owned(),
                cause.message().into_owned(),
                cause.frames(),
                Some(enclosing),
                options,
            ));
            enclosing = cause.frames();
        }

        let truncation = chain.cut().map(|cut| match cut {
            Cut::Circular(err) => Truncation::Circular {
                kind: err.kind().into_owned(),
                message: err.message().into_owned(),
            },
            Cut::Depth(limit) => Truncation::Depth { limit },
        });

        Self { errors, truncation }
    }

    /// Number of frame lines across the whole report
    pub fn frame_count(&self) -> usize {
        self.errors.iter().map(|e| e.frames.len()).sum()
    }
}

fn entry(
    kind: String,
    message: String,
    frames: &[Frame],
    enclosing: Option<&[Frame]>,
    options: &TraceOptions,
) -> ErrorEntry {
    let unique = match enclosing {
        Some(outer) if options.elide_common_frames => {
            frames.len() - common_suffix(frames, outer)
        }
        _ => frames.len(),
    };
    let shown = options.max_frames.map_or(unique, |max| unique.min(max));

    ErrorEntry {
        kind,
        message,
        frames: frames[..shown].to_vec(),
        omitted_frames: frames.len() - shown,
    }
}

/// Count of trailing frames `frames` shares with `enclosing`
fn common_suffix(frames: &[Frame], enclosing: &[Frame]) -> usize {
    frames
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Trace exporter
pub struct TraceExporter;

impl TraceExporter {
    /// Export to the conventional multi-line stack trace
    pub fn to_text(report: &TraceReport, options: &TraceOptions) -> String {
        let prefix = options.prefix();
        let mut out = String::new();

        for (i, error) in report.errors.iter().enumerate() {
            out.push_str(&prefix);
            if i > 0 {
                out.push_str(CAUSED_BY);
            }
            out.push_str(&header(&error.kind, &error.message));
            out.push('\n');

            for frame in &error.frames {
                out.push_str(&prefix);
                out.push_str(FRAME_PREFIX);
                out.push_str(&frame.to_string());
                out.push('\n');
            }

            if error.omitted_frames > 0 {
                out.push_str(&format!("{}    ... {} more\n", prefix, error.omitted_frames));
            }
        }

        match &report.truncation {
            Some(Truncation::Circular { kind, message }) => {
                out.push_str(&format!(
                    "{}{}[CIRCULAR REFERENCE: {}]\n",
                    prefix,
                    CAUSED_BY,
                    header(kind, message)
                ));
            }
            Some(Truncation::Depth { limit }) => {
                out.push_str(&format!(
                    "{}    ... cause chain truncated after {} causes\n",
                    prefix, limit
                ));
            }
            None => {}
        }

        out
    }

    /// Export to JSON
    pub fn to_json(report: &TraceReport) -> Result<String, serde_json::Error> {
        serde_json::to_string(report)
    }

    /// Export to pretty JSON
    pub fn to_json_pretty(report: &TraceReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    /// Export in the format named by `options`
    pub fn export(
        report: &TraceReport,
        options: &TraceOptions,
    ) -> Result<String, serde_json::Error> {
        match options.format {
            TraceFormat::Text => Ok(Self::to_text(report, options)),
            TraceFormat::Json => Self::to_json(report).map(|json| json + "\n"),
            TraceFormat::JsonPretty => Self::to_json_pretty(report).map(|json| json + "\n"),
        }
    }
}

//! Trace Writer
//!
//! Renders an error's trace and writes it to a caller-owned sink, then hands
//! the same error back so it can be propagated further.

use std::io::Write;

use super::export::{TraceExporter, TraceReport};
use crate::config::{OptionMap, TraceOptions};
use crate::error::{Result, TraceError};
use crate::traceable::Traceable;

/// Writes traces under a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct TraceWriter {
    options: TraceOptions,
}

impl TraceWriter {
    /// Create a writer with the given options
    pub fn new(options: TraceOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    /// Build the report without rendering it
    pub fn report<E>(&self, err: &E) -> TraceReport
    where
        E: Traceable + ?Sized,
    {
        TraceReport::build(err, &self.options)
    }

    /// Render the trace to a string
    pub fn render<E>(&self, err: &E) -> Result<String>
    where
        E: Traceable + ?Sized,
    {
        let report = self.report(err);
        Ok(TraceExporter::export(&report, &self.options)?)
    }

    /// Write the trace of `err` to `sink` and return `err`.
    ///
    /// The whole trace is rendered before anything is written, so a
    /// rendering failure leaves the sink untouched. The sink is not flushed.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::IoFailure`] if the sink rejects the write.
    pub fn trace_to<'e, E, W>(&self, err: &'e E, sink: &mut W) -> Result<&'e E>
    where
        E: Traceable + ?Sized,
        W: Write + ?Sized,
    {
        let text = self.render(err)?;
        sink.write_all(text.as_bytes())?;

        tracing::trace!(bytes = text.len(), kind = %err.kind(), "Wrote trace");
        Ok(err)
    }
}

/// Write the trace of `err` to `sink`, returning `err`.
///
/// `None` options means defaults.
pub fn trace_to<'e, E, W>(
    err: &'e E,
    sink: &mut W,
    options: Option<&TraceOptions>,
) -> Result<&'e E>
where
    E: Traceable + ?Sized,
    W: Write + ?Sized,
{
    match options {
        Some(options) => TraceWriter::new(options.clone()).trace_to(err, sink),
        None => TraceWriter::default().trace_to(err, sink),
    }
}

/// Entry point for host runtimes that pass nullable arguments and a loose
/// option map.
///
/// # Errors
///
/// Returns [`TraceError::InvalidArgument`] if `err` or `sink` is missing or
/// a recognized option has the wrong type, and [`TraceError::IoFailure`] if
/// the write fails.
pub fn trace_dynamic<'e>(
    err: Option<&'e dyn Traceable>,
    sink: Option<&mut dyn Write>,
    options: Option<&OptionMap>,
) -> Result<&'e dyn Traceable> {
    let err = err.ok_or_else(|| TraceError::invalid("error value is required"))?;
    let sink = sink.ok_or_else(|| TraceError::invalid("sink is required"))?;
    let options = options
        .map(TraceOptions::from_map)
        .transpose()?
        .unwrap_or_default();

    TraceWriter::new(options).trace_to(err, sink)
}

/// Fluent tracing on any [`Traceable`]
pub trait TraceExt: Traceable {
    /// Write this error's trace to `sink` and return `self`
    fn trace_to<W>(&self, sink: &mut W, options: Option<&TraceOptions>) -> Result<&Self>
    where
        W: Write + ?Sized,
    {
        trace_to(self, sink, options)
    }

    /// Render this error's trace to a string
    fn trace_to_string(&self, options: Option<&TraceOptions>) -> Result<String> {
        match options {
            Some(options) => TraceWriter::new(options.clone()).render(self),
            None => TraceWriter::default().render(self),
        }
    }
}

impl<T: Traceable + ?Sized> TraceExt for T {}

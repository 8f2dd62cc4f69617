//! Trace Rendering
//!
//! Walks an error's cause chain, renders it and writes it to a sink.
//!
//! # Features
//!
//! - Conventional `at label (location)` text output
//! - Bounded, cycle-safe cause chain walk
//! - Elision of frames a cause shares with its enclosing error
//! - JSON export of the same report
//!
//! # Example
//!
//! ```rust
//! use errtrace_core::prelude::*;
//!
//! let err = TracedErr::new("boom").at("f", "a.src:10");
//! let mut out = Vec::new();
//!
//! let same = trace_to(&err, &mut out, None)?;
//! assert!(std::ptr::eq(same, &err));
//! assert_eq!(String::from_utf8(out).unwrap(), "Error: boom\n    at f (a.src:10)\n");
//! # Ok::<(), TraceError>(())
//! ```

mod chain;
mod export;
mod writer;

pub use chain::{CauseChain, Cut, walk};
pub use export::{CAUSED_BY, ErrorEntry, FRAME_PREFIX, TraceExporter, TraceReport, Truncation};
pub use writer::{TraceExt, TraceWriter, trace_dynamic, trace_to};

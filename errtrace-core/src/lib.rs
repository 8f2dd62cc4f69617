//! # errtrace
//!
//! Renders the captured stack trace of an error value into any
//! [`std::io::Write`] sink. With `include_causes` set, the chain of causes
//! follows the error's own frames:
//!
//! ```text
//! IOErr: wrapped
//!     at load (io.src:40)
//!     at main (main.src:1)
//! Caused by: Error: disk full
//!     at write (io.src:12)
//!     ... 1 more
//! ```
//!
//! The error is only borrowed and is handed back unchanged, so a trace can
//! be dumped in the middle of propagating it.
//!
//! ## Quick Start
//!
//! ```rust
//! use errtrace_core::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let err = TracedErr::new("wrapped")
//!         .with_kind("IOErr")
//!         .at("load", "io.src:40")
//!         .caused_by(TracedErr::new("disk full").at("write", "io.src:12"));
//!
//!     let options = TraceOptions::builder()
//!         .include_causes(true)
//!         .max_frames(20)
//!         .build();
//!     let mut stderr = std::io::stderr();
//!     err.trace_to(&mut stderr, Some(&options))?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod trace;
pub mod traceable;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{OptionMap, TraceFormat, TraceOptions, TraceOptionsBuilder};
    pub use crate::error::{Result, TraceError};
    pub use crate::trace::{
        TraceExporter, TraceExt, TraceReport, TraceWriter, Truncation, trace_dynamic, trace_to,
    };
    pub use crate::traceable::{Frame, Traceable, TracedErr};
}

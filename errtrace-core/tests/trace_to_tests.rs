//! Integration tests for writing traces to sinks
//!
//! These tests drive the public entry points the way a host runtime would:
//! its own error type behind `Traceable`, caller-owned sinks, and option maps.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::io::{Read, Seek, SeekFrom, Write};
use std::rc::Rc;
use std::sync::Arc;

use errtrace_core::prelude::*;
use errtrace_core::trace::{CAUSED_BY, FRAME_PREFIX};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Exception object of a host runtime whose causes may loop
struct HostErr {
    kind: &'static str,
    message: String,
    frames: Vec<Frame>,
    cause: OnceCell<Rc<HostErr>>,
}

impl HostErr {
    fn new(kind: &'static str, message: &str, frames: Vec<Frame>) -> Rc<Self> {
        Rc::new(Self {
            kind,
            message: message.to_string(),
            frames,
            cause: OnceCell::new(),
        })
    }

    fn link(&self, cause: &Rc<HostErr>) {
        let _ = self.cause.set(Rc::clone(cause));
    }
}

impl Traceable for HostErr {
    fn kind(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.kind)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }

    fn frames(&self) -> &[Frame] {
        &self.frames
    }

    fn cause(&self) -> Option<&dyn Traceable> {
        self.cause.get().map(|c| c.as_ref() as &dyn Traceable)
    }
}

fn frames(n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame::at(format!("fn{}", i), format!("mod.src:{}", i + 1)))
        .collect()
}

fn frame_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| l.starts_with(FRAME_PREFIX)).collect()
}

fn with_causes() -> TraceOptions {
    TraceOptions::builder().include_causes(true).build()
}

#[test]
fn test_single_frame_trace() {
    let err = TracedErr::new("boom").at("f", "a.src:10");
    let mut sink = Vec::new();

    trace_to(&err, &mut sink, None).unwrap();

    assert_eq!(
        String::from_utf8(sink).unwrap(),
        "Error: boom\n    at f (a.src:10)\n"
    );
}

#[test]
fn test_empty_frames_write_header_only() {
    let err = TracedErr::new("nothing captured").with_kind("UnknownErr");
    let mut sink = Vec::new();

    trace_to(&err, &mut sink, Some(&TraceOptions::default())).unwrap();

    assert_eq!(
        String::from_utf8(sink).unwrap(),
        "UnknownErr: nothing captured\n"
    );
}

#[test]
fn test_frame_lines_preserve_order() {
    for n in [1, 2, 7, 50] {
        let err = TracedErr::new("boom").with_frames(frames(n));
        let text = err.trace_to_string(None).unwrap();
        let lines = frame_lines(&text);

        assert_eq!(lines.len(), n);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(*line, format!("    at fn{} (mod.src:{})", i, i + 1));
        }
    }
}

#[test]
fn test_returns_same_reference() {
    let host = HostErr::new("Err", "boom", frames(2));
    let mut sink = Vec::new();

    let returned = trace_to(host.as_ref(), &mut sink, None).unwrap();
    assert!(std::ptr::eq(returned, host.as_ref()));

    let as_dyn: &dyn Traceable = host.as_ref();
    let returned = trace_dynamic(Some(as_dyn), Some(&mut sink), None).unwrap();
    assert!(std::ptr::addr_eq(returned, as_dyn));
}

#[test]
fn test_cause_chain_included() {
    let cause = HostErr::new("IOErr", "disk full", vec![Frame::at("write", "io.src:12")]);
    let err = HostErr::new("Err", "save failed", vec![Frame::at("save", "app.src:3")]);
    err.link(&cause);

    let text = err.trace_to_string(Some(&with_causes())).unwrap();

    assert_eq!(
        text,
        "Err: save failed\n    at save (app.src:3)\n\
         Caused by: IOErr: disk full\n    at write (io.src:12)\n"
    );
}

#[test]
fn test_cause_chain_excluded_by_default() {
    let cause = HostErr::new("IOErr", "disk full", frames(1));
    let err = HostErr::new("Err", "save failed", frames(1));
    err.link(&cause);

    let text = err.trace_to_string(None).unwrap();

    assert!(!text.contains(CAUSED_BY));
    assert_eq!(frame_lines(&text).len(), 1);
}

#[test]
fn test_empty_frames_with_cause_write_header_only() {
    let err = TracedErr::new("top").caused_by(TracedErr::new("inner").at("g", "b.src:2"));
    let mut sink = Vec::new();

    let result = trace_dynamic(Some(&err), Some(&mut sink), Some(&OptionMap::new()));

    assert!(result.is_ok());
    assert_eq!(String::from_utf8(sink).unwrap(), "Error: top\n");
}

#[test]
fn test_cyclic_chain_terminates() {
    init_tracing();

    let e = HostErr::new("Err", "outer", frames(1));
    let c = HostErr::new("Err", "inner", frames(1));
    e.link(&c);
    c.link(&e);

    let mut sink = Vec::new();
    trace_to(e.as_ref(), &mut sink, Some(&with_causes())).unwrap();
    let text = String::from_utf8(sink).unwrap();

    assert_eq!(text.matches(CAUSED_BY).count(), 2);
    assert!(text.contains("Caused by: Err: inner\n"));
    assert!(text.ends_with("Caused by: [CIRCULAR REFERENCE: Err: outer]\n"));
}

#[test]
fn test_self_cause_terminates() {
    let e = HostErr::new("Err", "loop", Vec::new());
    e.link(&e);

    let text = e.trace_to_string(Some(&with_causes())).unwrap();
    assert_eq!(text, "Err: loop\nCaused by: [CIRCULAR REFERENCE: Err: loop]\n");
}

#[test]
fn test_long_chain_truncated() {
    let mut err = TracedErr::new("root");
    for i in 0..100 {
        err = TracedErr::new(format!("level {}", i)).caused_by(err);
    }

    let options = TraceOptions::builder()
        .include_causes(true)
        .max_causes(5)
        .build();
    let text = err.trace_to_string(Some(&options)).unwrap();

    assert_eq!(text.matches(CAUSED_BY).count(), 5);
    assert!(text.ends_with("    ... cause chain truncated after 5 causes\n"));
}

#[test]
fn test_sink_failure_is_io_failure() {
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = TracedErr::new("boom").at("f", "a.src:10");
    let result = trace_to(&err, &mut FullDisk, None);

    assert!(matches!(result, Err(TraceError::IoFailure(_))));
}

#[test]
fn test_sink_is_not_flushed() {
    struct CountingSink {
        bytes: Vec<u8>,
        flushes: usize,
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    let mut sink = CountingSink {
        bytes: Vec::new(),
        flushes: 0,
    };
    trace_to(&TracedErr::new("boom"), &mut sink, None).unwrap();

    assert_eq!(sink.bytes, b"Error: boom\n");
    assert_eq!(sink.flushes, 0);
}

#[test]
fn test_file_sink() {
    let mut file = tempfile::tempfile().unwrap();
    let err = TracedErr::new("boom").at("f", "a.src:10");

    err.trace_to(&mut file, None).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "Error: boom\n    at f (a.src:10)\n");
}

#[test]
fn test_host_option_map() {
    let err = TracedErr::new("boom").with_frames(frames(5));
    let options: OptionMap =
        serde_json::from_str(r#"{"indent": 2, "maxDepth": 2, "color": "never"}"#).unwrap();
    let mut sink = Vec::new();

    trace_dynamic(Some(&err), Some(&mut sink), Some(&options)).unwrap();

    assert_eq!(
        String::from_utf8(sink).unwrap(),
        "  Error: boom\n      at fn0 (mod.src:1)\n      at fn1 (mod.src:2)\n      ... 3 more\n"
    );
}

#[test]
fn test_host_option_map_prefers_max_frames() {
    let err = TracedErr::new("boom").with_frames(frames(5));
    let options: OptionMap =
        serde_json::from_str(r#"{"maxDepth": 1, "max_frames": 3}"#).unwrap();
    let mut sink = Vec::new();

    trace_dynamic(Some(&err), Some(&mut sink), Some(&options)).unwrap();

    let text = String::from_utf8(sink).unwrap();
    assert_eq!(frame_lines(&text).len(), 3);
    assert!(text.ends_with("    ... 2 more\n"));
}

#[test]
fn test_json_output() {
    let err = TracedErr::new("save failed")
        .at("save", "app.src:3")
        .caused_by(TracedErr::new("disk full").with_kind("IOErr"));
    let options = TraceOptions::builder()
        .include_causes(true)
        .format(TraceFormat::Json)
        .build();

    let text = err.trace_to_string(Some(&options)).unwrap();
    let report: TraceReport = serde_json::from_str(&text).unwrap();

    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].frames, vec![Frame::at("save", "app.src:3")]);
    assert_eq!(report.errors[1].kind, "IOErr");
    assert!(report.truncation.is_none());
}

#[test]
fn test_json_reports_cycle() {
    let e = HostErr::new("Err", "loop", Vec::new());
    e.link(&e);

    let options = TraceOptions::builder()
        .include_causes(true)
        .format(TraceFormat::Json)
        .build();
    let report: TraceReport =
        serde_json::from_str(&e.trace_to_string(Some(&options)).unwrap()).unwrap();

    assert_eq!(
        report.truncation,
        Some(Truncation::Circular {
            kind: "Err".to_string(),
            message: "loop".to_string(),
        })
    );
}

#[test]
fn test_concurrent_writers_with_own_sinks() {
    let writer = Arc::new(TraceWriter::new(TraceOptions::default()));
    let err = Arc::new(TracedErr::new("shared").with_frames(frames(3)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let writer = Arc::clone(&writer);
            let err = Arc::clone(&err);
            std::thread::spawn(move || {
                let mut sink = Vec::new();
                writer.trace_to(err.as_ref(), &mut sink).unwrap();
                String::from_utf8(sink).unwrap()
            })
        })
        .collect();

    let expected = err.trace_to_string(None).unwrap();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_rust_error_chain() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");
    let err = anyhow::Error::new(io).context("starting service");

    let text = TracedErr::from(&err)
        .trace_to_string(Some(&with_causes()))
        .unwrap();
    assert_eq!(
        text,
        "Error: starting service\nCaused by: Error: config.toml missing\n"
    );
}

//! Report sinks
//!
//! A sink receives each finished [`Measurement`] and renders it. Every
//! report (line plus optional advisory) is written under one lock so that
//! reports from concurrent timers never interleave.

use crate::measurement::{Measurement, ADVISORY};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;

/// Destination of report lines
pub trait ReportSink: Send + Sync {
    fn report(&self, measurement: &Measurement) -> io::Result<()>;
}

/// Render a report onto any writer
pub fn write_report<W: Write + ?Sized>(out: &mut W, measurement: &Measurement) -> io::Result<()> {
    writeln!(out, "{}", measurement)?;
    if measurement.needs_advisory() {
        // no trailing newline
        out.write_all(ADVISORY.as_bytes())?;
    }
    out.flush()
}

/// Process standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn report(&self, measurement: &Measurement) -> io::Result<()> {
        write_report(&mut io::stdout().lock(), measurement)
    }
}

/// Process standard error
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl ReportSink for StderrSink {
    fn report(&self, measurement: &Measurement) -> io::Result<()> {
        write_report(&mut io::stderr().lock(), measurement)
    }
}

/// Any owned writer, e.g. a file
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write + Send> ReportSink for WriterSink<W> {
    fn report(&self, measurement: &Measurement) -> io::Result<()> {
        write_report(&mut *self.inner.lock(), measurement)
    }
}

/// Shared in-memory buffer; clones write to the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl ReportSink for MemorySink {
    fn report(&self, measurement: &Measurement) -> io::Result<()> {
        write_report(&mut *self.buf.lock(), measurement)
    }
}

/// Emits reports as `tracing` events instead of raw text
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, measurement: &Measurement) -> io::Result<()> {
        info!(
            target: "block_timer::report",
            block = measurement.name(),
            value = measurement.value() as u64,
            unit = measurement.unit().label(),
            completed = measurement.completed(),
            "{}",
            measurement
        );
        if measurement.needs_advisory() {
            info!(target: "block_timer::report", "{}", ADVISORY);
        }
        Ok(())
    }
}

/// Sink selection in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    Tracing,
}

impl OutputTarget {
    pub fn into_sink(self) -> Arc<dyn ReportSink> {
        match self {
            OutputTarget::Stdout => Arc::new(StdoutSink),
            OutputTarget::Stderr => Arc::new(StderrSink),
            OutputTarget::Tracing => Arc::new(TracingSink),
        }
    }
}

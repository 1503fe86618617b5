//! Block Timer
//!
//! Measures the wall-clock time of a single block of work and reports it in
//! seconds, milliseconds or nanoseconds.
//!
//! ## Architecture
//! - Unit: closed set of reporting units and truncating conversion
//! - Measurement: immutable result of one timed block
//! - Sink: where report lines go (stdout, stderr, writer, memory, tracing)
//! - Timer: runs the work once under a drop guard and emits the report
//!
//! ```no_run
//! use block_timer::{timer, TimeUnit};
//!
//! let m = timer(|| std::thread::sleep(std::time::Duration::from_millis(5)), TimeUnit::Milliseconds, "Sleep");
//! // ["Sleep" execution time: 5 miliseconds]
//! assert!(m.value() >= 5);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod measurement;
pub mod sink;
pub mod timer;
pub mod unit;

pub use config::Config;
pub use error::{Result, TimerError};
pub use measurement::{Measurement, ADVISORY, DEFAULT_NAME};
pub use sink::{MemorySink, OutputTarget, ReportSink, StderrSink, StdoutSink, TracingSink, WriterSink};
pub use timer::{time_block, timer, timer_with_label, Timer, TimerGuard};
pub use unit::TimeUnit;

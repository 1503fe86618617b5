//! Timing of a single block of work
//!
//! Everything funnels through [`TimerGuard`]: the start instant is taken when
//! the guard is created and the report is emitted when it is stopped or
//! dropped, so every exit path of the timed block is observed.

use crate::config::Config;
use crate::error::Result;
use crate::measurement::{Measurement, DEFAULT_NAME};
use crate::sink::{ReportSink, StdoutSink};
use crate::unit::TimeUnit;
use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Reusable timer settings: block name, unit, sink and unwind policy
#[derive(Clone)]
pub struct Timer {
    name: String,
    unit: TimeUnit,
    sink: Arc<dyn ReportSink>,
    report_on_unwind: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("report_on_unwind", &self.report_on_unwind)
            .finish_non_exhaustive()
    }
}

impl Timer {
    /// Milliseconds to stdout, silent on unwind
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: TimeUnit::default(),
            sink: Arc::new(StdoutSink),
            report_on_unwind: false,
        }
    }

    /// Build from the `timer` and `output` config sections
    pub fn from_config(config: &Config) -> Result<Self> {
        let unit = config.timer.unit()?;
        Ok(Self::new(config.timer.default_name.clone())
            .unit(unit)
            .report_on_unwind(config.timer.report_on_unwind)
            .shared_sink(config.output.target.into_sink()))
    }

    pub fn unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn sink<S: ReportSink + 'static>(self, sink: S) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    pub fn shared_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Also report blocks that panic (or futures that are dropped early)
    pub fn report_on_unwind(mut self, enabled: bool) -> Self {
        self.report_on_unwind = enabled;
        self
    }

    /// Same settings under another block name
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.unit
    }

    /// Start timing a scope; the report is emitted when the guard drops
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard::new(self, OnDrop::Report)
    }

    /// Execute `work` exactly once on this thread and report its duration
    pub fn run<T, F>(&self, work: F) -> (T, Measurement)
    where
        F: FnOnce() -> T,
    {
        let guard = TimerGuard::new(self, OnDrop::Abandon);
        let value = work();
        (value, guard.stop())
    }

    /// Await `future` to completion and report how long that took
    pub async fn run_async<F>(&self, future: F) -> (F::Output, Measurement)
    where
        F: Future,
    {
        let guard = TimerGuard::new(self, OnDrop::Abandon);
        let value = future.await;
        (value, guard.stop())
    }

    fn emit(&self, measurement: &Measurement) {
        debug!(
            block = measurement.name(),
            elapsed_ns = measurement.elapsed().as_nanos() as u64,
            completed = measurement.completed(),
            "measurement taken"
        );
        if let Err(e) = self.sink.report(measurement) {
            warn!(block = measurement.name(), "failed to report measurement: {}", e);
        }
    }
}

/// What an unstopped guard does when it goes out of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnDrop {
    /// Scope ended normally
    Report,
    /// Work never finished: it panicked or its future was dropped
    Abandon,
}

/// Running measurement tied to a [`Timer`]
#[must_use = "dropping the guard immediately ends the measurement"]
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    start: Instant,
    on_drop: OnDrop,
    stopped: bool,
}

impl<'a> TimerGuard<'a> {
    fn new(timer: &'a Timer, on_drop: OnDrop) -> Self {
        Self {
            timer,
            on_drop,
            stopped: false,
            start: Instant::now(),
        }
    }

    /// Time since the guard was created
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// End the measurement, report it and hand it back
    pub fn stop(mut self) -> Measurement {
        let elapsed = self.start.elapsed();
        self.stopped = true;
        let measurement = Measurement::new(self.timer.name.clone(), self.timer.unit, elapsed);
        self.timer.emit(&measurement);
        measurement
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        let elapsed = self.start.elapsed();
        let timer = self.timer;

        if self.on_drop == OnDrop::Report && !thread::panicking() {
            timer.emit(&Measurement::new(timer.name.clone(), timer.unit, elapsed));
            return;
        }

        if thread::panicking() {
            warn!(
                block = timer.name.as_str(),
                elapsed_ns = elapsed.as_nanos() as u64,
                "timed block panicked"
            );
        } else {
            debug!(
                block = timer.name.as_str(),
                elapsed_ns = elapsed.as_nanos() as u64,
                "timed block dropped before completion"
            );
        }
        if timer.report_on_unwind {
            timer.emit(&Measurement::unwound(timer.name.clone(), timer.unit, elapsed));
        }
    }
}

/// Time `work` and print the report to stdout
pub fn timer<F: FnOnce()>(work: F, unit: TimeUnit, name: &str) -> Measurement {
    Timer::new(name).unit(unit).run(work).1
}

/// [`timer`] with a textual unit label; unknown labels mean milliseconds
pub fn timer_with_label<F: FnOnce()>(work: F, format: &str, name: &str) -> Measurement {
    timer(work, TimeUnit::from_label_lossy(format), name)
}

/// [`timer`] in milliseconds under the default block name
pub fn time_block<F: FnOnce()>(work: F) -> Measurement {
    timer(work, TimeUnit::default(), DEFAULT_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::ADVISORY;
    use crate::sink::MemorySink;
    use std::io;
    use std::panic::{self, AssertUnwindSafe};

    fn memory_timer(name: &str, unit: TimeUnit) -> (Timer, MemorySink) {
        let sink = MemorySink::new();
        (Timer::new(name).unit(unit).sink(sink.clone()), sink)
    }

    #[test]
    fn test_sleep_millis() {
        let (timer, sink) = memory_timer("Sleep", TimeUnit::Milliseconds);
        let ((), m) = timer.run(|| thread::sleep(Duration::from_millis(5)));

        assert!(m.value() >= 5);
        assert!(m.completed());
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], format!("[\"Sleep\" execution time: {} miliseconds]", m.value()));
    }

    #[test]
    fn test_noop_nanos_default_name() {
        let (timer, sink) = memory_timer(DEFAULT_NAME, TimeUnit::Nanoseconds);
        let ((), m) = timer.run(|| {});
        assert_eq!(sink.contents(), format!("[\"Code\" execution time: {} nanoseconds]\n", m.value()));
    }

    #[test]
    fn test_work_runs_exactly_once() {
        let (timer, sink) = memory_timer("once", TimeUnit::Nanoseconds);
        let mut calls = 0;
        let (out, _) = timer.run(|| {
            calls += 1;
            calls * 10
        });
        assert_eq!(calls, 1);
        assert_eq!(out, 10);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_repeated_calls_are_structurally_identical() {
        let (timer, sink) = memory_timer(DEFAULT_NAME, TimeUnit::Milliseconds);
        timer.run(|| {});
        timer.run(|| {});
        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.starts_with("[\"Code\" execution time: "));
            assert!(line.ends_with(" miliseconds]"));
        }
    }

    #[test]
    fn test_seconds_advisory_at_one_second_boundary() {
        let (timer, sink) = memory_timer("Slow", TimeUnit::Seconds);
        let ((), m) = timer.run(|| thread::sleep(Duration::from_millis(1_100)));

        // 1.1 s truncates to 1, which is still <= 1
        if m.value() == 1 {
            assert_eq!(sink.contents(), format!("[\"Slow\" execution time: 1 seconds]\n{ADVISORY}"));
        }
        assert_eq!(m.needs_advisory(), m.value() <= 1);
    }

    #[test]
    fn test_seconds_advisory_for_fast_work() {
        let (timer, sink) = memory_timer("fast", TimeUnit::Seconds);
        timer.run(|| {});
        assert_eq!(sink.contents(), format!("[\"fast\" execution time: 0 seconds]\n{ADVISORY}"));
    }

    #[test]
    fn test_panic_propagates_without_report() {
        let (timer, sink) = memory_timer("boom", TimeUnit::Milliseconds);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            timer.run(|| panic!("work failed"));
        }));

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"work failed"));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_panic_reported_when_enabled() {
        let (timer, sink) = memory_timer("boom", TimeUnit::Milliseconds);
        let timer = timer.report_on_unwind(true);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            timer.run(|| panic!("work failed"));
        }));

        assert!(result.is_err());
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[\"boom\" execution time: "));
    }

    #[test]
    fn test_scoped_guard_reports_on_drop() {
        let (timer, sink) = memory_timer("scope", TimeUnit::Nanoseconds);
        {
            let _guard = timer.start();
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_guard_stop_reports_once() {
        let (timer, sink) = memory_timer("stop", TimeUnit::Milliseconds);
        let guard = timer.start();
        thread::sleep(Duration::from_millis(2));
        assert!(guard.elapsed() >= Duration::from_millis(2));
        let m = guard.stop();
        assert!(m.value() >= 2);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_named_keeps_sink_and_unit() {
        let (timer, sink) = memory_timer("a", TimeUnit::Nanoseconds);
        let other = timer.named("b");
        assert_eq!(other.time_unit(), TimeUnit::Nanoseconds);
        other.run(|| {});
        assert!(sink.contents().starts_with("[\"b\" execution time: "));
        assert_eq!(timer.name(), "a");
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn report(&self, _: &Measurement) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_sink_failure_still_returns_measurement() {
        let timer = Timer::new("broken").sink(FailingSink);
        let (v, m) = timer.run(|| 7);
        assert_eq!(v, 7);
        assert!(m.completed());
    }

    #[test]
    fn test_concurrent_runs_share_timer() {
        let (timer, sink) = memory_timer("par", TimeUnit::Nanoseconds);
        let timer = Arc::new(timer);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let timer = Arc::clone(&timer);
                thread::spawn(move || timer.run(|| thread::sleep(Duration::from_millis(1))).1)
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().value() >= 1_000_000);
        }
        assert_eq!(sink.lines().len(), 4);
    }

    #[test]
    fn test_free_functions() {
        let m = timer(|| {}, TimeUnit::Nanoseconds, "free");
        assert_eq!(m.name(), "free");
        assert_eq!(m.unit(), TimeUnit::Nanoseconds);

        let m = timer_with_label(|| {}, "typo", "label");
        assert_eq!(m.unit(), TimeUnit::Milliseconds);

        let m = time_block(|| {});
        assert_eq!(m.name(), DEFAULT_NAME);
        assert_eq!(m.unit(), TimeUnit::Milliseconds);
    }

    #[tokio::test]
    async fn test_run_async() {
        let (timer, sink) = memory_timer("async", TimeUnit::Milliseconds);
        let (v, m) = timer
            .run_async(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                "done"
            })
            .await;
        assert_eq!(v, "done");
        assert!(m.value() >= 5);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_dropped_future_is_not_reported_by_default() {
        let (timer, sink) = memory_timer("cancel", TimeUnit::Milliseconds);
        let mut fut = tokio_test::task::spawn(timer.run_async(std::future::pending::<()>()));
        assert!(fut.poll().is_pending());
        drop(fut);
        assert!(sink.contents().is_empty());

        let timer = timer.report_on_unwind(true);
        let mut fut = tokio_test::task::spawn(timer.run_async(std::future::pending::<()>()));
        assert!(fut.poll().is_pending());
        drop(fut);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_run_async_block_on() {
        let (timer, _sink) = memory_timer("ready", TimeUnit::Nanoseconds);
        let (v, m) = tokio_test::block_on(timer.run_async(async { 1 + 1 }));
        assert_eq!(v, 2);
        assert!(m.completed());
    }
}

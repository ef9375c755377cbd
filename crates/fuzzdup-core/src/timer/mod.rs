//! Wall-clock timing of stage entry points.
//!
//! [`Timed`] wraps an operation, reports when it starts and, if it succeeds, how
//! long it took. The operation's value or error is handed back untouched; a failed
//! operation gets no finish report.

use std::{
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use tracing::info;

/// Sink for timing reports.
pub trait TimingReport {
    fn started(&self, name: &str);
    fn finished(&self, name: &str, elapsed: Duration);
}

impl<T> TimingReport for &T
where
    T: TimingReport + ?Sized,
{
    fn started(&self, name: &str) {
        (**self).started(name)
    }

    fn finished(&self, name: &str, elapsed: Duration) {
        (**self).finished(name, elapsed)
    }
}

/// Default sink: one `info` event per report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReport;

impl TimingReport for TracingReport {
    fn started(&self, name: &str) {
        info!(function = name, "function {name} started...");
    }

    fn finished(&self, name: &str, elapsed: Duration) {
        info!(
            function = name,
            elapsed_secs = elapsed.as_secs_f64(),
            "function {name} finished in {} seconds",
            Elapsed(elapsed)
        );
    }
}

/// Displays a duration as seconds with one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0.as_secs_f64())
    }
}

/// A named operation whose duration is reported to `R`.
#[derive(Debug, Clone)]
pub struct Timed<'a, R = TracingReport> {
    name: &'a str,
    report: R,
}

impl<'a> Timed<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            report: TracingReport,
        }
    }
}

impl<'a, R> Timed<'a, R>
where
    R: TimingReport,
{
    pub fn with_report<S: TimingReport>(self, report: S) -> Timed<'a, S> {
        Timed {
            name: self.name,
            report,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Run a fallible operation. Errors return immediately, without a finish report.
    pub fn run<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.report.started(self.name);
        let start = Instant::now();
        let out = op()?;
        self.report.finished(self.name, start.elapsed());
        Ok(out)
    }

    /// Run an operation that cannot fail.
    pub fn call<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.report.started(self.name);
        let start = Instant::now();
        let out = op();
        self.report.finished(self.name, start.elapsed());
        out
    }

    /// Await a fallible future, with the same reporting as [`Timed::run`].
    pub async fn run_async<T, E, Fut>(&self, fut: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        self.report.started(self.name);
        let start = Instant::now();
        let out = fut.await?;
        self.report.finished(self.name, start.elapsed());
        Ok(out)
    }
}

/// Run `op` under `name`, reporting through `tracing`.
pub fn timed<T, E, F>(name: &str, op: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    Timed::new(name).run(op)
}

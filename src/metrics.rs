use core::{
    fmt::{self, Debug, Display},
    ops::{Add, Div, Sub},
};
use std::time::{Duration, Instant};

use serde::Serialize;

pub trait Metric {
    type Unit: Copy
        + PartialOrd
        + PartialEq
        + Add<Output = Self::Unit>
        + Sub<Output = Self::Unit>
        + Div<Self::Divisor, Output = Self::Unit>
        + Debug;
    type Divisor: TryFrom<usize> /* = Self::Unit */;
    type Start;

    const UNIT_NAME: &'static str = "unknown";

    fn start(&mut self) -> Self::Start;
    fn end(&mut self, start: Self::Start) -> Self::Unit;
    fn print(u: &Self::Unit, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(u, f)
    }

    /// The measurement in seconds, for metrics that measure time.
    ///
    /// Reporters use this to derive a [`Throughput`]; metrics that count
    /// something else (cycles, calls) leave it as `None`.
    #[allow(unused_variables)]
    fn seconds(u: &Self::Unit) -> Option<f64> {
        None
    }
}

/// Formats a `Unit` the way its [`Metric`] wants it printed.
pub struct MetricFmtAdapter<'u, M: Metric>(pub &'u M::Unit);

impl<M: Metric> Display for MetricFmtAdapter<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        M::print(self.0, f)
    }
}

/// A placeholder metric that just returns 1.
///
/// Using this with [`BenchmarkRunner`](crate::BenchmarkRunner) should
/// yield `1` as the "result" for every benchmark.
#[derive(Debug, Default)]
pub struct NoOpMetric;

impl Metric for NoOpMetric {
    type Unit = u32;
    type Start = ();
    type Divisor = u32;

    fn start(&mut self) {}
    fn end(&mut self, (): ()) -> u32 {
        1
    }
}

/// Wall-clock time from a monotonic [`Instant`].
#[derive(Debug, Default)]
pub struct WallTime;

impl Metric for WallTime {
    type Start = Instant;
    type Unit = Duration;
    type Divisor = u32;

    const UNIT_NAME: &'static str = "time";

    fn start(&mut self) -> Instant {
        Instant::now()
    }

    fn end(&mut self, s: Instant) -> Duration {
        s.elapsed()
    }

    fn seconds(u: &Duration) -> Option<f64> {
        Some(u.as_secs_f64())
    }
}

/// Iterations per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Throughput(pub f64);

impl Throughput {
    /// `None` when no time elapsed (the rate would be infinite).
    pub fn per_second(iterations: usize, elapsed_secs: f64) -> Option<Self> {
        if elapsed_secs > 0.0 {
            Some(Throughput(iterations as f64 / elapsed_secs))
        } else {
            None
        }
    }

    /// How many times slower `self` is than `fastest`.
    pub fn slowdown_from(self, fastest: Throughput) -> f64 {
        fastest.0 / self.0
    }
}

impl Display for Throughput {
    // `1234567.0` -> `1.235M i/s`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (scaled, suffix) = match self.0 {
            r if r >= 1e9 => (r / 1e9, "B"),
            r if r >= 1e6 => (r / 1e6, "M"),
            r if r >= 1e3 => (r / 1e3, "k"),
            r => (r, ""),
        };

        write!(f, "{scaled:.3}{suffix} i/s")
    }
}

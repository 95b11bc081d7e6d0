use core::ops::Add;

use crate::metrics::{Metric, Throughput};
use crate::Outcome;

/// Running min / max / sum over measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats<U> {
    pub min: U,
    pub max: U,
    pub sum: U,
    pub count: usize,
}

impl<U: Copy + PartialOrd + Add<Output = U>> Stats<U> {
    pub fn new(first: U) -> Self {
        Stats {
            min: first,
            max: first,
            sum: first,
            count: 1,
        }
    }

    pub fn push(&mut self, measurement: U) {
        if measurement < self.min {
            self.min = measurement;
        }
        if measurement > self.max {
            self.max = measurement;
        }
        self.sum = self.sum + measurement;
        self.count += 1;
    }
}

/// Every measured iteration of one (input, benchmark) pair.
///
/// Only passing iterations contribute to [`Tally::passed`]; failing ones are
/// just counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tally<U> {
    passed: Option<Stats<U>>,
    failed: usize,
}

impl<U> Default for Tally<U> {
    fn default() -> Self {
        Tally {
            passed: None,
            failed: 0,
        }
    }
}

impl<U: Copy + PartialOrd + Add<Output = U>> Tally<U> {
    pub fn record(&mut self, measurement: U, outcome: Outcome) {
        match (outcome, &mut self.passed) {
            (Outcome::Failed, _) => self.failed += 1,
            (Outcome::Passed, Some(stats)) => stats.push(measurement),
            (Outcome::Passed, None) => self.passed = Some(Stats::new(measurement)),
        }
    }
}

impl<U> Tally<U> {
    /// `None` when every iteration failed.
    pub fn passed(&self) -> Option<&Stats<U>> {
        self.passed.as_ref()
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn iterations(&self) -> usize {
        self.passed.as_ref().map_or(0, |s| s.count) + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary<U> {
    pub mean: U,
    /// Largest distance from the mean to either extreme.
    pub spread: U,
    pub min: U,
    pub max: U,
    /// Only for metrics that measure time.
    pub throughput: Option<Throughput>,
}

/// `None` if the iteration count doesn't fit the metric's divisor type.
pub(crate) fn summarize<M: Metric>(stats: &Stats<M::Unit>) -> Option<Summary<M::Unit>> {
    let count: M::Divisor = stats.count.try_into().ok()?;
    let mean = stats.sum / count;

    let upper = stats.max - mean;
    let lower = mean - stats.min;
    let spread = if upper > lower { upper } else { lower };

    let throughput = M::seconds(&mean).and_then(|secs| Throughput::per_second(1, secs));

    Some(Summary {
        mean,
        spread,
        min: stats.min,
        max: stats.max,
        throughput,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{NoOpMetric, WallTime};
    use std::time::Duration;

    #[test]
    fn summarizes_durations() {
        let mut s = Stats::new(Duration::from_millis(10));
        s.push(Duration::from_millis(30));
        s.push(Duration::from_millis(20));

        let sum = summarize::<WallTime>(&s).unwrap();
        assert_eq!(sum.mean, Duration::from_millis(20));
        assert_eq!(sum.spread, Duration::from_millis(10));
        assert_eq!(sum.min, Duration::from_millis(10));
        assert_eq!(sum.max, Duration::from_millis(30));
        assert_eq!(sum.throughput, Some(Throughput(50.0)));
    }

    #[test]
    fn non_time_metrics_have_no_throughput() {
        let mut s = Stats::new(1u32);
        s.push(1);

        let sum = summarize::<NoOpMetric>(&s).unwrap();
        assert_eq!(sum.mean, 1);
        assert_eq!(sum.spread, 0);
        assert_eq!(sum.throughput, None);
    }

    #[test]
    fn failures_stay_out_of_the_stats() {
        let mut t = Tally::default();
        t.record(Duration::from_millis(5), Outcome::Passed);
        t.record(Duration::from_secs(9), Outcome::Failed);
        t.record(Duration::from_millis(7), Outcome::Passed);

        assert_eq!(t.iterations(), 3);
        assert_eq!(t.failed(), 1);
        let passed = t.passed().unwrap();
        assert_eq!(passed.count, 2);
        assert_eq!(passed.max, Duration::from_millis(7));
    }

    #[test]
    fn all_failed_leaves_no_stats() {
        let mut t = Tally::default();
        t.record(1u32, Outcome::Failed);
        t.record(1u32, Outcome::Failed);

        assert!(t.passed().is_none());
        assert_eq!((t.failed(), t.iterations()), (2, 2));
    }
}

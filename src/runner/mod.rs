use core::{any::Any, fmt::Debug};

use tracing::info;

use crate::reporters::Tally;
use crate::{Benchmark, Metric, Reporter};

mod support;
pub use support::black_box;
#[doc(hidden)]
pub use support::{Append, HListIterator};

mod single;
pub use single::build_single as single;

mod suite;
pub use suite::build_suite as suite;

/// How many times each (input, benchmark) pair runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Measured and reported; at least one.
    pub iterations: usize,
    /// Run first (setup and teardown included), never reported.
    pub warmup: usize,
}

impl Schedule {
    /// Runs `bench` on `inp` for the warmup and then the measured
    /// iterations, tallying each measured one by its [`Outcome`](crate::Outcome).
    pub fn measure<Inp, B, M>(&self, bench: &mut B, inp: &Inp, metric: &mut M) -> Tally<M::Unit>
    where
        Inp: Any + Debug,
        B: Benchmark<Inp>,
        M: Metric,
    {
        for _ in 0..self.warmup {
            bench.setup(inp);
            let res = black_box(bench.run(black_box(inp)));
            bench.teardown(inp, res);
        }

        let mut tally = Tally::default();
        for _ in 0..self.iterations {
            bench.setup(inp);
            let start = metric.start();
            let res = black_box(bench.run(black_box(inp)));
            let measurement = metric.end(start);
            tally.record(measurement, bench.teardown(inp, res));
        }

        tally
    }
}

pub struct BenchmarkRunner<L: GroupList = ()> {
    schedule: Schedule,
    groups: L,
}

impl Default for BenchmarkRunner<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRunner {
    pub const fn new() -> BenchmarkRunner<()> {
        BenchmarkRunner {
            schedule: Schedule {
                iterations: 1,
                warmup: 0,
            },
            groups: (),
        }
    }
}

impl<L: GroupList> BenchmarkRunner<L> {
    /// Measured iterations per (input, benchmark) pair. Must be non-zero.
    pub const fn set_iterations(mut self, it: usize) -> Self {
        self.schedule.iterations = it;
        self
    }

    /// Iterations run before measuring starts; these are never handed to
    /// the reporter.
    pub const fn set_warmup(mut self, it: usize) -> Self {
        self.schedule.warmup = it;
        self
    }

    /// Groups run in the order they are added.
    #[allow(clippy::should_implement_trait)]
    pub fn add<X>(self, group: X) -> BenchmarkRunner<L::Output>
    where
        L: Append<X>,
        L::Output: GroupList,
    {
        BenchmarkRunner {
            schedule: self.schedule,
            groups: self.groups.append(group),
        }
    }

    pub fn run<M: Metric, R: Reporter<M>>(self, metric: &mut M, reporter: &mut R)
    where
        for<'a> HListIterator<'a, dyn GroupList + 'a>: Clone,
    {
        let Schedule { iterations, warmup } = self.schedule;
        assert!(iterations > 0, "at least one iteration is required");
        info!(groups = self.groups.len(), iterations, warmup, "starting benchmark run");

        reporter.run_started(iterations, warmup, HListIterator(&self.groups as &dyn GroupList));
        self.groups.run(metric, reporter, self.schedule);
        reporter.run_finished();
    }
}

/// The top-level `(group, rest)` list a [`BenchmarkRunner`] holds; groups
/// are single benchmarks or suites.
#[allow(clippy::len_without_is_empty)]
pub trait GroupList {
    fn run<M: Metric, R: Reporter<M>>(self, m: &mut M, r: &mut R, schedule: Schedule)
    where
        Self: Sized;

    /// This list's head (its name) and the rest of the list, with the
    /// concrete benchmark types erased so names can be walked lazily.
    fn name_and_next<'a>(&'a self) -> Option<(&'static str, &'a (dyn GroupList + 'a))>;
    fn len(&self) -> usize;
}

impl<'a> Iterator for HListIterator<'a, (dyn GroupList + 'a)> {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        let (name, next) = self.0.name_and_next()?;
        self.0 = next;

        Some(name)
    }
}

impl GroupList for () {
    fn run<M: Metric, R: Reporter<M>>(self, _m: &mut M, _r: &mut R, _schedule: Schedule) {}

    fn name_and_next(&self) -> Option<(&'static str, &dyn GroupList)> {
        None
    }
    fn len(&self) -> usize {
        0
    }
}

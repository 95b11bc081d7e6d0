//! Receivers of benchmark results.
//!
//! The runner measures every (input, benchmark) pair to completion and then
//! hands the reporter one [`Sample`]; reporters never see raw iterations.
//! Events arrive in this order:
//!
//! ```text
//! run_started
//!   group_started            (a single benchmark or a suite)
//!     input_started
//!       measured             (once per member; once for a single benchmark)
//!     input_finished
//!     ...
//!   group_finished
//!   ...
//! run_finished
//! ```

use core::fmt::Debug;

use crate::Metric;

mod io;
pub use io::{Output, OutputAdapter, Void};

mod stats;
pub use stats::{Stats, Summary, Tally};

mod basic;
pub use basic::*;

#[cfg(feature = "json")]
#[cfg_attr(all(docs, not(doctest)), doc(cfg(feature = "json")))]
mod json;
#[cfg(feature = "json")]
pub use json::*;

/// How a group's members relate to its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// One benchmark, its own name is the group's name.
    Single,
    /// Several benchmarks measured side by side on every input.
    Suite,
}

/// The result of measuring one benchmark on one input.
#[derive(Debug)]
pub struct Sample<'a, U> {
    pub benchmark: &'static str,
    /// Position of the benchmark within its group.
    pub benchmark_idx: usize,
    pub input_idx: usize,
    pub input: &'a dyn Debug,
    pub tally: &'a Tally<U>,
}

#[allow(unused_variables)]
pub trait Reporter<M: Metric> {
    /// `groups` yields the name of every top-level group, in run order.
    fn run_started<G: Iterator<Item = &'static str> + Clone>(
        &mut self,
        iterations: usize,
        warmup: usize,
        groups: G,
    ) {
    }

    fn group_started<B: Iterator<Item = &'static str> + Clone>(
        &mut self,
        kind: GroupKind,
        name: &'static str,
        inputs_size_hint: (usize, Option<usize>),
        benchmarks: B,
    ) {
    }

    fn input_started(&mut self, input_idx: usize, input: &dyn Debug) {}
    fn measured(&mut self, sample: Sample<'_, M::Unit>) {}
    fn input_finished(&mut self, input_idx: usize) {}

    fn group_finished(&mut self, name: &'static str) {}
    fn run_finished(&mut self) {}
}

/// A placeholder reporter that does nothing.
pub struct NoOpReporter;

impl<M: Metric> Reporter<M> for NoOpReporter {}

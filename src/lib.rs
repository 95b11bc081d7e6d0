#![cfg_attr(docs, feature(doc_cfg))]
//! Micro-benchmarks for two pairs of strategies, plus the harness that runs
//! them.
//!
//! The workloads:
//!  - [`fib`]: naive vs. memoized Fibonacci evaluation.
//!  - [`transform`]: a protocol transformer built on either evaluator.
//!  - [`resolve`]: sequential vs. concurrent batched hostname resolution.
//!
//! The harness: [`Benchmark`]s are grouped into [`single`] benchmarks or
//! [`suite`]s, driven by a [`BenchmarkRunner`] that takes measurements with a
//! [`Metric`] and hands them to a [`Reporter`].
//!
//! ```
//! use memobench::{metrics::WallTime, reporters::NoOpReporter, suite, BenchmarkRunner};
//! use memobench::fib::{MemoizedFibonacci, NaiveFibonacci};
//! use memobench::workloads::FibBench;
//!
//! BenchmarkRunner::new()
//!     .set_iterations(3)
//!     .add(
//!         suite("fibonacci", [10i64, 15])
//!             .add("naive", FibBench::<NaiveFibonacci>::default())
//!             .add("memoized", FibBench::<MemoizedFibonacci>::default()),
//!     )
//!     .run(&mut WallTime, &mut NoOpReporter);
//! ```

mod error;
pub use error::{Error, Result};

mod bench;
pub use bench::{Benchmark, Outcome};

mod runner;
#[doc(hidden)]
pub use runner::{Append, GroupList, HListIterator};
pub use runner::{black_box, single, suite, BenchmarkRunner, Schedule};

pub mod metrics;
pub use metrics::Metric;

pub mod reporters;
pub use reporters::Reporter;

pub mod config;
pub mod fib;
pub mod resolve;
pub mod transform;
pub mod workloads;

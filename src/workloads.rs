//! [`Benchmark`] adapters for the Fibonacci, transformer and resolver
//! strategy pairs.
//!
//! Every adapter builds whatever carries state (evaluator, transformer) from
//! scratch inside `run`, so each measured iteration pays the cold-cache cost.
//! `teardown` turns an `Err` into [`Outcome::Failed`] so reporters can count
//! it, and logs the first one; the run goes on.

use core::marker::PhantomData;

use tracing::warn;

use crate::fib::FibonacciEvaluator;
use crate::resolve::{AddressList, Resolver};
use crate::transform::{ProtocolRecord, ProtocolTransformer};
use crate::{Benchmark, Outcome, Result};

#[derive(Debug, Default)]
struct Failures {
    count: usize,
}

impl Failures {
    fn record<T>(&mut self, workload: &'static str, res: Result<T>) -> Outcome {
        let outcome = Outcome::of(&res);
        if let Err(e) = res {
            // Only the first one; the rest are summed up on drop.
            if self.count == 0 {
                warn!(workload, error = %e, "benchmark iteration failed");
            }
            self.count += 1;
        }
        outcome
    }

    fn report(&self, workload: &'static str) {
        if self.count > 0 {
            warn!(workload, failures = self.count, "benchmark had failing iterations");
        }
    }
}

/// `fib(n)` on a freshly constructed `E`.
pub struct FibBench<E> {
    failures: Failures,
    _evaluator: PhantomData<fn() -> E>,
}

impl<E> Default for FibBench<E> {
    fn default() -> Self {
        Self {
            failures: Failures::default(),
            _evaluator: PhantomData,
        }
    }
}

impl<E> FibBench<E> {
    pub fn failures(&self) -> usize {
        self.failures.count
    }
}

impl<E: FibonacciEvaluator + Default> Benchmark<i64> for FibBench<E> {
    type Res = Result<u128>;

    fn run(&mut self, n: &i64) -> Result<u128> {
        E::default().fib(*n)
    }

    fn teardown(&mut self, _n: &i64, res: Result<u128>) -> Outcome {
        self.failures.record("fib", res)
    }
}

impl<E> Drop for FibBench<E> {
    fn drop(&mut self) {
        self.failures.report("fib");
    }
}

/// A new [`ProtocolTransformer`] per iteration, transformed once.
pub struct TransformBench<E> {
    failures: Failures,
    _evaluator: PhantomData<fn() -> E>,
}

impl<E> Default for TransformBench<E> {
    fn default() -> Self {
        Self {
            failures: Failures::default(),
            _evaluator: PhantomData,
        }
    }
}

impl<E> TransformBench<E> {
    pub fn failures(&self) -> usize {
        self.failures.count
    }
}

impl<E: FibonacciEvaluator + Default> Benchmark<ProtocolRecord> for TransformBench<E> {
    type Res = Result<String>;

    fn run(&mut self, record: &ProtocolRecord) -> Result<String> {
        let mut transformer = ProtocolTransformer::<E>::new(record);
        transformer.transform()?;
        Ok(transformer.into_output())
    }

    fn teardown(&mut self, _record: &ProtocolRecord, res: Result<String>) -> Outcome {
        self.failures.record("transform", res)
    }
}

impl<E> Drop for TransformBench<E> {
    fn drop(&mut self) {
        self.failures.report("transform");
    }
}

/// Resolves the whole hostname batch with `R`.
pub struct ResolveBench<R> {
    resolver: R,
    failures: Failures,
}

impl<R: Resolver> ResolveBench<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            failures: Failures::default(),
        }
    }

    pub fn failures(&self) -> usize {
        self.failures.count
    }
}

impl<R: Resolver> Benchmark<Vec<String>> for ResolveBench<R> {
    type Res = Result<Vec<AddressList>>;

    fn run(&mut self, hostnames: &Vec<String>) -> Self::Res {
        self.resolver.resolve(hostnames)
    }

    fn teardown(&mut self, _hostnames: &Vec<String>, res: Self::Res) -> Outcome {
        self.failures.record("resolve", res)
    }
}

impl<R> Drop for ResolveBench<R> {
    fn drop(&mut self) {
        self.failures.report("resolve");
    }
}

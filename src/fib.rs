//! Naive and memoized Fibonacci evaluators.
//!
//! Both evaluators follow the standard definition (`fib(0) = 0`,
//! `fib(1) = 1`) and take `&mut self` so that a memo cache is never shared
//! between callers by accident: concurrent users each construct their own
//! evaluator.

use std::collections::HashMap;

use crate::{Error, Result};

/// Largest `n` whose Fibonacci number fits in a `u128`.
pub const MAX_INPUT: u64 = 186;

pub trait FibonacciEvaluator {
    /// Returns the `n`-th Fibonacci number.
    ///
    /// Errors with [`Error::InvalidArgument`] when `n` is negative and with
    /// [`Error::Overflow`] when `n > MAX_INPUT`.
    fn fib(&mut self, n: i64) -> Result<u128>;
}

fn checked_index(n: i64) -> Result<u64> {
    let idx = u64::try_from(n).map_err(|_| Error::InvalidArgument { n })?;
    if idx > MAX_INPUT {
        return Err(Error::Overflow { n });
    }

    Ok(idx)
}

/// Recomputes every subproblem; exponential in `n`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaiveFibonacci;

pub fn recursive(n: u64) -> u128 {
    match n {
        0 | 1 => n.into(),
        n => recursive(n - 1) + recursive(n - 2),
    }
}

impl FibonacciEvaluator for NaiveFibonacci {
    fn fib(&mut self, n: i64) -> Result<u128> {
        checked_index(n).map(recursive)
    }
}

/// `n -> fib(n)` for every `n >= 2` derived so far.
///
/// Populated lazily and never evicted.
#[derive(Debug, Default, Clone)]
pub struct MemoCache(HashMap<u64, u128>);

impl MemoCache {
    pub fn get(&self, n: u64) -> Option<u128> {
        self.0.get(&n).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Consults (and fills) its own [`MemoCache`]; linear in `n` on a cold cache
/// and a single lookup once warm.
#[derive(Debug, Default)]
pub struct MemoizedFibonacci {
    cache: MemoCache,
    derivations: usize,
}

impl MemoizedFibonacci {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }

    /// Number of values computed from their predecessors rather than read
    /// back from the cache.
    pub fn derivations(&self) -> usize {
        self.derivations
    }

    fn memoized(&mut self, n: u64) -> u128 {
        match n {
            0 | 1 => n.into(),
            n => {
                if let Some(v) = self.cache.get(n) {
                    v
                } else {
                    self.derivations += 1;
                    let val = self.memoized(n - 1) + self.memoized(n - 2);
                    self.cache.0.insert(n, val);
                    val
                }
            }
        }
    }
}

impl FibonacciEvaluator for MemoizedFibonacci {
    fn fib(&mut self, n: i64) -> Result<u128> {
        let idx = checked_index(n)?;
        Ok(self.memoized(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ANS: [u128; 36] = [
        0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181, 6765,
        10946, 17711, 28657, 46368, 75025, 121393, 196418, 317811, 514229, 832040, 1346269,
        2178309, 3524578, 5702887, 9227465,
    ];

    // Stops at `fib(n)`; one more step would overflow at `MAX_INPUT`.
    fn iterative(n: u64) -> u128 {
        if n == 0 {
            return 0;
        }

        let (mut a, mut b) = (0u128, 1u128);
        for _ in 1..n {
            let next = a + b;
            a = b;
            b = next;
        }

        b
    }

    #[test]
    fn known_values() {
        for (n, want) in [(0, 0), (1, 1), (10, 55), (20, 6765)] {
            assert_eq!(NaiveFibonacci.fib(n).unwrap(), want, "naive: {n}");
            assert_eq!(MemoizedFibonacci::new().fib(n).unwrap(), want, "memoized: {n}");
        }
    }

    #[test]
    fn naive_and_memoized_agree() {
        let mut memo = MemoizedFibonacci::new();
        for (n, want) in ANS.iter().enumerate() {
            let n = n as i64;
            assert_eq!(NaiveFibonacci.fib(n).unwrap(), *want, "input: {n}");
            assert_eq!(memo.fib(n).unwrap(), *want, "input: {n}");
            assert_eq!(MemoizedFibonacci::new().fib(n).unwrap(), *want, "input: {n}");
        }
    }

    #[test]
    fn largest_input_matches_iterative() {
        let n = MAX_INPUT as i64;
        assert_eq!(MemoizedFibonacci::new().fib(n).unwrap(), iterative(MAX_INPUT));
        assert_eq!(iterative(20), 6765);

        // `fib(MAX_INPUT + 1)` really does not fit.
        assert!(iterative(MAX_INPUT).checked_add(iterative(MAX_INPUT - 1)).is_none());
        assert!(matches!(
            MemoizedFibonacci::new().fib(n + 1),
            Err(Error::Overflow { n: 187 })
        ));
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let mut memo = MemoizedFibonacci::new();
        assert_eq!(memo.fib(10).unwrap(), 55);
        // One derivation for every n in 2..=10.
        assert_eq!(memo.derivations(), 9);
        assert_eq!(memo.cache().len(), 9);
        assert_eq!(memo.cache().get(10), Some(55));

        assert_eq!(memo.fib(10).unwrap(), 55);
        assert_eq!(memo.derivations(), 9);

        // Smaller inputs are already cached too.
        assert_eq!(memo.fib(7).unwrap(), 13);
        assert_eq!(memo.derivations(), 9);

        assert_eq!(memo.fib(12).unwrap(), 144);
        assert_eq!(memo.derivations(), 11);
    }

    #[test]
    fn base_cases_do_not_touch_the_cache() {
        let mut memo = MemoizedFibonacci::new();
        assert_eq!(memo.fib(0).unwrap(), 0);
        assert_eq!(memo.fib(1).unwrap(), 1);
        assert!(memo.cache().is_empty());
        assert_eq!(memo.derivations(), 0);
    }

    #[test]
    fn fresh_instances_start_cold() {
        let mut warm = MemoizedFibonacci::new();
        warm.fib(30).unwrap();

        let cold = MemoizedFibonacci::new();
        assert!(cold.cache().is_empty());
        assert_eq!(cold.derivations(), 0);
    }

    #[test]
    fn rejects_negative_input() {
        assert!(matches!(
            NaiveFibonacci.fib(-1),
            Err(Error::InvalidArgument { n: -1 })
        ));
        assert!(matches!(
            MemoizedFibonacci::new().fib(i64::MIN),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_input() {
        let n = MAX_INPUT as i64 + 1;
        assert!(matches!(
            MemoizedFibonacci::new().fib(n),
            Err(Error::Overflow { n: e }) if e == n
        ));
        assert!(matches!(NaiveFibonacci.fib(n), Err(Error::Overflow { .. })));
    }
}

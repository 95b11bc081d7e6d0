use core::{any::Any, fmt::Debug};

/// Whether a measured iteration did what it was supposed to.
///
/// Failed iterations are still timed but are tallied apart from the passing
/// ones, so they never skew the reported statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Passed,
    Failed,
}

impl Outcome {
    pub fn of<T, E>(res: &Result<T, E>) -> Self {
        match res {
            Ok(_) => Outcome::Passed,
            Err(_) => Outcome::Failed,
        }
    }

    pub fn failed(self) -> bool {
        self == Outcome::Failed
    }
}

pub trait Benchmark<Inp: Any + Debug> {
    /// What `run` produces; handed to `teardown` so it can be checked
    /// without being measured.
    type Res;

    /// Called before every call to `run`.
    ///
    /// For stuff you wish to have run once, use a constructor function.
    #[allow(unused_variables)]
    fn setup(&mut self, inp: &Inp) {}
    /// This is what is actually measured.
    fn run(&mut self, inp: &Inp) -> Self::Res;
    /// Called after every call to `run`; the returned [`Outcome`] is what
    /// reporters count as passed or failed.
    ///
    /// For stuff you wish to have run once, use `Drop`.
    #[allow(unused_variables)]
    fn teardown(&mut self, inp: &Inp, res: Self::Res) -> Outcome {
        Outcome::Passed
    }
}

impl<I: Any + Debug, R, F: FnMut(&I) -> R> Benchmark<I> for F {
    type Res = R;

    fn run(&mut self, inp: &I) -> R {
        self(inp)
    }
}

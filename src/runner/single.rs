use core::{any::Any, fmt::Debug, iter, marker::PhantomData};

use tracing::debug;

use super::{GroupList, Schedule};
use crate::reporters::{GroupKind, Sample};
use crate::{Benchmark, Metric, Reporter};

/// One benchmark run over its own inputs; reported under its own name.
pub fn build_single<B: Benchmark<Inp>, Inp: Any + Debug, I: IntoIterator<Item = Inp>>(
    name: &'static str,
    benchmark: B,
    inputs: I,
) -> SingleBenchmark<B, Inp, I> {
    SingleBenchmark {
        name,
        benchmark,
        inputs,
        _p: PhantomData,
    }
}

pub struct SingleBenchmark<B: Benchmark<Inp>, Inp: Any + Debug, I: IntoIterator<Item = Inp>> {
    name: &'static str,
    benchmark: B,
    inputs: I,
    _p: PhantomData<fn(Inp)>,
}

impl<B, Inp, I, Rest> GroupList for (SingleBenchmark<B, Inp, I>, Rest)
where
    B: Benchmark<Inp>,
    Inp: Any + Debug,
    I: IntoIterator<Item = Inp>,
    Rest: GroupList,
{
    fn run<M: Metric, R: Reporter<M>>(self, m: &mut M, r: &mut R, schedule: Schedule) {
        let (SingleBenchmark { name, mut benchmark, inputs, .. }, rest) = self;

        let inputs = inputs.into_iter();
        debug!(benchmark = name, "starting single benchmark");
        r.group_started(GroupKind::Single, name, inputs.size_hint(), iter::once(name));

        for (input_idx, inp) in inputs.enumerate() {
            r.input_started(input_idx, &inp);
            let tally = schedule.measure(&mut benchmark, &inp, m);
            r.measured(Sample {
                benchmark: name,
                benchmark_idx: 0,
                input_idx,
                input: &inp,
                tally: &tally,
            });
            r.input_finished(input_idx);
        }

        r.group_finished(name);
        rest.run(m, r, schedule);
    }

    fn name_and_next(&self) -> Option<(&'static str, &dyn GroupList)> {
        Some((self.0.name, &self.1))
    }

    fn len(&self) -> usize {
        self.1.len() + 1
    }
}

use core::{any::Any, fmt::Debug, marker::PhantomData};

use tracing::debug;

use super::{Append, GroupList, HListIterator, Schedule};
use crate::reporters::{GroupKind, Sample};
use crate::{Benchmark, Metric, Reporter};

/// A group of benchmarks that are all run against the same inputs and
/// reported side by side.
pub fn build_suite<Inp: Debug, I: IntoIterator<Item = Inp>>(
    name: &'static str,
    inputs: I,
) -> Suite<Inp, I, ()> {
    Suite {
        name,
        members: (),
        inputs,
        _p: PhantomData,
    }
}

pub struct Suite<Inp: Debug, I: IntoIterator<Item = Inp>, L: Members<Inp> = ()> {
    name: &'static str,
    members: L,
    inputs: I,
    _p: PhantomData<fn(Inp)>,
}

impl<Inp: Any + Debug, I: IntoIterator<Item = Inp>, L: Members<Inp>> Suite<Inp, I, L> {
    /// Members are measured (and reported) in the order they are added.
    #[allow(clippy::should_implement_trait)]
    pub fn add<B: Benchmark<Inp>>(self, name: &'static str, benchmark: B) -> Suite<Inp, I, L::Output>
    where
        L: Append<Member<B, Inp>>,
        L::Output: Members<Inp>,
    {
        Suite {
            name: self.name,
            members: self.members.append(Member {
                name,
                benchmark,
                _p: PhantomData,
            }),
            inputs: self.inputs,
            _p: PhantomData,
        }
    }
}

#[doc(hidden)]
pub struct Member<B: Benchmark<Inp>, Inp: Any + Debug> {
    name: &'static str,
    benchmark: B,
    _p: PhantomData<fn(Inp)>,
}

/// The `(member, rest)` list inside a [`Suite`].
///
/// Kept apart from [`GroupList`] so that suites cannot nest.
#[doc(hidden)]
#[allow(clippy::len_without_is_empty)]
pub trait Members<Inp: Debug> {
    /// Measures every member on one input; `idx` is the head's position in
    /// the suite.
    fn measure_each<M: Metric, R: Reporter<M>>(
        &mut self,
        m: &mut M,
        r: &mut R,
        schedule: Schedule,
        input: (usize, &Inp),
        idx: usize,
    ) where
        Self: Sized;

    fn name_and_next(&self) -> Option<(&'static str, &dyn Members<Inp>)>;

    fn len(&self) -> usize;
}

impl<I: Debug> Members<I> for () {
    fn measure_each<M: Metric, R: Reporter<M>>(
        &mut self,
        _: &mut M,
        _: &mut R,
        _: Schedule,
        _: (usize, &I),
        _: usize,
    ) {
    }

    fn name_and_next(&self) -> Option<(&'static str, &dyn Members<I>)> {
        None
    }

    fn len(&self) -> usize {
        0
    }
}

impl<'a, I: Debug> Iterator for HListIterator<'a, (dyn Members<I> + 'a)> {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        let (name, next) = self.0.name_and_next()?;
        self.0 = next;

        Some(name)
    }
}

impl<I, B, Rest> Members<I> for (Member<B, I>, Rest)
where
    I: Any + Debug,
    B: Benchmark<I>,
    Rest: Members<I>,
{
    fn measure_each<M: Metric, R: Reporter<M>>(
        &mut self,
        m: &mut M,
        r: &mut R,
        schedule: Schedule,
        (input_idx, inp): (usize, &I),
        idx: usize,
    ) {
        let (head, rest) = self;

        let tally = schedule.measure(&mut head.benchmark, inp, m);
        if tally.failed() > 0 {
            debug!(benchmark = head.name, input_idx, failed = tally.failed(), "iterations failed");
        }
        r.measured(Sample {
            benchmark: head.name,
            benchmark_idx: idx,
            input_idx,
            input: inp,
            tally: &tally,
        });

        rest.measure_each(m, r, schedule, (input_idx, inp), idx + 1);
    }

    fn name_and_next(&self) -> Option<(&'static str, &dyn Members<I>)> {
        Some((self.0.name, &self.1))
    }

    fn len(&self) -> usize {
        self.1.len() + 1
    }
}

impl<Inp, I, L, Rest> GroupList for (Suite<Inp, I, L>, Rest)
where
    Inp: Debug,
    I: IntoIterator<Item = Inp>,
    L: Members<Inp>,
    Rest: GroupList,
    for<'a> HListIterator<'a, dyn Members<Inp> + 'a>: Clone,
{
    fn run<M: Metric, R: Reporter<M>>(self, m: &mut M, r: &mut R, schedule: Schedule) {
        let (Suite { name, mut members, inputs, .. }, rest) = self;

        let inputs = inputs.into_iter();
        debug!(suite = name, members = members.len(), "starting suite");
        r.group_started(
            GroupKind::Suite,
            name,
            inputs.size_hint(),
            HListIterator(&members as &dyn Members<Inp>),
        );

        for (input_idx, inp) in inputs.enumerate() {
            r.input_started(input_idx, &inp);
            members.measure_each(m, r, schedule, (input_idx, &inp), 0);
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

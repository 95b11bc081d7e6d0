use core::fmt::{self, Write};

use serde::Serialize;
use tracing::warn;

use super::io::{Output, OutputAdapter, Void};
use super::stats::summarize;
use super::{GroupKind, Reporter, Sample};
use crate::metrics::{Metric, MetricFmtAdapter, Throughput};

/// One line of [`JsonReporter`] output: one (input, benchmark) pair.
///
/// The statistics cover passing iterations only and are left out when every
/// iteration failed.
#[derive(Debug, Serialize)]
pub struct Record<'a> {
    /// The suite, or the single benchmark, this belongs to.
    pub group: &'a str,
    pub benchmark: &'a str,
    pub input_idx: usize,
    /// `Debug` rendering of the input.
    pub input: String,
    pub iterations: usize,
    pub failures: usize,
    pub unit: &'static str,
    #[serde(flatten)]
    pub stats: Option<RecordStats>,
}

#[derive(Debug, Serialize)]
pub struct RecordStats {
    pub mean: String,
    pub spread: String,
    pub min: String,
    pub max: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<Throughput>,
}

/// Writes newline-delimited JSON, one [`Record`] per line.
pub struct JsonReporter<'o, Out: Output + ?Sized> {
    out: OutputAdapter<'o, Out>,
    group: &'static str,
}

impl JsonReporter<'static, Void> {
    pub fn new_with_fmt_write<'o, Fw: fmt::Write>(out: &'o mut Fw) -> JsonReporter<'o, dyn fmt::Write + 'o> {
        JsonReporter {
            out: OutputAdapter(out),
            group: "",
        }
    }

    pub fn new_with_io_write<'o, Iw: std::io::Write>(
        out: &'o mut Iw,
    ) -> JsonReporter<'o, dyn std::io::Write + 'o> {
        JsonReporter {
            out: OutputAdapter(out),
            group: "",
        }
    }
}

impl<'o, O: Output + ?Sized> JsonReporter<'o, O> {
    fn record<M: Metric>(&self, sample: &Sample<'_, M::Unit>) -> Record<'static> {
        let stats = sample.tally.passed().and_then(summarize::<M>).map(|summary| RecordStats {
            mean: MetricFmtAdapter::<M>(&summary.mean).to_string(),
            spread: MetricFmtAdapter::<M>(&summary.spread).to_string(),
            min: MetricFmtAdapter::<M>(&summary.min).to_string(),
            max: MetricFmtAdapter::<M>(&summary.max).to_string(),
            mean_secs: M::seconds(&summary.mean),
            throughput: summary.throughput,
        });

        Record {
            group: self.group,
            benchmark: sample.benchmark,
            input_idx: sample.input_idx,
            input: format!("{:?}", sample.input),
            iterations: sample.tally.iterations(),
            failures: sample.tally.failed(),
            unit: M::UNIT_NAME,
            stats,
        }
    }
}

impl<'o, O: Output + ?Sized, M: Metric> Reporter<M> for JsonReporter<'o, O> {
    fn group_started<B: Iterator<Item = &'static str> + Clone>(
        &mut self,
        _kind: GroupKind,
        name: &'static str,
        _inputs_size_hint: (usize, Option<usize>),
        _benchmarks: B,
    ) {
        self.group = name;
    }

    fn measured(&mut self, sample: Sample<'_, M::Unit>) {
        let record = self.record::<M>(&sample);
        match serde_json::to_string(&record) {
            Ok(line) => {
                if writeln!(self.out, "{line}").is_err() {
                    warn!(benchmark = sample.benchmark, "failed to write record");
                }
            }
            Err(e) => warn!(benchmark = sample.benchmark, error = %e, "failed to serialize record"),
        }
    }

    fn run_finished(&mut self) {
        self.out.flush();
    }
}

use core::{
    cmp::Ordering,
    fmt::{self, Write},
};

use owo_colors::{OwoColorize, Style};
use tracing::warn;

use super::io::{Output, OutputAdapter, Void};
use super::stats::{summarize, Tally};
use super::{GroupKind, Reporter, Sample};
use crate::metrics::{Metric, MetricFmtAdapter, Throughput};

/// Human readable, optionally coloured, report.
///
/// Suites additionally get a per-input comparison that ranks their members
/// by throughput (for metrics that measure time). Failed iterations are
/// left out of the statistics and counted next to them.
pub struct BasicReporter<'o, Out: Output + ?Sized> {
    out: OutputAdapter<'o, Out>,
    iterations: usize,
    pub format_options: FormatOptions,
    group: Option<Layout>,
    comparison: Vec<(&'static str, Throughput)>,
    write_failed: bool,
}

/// Column widths for the group being printed.
#[derive(Debug, Clone, Copy)]
struct Layout {
    kind: GroupKind,
    input_num_width: usize,
    name_width: usize,
}

#[allow(clippy::needless_lifetimes)]
impl BasicReporter<'static, Void> {
    pub fn new_with_fmt_write<'o, Fw: fmt::Write>(out: &'o mut Fw) -> BasicReporter<'o, dyn fmt::Write + 'o> {
        BasicReporter::with_output(OutputAdapter(out))
    }

    pub fn new_with_io_write<'o, Iw: std::io::Write>(
        out: &'o mut Iw,
    ) -> BasicReporter<'o, dyn std::io::Write + 'o> {
        BasicReporter::with_output(OutputAdapter(out))
    }
}

impl<'o, O: Output + ?Sized> BasicReporter<'o, O> {
    fn with_output(out: OutputAdapter<'o, O>) -> Self {
        BasicReporter {
            out,
            iterations: 0,
            format_options: Default::default(),
            group: None,
            comparison: Vec::new(),
            write_failed: false,
        }
    }

    pub fn set_format_options(mut self, options: FormatOptions) -> Self {
        self.format_options = options;
        self
    }
}

pub struct FormatOptions {
    pub prefix: Option<fn(&mut dyn Write) -> fmt::Result>,
    pub single_box_style: Style,
    pub single_box_spec: support::BoxSpec,
    pub suite_box_style: Style,
    pub suite_box_spec: support::BoxSpec,
    pub iteration_count_style: Style,
    pub top_level_bench_name_style: Style,
    pub input_style: Style,
    pub unit_style: Style,
    pub avg_style: Style,
    pub range_style: Style,
    pub min_style: Style,
    pub max_style: Style,
    pub throughput_style: Style,
    pub failure_style: Style,
    pub sub_bench_name_style: Style,
    pub comparison_heading_style: Style,
    pub slower_style: Style,
    pub punctuation_style: Style,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            prefix: Some(|f| f.write_str("┆ ")),
            single_box_style: Style::new().blue(),
            single_box_spec: support::SINGLE_LINED_BOX,
            suite_box_style: Style::new().green(),
            suite_box_spec: support::DOUBLE_LINED_BOX,
            iteration_count_style: Style::new(),
            top_level_bench_name_style: Style::new().bold(),
            input_style: Style::new().magenta(),
            unit_style: Style::new().bold(),
            avg_style: Style::new().green().bold(),
            range_style: Style::new().dimmed(),
            min_style: Style::new().yellow(),
            max_style: Style::new().red(),
            throughput_style: Style::new().blue().bold(),
            failure_style: Style::new().red().bold(),
            sub_bench_name_style: Style::new().cyan().italic(),
            comparison_heading_style: Style::new().bold().underline(),
            slower_style: Style::new().red(),
            punctuation_style: Style::new().dimmed(),
        }
    }
}

impl FormatOptions {
    /// Same layout as the default, without any escape codes.
    pub fn plain() -> Self {
        FormatOptions {
            prefix: Some(|f| f.write_str("┆ ")),
            single_box_style: Style::new(),
            single_box_spec: support::SINGLE_LINED_BOX,
            suite_box_style: Style::new(),
            suite_box_spec: support::DOUBLE_LINED_BOX,
            iteration_count_style: Style::new(),
            top_level_bench_name_style: Style::new(),
            input_style: Style::new(),
            unit_style: Style::new(),
            avg_style: Style::new(),
            range_style: Style::new(),
            min_style: Style::new(),
            max_style: Style::new(),
            throughput_style: Style::new(),
            failure_style: Style::new(),
            sub_bench_name_style: Style::new(),
            comparison_heading_style: Style::new(),
            slower_style: Style::new(),
            punctuation_style: Style::new(),
        }
    }
}

mod support {
    use core::fmt::{self, Display, Write};
    use owo_colors::{OwoColorize, Style};

    // When `unicode-width` is not enabled, this is bad and ignores the fact
    // that printed chars (i.e. emoji) can be wide.
    pub(crate) fn estimated_str_width(s: &str) -> usize {
        #[cfg(not(feature = "unicode-width"))]
        let res = s.chars().count();

        #[cfg(feature = "unicode-width")]
        let res = {
            use unicode_width::UnicodeWidthStr;
            UnicodeWidthStr::width(s)
        };

        res
    }

    pub(crate) fn estimated_num_width(n: usize) -> usize {
        n.checked_ilog10().map_or(1, |digits| digits as usize + 1)
    }

    pub(crate) struct Repeat<T>(T, usize);
    impl<T: Display> Display for Repeat<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for _ in 0..self.1 {
                self.0.fmt(f)?
            }

            Ok(())
        }
    }

    pub(crate) struct Joined<A, B>(A, B);
    impl<A: Display, B: Display> Display for Joined<A, B> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.fmt(f)?;
            self.1.fmt(f)
        }
    }
    pub(crate) trait FmtUtil: Sized {
        fn join<O>(self, other: O) -> Joined<Self, O> {
            Joined(self, other)
        }

        fn repeat(self, times: usize) -> Repeat<Self> {
            Repeat(self, times)
        }
    }
    impl<A> FmtUtil for A {}

    #[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
    pub struct BoxSpec {
        top_left: char,
        top_right: char,
        bot_left: char,
        bot_right: char,
        vertical: char,
        horizontal: char,
    }

    pub const SINGLE_LINED_BOX: BoxSpec = BoxSpec {
        top_left: '┌',
        top_right: '┐',
        bot_left: '└',
        bot_right: '┘',
        vertical: '│',
        horizontal: '─',
    };

    pub const DOUBLE_LINED_BOX: BoxSpec = BoxSpec {
        top_left: '╔',
        top_right: '╗',
        bot_left: '╚',
        bot_right: '╝',
        vertical: '║',
        horizontal: '═',
    };

    pub(crate) fn draw_boxed<W: Write>(
        f: &mut W,
        mut prefix: Option<impl FnMut(&mut dyn Write) -> fmt::Result>,
        spec: &BoxSpec,
        content: &str,
        box_style: Style,
        content_style: Style,
    ) -> fmt::Result {
        let lines = content.split_terminator('\n');
        let width = lines.clone().map(estimated_str_width).max().unwrap_or(0);

        macro_rules! line {
            ($(
                ($($tt:tt)+)
            ),* $(,)?) => {
                if let Some(ref mut p) = prefix {
                    p(f)?
                }

                $(
                    write!(f, $($tt)+)?;
                )*

                writeln!(f)?;
            };
        }

        // Top:
        line! {
            ("{}", spec.top_left.join(spec.horizontal.repeat(width + 2))
                .join(spec.top_right)
                .style(box_style)
            ),
        }

        // Content:
        for l in lines {
            line! {
                ("{} ", spec.vertical.style(box_style)),
                ("{}{}", l.style(content_style), " ".repeat(width - estimated_str_width(l))),
                (" {}", spec.vertical.style(box_style)),
            }
        }

        // End:
        line! {
            ("{}", spec.bot_left.join(spec.horizontal.repeat(width + 2))
                    .join(spec.bot_right)
                    .style(box_style)
            ),
        }

        Ok(())
    }
}
use support::*;
macro_rules! prefixed {
    (($self:ident) <- $(
        ($($tt:tt)+)
    ),* $(,)?) => {
        $self.prefix()?;
        prefixed![($self) ++ $(
            ($($tt)+),
        )*];
    };

    // Omit prefix!
    (($self:ident) ++ $(
        ($($tt:tt)+)
    ),* $(,)?) => {
        $(
            write!($self.out, $($tt)+)?;
        )*
    };
}

impl<'o, O: Output + ?Sized> BasicReporter<'o, O> {
    fn prefix(&mut self) -> fmt::Result {
        match self.format_options.prefix {
            Some(p) => p(&mut self.out),
            None => Ok(()),
        }
    }

    /// Reporter callbacks can't return errors; note the first failed write.
    fn check(&mut self, res: fmt::Result) {
        if res.is_err() && !self.write_failed {
            self.write_failed = true;
            warn!("failed to write benchmark report");
        }
    }

    fn layout(&self) -> Layout {
        self.group.unwrap_or(Layout {
            kind: GroupKind::Single,
            input_num_width: 1,
            name_width: 0,
        })
    }

    fn print_header<M: Metric>(&mut self, kind: GroupKind, name: &str) -> fmt::Result {
        let (spec, style) = match kind {
            GroupKind::Single => (&self.format_options.single_box_spec, self.format_options.single_box_style),
            GroupKind::Suite => (&self.format_options.suite_box_spec, self.format_options.suite_box_style),
        };
        draw_boxed(
            &mut self.out,
            self.format_options.prefix,
            spec,
            name,
            style,
            self.format_options.top_level_bench_name_style,
        )?;

        let punct = self.format_options.punctuation_style;
        prefixed![(self) <- ("\n")];
        prefixed![(self) <- (
            "{}{}{}{}{}\n",
            "Inputs (".style(punct),
            self.iterations.style(self.format_options.iteration_count_style),
            " iterations each, measuring ".style(punct),
            M::UNIT_NAME.style(self.format_options.unit_style),
            "):".style(punct),
        )];
        Ok(())
    }

    fn print_input(&mut self, input_idx: usize, input: &dyn fmt::Debug) -> fmt::Result {
        let punct = self.format_options.punctuation_style;
        let width = self.layout().input_num_width;
        prefixed![(self) <-
            (" "),
            ("{: >width$}{} ", input_idx + 1, '.'.style(punct)),
            ("{}{:?}{}", '`'.style(punct), input.style(self.format_options.input_style), '`'.style(punct)),
            ("\n"),
        ];
        Ok(())
    }

    fn print_sample<M: Metric>(&mut self, sample: &Sample<'_, M::Unit>) -> fmt::Result {
        let layout = self.layout();
        let indent = match layout.kind {
            GroupKind::Single => {
                prefixed![(self) <- (" ")];
                layout.input_num_width + 2
            }
            GroupKind::Suite => {
                // Right-aligned member name, past the input number column.
                let pad = layout.name_width.saturating_sub(estimated_str_width(sample.benchmark));
                prefixed![(self) <-
                    (" "),
                    ("{: >w$}  ", "", w = layout.input_num_width),
                    ("{}{}{}",
                        " ".repeat(pad),
                        sample.benchmark.style(self.format_options.sub_bench_name_style),
                        ':'.style(self.format_options.punctuation_style),
                    ),
                ];
                1
            }
        };

        if let Some(t) = self.print_tally::<M>(indent, sample.tally)? {
            self.comparison.push((sample.benchmark, t));
        }
        Ok(())
    }

    /// Prints `avg ± spread (min to max)` over the passing iterations, the
    /// throughput for timed metrics (also returned) and how many failed.
    fn print_tally<M: Metric>(
        &mut self,
        indent: usize,
        tally: &Tally<M::Unit>,
    ) -> Result<Option<Throughput>, fmt::Error> {
        prefixed![(self) ++ ("{}", " ".repeat(indent))];

        let Some(stats) = tally.passed() else {
            let msg = format!("all {} iterations failed", tally.failed());
            prefixed![(self) ++ ("{}\n", msg.style(self.format_options.failure_style))];
            return Ok(None);
        };
        let Some(summary) = summarize::<M>(stats) else {
            prefixed![(self) ++
                ("{}\n", "(too many iterations to average)".style(self.format_options.range_style)),
            ];
            return Ok(None);
        };

        let punct = self.format_options.punctuation_style;
        prefixed![(self) ++
            ("{} ± {} ",
                MetricFmtAdapter::<M>(&summary.mean).style(self.format_options.avg_style),
                MetricFmtAdapter::<M>(&summary.spread).style(self.format_options.range_style),
            ),
            ("{}{} {} {}{}",
                "(".style(punct),
                MetricFmtAdapter::<M>(&summary.min).style(self.format_options.min_style),
                "to".style(punct),
                MetricFmtAdapter::<M>(&summary.max).style(self.format_options.max_style),
                ")".style(punct),
            ),
        ];
        if let Some(t) = summary.throughput {
            prefixed![(self) ++ ("  {}", t.style(self.format_options.throughput_style))];
        }
        if tally.failed() > 0 {
            let msg = format!("{} of {} failed", tally.failed(), tally.iterations());
            prefixed![(self) ++
                ("  {}{}{}", '['.style(punct), msg.style(self.format_options.failure_style), ']'.style(punct)),
            ];
        }
        prefixed![(self) ++ ("\n")];

        Ok(summary.throughput)
    }

    /// Ranks the members measured for the current input, fastest first,
    /// and clears them.
    fn print_comparison(&mut self) -> fmt::Result {
        let mut ranked = core::mem::take(&mut self.comparison);
        if ranked.len() < 2 {
            return Ok(());
        }

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let indent = self.layout().input_num_width + 3;
        let width = ranked.iter().map(|(n, _)| estimated_str_width(n)).max().unwrap_or(0);
        let fastest = ranked[0].1;

        prefixed![(self) <-
            ("{}", " ".repeat(indent)),
            ("{}\n", "Comparison:".style(self.format_options.comparison_heading_style)),
        ];
        for (idx, (name, throughput)) in ranked.iter().enumerate() {
            prefixed![(self) <-
                ("{}", " ".repeat(indent + 2 + width - estimated_str_width(name))),
                ("{}{} ",
                    name.style(self.format_options.sub_bench_name_style),
                    ':'.style(self.format_options.punctuation_style),
                ),
                ("{}", throughput.style(self.format_options.throughput_style)),
            ];
            if idx > 0 {
                let slower = format!("{:.2}x slower", throughput.slowdown_from(fastest));
                prefixed![(self) ++ (" - {}", slower.style(self.format_options.slower_style))];
            }
            prefixed![(self) ++ ("\n")];
        }
        Ok(())
    }

    fn print_footer(&mut self) -> fmt::Result {
        prefixed![(self) <- ("\n")];
        prefixed![(self) ++ ("\n\n\n")];
        Ok(())
    }
}

impl<'o, O: Output + ?Sized, M: Metric> Reporter<M> for BasicReporter<'o, O> {
    fn run_started<G: Iterator<Item = &'static str> + Clone>(
        &mut self,
        iterations: usize,
        _warmup: usize,
        _groups: G,
    ) {
        debug_assert!(iterations > 0);
        self.iterations = iterations;
    }

    fn group_started<B: Iterator<Item = &'static str> + Clone>(
        &mut self,
        kind: GroupKind,
        name: &'static str,
        (lower, upper): (usize, Option<usize>),
        benchmarks: B,
    ) {
        debug_assert!(self.group.is_none());
        self.group = Some(Layout {
            kind,
            input_num_width: estimated_num_width(upper.unwrap_or(lower)),
            name_width: benchmarks.map(estimated_str_width).max().unwrap_or(0),
        });

        let res = self.print_header::<M>(kind, name);
        self.check(res);
    }

    fn input_started(&mut self, input_idx: usize, input: &dyn fmt::Debug) {
        let res = self.print_input(input_idx, input);
        self.check(res);
    }

    fn measured(&mut self, sample: Sample<'_, M::Unit>) {
        let res = self.print_sample::<M>(&sample);
        self.check(res);
    }

    fn input_finished(&mut self, _input_idx: usize) {
        let res = self.print_comparison();
        self.check(res);
    }

    fn group_finished(&mut self, _name: &'static str) {
        self.group = None;
        let res = self.print_footer();
        self.check(res);
    }

    fn run_finished(&mut self) {
        debug_assert!(self.group.is_none());
        self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metrics::NoOpMetric, single, suite, BenchmarkRunner, Outcome};

    #[test]
    fn num_width() {
        assert_eq!(estimated_num_width(0), 1);
        assert_eq!(estimated_num_width(9), 1);
        assert_eq!(estimated_num_width(10), 2);
        assert_eq!(estimated_num_width(12345), 5);
    }

    #[test]
    fn plain_single_report() {
        let mut out = String::new();
        let mut r = BasicReporter::new_with_fmt_write(&mut out).set_format_options(FormatOptions::plain());

        BenchmarkRunner::new()
            .set_iterations(3)
            .add(single("doubling", |x: &u32| x * 2, [1u32, 2]))
            .run(&mut NoOpMetric, &mut r);
        drop(r);

        assert!(out.contains("│ doubling │"), "{out}");
        assert!(out.contains("Inputs (3 iterations each, measuring unknown):"), "{out}");
        assert!(out.contains("1. `1`"), "{out}");
        assert!(out.contains("2. `2`"), "{out}");
        assert!(out.contains("1 ± 0 (1 to 1)"), "{out}");
        assert!(!out.contains("failed"), "{out}");
        assert!(!out.contains('\u{1b}'), "escape codes in plain output: {out}");
    }

    #[test]
    fn plain_suite_report_lists_members_in_order() {
        let mut out = String::new();
        let mut r = BasicReporter::new_with_fmt_write(&mut out).set_format_options(FormatOptions::plain());

        BenchmarkRunner::new()
            .set_iterations(2)
            .add(
                suite("pair", ["in"])
                    .add("first", |_: &&str| ())
                    .add("second one", |_: &&str| ()),
            )
            .run(&mut NoOpMetric, &mut r);
        drop(r);

        assert!(out.contains("║ pair ║"), "{out}");
        let first = out.find("     first:").expect("first member line");
        let second = out.find("second one:").expect("second member line");
        assert!(first < second, "{out}");
        // No throughput without a time metric, so no comparison either.
        assert!(!out.contains("Comparison:"), "{out}");
    }

    /// Fails on every third call.
    struct EveryThird(usize);

    impl crate::Benchmark<u8> for EveryThird {
        type Res = usize;

        fn run(&mut self, _: &u8) -> usize {
            self.0 += 1;
            self.0
        }

        fn teardown(&mut self, _: &u8, call: usize) -> Outcome {
            if call % 3 == 0 {
                Outcome::Failed
            } else {
                Outcome::Passed
            }
        }
    }

    #[test]
    fn failed_iterations_are_reported() {
        let mut out = String::new();
        let mut r = BasicReporter::new_with_fmt_write(&mut out).set_format_options(FormatOptions::plain());

        BenchmarkRunner::new()
            .set_iterations(6)
            .add(
                suite("flaky", [0u8])
                    .add("sometimes", EveryThird(0))
                    .add("never", |_: &u8| -> core::result::Result<(), ()> { Err(()) })
                    .add("always", |_: &u8| ()),
            )
            .run(&mut NoOpMetric, &mut r);
        drop(r);

        let line = |name: &str| {
            out.lines()
                .find(|l| l.contains(&format!("{name}:")))
                .unwrap_or_else(|| panic!("no line for {name}: {out}"))
                .to_owned()
        };
        assert!(line("sometimes").contains("1 ± 0 (1 to 1)  [2 of 6 failed]"), "{out}");
        // Closures can't fail; only `Benchmark::teardown` decides.
        assert!(!line("never").contains("failed"), "{out}");
        assert!(!line("always").contains("failed"), "{out}");
    }

    #[test]
    fn all_failed_has_no_stats() {
        let mut out = String::new();
        let mut r = BasicReporter::new_with_fmt_write(&mut out).set_format_options(FormatOptions::plain());

        BenchmarkRunner::new()
            .set_iterations(3)
            .add(single("broken", EveryThird(2), [0u8]))
            .run(&mut NoOpMetric, &mut r);
        drop(r);

        // Calls 3, 4, 5: only the first fails.
        assert!(out.contains("[1 of 3 failed]"), "{out}");

        let mut out = String::new();
        let mut r = BasicReporter::new_with_fmt_write(&mut out).set_format_options(FormatOptions::plain());
        BenchmarkRunner::new()
            .set_iterations(2)
            .add(single("broken", crate::workloads::FibBench::<crate::fib::NaiveFibonacci>::default(), [-1i64]))
            .run(&mut NoOpMetric, &mut r);
        drop(r);

        assert!(out.contains("all 2 iterations failed"), "{out}");
        assert!(!out.contains(" ± "), "{out}");
    }
}

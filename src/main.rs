use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use memobench::config::{BenchConfig, OutputFormat};
use memobench::fib::{MemoizedFibonacci, NaiveFibonacci};
use memobench::metrics::WallTime;
use memobench::reporters::{BasicReporter, FormatOptions, JsonReporter};
use memobench::resolve::{ConcurrentResolver, SequentialResolver, SystemLookup};
use memobench::workloads::{FibBench, ResolveBench, TransformBench};
use memobench::{suite, BenchmarkRunner, Reporter, Result};

/// Compare naive and memoized Fibonacci, the protocol transformers built on
/// them, and sequential and concurrent hostname resolution.
#[derive(Parser, Debug)]
#[command(name = "memobench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measured iterations per benchmark and input.
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Unmeasured iterations run before measuring.
    #[arg(long)]
    warmup: Option<usize>,

    /// `version` of the record fed to the protocol transformers.
    #[arg(long)]
    protocol_version: Option<i64>,

    /// Hostname to resolve; repeat for a batch. Replaces the configured batch.
    #[arg(long = "hostname", value_name = "HOSTNAME")]
    hostnames: Vec<String>,

    /// Newline-delimited JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Text report without colours.
    #[arg(long)]
    no_color: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Which comparison to run.
    #[arg(value_enum, default_value_t = Workload::All)]
    workload: Workload,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Workload {
    Fib,
    Protocol,
    Resolve,
    All,
}

impl Workload {
    fn includes(self, other: Workload) -> bool {
        self == Workload::All || self == other
    }
}

fn load_config(cli: &Cli) -> Result<BenchConfig> {
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };

    // CLI flags take precedence over the file.
    if let Some(it) = cli.iterations {
        config.iterations = it;
    }
    if let Some(w) = cli.warmup {
        config.warmup = w;
    }
    if let Some(v) = cli.protocol_version {
        config.protocol.version = v;
    }
    if !cli.hostnames.is_empty() {
        config.resolve.hostnames = cli.hostnames.clone();
    }
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
    if cli.no_color {
        config.output.color = false;
    }

    config.validate()?;
    Ok(config)
}

// `-v`/`-q` win over `RUST_LOG`, which wins over the configured level.
fn init_logging(cli: &Cli, config: &BenchConfig) {
    let flag_level = if cli.quiet {
        Some("error")
    } else if cli.verbose {
        Some("debug")
    } else {
        None
    };

    let filter = match flag_level {
        Some(level) => EnvFilter::new(format!("memobench={level}")),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("memobench={}", config.log_level))),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn runner(config: &BenchConfig) -> BenchmarkRunner {
    BenchmarkRunner::new()
        .set_iterations(config.iterations)
        .set_warmup(config.warmup)
}

fn bench<R: Reporter<WallTime>>(workload: Workload, config: &BenchConfig, reporter: &mut R) {
    let mut metric = WallTime;

    if workload.includes(Workload::Fib) {
        runner(config)
            .add(
                suite("fibonacci", config.fib.inputs.clone())
                    .add("memoized", FibBench::<MemoizedFibonacci>::default())
                    .add("naive", FibBench::<NaiveFibonacci>::default()),
            )
            .run(&mut metric, reporter);
    }

    if workload.includes(Workload::Protocol) {
        runner(config)
            .add(
                suite("protocol transformation", [config.protocol.record()])
                    .add("memoized protocol", TransformBench::<MemoizedFibonacci>::default())
                    .add("naive protocol", TransformBench::<NaiveFibonacci>::default()),
            )
            .run(&mut metric, reporter);
    }

    if workload.includes(Workload::Resolve) {
        runner(config)
            .add(
                suite("DNS lookup batch", [config.resolve.hostnames.clone()])
                    .add("concurrent", ResolveBench::new(ConcurrentResolver::new(SystemLookup)))
                    .add("naive", ResolveBench::new(SequentialResolver::new(SystemLookup))),
            )
            .run(&mut metric, reporter);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (no logging yet).
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("memobench: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&cli, &config);
    tracing::debug!(?config, "configuration loaded");

    let mut out = std::io::stdout().lock();
    match config.output.format {
        OutputFormat::Json => {
            let mut r = JsonReporter::new_with_io_write(&mut out);
            bench(cli.workload, &config, &mut r);
        }
        OutputFormat::Text => {
            let options = if config.output.color {
                FormatOptions::default()
            } else {
                FormatOptions::plain()
            };
            let mut r = BasicReporter::new_with_io_write(&mut out).set_format_options(options);
            bench(cli.workload, &config, &mut r);
        }
    }

    ExitCode::SUCCESS
}

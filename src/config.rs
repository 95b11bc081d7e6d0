//! Benchmark configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! same run the defaults describe: 20 measured iterations, `fib(20)` over
//! `"Hello, world! "` repeated 100 times, and four hostnames.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fib::MAX_INPUT;
use crate::transform::ProtocolRecord;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Measured iterations per (input, benchmark) pair.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Unmeasured iterations run first.
    #[serde(default = "default_warmup")]
    pub warmup: usize,

    /// Log level used when neither `RUST_LOG` nor a CLI flag says otherwise.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub fib: FibConfig,

    #[serde(default)]
    pub protocol: ProtocolConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            warmup: default_warmup(),
            log_level: default_log_level(),
            fib: FibConfig::default(),
            protocol: ProtocolConfig::default(),
            resolve: ResolveConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_iterations() -> usize {
    20
}

fn default_warmup() -> usize {
    2
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Inputs for the Fibonacci comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibConfig {
    #[serde(default = "default_fib_inputs")]
    pub inputs: Vec<i64>,
}

impl Default for FibConfig {
    fn default() -> Self {
        Self {
            inputs: default_fib_inputs(),
        }
    }
}

fn default_fib_inputs() -> Vec<i64> {
    vec![5, 10, 15, 20, 25]
}

/// The record fed to the protocol transformers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_version")]
    pub version: i64,

    /// Repeated `repeat` times to build the record's data.
    #[serde(default = "default_data")]
    pub data: String,

    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

impl ProtocolConfig {
    pub fn record(&self) -> ProtocolRecord {
        ProtocolRecord::new(self.version, self.data.repeat(self.repeat))
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            data: default_data(),
            repeat: default_repeat(),
        }
    }
}

fn default_version() -> i64 {
    20
}

fn default_data() -> String {
    "Hello, world! ".to_string()
}

fn default_repeat() -> usize {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_hostnames")]
    pub hostnames: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            hostnames: default_hostnames(),
        }
    }
}

fn default_hostnames() -> Vec<String> {
    ["example.com", "localhost", "test.com", "example.org"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Ignored for JSON output.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl BenchConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config: BenchConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::config("iterations must be at least 1"));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(Error::config(format!("unknown log_level `{}`", self.log_level)));
        }
        check_fib_input("protocol.version", self.protocol.version)?;
        if self.protocol.data.is_empty() || self.protocol.repeat == 0 {
            return Err(Error::config("protocol data must not be empty"));
        }
        for n in &self.fib.inputs {
            check_fib_input("fib.inputs", *n)?;
        }
        Ok(())
    }
}

fn check_fib_input(field: &str, n: i64) -> Result<()> {
    if n < 0 {
        return Err(Error::config(format!("{field} must not be negative (got {n})")));
    }
    if n > MAX_INPUT as i64 {
        return Err(Error::config(format!(
            "{field} must be at most {MAX_INPUT} (got {n})"
        )));
    }
    Ok(())
}

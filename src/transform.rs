//! Turns a [`ProtocolRecord`] into a string artifact.
//!
//! The transformer derives a metadata header (`fib(version)` and a code point
//! checksum of the data) on every call but only the reversed data makes it
//! into the output; the header is kept aside and can be read back with
//! [`ProtocolTransformer::header`].

use core::{fmt, marker::PhantomData};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fib::{FibonacciEvaluator, MemoizedFibonacci, NaiveFibonacci};
use crate::Result;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub version: i64,
    #[serde(alias = "interesting_data")]
    pub data: String,
}

impl ProtocolRecord {
    pub fn new(version: i64, data: impl Into<String>) -> Self {
        Self {
            version,
            data: data.into(),
        }
    }
}

// Benchmark reports print inputs with `Debug`; keep long payloads to one line.
impl fmt::Debug for ProtocolRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 24;

        let len = self.data.chars().count();
        let mut s = f.debug_struct("ProtocolRecord");
        s.field("version", &self.version);
        if len > SHOWN {
            let head: String = self.data.chars().take(SHOWN).collect();
            s.field("data", &format_args!("{head:?}... ({len} chars)"));
        } else {
            s.field("data", &self.data);
        }
        s.finish()
    }
}

/// Sum of the Unicode scalar values of `data`.
///
/// Not a length: `"é"` contributes 233, not 1 or 2.
pub fn checksum(data: &str) -> u64 {
    data.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Reverses by `char`, not by byte.
pub fn reversed(data: &str) -> String {
    data.chars().rev().collect()
}

/// Header layout used by [`ProtocolTransformer`].
pub fn header(version_info: u128, length_info: u64) -> String {
    format!("Version: {version_info} Length: {length_info} Data: ")
}

pub type MemoizedProtocolTransformer<'r> = ProtocolTransformer<'r, MemoizedFibonacci>;
pub type NaiveProtocolTransformer<'r> = ProtocolTransformer<'r, NaiveFibonacci>;

/// `E` picks the Fibonacci strategy; a fresh `E` is built for every
/// [`transform`](Self::transform) so a memoized evaluator always starts cold.
#[derive(Debug)]
pub struct ProtocolTransformer<'r, E> {
    record: &'r ProtocolRecord,
    output: String,
    header: Option<String>,
    _evaluator: PhantomData<fn() -> E>,
}

impl<'r, E: FibonacciEvaluator + Default> ProtocolTransformer<'r, E> {
    pub fn new(record: &'r ProtocolRecord) -> Self {
        Self {
            record,
            output: String::new(),
            header: None,
            _evaluator: PhantomData,
        }
    }

    pub fn record(&self) -> &'r ProtocolRecord {
        self.record
    }

    /// The header computed by the most recent `transform`, if any.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Appends the reversed data to the output and returns the output.
    ///
    /// The header is computed first and stored, but never written into the
    /// output. Calling this again on the same transformer appends again.
    pub fn transform(&mut self) -> Result<&str> {
        let version_info = E::default().fib(self.record.version)?;
        let length_info = checksum(&self.record.data);
        debug!(
            version = self.record.version,
            version_info = %version_info,
            length_info,
            "computed metadata"
        );
        self.header = Some(header(version_info, length_info));

        self.output.push_str(&reversed(&self.record.data));
        Ok(&self.output)
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn output_is_reversed_data_only() {
        let rec = ProtocolRecord::new(5, "abc");
        assert_eq!(MemoizedProtocolTransformer::new(&rec).transform().unwrap(), "cba");
        assert_eq!(NaiveProtocolTransformer::new(&rec).transform().unwrap(), "cba");
    }

    #[test]
    fn header_is_computed_but_kept_out_of_the_output() {
        let rec = ProtocolRecord::new(5, "abc");
        let mut t = MemoizedProtocolTransformer::new(&rec);
        assert_eq!(t.header(), None);

        t.transform().unwrap();
        assert_eq!(t.header(), Some("Version: 5 Length: 294 Data: "));
        assert!(!t.output().contains("Version"));
    }

    #[test]
    fn variants_agree() {
        let rec = ProtocolRecord::new(20, "Hello, world! ".repeat(100));

        let mut memo = MemoizedProtocolTransformer::new(&rec);
        let mut naive = NaiveProtocolTransformer::new(&rec);
        assert_eq!(memo.transform().unwrap(), naive.transform().unwrap());
        assert_eq!(memo.header(), naive.header());
        assert_eq!(memo.header(), Some("Version: 6765 Length: 119300 Data: "));
    }

    #[test]
    fn checksum_sums_code_points() {
        assert_eq!(checksum("abc"), 294);
        assert_eq!(checksum(""), 0);
        // Two bytes in UTF-8, one code point.
        assert_eq!(checksum("é"), 233);
        assert_eq!(checksum("😀"), 0x1F600);
    }

    #[test]
    fn reverses_by_char() {
        assert_eq!(reversed("héllo"), "olléh");
        assert_eq!(reversed(""), "");
    }

    #[test]
    fn repeated_transform_accumulates() {
        let rec = ProtocolRecord::new(1, "ab");
        let mut t = NaiveProtocolTransformer::new(&rec);
        t.transform().unwrap();
        assert_eq!(t.transform().unwrap(), "baba");
        assert_eq!(t.into_output(), "baba");
    }

    #[test]
    fn inherits_fibonacci_precondition() {
        let rec = ProtocolRecord::new(-3, "abc");
        let mut t = MemoizedProtocolTransformer::new(&rec);
        assert!(matches!(t.transform(), Err(Error::InvalidArgument { n: -3 })));
        assert_eq!(t.output(), "");
        assert_eq!(t.header(), None);
    }

    #[test]
    fn debug_elides_long_data() {
        let short = ProtocolRecord::new(5, "abc");
        assert_eq!(format!("{short:?}"), r#"ProtocolRecord { version: 5, data: "abc" }"#);

        // Exactly 24 chars are still shown in full.
        let edge = ProtocolRecord::new(1, "x".repeat(24));
        assert_eq!(format!("{edge:?}"), format!("ProtocolRecord {{ version: 1, data: {:?} }}", "x".repeat(24)));

        let long = ProtocolRecord::new(20, "Hello, world! ".repeat(100));
        assert_eq!(
            format!("{long:?}"),
            r#"ProtocolRecord { version: 20, data: "Hello, world! Hello, wor"... (1400 chars) }"#
        );
    }

    #[test]
    fn record_accepts_interesting_data_alias() {
        let rec: ProtocolRecord =
            toml::from_str("version = 20\ninteresting_data = \"xyz\"").unwrap();
        assert_eq!(rec, ProtocolRecord::new(20, "xyz"));
    }
}

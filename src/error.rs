use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// Fibonacci numbers are only defined here for `n >= 0`.
    #[error("invalid argument: fib({n}) is undefined for negative input")]
    InvalidArgument { n: i64 },

    /// The result does not fit in a `u128` (`n > 186`).
    #[error("fib({n}) overflows a u128")]
    Overflow { n: i64 },

    #[error("failed to resolve `{hostname}`: {source}")]
    Resolution {
        hostname: String,
        #[source]
        source: io::Error,
    },

    #[error("lookup task for `{hostname}` panicked")]
    LookupPanicked { hostname: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[cfg(feature = "json")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn resolution(hostname: &str, source: io::Error) -> Self {
        Self::Resolution {
            hostname: hostname.to_owned(),
            source,
        }
    }
}

//! Logging setup for the `monkey` binary.
//!
//! Events go to stderr as `LEVEL message` lines, so they never mix with
//! what a session writes to its output stream.
//!
//! ```rust,no_run
//! monkey::logger::init(monkey::logger::LogLevel::Debug);
//! tracing::debug!("ready");
//! ```

use std::str::FromStr;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Environment variable holding a filter such as `debug` or
/// `monkey::repl=trace`. Overrides the level passed to [`init`].
pub const LOG_ENV: &str = "MONKEY_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Maps a repeated `-v` count to a level; zero is `Warn`.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn filter_for(level: LogLevel, directive: Option<&str>) -> Targets {
    let default = Targets::new().with_default(LevelFilter::from_level(level.into()));
    match directive {
        Some(d) => Targets::from_str(d).unwrap_or(default),
        None => default,
    }
}

/// Installs the global subscriber. Calling it more than once is harmless;
/// later calls are ignored.
pub fn init(level: LogLevel) {
    let directive = std::env::var(LOG_ENV).ok();
    let filter = filter_for(level, directive.as_deref());

    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(filter);

    if let Err(already_set) = Registry::default().with(layer).try_init() {
        // reaches whichever subscriber won the first call
        tracing::debug!(%already_set, "keeping the installed subscriber");
    }
}

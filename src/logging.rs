//! FFmpeg console verbosity.
//!
//! FFmpeg prints warnings straight to stderr, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade this crate uses for its own
//! diagnostics. [`set_ffmpeg_log_level`] tunes that output without requiring
//! callers to depend on `ffmpeg-next`.
//!
//! ```no_run
//! use videohandler::LogLevel;
//!
//! videohandler::set_ffmpeg_log_level(LogLevel::Error);
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

/// FFmpeg log verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// No output.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors that invalidate the decoding context.
    Fatal,
    /// Recoverable errors. The CLI default.
    Error,
    /// Warnings. FFmpeg's own default.
    Warning,
    /// Informational messages. The CLI uses this with `--verbose`.
    Info,
    /// Detailed informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Everything, including per-packet tracing.
    Trace,
}

impl LogLevel {
    const NAMES: [(&'static str, LogLevel); 9] = [
        ("quiet", LogLevel::Quiet),
        ("panic", LogLevel::Panic),
        ("fatal", LogLevel::Fatal),
        ("error", LogLevel::Error),
        ("warning", LogLevel::Warning),
        ("info", LogLevel::Info),
        ("verbose", LogLevel::Verbose),
        ("debug", LogLevel::Debug),
        ("trace", LogLevel::Trace),
    ];

    /// Lowercase name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, level)| *level == self)
            .map_or("quiet", |(name, _)| *name)
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        let lowered = if lowered == "warn" { "warning".to_string() } else { lowered };
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, level)| *level)
            .ok_or_else(|| format!("unknown log level: {value}"))
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Quiet => Level::Quiet,
            LogLevel::Panic => Level::Panic,
            LogLevel::Fatal => Level::Fatal,
            LogLevel::Error => Level::Error,
            LogLevel::Warning => Level::Warning,
            LogLevel::Info => Level::Info,
            LogLevel::Verbose => Level::Verbose,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Quiet => LogLevel::Quiet,
            Level::Panic => LogLevel::Panic,
            Level::Fatal => LogLevel::Fatal,
            Level::Error => LogLevel::Error,
            Level::Warning => LogLevel::Warning,
            Level::Info => LogLevel::Info,
            Level::Verbose => LogLevel::Verbose,
            Level::Debug => LogLevel::Debug,
            Level::Trace => LogLevel::Trace,
        }
    }
}

/// Set FFmpeg's console verbosity.
pub fn set_ffmpeg_log_level(level: LogLevel) {
    log::trace!("Setting FFmpeg log level to {level}");
    ffmpeg_next::util::log::set_level(level.into());
}

/// Current FFmpeg console verbosity, if it maps to a known level.
pub fn get_ffmpeg_log_level() -> Option<LogLevel> {
    ffmpeg_next::util::log::get_level().ok().map(LogLevel::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!(" quiet ".parse::<LogLevel>(), Ok(LogLevel::Quiet));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for (_, level) in LogLevel::NAMES {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
    }
}

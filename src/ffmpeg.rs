//! FFmpeg log level configuration.
//!
//! FFmpeg writes its own warnings to stderr, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade. Broken or truncated videos
//! make it chatty, which drowns out the per-video summary, so front ends
//! usually lower it with [`set_ffmpeg_log_level`].
//!
//! # Example
//!
//! ```no_run
//! use video_to_frames::FfmpegLogLevel;
//!
//! video_to_frames::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let level: FfmpegLogLevel = "quiet".parse().unwrap();
//! video_to_frames::set_ffmpeg_log_level(level);
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, from most quiet to most verbose.
///
/// Variants are declared in the same order as the lookup table below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

/// Each level with FFmpeg's equivalent and its command-line name.
const LEVELS: [(FfmpegLogLevel, Level, &str); 9] = [
    (FfmpegLogLevel::Quiet, Level::Quiet, "quiet"),
    (FfmpegLogLevel::Panic, Level::Panic, "panic"),
    (FfmpegLogLevel::Fatal, Level::Fatal, "fatal"),
    (FfmpegLogLevel::Error, Level::Error, "error"),
    (FfmpegLogLevel::Warning, Level::Warning, "warning"),
    (FfmpegLogLevel::Info, Level::Info, "info"),
    (FfmpegLogLevel::Verbose, Level::Verbose, "verbose"),
    (FfmpegLogLevel::Debug, Level::Debug, "debug"),
    (FfmpegLogLevel::Trace, Level::Trace, "trace"),
];

impl FfmpegLogLevel {
    fn entry(self) -> (FfmpegLogLevel, Level, &'static str) {
        LEVELS[self as usize]
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.entry().2)
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        let wanted = if wanted == "warn" { "warning" } else { wanted.as_str() };
        LEVELS
            .iter()
            .find(|(_, _, name)| *name == wanted)
            .map(|(level, _, _)| *level)
            .ok_or_else(|| format!("unknown FFmpeg log level: {value}"))
    }
}

/// Set FFmpeg's internal log verbosity.
///
/// This does not affect Rust-side `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.entry().1);
}

/// Get FFmpeg's current internal log verbosity, if it maps to a known level.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    let current = ffmpeg_next::util::log::get_level().ok()?;
    LEVELS
        .iter()
        .find(|(_, ffmpeg, _)| *ffmpeg == current)
        .map(|(level, _, _)| *level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("warn".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Warning));
        assert_eq!("QUIET".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Quiet));
        assert!("loud".parse::<FfmpegLogLevel>().is_err());
    }

    #[test]
    fn table_matches_declaration_order() {
        for (index, (level, _, _)) in LEVELS.iter().enumerate() {
            assert_eq!(*level as usize, index);
        }
    }

    #[test]
    fn set_level_is_read_back() {
        set_ffmpeg_log_level(FfmpegLogLevel::Warning);
        assert_eq!(get_ffmpeg_log_level(), Some(FfmpegLogLevel::Warning));
        set_ffmpeg_log_level(FfmpegLogLevel::Quiet);
        assert_eq!(get_ffmpeg_log_level(), Some(FfmpegLogLevel::Quiet));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for level in [FfmpegLogLevel::Error, FfmpegLogLevel::Trace] {
            assert_eq!(level.to_string().parse::<FfmpegLogLevel>(), Ok(level));
        }
    }
}

//! Stderr logging for the `log` facade.
//!
//! Output lines read `[  0.012s DEBUG blob_features::builder] built ...`.
//! Library code only emits records; binaries and tests pick a sink, either
//! this one via [`init_with_level`] / [`init_from_env`], or `tracing` with the
//! `tracing` feature.

use std::fmt::Arguments;
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

/// Environment variable read by [`init_from_env`].
pub const LOG_ENV_VAR: &str = "BLOB_FEATURES_LOG";

const FALLBACK_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrSink {
    max: LevelFilter,
    epoch: Instant,
}

fn format_line(secs: f64, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("[{secs:8.3}s {level:>5} {target}] {args}")
}

/// Level named by `raw`, or `warn` when absent or unrecognised.
fn parse_level(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(FALLBACK_LEVEL)
}

impl Log for StderrSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_line(
                self.epoch.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args(),
            );
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static SINK: OnceLock<StderrSink> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// Only the first call installs the sink; later calls return `Ok(())` and
/// keep the original level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if SINK.get().is_some() {
        return Ok(());
    }
    let sink = SINK.get_or_init(|| StderrSink {
        max: level,
        epoch: Instant::now(),
    });
    log::set_logger(sink)?;
    log::set_max_level(sink.max);
    Ok(())
}

/// [`init_with_level`] with the level read from [`LOG_ENV_VAR`].
pub fn init_from_env() -> Result<(), log::SetLoggerError> {
    let raw = std::env::var(LOG_ENV_VAR).ok();
    init_with_level(parse_level(raw.as_deref()))
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`),
/// with span close events so instrumented blob operations report timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_falls_back_to_warn() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Warn);
        assert_eq!(parse_level(None), LevelFilter::Warn);
    }

    #[test]
    fn line_carries_level_and_target() {
        let line = format_line(1.5, Level::Info, "blob_features", &format_args!("area {}", 100));
        assert_eq!(line, "[   1.500s  INFO blob_features] area 100");
    }
}

//! Process logging bootstrap.
//!
//! # Responsibility
//! - Install the `flexi_logger` backend behind the `log` facade once.
//! - Route output to stderr or to size-rotated files under a directory.
//!
//! # Invariants
//! - Repeating `init_logging` with the same level and target is a no-op.
//! - A second call with a different level or target fails instead of
//!   reconfiguring the running logger.
//! - Nothing in this module panics.
//! - Entry titles and contents are never logged by this crate.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecBuilder, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "journal";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_SUMMARY_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    Directory(PathBuf),
}

impl LogTarget {
    fn parse(log_dir: Option<&str>) -> Result<Self, String> {
        let Some(raw) = log_dir else {
            return Ok(Self::Stderr);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("log directory must not be blank".to_string());
        }
        let dir = Path::new(raw);
        if !dir.is_absolute() {
            return Err(format!("log directory `{raw}` is not an absolute path"));
        }
        Ok(Self::Directory(dir.to_path_buf()))
    }

    fn directory(&self) -> Option<&Path> {
        match self {
            Self::Stderr => None,
            Self::Directory(dir) => Some(dir),
        }
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

struct ActiveLogger {
    level: LevelFilter,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts process logging at `level`.
///
/// `log_dir = None` writes to stderr. `Some(dir)` writes rotating
/// `journal_*.log` files under the absolute directory `dir`, creating it
/// when needed.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging is already running with a different level or target.
/// - The backend refuses to start.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let level = parse_level(level)?;
    let target = LogTarget::parse(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start(level, &target))?;

    if active.target != target {
        return Err(format!(
            "logging already writes to `{}`; refusing to switch to `{target}`",
            active.target
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already runs at `{}`; refusing to switch to `{}`",
            level_name(active.level),
            level_name(level)
        ));
    }
    Ok(())
}

/// Reports the running logger as `(level, log_dir)`, or `None` before init.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    ACTIVE.get().map(|active| {
        (
            level_name(active.level),
            active.target.directory().map(Path::to_path_buf),
        )
    })
}

/// Level used when none is configured: `debug` in debug builds, `info` in
/// release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(level: LevelFilter, target: &LogTarget) -> Result<ActiveLogger, String> {
    let spec = LogSpecBuilder::new().default(level).build();
    let logger = Logger::with(spec);

    let logger = match target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    let handle = logger
        .start()
        .map_err(|err| format!("logger backend failed to start: {err}"))?;
    install_panic_hook();

    info!(
        "event=logging_init module=core status=ok level={} target={} os={} version={}",
        level_name(level),
        target,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        target: target.clone(),
        _handle: handle,
    })
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    let level = match normalized.as_str() {
        "warning" => LevelFilter::Warn,
        "off" => return Err("log level `off` is not allowed".to_string()),
        other => other.parse::<LevelFilter>().map_err(|_| {
            format!("unknown log level `{other}`; expected trace|debug|info|warn|error")
        })?,
    };
    Ok(level)
}

fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Payloads may echo request bodies; flatten and cap them.
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic module=core status=error location={location} payload={}",
            summarize_panic(info)
        );
        previous(info);
    }));
}

fn summarize_panic(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(message, PANIC_SUMMARY_CHARS)
}

fn single_line(value: &str, max_chars: usize) -> String {
    let mut out: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_level, single_line, LogTarget};
    use log::LevelFilter;
    use std::path::PathBuf;

    #[test]
    fn parse_level_is_case_insensitive_and_accepts_warning() {
        assert_eq!(parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("warning").unwrap(), LevelFilter::Warn);
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("off").is_err());
    }

    #[test]
    fn log_target_requires_absolute_non_blank_directory() {
        assert_eq!(LogTarget::parse(None).unwrap(), LogTarget::Stderr);
        assert!(LogTarget::parse(Some("   ")).is_err());
        assert!(LogTarget::parse(Some("logs/dev"))
            .unwrap_err()
            .contains("absolute"));
        assert_eq!(
            LogTarget::parse(Some("/var/log/journal")).unwrap(),
            LogTarget::Directory(PathBuf::from("/var/log/journal"))
        );
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        let line = single_line("line1\nline2\rline3", 8);
        assert_eq!(line, "line1 li...");
        assert_eq!(single_line("short", 8), "short");
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dir_str = dir.path().to_str().expect("utf-8 temp dir").to_string();

        init_logging("info", Some(&dir_str)).expect("first init");
        init_logging("INFO", Some(&dir_str)).expect("same config is a no-op");

        let level_err = init_logging("debug", Some(&dir_str)).expect_err("level change");
        assert!(level_err.contains("refusing to switch"));
        let target_err = init_logging("info", None).expect_err("target change");
        assert!(target_err.contains("refusing to switch"));

        let (level, active_dir) = logging_status().expect("logging active");
        assert_eq!(level, "info");
        assert_eq!(active_dir.as_deref(), Some(dir.path()));
    }
}

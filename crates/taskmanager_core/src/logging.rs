//! Process logging bootstrap.
//!
//! # Responsibility
//! - Initialize the `log` backend exactly once per process.
//! - Route records to an optional log file, or to stderr when there is none.
//! - Keep stderr free of records while a log file is active; the CLI owns
//!   user-facing error text there.
//!
//! # Invariants
//! - Logging initialization must not panic.
//! - An unwritable log file degrades to stderr-only logging; it never aborts
//!   the command being run.
//! - Re-initialization is rejected.

use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    target: LogTarget,
    _logger: LoggerHandle,
}

/// Where log records end up after initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Records go only to this file.
    File(PathBuf),
    /// Records go to stderr. `fallback_reason` is set when a configured log
    /// file could not be used.
    Stderr { fallback_reason: Option<String> },
}

/// Initializes logging with `level` and an optional `log_file`.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when logging was already initialized.
/// - Returns an error when even the stderr backend cannot start.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<LogTarget, String> {
    let normalized_level = normalize_level(level)?;
    if let Some(state) = LOGGING_STATE.get() {
        return Err(format!(
            "logging already initialized with level `{}` ({:?})",
            state.level, state.target
        ));
    }

    let (logger, target) = match log_file {
        Some(path) => match start_file_logger(normalized_level, path) {
            Ok(logger) => (logger, LogTarget::File(path.to_path_buf())),
            Err(reason) => (
                start_stderr_logger(normalized_level)?,
                LogTarget::Stderr {
                    fallback_reason: Some(reason),
                },
            ),
        },
        None => (
            start_stderr_logger(normalized_level)?,
            LogTarget::Stderr {
                fallback_reason: None,
            },
        ),
    };

    install_panic_hook_once();
    info!(
        "event=app_start module=core status=ok platform={} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        normalized_level
    );

    LOGGING_STATE
        .set(LoggingState {
            level: normalized_level,
            target: target.clone(),
            _logger: logger,
        })
        .map_err(|_| "logging already initialized".to_string())?;

    Ok(target)
}

/// Returns `(level, target)` when logging is active.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.target.clone()))
}

/// Maps user-facing level names onto `log` level filters.
pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" | "critical" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn start_file_logger(level: &str, path: &Path) -> Result<LoggerHandle, String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| {
            format!("failed to create log directory `{}`: {err}", parent.display())
        })?;
    }

    let spec = FileSpec::try_from(path)
        .map_err(|err| format!("invalid log file `{}`: {err}", path.display()))?
        .suppress_timestamp();

    Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(spec)
        .append()
        .write_mode(WriteMode::Direct)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to open log file `{}`: {err}", path.display()))
}

fn start_stderr_logger(level: &str) -> Result<LoggerHandle, String> {
    Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .format_for_stderr(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

/// Flattens newlines and caps length so one value stays on one log line.
pub fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, normalize_level, sanitize_message, LogTarget};

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert_eq!(normalize_level("CRITICAL").unwrap(), "error");
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_logging_writes_file_and_rejects_second_init() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("nested").join("taskmanager.log");

        let target = init_logging("info", Some(&log_file)).expect("first init should succeed");
        assert_eq!(target, LogTarget::File(log_file.clone()));
        log::info!("event=test module=logging status=ok");
        assert!(log_file.exists());

        let error = init_logging("info", None).expect_err("second init must fail");
        assert!(error.contains("already initialized"));

        let (level, active) = logging_status().expect("logging should be active");
        assert_eq!(level, "info");
        assert_eq!(active, LogTarget::File(log_file));
    }
}

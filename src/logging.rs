use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "error";
const VERBOSE_LOG_FILTER: &str = "warn,shellama=debug";
const DEFAULT_LOG_FORMAT: &str = "pretty";
const DEFAULT_LOG_OUTPUT: &str = "stderr";
const LOG_FILE_NAME: &str = "shellama.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Flushes the file sink when dropped; hold it until the program is done logging.
pub type LogGuard = Option<WorkerGuard>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw
        .unwrap_or(DEFAULT_LOG_FORMAT)
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_log_output(raw: Option<&str>) -> LogOutput {
    match raw
        .unwrap_or(DEFAULT_LOG_OUTPUT)
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "file" => LogOutput::File,
        "both" => LogOutput::Both,
        _ => LogOutput::Stderr,
    }
}

/// `<local data dir>/shellama/shellama.log`, or `shellama.log` when there is no data dir.
fn default_log_file_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("shellama").join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
}

fn parse_log_file_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_log_file_path)
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

fn build_file_writer(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new(LOG_FILE_NAME));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_filter_from_env(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)))
}

fn stderr_writer() -> BoxMakeWriter {
    BoxMakeWriter::new(std::io::stderr)
}

fn init_with_writer(format: LogFormat, env_filter: EnvFilter, writer: BoxMakeWriter) -> InitResult {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .try_init(),
    }
}

fn init_file_output(
    format: LogFormat,
    file_path: &Path,
    include_stderr: bool,
    verbose: bool,
) -> (InitResult, LogGuard) {
    match build_file_writer(file_path) {
        Ok((file_writer, guard)) => {
            let writer = if include_stderr {
                BoxMakeWriter::new(std::io::stderr.and(file_writer))
            } else {
                BoxMakeWriter::new(file_writer)
            };

            let init_result = init_with_writer(format, env_filter_from_env(verbose), writer);
            let guard = init_result.is_ok().then_some(guard);
            (init_result, guard)
        }
        Err(err) => {
            let mode = if include_stderr { "both" } else { "file" };
            eprintln!(
                "shellama: failed to initialize LOG_OUTPUT={} at '{}': {}; using stderr instead",
                mode,
                file_path.display(),
                err
            );
            (
                init_with_writer(format, env_filter_from_env(verbose), stderr_writer()),
                None,
            )
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity default.
pub fn init(verbose: bool) -> LogGuard {
    let format = parse_log_format(env::var("LOG_FORMAT").ok().as_deref());
    let output = parse_log_output(env::var("LOG_OUTPUT").ok().as_deref());
    let file_path = parse_log_file_path(env::var("LOG_FILE_PATH").ok().as_deref());

    let (init_result, guard) = match output {
        LogOutput::Stderr => (
            init_with_writer(format, env_filter_from_env(verbose), stderr_writer()),
            None,
        ),
        LogOutput::File => init_file_output(format, &file_path, false, verbose),
        LogOutput::Both => init_file_output(format, &file_path, true, verbose),
    };

    let _ = init_result;
    guard
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{
        DEFAULT_LOG_FILTER, LOG_FILE_NAME, LogFormat, LogOutput, VERBOSE_LOG_FILTER,
        default_filter, default_log_file_path, parse_log_file_path, parse_log_format,
        parse_log_output,
    };

    #[test]
    fn parse_log_format_defaults_to_pretty() {
        assert_eq!(parse_log_format(None), LogFormat::Pretty);
        assert_eq!(parse_log_format(Some("unknown")), LogFormat::Pretty);
    }

    #[test]
    fn parse_log_format_accepts_json() {
        assert_eq!(parse_log_format(Some(" JSON ")), LogFormat::Json);
    }

    #[test]
    fn parse_log_output_defaults_to_stderr() {
        assert_eq!(parse_log_output(None), LogOutput::Stderr);
        assert_eq!(parse_log_output(Some("syslog")), LogOutput::Stderr);
    }

    #[test]
    fn parse_log_output_accepts_file_and_both() {
        assert_eq!(parse_log_output(Some("file")), LogOutput::File);
        assert_eq!(parse_log_output(Some(" BOTH ")), LogOutput::Both);
    }

    #[test]
    fn parse_log_file_path_uses_default_for_missing_or_empty_values() {
        assert_eq!(parse_log_file_path(None), default_log_file_path());
        assert_eq!(parse_log_file_path(Some("  ")), default_log_file_path());
        assert!(default_log_file_path().ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn parse_log_file_path_preserves_explicit_value() {
        assert_eq!(
            parse_log_file_path(Some("custom/shellama.log")),
            PathBuf::from("custom/shellama.log")
        );
    }

    #[test]
    fn verbose_raises_default_filter() {
        assert_eq!(default_filter(false), DEFAULT_LOG_FILTER);
        assert_eq!(default_filter(true), VERBOSE_LOG_FILTER);
    }
}

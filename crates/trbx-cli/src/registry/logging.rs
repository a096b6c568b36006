use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use super::{RegistryError, RegistryResult};

/// Directives for `logs.ndjson` when `RUST_LOG` is unset or blank.
const DEFAULT_DIRECTIVES: &str = "info";

/// Install the process subscriber for one run.
///
/// Events accepted by `RUST_LOG` (default `info`) are appended to `path` as
/// JSON lines with RFC 3339 UTC timestamps. Warnings and errors are echoed to
/// stderr in compact form.
pub fn init_run_logging(path: &Path) -> RegistryResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = run_filter(std::env::var("RUST_LOG").ok().as_deref())?;

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file))
        .with_filter(filter);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}

fn run_filter(directives: Option<&str>) -> RegistryResult<EnvFilter> {
    let directives = directives
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES);
    EnvFilter::try_new(directives)
        .map_err(|err| RegistryError::Logging(format!("invalid RUST_LOG '{directives}': {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_rust_log_falls_back_to_info() {
        assert_eq!(run_filter(None).expect("filter").to_string(), "info");
        assert_eq!(run_filter(Some("  ")).expect("filter").to_string(), "info");
    }

    #[test]
    fn rust_log_directives_are_honoured() {
        let filter = run_filter(Some("trbx_generate=debug")).expect("filter");
        assert!(filter.to_string().contains("trbx_generate=debug"));
    }

    #[test]
    fn malformed_rust_log_is_a_logging_error() {
        let err = run_filter(Some("trbx=loud")).unwrap_err();
        assert!(matches!(err, RegistryError::Logging(message) if message.contains("trbx=loud")));
    }
}

//! Logging Infrastructure
//!
//! Structured logging setup for development (pretty, stdout) and production
//! (JSON, optional daily rolling file).

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is not set
fn default_directives(level: &str) -> String {
    format!("shop_server={level},security={level},tower_http={level}")
}

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `log_level`. When `log_dir` is given the
/// output goes to `<log_dir>/shop-server.<date>` instead of stdout.
pub fn init_logger(log_level: &str, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let file_appender = log_dir.and_then(|dir| {
        let path = Path::new(dir);
        if let Err(e) = std::fs::create_dir_all(path) {
            eprintln!("Cannot create log directory {dir}: {e}, logging to stdout");
            return None;
        }
        Some(tracing_appender::rolling::daily(path, "shop-server"))
    });

    match (json, file_appender) {
        (true, Some(writer)) => builder.json().with_writer(writer).init(),
        (true, None) => builder.json().init(),
        (false, Some(writer)) => builder.with_ansi(false).with_writer(writer).init(),
        (false, None) => builder.init(),
    }
}

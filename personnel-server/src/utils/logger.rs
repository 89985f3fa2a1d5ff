//! Tracing setup.
//!
//! Console output always; a daily rolling file under the configured log
//! directory when it exists.

use std::path::Path;

/// Console-only logging at the default level.
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Full logger init. Unparseable or missing levels fall back to `info`.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level
        .and_then(|value| value.parse().ok())
        .unwrap_or(tracing::Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    match log_dir.map(Path::new).filter(|dir| dir.exists()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "personnel-server");
            builder.with_writer(appender).init();
        }
        None => builder.init(),
    }
}

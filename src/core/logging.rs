use std::str::FromStr;

use console::Style;
use log::{Level, LevelFilter};

use crate::types::config::{colors_enabled, config};

fn level_style(level: Level) -> Style {
    match level {
        Level::Error => Style::new().red().bold(),
        Level::Warn => Style::new().yellow(),
        Level::Info => Style::new().green(),
        Level::Debug => Style::new().cyan(),
        Level::Trace => Style::new().dim(),
    }
}

/// Installs the global logger using the effective `[log]` settings. Must run after the
/// configuration has been initialized; later calls are ignored.
pub fn init_logging() {
    let log_config = config().log();
    let level = LevelFilter::from_str(log_config.level()).unwrap_or(LevelFilter::Info);
    let color = colors_enabled();

    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            let label = format!("{:<5}", record.level());
            let label = if color {
                level_style(record.level()).apply_to(label).to_string()
            } else {
                label
            };
            out.finish(format_args!("{label} {message}"))
        })
        .level(level)
        // sqlx logs every statement at info
        .level_for("sqlx", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}

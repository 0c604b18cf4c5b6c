// src/logger.rs
// =============================================================================
// Diagnostic logging.
//
// User-facing messages are printed to stdout by the commands themselves.
// The `log` macros (debug!, info!, warn!) are for the curious: every HTTP
// request, every unexpected status. They go to stderr so they never mix
// with the program's normal output.
//
// Level: warnings only by default, -v for info, -vv (or more) for debug.
// =============================================================================

use anyhow::{anyhow, Result};
use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use humantime::format_rfc3339_seconds;
use log::{warn, LevelFilter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

// A global logger can only be installed once per process
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Maps the number of -v flags to a level filter
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Installs the stderr logger.
///
/// Safe to call more than once: later calls log a warning and return Ok.
pub fn initialize(level: LevelFilter) -> Result<()> {
    if LOGGER_INITIALIZED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let colors = ColoredLevelConfig::new()
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
        .trace(Color::Magenta);

    Dispatch::new()
        .level(LevelFilter::Warn)
        // Only our own crate gets chatty with -v; reqwest/hyper stay at Warn
        .level_for(env!("CARGO_CRATE_NAME"), level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message}",
                date = format_rfc3339_seconds(SystemTime::now()),
                level = colors.color(record.level()),
                message = message,
            ))
        })
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

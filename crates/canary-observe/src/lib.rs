//! Logger setup for canary binaries.
//!
//! ```rust
//! use canary_observe::{LoggerConfig, init_logger};
//!
//! let cfg = LoggerConfig::default();
//! let _ = init_logger(&cfg);
//! tracing::info!("logger ready");
//! ```
mod clock;
mod config;
mod error;
mod format;
mod install;
mod level;

pub use clock::{LogClock, LoggerTimeZone};
pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;

/// Install the global tracing subscriber described by `cfg`.
///
/// With [`LoggerTimeZone::Local`] call this before starting a multi-threaded
/// runtime; offset detection fails once other threads exist and falls back to UTC.
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let clock = LogClock::for_zone(cfg.tz);
    match cfg.format {
        LoggerFormat::Text => install::text(cfg, clock),
        LoggerFormat::Json => install::json(cfg, clock),
        LoggerFormat::Journald => install::journald(cfg),
    }
}

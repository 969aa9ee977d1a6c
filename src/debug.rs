use parking_lot::Mutex;
/// Debug logging for mermaid-export
///
/// Level is taken from the DEBUG_LEVEL environment variable unless the CLI
/// or config overrides it through `init_log_bridge`:
/// - 0 or unset: No debugging
/// - 1: Errors only
/// - 2: Info level (render attempts, exports)
/// - 3: Debug level (staleness decisions, surface geometry)
/// - 4: Trace level (every operation, detailed info)
///
/// All output goes to /tmp/mermaid_export_debug.log on Unix/macOS,
/// or %TEMP%\mermaid_export_debug.log on Windows, so the CLI's own
/// stdout/stderr stays clean for piping.
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use mermaid_export_config::LogLevel;

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Option<Self> {
        let val = std::env::var("DEBUG_LEVEL").ok()?;
        match val.trim().parse::<u8>() {
            Ok(0) => Some(DebugLevel::Off),
            Ok(1) => Some(DebugLevel::Error),
            Ok(2) => Some(DebugLevel::Info),
            Ok(3) => Some(DebugLevel::Debug),
            Ok(4) => Some(DebugLevel::Trace),
            _ => None,
        }
    }

    fn from_log_level(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => DebugLevel::Off,
            LogLevel::Error | LogLevel::Warn => DebugLevel::Error,
            LogLevel::Info => DebugLevel::Info,
            LogLevel::Debug => DebugLevel::Debug,
            LogLevel::Trace => DebugLevel::Trace,
        }
    }

    fn from_record_level(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => DebugLevel::Error,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Debug,
            log::Level::Trace => DebugLevel::Trace,
        }
    }

    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Warn,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Global debug logger
struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
}

impl DebugLogger {
    fn new(level: DebugLevel) -> Self {
        if level == DebugLevel::Off {
            return DebugLogger { level, file: None };
        }

        #[cfg(unix)]
        let log_path = std::path::PathBuf::from("/tmp/mermaid_export_debug.log");
        #[cfg(windows)]
        let log_path = std::env::temp_dir().join("mermaid_export_debug.log");

        match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&log_path)
        {
            Ok(f) => {
                let mut logger = DebugLogger {
                    level,
                    file: Some(f),
                };
                logger.write_raw(&format!(
                    "\n{}\nmermaid-export debug session started at {} (level={:?})\n{}\n",
                    "=".repeat(80),
                    get_timestamp(),
                    level,
                    "=".repeat(80)
                ));
                logger
            }
            // An unwritable log file must not break rendering
            Err(_e) => DebugLogger { level, file: None },
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level <= self.level {
            let timestamp = get_timestamp();
            let level_str = match level {
                DebugLevel::Error => "ERROR",
                DebugLevel::Info => "INFO ",
                DebugLevel::Debug => "DEBUG",
                DebugLevel::Trace => "TRACE",
                DebugLevel::Off => return,
            };
            self.write_raw(&format!(
                "[{}] [{}] [{}] {}\n",
                timestamp, level_str, category, msg
            ));
        }
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| {
        Mutex::new(DebugLogger::new(
            DebugLevel::from_env().unwrap_or(DebugLevel::Off),
        ))
    })
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

/// Forwards `log` facade records into the debug log file, and mirrors them
/// to stderr when `RUST_LOG` is set.
struct LogBridge {
    mirror_stderr: bool,
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        is_enabled(DebugLevel::from_record_level(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let category = record.target();
        let level = DebugLevel::from_record_level(record.level());
        self::log(level, category, &format!("{}", record.args()));
        if self.mirror_stderr {
            eprintln!("[{}] [{}] {}", record.level(), category, record.args());
        }
    }

    fn flush(&self) {}
}

static LOG_BRIDGE_INIT: OnceLock<()> = OnceLock::new();

/// Route the `log` facade into the debug log file.
///
/// Precedence: the explicit `level` (CLI flag or config) wins, then
/// `DEBUG_LEVEL`, then off. Only the first call has any effect.
pub fn init_log_bridge(level: Option<LogLevel>) {
    LOG_BRIDGE_INIT.get_or_init(|| {
        let resolved = level
            .map(DebugLevel::from_log_level)
            .or_else(DebugLevel::from_env)
            .unwrap_or(DebugLevel::Off);

        // The file logger may already exist if a macro fired before init.
        let logger = get_logger();
        {
            let mut guard = logger.lock();
            if guard.level != resolved {
                *guard = DebugLogger::new(resolved);
            }
        }

        let bridge = LogBridge {
            mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
        };
        if log::set_boxed_logger(Box::new(bridge)).is_ok() {
            log::set_max_level(resolved.to_level_filter());
        }
    });
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}

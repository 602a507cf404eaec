//! Rolling Logger
//!
//! A `tracing` layer that keeps the most recent log lines in a bounded
//! circular buffer and echoes each line to the browser console (wasm) or
//! stderr (native). The buffer handle lets the UI show what happened
//! without opening devtools.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

pub use tracing_subscriber::filter::LevelFilter;

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Lines kept before the oldest are dropped
    pub capacity: usize,
    pub level: LevelFilter,
    /// Also write every line to the console / stderr
    pub echo: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            level: LevelFilter::INFO,
            echo: true,
        }
    }
}

/// One formatted event
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:>5} {}: {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Shared handle to the circular buffer
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, line: LogLine) {
        let mut lines = self.lock();
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Oldest first
    pub fn lines(&self) -> Vec<LogLine> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// All lines, newline separated
    pub fn render(&self) -> String {
        self.lock().iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogLine>> {
        // A panic while holding the lock leaves the deque intact
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Collects the `message` field plus any other fields as `key=value`
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl LineVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields.join(" "),
            (false, false) => format!("{} {}", self.message, self.fields.join(" ")),
        }
    }
}

pub struct RollingLayer {
    buffer: LogBuffer,
    echo: bool,
}

impl RollingLayer {
    pub fn new(buffer: LogBuffer, echo: bool) -> Self {
        Self { buffer, echo }
    }
}

impl<S: Subscriber> Layer<S> for RollingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = LogLine {
            timestamp: Local::now(),
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.finish(),
        };
        if self.echo {
            echo(&line);
        }
        self.buffer.push(line);
    }
}

#[cfg(target_arch = "wasm32")]
fn echo(line: &LogLine) {
    let text = wasm_bindgen::JsValue::from_str(&line.to_string());
    match line.level {
        Level::ERROR => web_sys::console::error_1(&text),
        Level::WARN => web_sys::console::warn_1(&text),
        Level::INFO => web_sys::console::info_1(&text),
        _ => web_sys::console::debug_1(&text),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn echo(line: &LogLine) {
    eprintln!("{}", line);
}

fn log_level(level: LevelFilter) -> log::LevelFilter {
    match level.into_level() {
        None => log::LevelFilter::Off,
        Some(Level::ERROR) => log::LevelFilter::Error,
        Some(Level::WARN) => log::LevelFilter::Warn,
        Some(Level::INFO) => log::LevelFilter::Info,
        Some(Level::DEBUG) => log::LevelFilter::Debug,
        Some(_) => log::LevelFilter::Trace,
    }
}

/// Install the global subscriber and return the buffer it writes to.
///
/// `log` records from dependencies are routed into the same buffer, capped
/// at the configured level.
pub fn init_logger(config: LoggerConfig) -> Result<LogBuffer, LoggerError> {
    let buffer = LogBuffer::new(config.capacity);
    tracing_subscriber::registry()
        .with(config.level)
        .with(RollingLayer::new(buffer.clone(), config.echo))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    log::set_max_level(log_level(config.level));

    tracing::info!(capacity = buffer.capacity(), level = %config.level, "logger initialized");
    Ok(buffer)
}

use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    }

    fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    fn allows(self, other: LogLevel) -> bool {
        other.rank() <= self.rank()
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub context: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
struct Counters {
    error: u64,
    warn: u64,
    info: u64,
    debug: u64,
}

/// Line-oriented stderr logger shared by every component of a call.
///
/// Clones and children share counters and, when enabled, the capture buffer.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    quiet: bool,
    counters: Arc<Mutex<Counters>>,
    captured: Option<Arc<Mutex<Vec<LogRecord>>>>,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::from_env(),
            quiet: false,
            counters: Arc::new(Mutex::new(Counters::default())),
            captured: None,
        }
    }

    /// Keeps every record in memory instead of writing to stderr.
    pub fn capturing(context: &str) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::Debug,
            quiet: true,
            counters: Arc::new(Mutex::new(Counters::default())),
            captured: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self {
            context,
            level: self.level,
            quiet: self.quiet,
            counters: self.counters.clone(),
            captured: self.captured.clone(),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&serde_json::Value>) {
        if !self.level.allows(level) {
            return;
        }
        if let Ok(mut counters) = self.counters.lock() {
            match level {
                LogLevel::Error => counters.error += 1,
                LogLevel::Warn => counters.warn += 1,
                LogLevel::Info => counters.info += 1,
                LogLevel::Debug => counters.debug += 1,
            }
        }
        let meta = meta.filter(|m| !m.is_null());
        if let Some(captured) = &self.captured {
            if let Ok(mut records) = captured.lock() {
                records.push(LogRecord {
                    level,
                    context: self.context.clone(),
                    message: message.to_string(),
                    meta: meta.cloned(),
                });
            }
        }
        if self.quiet {
            return;
        }
        let meta_suffix = meta.map(|m| format!(" {}", m)).unwrap_or_default();
        eprintln!(
            "[{}] {} [{}] {}{}",
            chrono::Utc::now().to_rfc3339(),
            level.label(),
            self.context,
            message,
            meta_suffix
        );
    }

    pub fn error(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Debug, message, meta);
    }

    /// Records captured so far; empty unless built with [`Logger::capturing`].
    pub fn records(&self) -> Vec<LogRecord> {
        self.captured
            .as_ref()
            .and_then(|c| c.lock().ok().map(|r| r.clone()))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> serde_json::Value {
        let counters = self.counters.lock().unwrap_or_else(|err| err.into_inner());
        serde_json::json!({
            "level": self.level,
            "context": self.context,
            "error": counters.error,
            "warn": counters.warn,
            "info": counters.info,
            "debug": counters.debug,
        })
    }
}

use std::{
    cmp::Ordering,
    sync::atomic::{AtomicU8, Ordering as AtomicOrdering},
};

pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

static MIN_LEVEL: AtomicU8 = AtomicU8::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl LogLevel {
    fn rank(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warn => 2,
        }
    }

    fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::Debug,
            1 => Self::Info,
            _ => Self::Warn,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

pub fn set_min_level(level: LogLevel) {
    MIN_LEVEL.store(level.rank(), AtomicOrdering::Relaxed);
}

pub fn min_level() -> LogLevel {
    LogLevel::from_rank(MIN_LEVEL.load(AtomicOrdering::Relaxed))
}

pub fn log_event(level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < min_level() {
        return;
    }

    emit(level, &build_event(now_millis(), level, event, fields));
}

fn build_event(ts: u64, level: LogLevel, event: &str, fields: serde_json::Value) -> serde_json::Value {
    let mut payload = serde_json::Map::new();
    payload.insert("ts".to_string(), serde_json::Value::Number(ts.into()));
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload)
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: LogLevel, payload: &serde_json::Value) {
    println!("{payload}");
}

#[cfg(target_arch = "wasm32")]
fn emit(level: LogLevel, payload: &serde_json::Value) {
    let line = wasm_bindgen::JsValue::from_str(&payload.to_string());
    match level {
        LogLevel::Warn => web_sys::console::warn_1(&line),
        LogLevel::Debug | LogLevel::Info => web_sys::console::log_1(&line),
    }
}

/// Browser builds pick their level from `localStorage`, so verbose logs can
/// be switched on from the devtools console without a rebuild.
#[cfg(target_arch = "wasm32")]
pub fn init_from_storage() {
    const LOG_LEVEL_KEY: &str = "portfolio-log-level";

    let level = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(LOG_LEVEL_KEY).ok().flatten())
        .and_then(|value| LogLevel::parse(&value))
        .unwrap_or(DEFAULT_LOG_LEVEL);
    set_min_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_fields_follow_envelope() {
        let payload = build_event(42, LogLevel::Info, "section.activated", json!({ "section": "section2" }));

        assert_eq!(
            payload,
            json!({ "ts": 42, "level": "info", "event": "section.activated", "section": "section2" })
        );
    }

    #[test]
    fn non_object_fields_are_ignored() {
        let payload = build_event(1, LogLevel::Warn, "bridge.failed", json!("oops"));
        assert_eq!(payload, json!({ "ts": 1, "level": "warn", "event": "bridge.failed" }));
    }

    #[test]
    fn levels_parse_and_order() {
        assert_eq!(LogLevel::parse(" DEBUG "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("trace"), None);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert_eq!(LogLevel::from_rank(LogLevel::Warn.rank()), LogLevel::Warn);
    }
}

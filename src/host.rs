use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

use crate::telemetry::{log_event, set_min_level, LogLevel, DEFAULT_LOG_LEVEL};

const DEFAULT_SITE_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_SITE_PORT: u16 = 8080;
const DEFAULT_DIST_DIR: &str = "dist";
const SITE_PORT_BOUNDS: (u16, u16) = (1_024, 65_535);
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, PartialEq)]
pub struct HostConfig {
    pub addr: SocketAddr,
    pub dist_dir: PathBuf,
    pub log_level: LogLevel,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = parse_non_empty(&lookup, "SITE_HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(DEFAULT_SITE_HOST);
        let port = parse_u16_with_bounds(&lookup, "SITE_PORT", DEFAULT_SITE_PORT, SITE_PORT_BOUNDS);
        let dist_dir = parse_non_empty(&lookup, "SITE_DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));
        let log_level = parse_non_empty(&lookup, "SITE_LOG_LEVEL")
            .and_then(|value| LogLevel::parse(&value))
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Self {
            addr: SocketAddr::new(host, port),
            dist_dir,
            log_level,
        }
    }
}

fn parse_non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u16_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u16,
    bounds: (u16, u16),
) -> u16 {
    parse_non_empty(lookup, name)
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = HostConfig::from_env();
    set_min_level(config.log_level);

    if !config.dist_dir.join("index.html").is_file() {
        log_event(
            LogLevel::Warn,
            "host.bundle_missing",
            json!({ "dist_dir": config.dist_dir.display().to_string(), "hint": "run `trunk build --release`" }),
        );
    }

    let listener = TcpListener::bind(config.addr).await?;
    log_event(
        LogLevel::Info,
        "host.listening",
        json!({ "addr": listener.local_addr()?.to_string(), "dist_dir": config.dist_dir.display().to_string() }),
    );

    axum::serve(listener, router(&config.dist_dir)).await?;
    Ok(())
}

/// Serves the built bundle. Unknown paths fall back to `index.html` so deep
/// links such as `/#section3` or a stale route still load the page.
pub fn router(dist_dir: &Path) -> Router {
    let static_files =
        ServeDir::new(dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")));

    Router::new()
        .route("/healthz", get(healthz))
        .fallback_service(static_files)
        .layer(middleware::from_fn(log_requests))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    log_event(
        LogLevel::Info,
        "http.request",
        json!({
            "request_id": request_id,
            "method": method,
            "path": path,
            "status": response.status().as_u16(),
            "elapsed_ms": started.elapsed().as_millis() as u64,
        }),
    );

    response
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(generate_request_id)
}

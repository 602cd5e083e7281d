// Page logic shared by both targets is only driven from the browser build;
// the native build compiles it for the host and the unit tests.
#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod content;
mod layout;
mod nav;
mod sections;
mod telemetry;
mod tracker;
mod viewport;
mod widgets;

#[cfg(target_arch = "wasm32")]
mod bridges;
#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
mod host;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    if let Err(error) = host::run().await {
        telemetry::log_event(
            telemetry::LogLevel::Warn,
            "host.failed",
            serde_json::json!({ "error": error.to_string() }),
        );
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}

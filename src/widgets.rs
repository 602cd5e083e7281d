//! Settings and one-shot guards for the two CDN-loaded page widgets.

use std::{
    cell::Cell,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicBool, Ordering},
};

use serde::Serialize;
use serde_json::json;

use crate::telemetry::{log_event, LogLevel};

pub const SHADER_SCRIPT_URL: &str = "https://cdn.unicorn.studio/v1.2.3/unicornStudio.umd.js";
pub const SHADER_SCRIPT_SELECTOR: &str = r#"script[src^="https://cdn.unicorn.studio"]"#;
pub const SHADER_GLOBAL: &str = "UnicornStudio";
pub const SHADER_PROJECT_ID: &str = "YnADGzDD7LGB9cUocyyN";
pub const SHADER_ATTRIBUTES: [(&str, &str); 3] = [
    ("data-us-dpi", "1"),
    ("data-us-scale", "1"),
    ("data-us-fps", "120"),
];

pub const PRELOADER_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/vara@1.4.0/lib/vara.min.js";
pub const PRELOADER_SCRIPT_SELECTOR: &str = r#"script[src*="vara.min.js"]"#;
pub const PRELOADER_GLOBAL: &str = "Vara";
pub const PRELOADER_FONT_URL: &str =
    "https://cdn.jsdelivr.net/npm/vara@1.4.0/fonts/Satisfy/SatisfySL.json";
pub const PRELOADER_CONTAINER_ID: &str = "container";
pub const PRELOADER_TEXT: &str = "Jerry's Portfolio :)";
pub const PRELOADER_TEXT_Y: u32 = 90;
pub const PRELOADER_STROKE_WIDTH: u32 = 2;
pub const PRELOADER_COLOR: &str = "#FFFFFF";
pub const PRELOADER_DRAW_MS: u32 = 4_000;
pub const PRELOADER_FADE_MS: u32 = 2_000;
pub const PRELOADER_FADE_TRANSITION: &str = "opacity 1s 1s";

/// Set on injected script tags so a later mount can tell whether the tag
/// already finished loading.
pub const SCRIPT_STATE_ATTRIBUTE: &str = "data-load-state";

pub static SHADER_STARTED: AtomicBool = AtomicBool::new(false);
pub static PRELOADER_STARTED: AtomicBool = AtomicBool::new(false);

pub fn preloader_font_size(screen_width: f64) -> u32 {
    if screen_width < 700.0 {
        32
    } else if screen_width < 1200.0 {
        56
    } else {
        72
    }
}

pub fn preloader_total_ms() -> u32 {
    PRELOADER_DRAW_MS + PRELOADER_FADE_MS
}

/// Process-wide "already started" flag for a widget whose library keeps
/// global state. Cleared only by [`InitGuard::finish`] or a page reload.
#[derive(Clone, Copy)]
pub struct InitGuard {
    flag: &'static AtomicBool,
}

impl InitGuard {
    pub const fn new(flag: &'static AtomicBool) -> Self {
        Self { flag }
    }

    pub fn try_begin(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_started(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn finish(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptTagState {
    Pending,
    Loaded,
    Failed,
}

impl ScriptTagState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        }
    }

    /// Tags without a recognised marker are assumed to still be loading.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("loaded") => Self::Loaded,
            Some("failed") => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// `load` or `error` has already fired, so listeners attached now would
    /// never run.
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    AnimationEnd,
    AlreadyStarted,
    ScriptFailed,
    InitFailed,
}

/// The preloader's `on_finish`, shared by every path that can end the intro.
/// Only the first [`fire`](Self::fire) runs it.
#[derive(Clone)]
pub struct PreloaderCompletion {
    done: Rc<Cell<bool>>,
    callback: Rc<dyn Fn()>,
}

impl PreloaderCompletion {
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            done: Rc::new(Cell::new(false)),
            callback: Rc::new(callback),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    pub fn fire(&self, reason: FinishReason) -> bool {
        if self.done.replace(true) {
            return false;
        }
        log_event(LogLevel::Info, "preloader.finished", json!({ "reason": reason }));
        (self.callback)();
        true
    }

    /// Claims `guard` for this mount. When an earlier mount already holds it
    /// the intro is over as far as this mount is concerned.
    pub fn begin(&self, guard: &InitGuard) -> bool {
        if guard.try_begin() {
            return true;
        }
        self.fire(FinishReason::AlreadyStarted);
        false
    }

    /// Finishes straight away when starting the animation failed.
    pub fn fail_on_error<E: fmt::Display>(&self, result: Result<(), E>) -> bool {
        let Err(error) = result else {
            return false;
        };
        log_event(
            LogLevel::Warn,
            "preloader.init_failed",
            json!({ "error": error.to_string() }),
        );
        self.fire(FinishReason::InitFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_completion() -> (PreloaderCompletion, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let completion = {
            let calls = calls.clone();
            PreloaderCompletion::new(move || calls.set(calls.get() + 1))
        };
        (completion, calls)
    }

    #[test]
    fn font_size_steps_with_screen_width() {
        assert_eq!(preloader_font_size(390.0), 32);
        assert_eq!(preloader_font_size(700.0), 56);
        assert_eq!(preloader_font_size(1199.0), 56);
        assert_eq!(preloader_font_size(1920.0), 72);
    }

    #[test]
    fn preloader_runs_about_six_seconds() {
        assert_eq!(preloader_total_ms(), 6_000);
    }

    #[test]
    fn guard_admits_one_starter_until_finished() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let guard = InitGuard::new(&FLAG);

        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        assert!(guard.is_started());

        guard.finish();
        assert!(!guard.is_started());
        assert!(guard.try_begin());
    }

    #[test]
    fn completion_runs_callback_once() {
        let (completion, calls) = counting_completion();

        assert!(completion.fire(FinishReason::AnimationEnd));
        assert!(!completion.fire(FinishReason::AnimationEnd));
        assert!(!completion.clone().fire(FinishReason::ScriptFailed));
        assert!(completion.is_done());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn script_failure_finishes_and_late_animation_end_is_ignored() {
        let (completion, calls) = counting_completion();

        completion.fire(FinishReason::ScriptFailed);
        assert_eq!(calls.get(), 1);

        completion.fire(FinishReason::AnimationEnd);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn init_error_finishes_immediately() {
        let (completion, calls) = counting_completion();

        assert!(!completion.fail_on_error(Ok::<(), String>(())));
        assert_eq!(calls.get(), 0);

        assert!(completion.fail_on_error(Err("Vara is not a constructor")));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn second_mount_finishes_immediately_while_first_holds_guard() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let guard = InitGuard::new(&FLAG);

        let (first, first_calls) = counting_completion();
        assert!(first.begin(&guard));
        assert_eq!(first_calls.get(), 0);

        let (second, second_calls) = counting_completion();
        assert!(!second.begin(&guard));
        assert_eq!(second_calls.get(), 1);
        assert!(!first.is_done());
        assert!(guard.is_started());
    }

    #[test]
    fn script_tag_state_reads_marker() {
        assert_eq!(ScriptTagState::from_attribute(None), ScriptTagState::Pending);
        assert_eq!(
            ScriptTagState::from_attribute(Some("loaded")),
            ScriptTagState::Loaded
        );
        assert_eq!(
            ScriptTagState::from_attribute(Some("failed")),
            ScriptTagState::Failed
        );
        assert!(!ScriptTagState::Pending.is_settled());
        assert!(ScriptTagState::Loaded.is_settled());
        for state in [ScriptTagState::Pending, ScriptTagState::Loaded, ScriptTagState::Failed] {
            assert_eq!(ScriptTagState::from_attribute(Some(state.as_str())), state);
        }
    }
}

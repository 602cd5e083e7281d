//! Glue for the two CDN widgets: the shader background and the handwriting
//! preloader. Each one injects its script at most once and drives the
//! library through its global entry point.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{window, Document, Element, HtmlElement, HtmlScriptElement};

use crate::telemetry::{log_event, LogLevel};
use crate::widgets::{
    preloader_font_size, FinishReason, InitGuard, PreloaderCompletion, ScriptTagState,
    PRELOADER_COLOR, PRELOADER_CONTAINER_ID, PRELOADER_DRAW_MS,
    PRELOADER_FADE_MS, PRELOADER_FADE_TRANSITION, PRELOADER_FONT_URL, PRELOADER_GLOBAL,
    PRELOADER_SCRIPT_SELECTOR, PRELOADER_SCRIPT_URL, PRELOADER_STARTED, PRELOADER_STROKE_WIDTH,
    PRELOADER_TEXT, PRELOADER_TEXT_Y, SHADER_ATTRIBUTES, SHADER_GLOBAL, SHADER_PROJECT_ID,
    SCRIPT_STATE_ATTRIBUTE, SHADER_SCRIPT_SELECTOR, SHADER_SCRIPT_URL, SHADER_STARTED,
};

#[derive(Debug)]
pub enum BridgeError {
    MissingDocument,
    MissingElement(&'static str),
    Script(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDocument => write!(f, "document is not available"),
            Self::MissingElement(what) => write!(f, "missing element: {what}"),
            Self::Script(message) => write!(f, "script error: {message}"),
        }
    }
}

impl std::error::Error for BridgeError {}

fn js_error(context: &str, value: JsValue) -> BridgeError {
    let detail = value.as_string().unwrap_or_else(|| format!("{value:?}"));
    BridgeError::Script(format!("{context}: {detail}"))
}

#[derive(Clone, Copy)]
enum ScriptParent {
    Head,
    Body,
}

struct ScriptSource {
    src: &'static str,
    selector: &'static str,
    global: &'static str,
    parent: ScriptParent,
    async_load: bool,
}

const SHADER_SCRIPT: ScriptSource = ScriptSource {
    src: SHADER_SCRIPT_URL,
    selector: SHADER_SCRIPT_SELECTOR,
    global: SHADER_GLOBAL,
    parent: ScriptParent::Head,
    async_load: false,
};

const PRELOADER_SCRIPT: ScriptSource = ScriptSource {
    src: PRELOADER_SCRIPT_URL,
    selector: PRELOADER_SCRIPT_SELECTOR,
    global: PRELOADER_GLOBAL,
    parent: ScriptParent::Body,
    async_load: true,
};

struct PendingScript {
    on_ready: Box<dyn FnOnce()>,
    on_failed: Box<dyn FnOnce()>,
}

/// Keeps the `load`/`error` listeners of a script tag alive. Dropping it
/// detaches them.
struct ScriptLoad {
    _listeners: Vec<EventListener>,
}

fn lookup_global(name: &str) -> Option<JsValue> {
    let win = window()?;
    Reflect::get(&win, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn inject_script(document: &Document, source: &ScriptSource) -> Result<HtmlScriptElement, BridgeError> {
    let script = document
        .create_element("script")
        .map_err(|error| js_error("create script", error))?
        .dyn_into::<HtmlScriptElement>()
        .map_err(|_| BridgeError::Script("created element is not a script".to_string()))?;
    script.set_src(source.src);
    script.set_async(source.async_load);
    let _ = script.set_attribute(SCRIPT_STATE_ATTRIBUTE, ScriptTagState::Pending.as_str());

    // Outlive every mount so a later reuse can see how the load ended.
    for (event, state) in [("load", ScriptTagState::Loaded), ("error", ScriptTagState::Failed)] {
        let tag = script.clone();
        EventListener::once(&script, event, move |_| {
            let _ = tag.set_attribute(SCRIPT_STATE_ATTRIBUTE, state.as_str());
        })
        .forget();
    }

    let parent: Element = match source.parent {
        ScriptParent::Head => document
            .head()
            .ok_or(BridgeError::MissingElement("head"))?
            .into(),
        ScriptParent::Body => document
            .body()
            .ok_or(BridgeError::MissingElement("body"))?
            .into(),
    };
    parent
        .append_child(&script)
        .map_err(|error| js_error("append script", error))?;

    log_event(LogLevel::Debug, "bridge.script.injected", json!({ "src": source.src }));
    Ok(script)
}

/// Runs `on_ready` once the library global exists, reusing a matching script
/// tag when one is already in the document. Exactly one of the two callbacks
/// runs. A reused tag that already finished without defining the global
/// counts as failed.
fn load_script(
    source: &ScriptSource,
    on_ready: impl FnOnce() + 'static,
    on_failed: impl FnOnce() + 'static,
) -> Result<ScriptLoad, BridgeError> {
    if lookup_global(source.global).is_some() {
        on_ready();
        return Ok(ScriptLoad {
            _listeners: Vec::new(),
        });
    }

    let document = window()
        .and_then(|w| w.document())
        .ok_or(BridgeError::MissingDocument)?;

    let script = match document.query_selector(source.selector).ok().flatten() {
        Some(existing) => {
            let marker = existing.get_attribute(SCRIPT_STATE_ATTRIBUTE);
            let state = ScriptTagState::from_attribute(marker.as_deref());
            if state.is_settled() {
                log_event(
                    LogLevel::Warn,
                    "bridge.script.unusable",
                    json!({ "src": source.src, "state": state.as_str() }),
                );
                on_failed();
                return Ok(ScriptLoad {
                    _listeners: Vec::new(),
                });
            }
            existing
                .dyn_into::<HtmlScriptElement>()
                .map_err(|_| BridgeError::Script(format!("{} matched a non-script element", source.selector)))?
        }
        None => inject_script(&document, source)?,
    };

    let pending = Rc::new(RefCell::new(Some(PendingScript {
        on_ready: Box::new(on_ready),
        on_failed: Box::new(on_failed),
    })));

    let on_load = {
        let pending = pending.clone();
        EventListener::once(&script, "load", move |_| {
            let next = pending.borrow_mut().take();
            if let Some(next) = next {
                (next.on_ready)();
            }
        })
    };

    let on_error = {
        let src = source.src;
        EventListener::once(&script, "error", move |_| {
            log_event(LogLevel::Warn, "bridge.script.failed", json!({ "src": src }));
            let next = pending.borrow_mut().take();
            if let Some(next) = next {
                (next.on_failed)();
            }
        })
    };

    Ok(ScriptLoad {
        _listeners: vec![on_load, on_error],
    })
}

fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, BridgeError> {
    let method = Reflect::get(target, &JsValue::from_str(name))
        .map_err(|error| js_error(name, error))?
        .dyn_into::<Function>()
        .map_err(|_| BridgeError::Script(format!("{name} is not a function")))?;
    method
        .apply(target, args)
        .map_err(|error| js_error(name, error))
}

fn js_object(entries: &[(&str, JsValue)]) -> Result<Object, BridgeError> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value)
            .map_err(|error| js_error("build options", error))?;
    }
    Ok(object)
}

pub struct ShaderBackgroundHandle {
    _script: ScriptLoad,
    alive: Rc<Cell<bool>>,
    guard: InitGuard,
}

impl Drop for ShaderBackgroundHandle {
    fn drop(&mut self) {
        self.alive.set(false);
        if let Some(studio) = lookup_global(SHADER_GLOBAL) {
            let _ = call_method(&studio, "destroy", &Array::new());
        }
        self.guard.finish();
    }
}

fn init_shader_scenes() {
    let Some(studio) = lookup_global(SHADER_GLOBAL) else {
        return;
    };

    let _ = call_method(&studio, "destroy", &Array::new());
    let started = match call_method(&studio, "init", &Array::new()) {
        Ok(started) => started,
        Err(error) => {
            log_event(LogLevel::Warn, "shader.init_failed", json!({ "error": error.to_string() }));
            return;
        }
    };

    let Ok(promise) = started.dyn_into::<Promise>() else {
        return;
    };

    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(scenes) => {
                let count = if Array::is_array(&scenes) {
                    Array::from(&scenes).length()
                } else {
                    0
                };
                log_event(LogLevel::Info, "shader.ready", json!({ "scenes": count }));
            }
            Err(error) => {
                log_event(
                    LogLevel::Warn,
                    "shader.init_failed",
                    json!({ "error": js_error("init", error).to_string() }),
                );
            }
        }
    });
}

/// Starts the shader background on `host`. Returns `Ok(None)` when another
/// mount already owns the library.
pub fn start_shader_background(host: &Element) -> Result<Option<ShaderBackgroundHandle>, BridgeError> {
    let guard = InitGuard::new(&SHADER_STARTED);
    if !guard.try_begin() {
        log_event(LogLevel::Debug, "shader.skipped", json!({ "reason": "already_started" }));
        return Ok(None);
    }

    let _ = host.set_attribute("data-us-project", SHADER_PROJECT_ID);
    for (name, value) in SHADER_ATTRIBUTES {
        let _ = host.set_attribute(name, value);
    }

    let alive = Rc::new(Cell::new(true));
    let on_ready = {
        let alive = alive.clone();
        move || {
            if alive.get() {
                init_shader_scenes();
            }
        }
    };

    match load_script(&SHADER_SCRIPT, on_ready, || ()) {
        Ok(script) => Ok(Some(ShaderBackgroundHandle {
            _script: script,
            alive,
            guard,
        })),
        Err(error) => {
            guard.finish();
            Err(error)
        }
    }
}

pub struct PreloaderHandle {
    _script: ScriptLoad,
    alive: Rc<Cell<bool>>,
    pending_finish: Rc<RefCell<Option<Timeout>>>,
}

impl Drop for PreloaderHandle {
    fn drop(&mut self) {
        self.alive.set(false);
        self.pending_finish.borrow_mut().take();
        clear_container();
    }
}

fn clear_container() {
    if let Some(container) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(PRELOADER_CONTAINER_ID))
    {
        container.set_inner_html("");
    }
}

fn fade_out(drawn: &JsValue) {
    let Some(container) = Reflect::get(drawn, &JsValue::from_str("container"))
        .ok()
        .and_then(|value| value.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    let style = container.style();
    let _ = style.set_property("transition", PRELOADER_FADE_TRANSITION);
    let _ = style.set_property("opacity", "0");
}

fn draw_handwriting(
    completion: &PreloaderCompletion,
    pending_finish: &Rc<RefCell<Option<Timeout>>>,
) -> Result<(), BridgeError> {
    let win = window().ok_or(BridgeError::MissingDocument)?;
    let constructor = lookup_global(PRELOADER_GLOBAL)
        .ok_or_else(|| BridgeError::Script(format!("{PRELOADER_GLOBAL} is not loaded")))?
        .dyn_into::<Function>()
        .map_err(|_| BridgeError::Script(format!("{PRELOADER_GLOBAL} is not a constructor")))?;

    let screen_width = win
        .screen()
        .ok()
        .and_then(|screen| screen.width().ok())
        .map(f64::from)
        .unwrap_or(1280.0);

    let text = js_object(&[
        ("text", JsValue::from_str(PRELOADER_TEXT)),
        ("y", JsValue::from(PRELOADER_TEXT_Y)),
        (
            "fromCurrentPosition",
            js_object(&[("y", JsValue::FALSE)])?.into(),
        ),
        ("duration", JsValue::from(PRELOADER_DRAW_MS)),
    ])?;
    let options = js_object(&[
        ("strokeWidth", JsValue::from(PRELOADER_STROKE_WIDTH)),
        ("color", JsValue::from_str(PRELOADER_COLOR)),
        ("fontSize", JsValue::from(preloader_font_size(screen_width))),
        ("textAlign", JsValue::from_str("center")),
    ])?;

    let args = Array::of4(
        &JsValue::from_str(&format!("#{PRELOADER_CONTAINER_ID}")),
        &JsValue::from_str(PRELOADER_FONT_URL),
        &Array::of1(&text),
        &options,
    );
    let vara = Reflect::construct(&constructor, &args).map_err(|error| js_error("construct", error))?;

    let on_animation_end = {
        let completion = completion.clone();
        let pending_finish = pending_finish.clone();
        let erased = Cell::new(false);
        Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_index: JsValue, drawn: JsValue| {
            if erased.replace(true) {
                return;
            }
            fade_out(&drawn);
            let completion = completion.clone();
            *pending_finish.borrow_mut() = Some(Timeout::new(PRELOADER_FADE_MS, move || {
                completion.fire(FinishReason::AnimationEnd);
            }));
        })
        .into_js_value()
    };

    let on_ready = {
        let completion = completion.clone();
        let target = vara.clone();
        Closure::once_into_js(move || {
            let registered = call_method(&target, "animationEnd", &Array::of1(&on_animation_end));
            completion.fail_on_error(registered.map(|_| ()));
        })
    };

    call_method(&vara, "ready", &Array::of1(&on_ready))?;
    Ok(())
}

/// Plays the handwriting intro and calls `on_finish` once it has faded out.
/// Load failures finish immediately so the page is never stuck behind the
/// overlay. A remount after the first start finishes immediately as well.
pub fn start_preloader(on_finish: impl Fn() + 'static) -> Result<Option<PreloaderHandle>, BridgeError> {
    let completion = PreloaderCompletion::new(on_finish);
    if !completion.begin(&InitGuard::new(&PRELOADER_STARTED)) {
        return Ok(None);
    }

    clear_container();

    let alive = Rc::new(Cell::new(true));
    let pending_finish = Rc::new(RefCell::new(None));

    let on_ready = {
        let alive = alive.clone();
        let completion = completion.clone();
        let pending_finish = pending_finish.clone();
        move || {
            if !alive.get() {
                return;
            }
            completion.fail_on_error(draw_handwriting(&completion, &pending_finish));
        }
    };

    let on_failed = {
        let completion = completion.clone();
        move || {
            completion.fire(FinishReason::ScriptFailed);
        }
    };

    let script = load_script(&PRELOADER_SCRIPT, on_ready, on_failed)?;
    Ok(Some(PreloaderHandle {
        _script: script,
        alive,
        pending_finish,
    }))
}

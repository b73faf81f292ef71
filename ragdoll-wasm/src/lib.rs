use std::cell::RefCell;
use std::rc::Rc;

use log::LevelFilter;
use ragdoll_core::{Playground, RagdollConfig, RapierWorld, Vec2};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, Window};

mod canvas;
mod logger;
mod render;
mod state;
mod utils;

use state::{STATE, State};
use utils::{
    asset_url, event_canvas_coords, fetch_text_with_fallbacks, get_query_param, is_truthy, log,
    sync_canvas_size,
};

fn new_playground(
    config: &RagdollConfig,
    width: f32,
    height: f32,
) -> Result<Playground<RapierWorld>, JsValue> {
    Playground::new(RapierWorld::new(config.gravity), config, width, height)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Finds `#cv`, or creates a full-window canvas when the page has none.
fn init_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(el) = document.get_element_by_id("cv") {
        return el
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("#cv is not a canvas"));
    }
    log::warn!("canvas #cv not found, creating one");
    let cv = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    cv.set_id("cv");
    cv.set_attribute(
        "style",
        "position:fixed;left:0;top:0;width:100vw;height:100vh;display:block",
    )?;
    document.body().ok_or("no body")?.append_child(&cv)?;
    Ok(cv)
}

fn context_2d(cv: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    cv.get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("2D context has the wrong type"))
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    {
        let st = state.clone();
        let mousedown = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let (x, y) = event_canvas_coords(&e, &s.canvas);
            if s.playground.press(Vec2::new(x, y)) {
                e.prevent_default();
            }
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }
    {
        let st = state.clone();
        let mousemove = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            if s.playground.is_dragging() {
                let (x, y) = event_canvas_coords(&e, &s.canvas);
                s.playground.drag_to(Vec2::new(x, y));
            }
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }
    {
        let st = state.clone();
        let mouseup = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_e: MouseEvent| {
            st.borrow_mut().playground.release();
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }
    {
        let st = state.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            st.borrow_mut().resize_pending = true;
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }
    Ok(())
}

/// One animation frame: pending resize, fixed steps, then drawing.
fn frame(state: &mut State, now_ms: f64) {
    if state.resize_pending {
        state.resize_pending = false;
        let (w, h) = sync_canvas_size(&state.window, &state.canvas);
        state.playground.resize(w, h);
    }
    state.playground.advance(now_ms);
    render::draw(state);
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) {
    if let Some(window) = web_sys::window()
        && let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref())
    {
        log::error!("requestAnimationFrame failed: {e:?}");
    }
}

fn start_animation(state: Rc<RefCell<State>>) {
    type RafClosure = Closure<dyn FnMut(f64)>;
    let f: Rc<RefCell<Option<RafClosure>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        frame(&mut state.borrow_mut(), ts);
        if let Some(cb) = f.borrow().as_ref() {
            request_frame(cb);
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        request_frame(cb);
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();

    let level = get_query_param(&search, "log")
        .map(|l| logger::parse_level(&l))
        .unwrap_or(LevelFilter::Info);
    logger::init(level);
    log(&format!("ragdoll starting, log level {level}"));

    let debug = get_query_param(&search, "debug").is_some_and(|v| is_truthy(&v));
    let canvas = init_canvas(&document)?;
    let ctx = match context_2d(&canvas) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            log::error!("drawing disabled: {e:?}");
            None
        }
    };

    let mut config = RagdollConfig::default();
    config.show_walls |= debug;
    let (w, h) = sync_canvas_size(&window, &canvas);
    let playground = new_playground(&config, w, h)?;

    let state = Rc::new(RefCell::new(State {
        window: window.clone(),
        canvas,
        ctx,
        playground,
        config,
        resize_pending: false,
        show_status: debug,
    }));
    STATE.with(|st| st.replace(Some(state.clone())));
    attach_ui(state.clone())?;
    start_animation(state);

    // Defaults are already running; a fetched config restarts the session.
    if let Some(url) = get_query_param(&search, "config") {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = fetch_and_apply_config(&window, &url, debug).await {
                log::warn!("config '{url}' not applied, keeping defaults: {err:?}");
            }
        });
    }
    Ok(())
}

async fn fetch_and_apply_config(window: &Window, url: &str, debug: bool) -> Result<(), JsValue> {
    let text = fetch_text_with_fallbacks(window, &[&asset_url(url), url])
        .await
        .ok_or_else(|| JsValue::from_str("could not fetch config"))?;
    let mut config =
        RagdollConfig::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    config.show_walls |= debug;

    STATE.with(|st| -> Result<(), JsValue> {
        if let Some(st_rc) = st.borrow().as_ref() {
            let mut s = st_rc.borrow_mut();
            let vp = *s.playground.viewport();
            s.playground = new_playground(&config, vp.width, vp.height)?;
            s.config = config;
            log::info!("loaded config from {url}");
        }
        Ok(())
    })
}

/// Current session state as JSON, for the host page and debugging.
#[wasm_bindgen]
pub fn ragdoll_status() -> String {
    STATE.with(|st| {
        st.borrow()
            .as_ref()
            .and_then(|s| serde_json::to_string(&s.borrow().playground.status()).ok())
            .unwrap_or_else(|| "null".to_string())
    })
}

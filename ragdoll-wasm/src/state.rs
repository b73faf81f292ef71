use std::cell::RefCell;
use std::rc::Rc;

use ragdoll_core::{Playground, RagdollConfig, RapierWorld};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

/// Runtime state stored behind an `Rc<RefCell<_>>` so it can be shared
/// across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub canvas: HtmlCanvasElement,
    /// `None` when the browser refused a 2D context; the simulation still runs.
    pub ctx: Option<CanvasRenderingContext2d>,
    pub playground: Playground<RapierWorld>,
    pub config: RagdollConfig,
    /// Set by the resize listener, applied before the next frame's ticks.
    pub resize_pending: bool,
    pub show_status: bool,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}

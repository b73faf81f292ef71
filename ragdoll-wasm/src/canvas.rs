use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

/// Traces a rectangle centred on the origin with corners of `radius`.
pub fn rounded_rect_path(ctx: &CanvasRenderingContext2d, w: f64, h: f64, radius: f64) {
    let (x0, y0, x1, y1) = (-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    ctx.begin_path();
    ctx.move_to(x0 + r, y0);
    let _ = ctx.arc_to(x1, y0, x1, y1, r);
    let _ = ctx.arc_to(x1, y1, x0, y1, r);
    let _ = ctx.arc_to(x0, y1, x0, y0, r);
    let _ = ctx.arc_to(x0, y0, x1, y0, r);
    ctx.close_path();
}

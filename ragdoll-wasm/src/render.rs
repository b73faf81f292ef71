use ragdoll_core::{PartKind, PartPose, SessionStatus};
use web_sys::CanvasRenderingContext2d;

use crate::canvas::{rounded_rect_path, set_fill_style, set_stroke_style};
use crate::state::State;

const BACKGROUND: &str = "#f4f1ea";
const OUTLINE: &str = "#2b2b2b";
const WALL: &str = "rgba(200, 40, 40, 0.6)";

fn part_color(kind: PartKind) -> &'static str {
    match kind {
        PartKind::Head => "#f2c9a0",
        PartKind::Torso => "#4f7cac",
        PartKind::LeftUpperArm | PartKind::RightUpperArm => "#6b9bd1",
        PartKind::LeftLowerArm | PartKind::RightLowerArm => "#f2c9a0",
        PartKind::LeftUpperLeg | PartKind::RightUpperLeg => "#3d4f66",
        PartKind::LeftLowerLeg | PartKind::RightLowerLeg => "#56677f",
    }
}

pub fn draw(state: &State) {
    let Some(ctx) = state.ctx.as_ref() else {
        return;
    };
    let dpr = state.window.device_pixel_ratio();
    // draw in CSS pixels, the simulation's units
    let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

    let vp = state.playground.viewport();
    let (w, h) = (vp.width as f64, vp.height as f64);
    ctx.clear_rect(0.0, 0.0, w, h);
    set_fill_style(ctx, BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    if state.config.show_walls {
        draw_walls(ctx, state);
    }
    for pose in state.playground.part_poses() {
        draw_part(ctx, &pose);
    }
    if state.show_status || state.config.show_walls {
        draw_status(ctx, &state.playground.status(), state.playground.ticks());
    }
}

fn draw_part(ctx: &CanvasRenderingContext2d, pose: &PartPose) {
    let (w, h) = (pose.width as f64, pose.height as f64);
    ctx.save();
    let _ = ctx.translate(pose.x as f64, pose.y as f64);
    let _ = ctx.rotate(pose.angle as f64);
    let radius = if pose.kind == PartKind::Head {
        w.min(h) / 2.0
    } else {
        w.min(h) * 0.3
    };
    rounded_rect_path(ctx, w, h, radius);
    set_fill_style(ctx, part_color(pose.kind));
    ctx.fill();
    ctx.set_line_width(1.6);
    set_stroke_style(ctx, OUTLINE);
    ctx.stroke();
    ctx.restore();
}

fn draw_walls(ctx: &CanvasRenderingContext2d, state: &State) {
    ctx.set_line_width(4.0);
    set_stroke_style(ctx, WALL);
    for (_, rect) in state.playground.walls() {
        let min = rect.min();
        ctx.stroke_rect(
            min.x as f64,
            min.y as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }
}

fn draw_status(ctx: &CanvasRenderingContext2d, status: &SessionStatus, ticks: u64) {
    let text = format!(
        "{:?} walls ({}) | gravity {:?} | {:?} | tick {}",
        status.mode, status.walls, status.gravity, status.landing, ticks
    );
    ctx.set_font("12px monospace");
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    set_fill_style(ctx, OUTLINE);
    let _ = ctx.fill_text(&text, 8.0, 8.0);
}

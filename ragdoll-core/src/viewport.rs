use glam::Vec2;

/// Current drawing surface size in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let mut vp = Viewport {
            width: 1.0,
            height: 1.0,
        };
        vp.resize(width, height);
        vp
    }

    /// Stores a new size. Degenerate sizes are clamped to one pixel.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = sanitize(width);
        self.height = sanitize(height);
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}

//! Static screen walls and the Partial/Full boundary modes.

use glam::Vec2;
use serde::Serialize;

use crate::error::WorldError;
use crate::viewport::Viewport;
use crate::world::{BodyId, PhysicsWorld, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BoundaryMode {
    /// Floor only; the doll may pass through the top and sides.
    Partial,
    /// All four walls.
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Bottom, Edge::Top, Edge::Left, Edge::Right];
}

/// Wall slots. `bottom` is always filled while a session runs; the other three
/// are filled together or not at all.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundarySet {
    pub top: Option<BodyId>,
    pub bottom: Option<BodyId>,
    pub left: Option<BodyId>,
    pub right: Option<BodyId>,
}

impl BoundarySet {
    pub fn get(&self, edge: Edge) -> Option<BodyId> {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    fn slot(&mut self, edge: Edge) -> &mut Option<BodyId> {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Edge, BodyId)> + '_ {
        Edge::ALL
            .into_iter()
            .filter_map(|e| self.get(e).map(|id| (e, id)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Geometry of the wall on `edge`. Walls sit just outside the viewport so
/// their inner faces line up with the screen edges.
pub fn wall_rect(edge: Edge, viewport: &Viewport, thickness: f32) -> Rect {
    let (w, h, t) = (viewport.width, viewport.height, thickness);
    match edge {
        Edge::Bottom => Rect::new(Vec2::new(w / 2.0, h + t / 2.0), Vec2::new(w + 2.0 * t, t)),
        Edge::Top => Rect::new(Vec2::new(w / 2.0, -t / 2.0), Vec2::new(w + 2.0 * t, t)),
        Edge::Left => Rect::new(Vec2::new(-t / 2.0, h / 2.0), Vec2::new(t, h + 2.0 * t)),
        Edge::Right => Rect::new(Vec2::new(w + t / 2.0, h / 2.0), Vec2::new(t, h + 2.0 * t)),
    }
}

pub fn edges_for(mode: BoundaryMode) -> &'static [Edge] {
    match mode {
        BoundaryMode::Partial => &[Edge::Bottom],
        BoundaryMode::Full => &Edge::ALL,
    }
}

#[derive(Debug)]
pub struct BoundaryManager {
    set: BoundarySet,
    rects: Vec<(Edge, Rect)>,
    mode: BoundaryMode,
    thickness: f32,
}

impl BoundaryManager {
    pub fn new(thickness: f32) -> Self {
        BoundaryManager {
            set: BoundarySet::default(),
            rects: Vec::new(),
            mode: BoundaryMode::Partial,
            thickness,
        }
    }

    pub fn mode(&self) -> BoundaryMode {
        self.mode
    }

    pub fn set(&self) -> &BoundarySet {
        &self.set
    }

    /// Geometry of the walls currently in the world.
    pub fn rects(&self) -> &[(Edge, Rect)] {
        &self.rects
    }

    pub fn is_bottom(&self, id: BodyId) -> bool {
        self.set.bottom == Some(id)
    }

    /// Rebuild the walls `mode` needs at the current viewport size. Calling it
    /// again with the same mode only refreshes the geometry.
    ///
    /// The new walls are all added before the old ones are removed. If any
    /// add fails, the walls added so far are removed again and the previous
    /// set and mode stay in place.
    pub fn set_mode<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        viewport: &Viewport,
        mode: BoundaryMode,
    ) -> Result<(), WorldError> {
        let mut set = BoundarySet::default();
        let mut rects = Vec::with_capacity(Edge::ALL.len());
        for &edge in edges_for(mode) {
            let rect = wall_rect(edge, viewport, self.thickness);
            match world.add_static_rect(&rect) {
                Ok(id) => {
                    *set.slot(edge) = Some(id);
                    rects.push((edge, rect));
                }
                Err(e) => {
                    log::warn!("adding {edge:?} wall failed, keeping {:?} walls: {e}", self.mode);
                    discard(world, &set);
                    return Err(e);
                }
            }
        }

        let old = std::mem::replace(&mut self.set, set);
        discard(world, &old);
        self.rects = rects;
        if self.mode != mode {
            log::info!("boundary mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        log::debug!(
            "rebuilt {} wall(s) for {}x{}",
            self.set.len(),
            viewport.width,
            viewport.height
        );
        Ok(())
    }
}

fn discard<W: PhysicsWorld>(world: &mut W, set: &BoundarySet) {
    for (edge, id) in set.iter() {
        if let Err(e) = world.remove_body(id) {
            log::warn!("failed to remove {edge:?} wall {id:?}: {e}");
        }
    }
}

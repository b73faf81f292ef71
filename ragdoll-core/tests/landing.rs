use ragdoll_core::{
    BoundaryMode, Edge, Gravity, GravityState, LandingState, PhysicsWorld, Playground,
    RagdollConfig, RapierWorld,
};

const MAX_TICKS: usize = 600;

fn drop_until_landed(pg: &mut Playground<RapierWorld>) -> usize {
    for tick in 0..MAX_TICKS {
        if pg.status().landing == LandingState::Landed {
            return tick;
        }
        pg.tick();
    }
    panic!("ragdoll never reached the floor in {MAX_TICKS} ticks");
}

fn playground(width: f32, height: f32) -> Playground<RapierWorld> {
    let config = RagdollConfig::default();
    Playground::new(RapierWorld::new(config.gravity), &config, width, height).unwrap()
}

#[test]
fn falls_in_with_floor_only() {
    let mut pg = playground(800.0, 600.0);
    let st = pg.status();
    assert_eq!(st.mode, BoundaryMode::Partial);
    assert_eq!(st.walls, 1);
    assert!(pg.world().gravity().scale > 0.0);

    let torso_y = |pg: &Playground<RapierWorld>| {
        pg.part_poses()
            .iter()
            .find(|p| p.kind == ragdoll_core::PartKind::Torso)
            .map(|p| p.y)
            .unwrap()
    };
    let start = torso_y(&pg);
    for _ in 0..5 {
        pg.tick();
    }
    assert!(torso_y(&pg) > start);
    assert_eq!(pg.status().landing, LandingState::Falling);
}

#[test]
fn landing_closes_the_box_and_switches_gravity_off() {
    let mut pg = playground(800.0, 600.0);
    drop_until_landed(&mut pg);

    let st = pg.status();
    assert_eq!(st.mode, BoundaryMode::Full);
    assert_eq!(st.gravity, GravityState::Disabled);
    assert_eq!(st.walls, 4);
    assert_eq!(pg.world().gravity(), Gravity::ZERO);
    // walls plus ten parts
    assert_eq!(pg.world().body_count(), 14);

    let edges: Vec<Edge> = pg.walls().iter().map(|(e, _)| *e).collect();
    for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right] {
        assert!(edges.contains(&edge), "missing {edge:?}");
    }
}

#[test]
fn doll_stays_inside_after_landing() {
    let mut pg = playground(800.0, 600.0);
    drop_until_landed(&mut pg);
    for _ in 0..240 {
        pg.tick();
    }
    for pose in pg.part_poses() {
        assert!(
            (-10.0..=810.0).contains(&pose.x) && (-10.0..=610.0).contains(&pose.y),
            "{:?} escaped to ({}, {})",
            pose.kind,
            pose.x,
            pose.y
        );
    }
    assert_eq!(pg.status().landing, LandingState::Landed);
}

#[test]
fn resize_after_landing_rebuilds_four_walls() {
    let mut pg = playground(800.0, 600.0);
    drop_until_landed(&mut pg);

    pg.resize(1024.0, 768.0);
    let st = pg.status();
    assert_eq!(st.mode, BoundaryMode::Full);
    assert_eq!(st.walls, 4);
    assert_eq!(pg.world().body_count(), 14);

    let floor = pg
        .walls()
        .iter()
        .find(|(e, _)| *e == Edge::Bottom)
        .map(|(_, r)| *r)
        .unwrap();
    assert_eq!(floor.center.y, 768.0 + 60.0);
    assert_eq!(floor.size.x, 1024.0 + 240.0);

    for _ in 0..60 {
        pg.tick();
    }
    assert_eq!(pg.world().gravity(), Gravity::ZERO);
}

#[test]
fn drag_moves_the_doll() {
    let mut pg = playground(800.0, 600.0);
    drop_until_landed(&mut pg);
    for _ in 0..30 {
        pg.tick();
    }
    let torso = pg
        .part_poses()
        .into_iter()
        .find(|p| p.kind == ragdoll_core::PartKind::Torso)
        .unwrap();
    assert!(pg.press(ragdoll_core::Vec2::new(torso.x, torso.y)));
    pg.drag_to(ragdoll_core::Vec2::new(400.0, 150.0));
    for _ in 0..90 {
        pg.tick();
    }
    pg.release();
    let moved = pg
        .part_poses()
        .into_iter()
        .find(|p| p.kind == ragdoll_core::PartKind::Torso)
        .unwrap();
    assert!(moved.y < torso.y - 50.0, "torso only reached y = {}", moved.y);
}

use std::time::Duration;

use layout_core::{
    Catalog, Dimensions, DragTarget, InputEvent, InputKind, InputPhase, LayoutSession, MaterialType,
    MemorySink, SceneState, ScreenPoint, SessionConfig, SessionEvent, Terrain, TerrainPatch, Vec3,
};

fn lot() -> Terrain {
    Terrain::flat("lot", "site-a", 10, Dimensions::new(50.0, 50.0), MaterialType::Soil).unwrap()
}

fn ground(p: ScreenPoint) -> Option<(f32, f32)> {
    Some((p.x, p.y))
}

fn ev(kind: InputKind, phase: InputPhase, x: f32, y: f32, t: u64) -> InputEvent {
    InputEvent::new(kind, phase, ScreenPoint::new(x, y), Duration::from_millis(t))
}

// Press on open ground at `from`, drop at `to`, one event per tick.
fn drop_at(session: &mut LayoutSession<'_>, from: (f32, f32), to: (f32, f32), t0: u64) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for (i, (phase, (x, y))) in [(InputPhase::Down, from), (InputPhase::Move, to), (InputPhase::Up, to)]
        .into_iter()
        .enumerate()
    {
        let e = ev(InputKind::Mouse, phase, x, y, t0 + 16 * i as u64);
        events.extend(session.tick(e.time, &[e], &ground).unwrap());
    }
    events
}

#[test]
fn tree_dropped_on_flat_lot() {
    let mut session = LayoutSession::new(Catalog::builtin(), lot(), SessionConfig::default(), None);
    session.set_active_template(Some("tree-large")).unwrap();
    drop_at(&mut session, (20.0, 20.0), (3.2, 4.8), 0);

    let placed = session.scene().elements();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].template_id, "tree-large");
    assert_eq!(placed[0].position, Vec3::new(3.2, 0.0, 4.8));
    assert_eq!(placed[0].scale, Vec3::ONE);
    assert_eq!(session.scene().state(), &SceneState::Selected(placed[0].id.clone()));
}

#[test]
fn parking_dropped_off_lot_is_discarded() {
    let mut session = LayoutSession::new(Catalog::builtin(), lot(), SessionConfig::default(), None);
    session.set_active_template(Some("parking")).unwrap();
    let events = drop_at(&mut session, (40.0, 40.0), (60.0, 60.0), 0);

    assert!(events.iter().all(|e| !matches!(e, SessionEvent::Committed(_))));
    assert!(session.scene().elements().is_empty());
    assert_eq!(session.scene().state(), &SceneState::Idle);
}

#[test]
fn simultaneous_sources_arm_one_gesture() {
    let mut session = LayoutSession::new(Catalog::builtin(), lot(), SessionConfig::default(), None);
    session.set_active_template(Some("bench")).unwrap();

    session
        .tick(
            Duration::ZERO,
            &[
                ev(InputKind::Touch, InputPhase::Down, 5.0, 5.0, 0),
                ev(InputKind::Mouse, InputPhase::Down, 5.0, 5.0, 0),
            ],
            &ground,
        )
        .unwrap();
    // touch hold and mouse travel both qualify on this tick
    let events = session
        .tick(
            Duration::from_millis(300),
            &[ev(InputKind::Mouse, InputPhase::Move, 25.0, 5.0, 300)],
            &ground,
        )
        .unwrap();

    let started: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::DragStarted { input, .. } => Some(*input),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![InputKind::Mouse]);

    // the losing touch can't finish the drag
    let events = session
        .tick(
            Duration::from_millis(320),
            &[ev(InputKind::Touch, InputPhase::Up, 10.0, 10.0, 320)],
            &ground,
        )
        .unwrap();
    assert!(events.is_empty());
    assert!(matches!(session.scene().state(), SceneState::Dragging(_)));
}

#[test]
fn repeated_reposition_keeps_one_element() {
    let mut session = LayoutSession::new(Catalog::builtin(), lot(), SessionConfig::default(), None);
    session.set_active_template(Some("parking")).unwrap();
    drop_at(&mut session, (40.0, 40.0), (10.0, 10.0), 0);
    let id = session.scene().elements()[0].id.clone();

    drop_at(&mut session, (10.0, 10.0), (25.0, 20.0), 100);
    let events = drop_at(&mut session, (25.0, 20.0), (25.0, 35.0), 200);
    assert!(events.contains(&SessionEvent::DragStarted {
        target: DragTarget::Element(id.clone()),
        input: InputKind::Mouse,
    }));

    let placed = session.scene().elements();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].id, id);
    assert_eq!(placed[0].position, Vec3::new(25.0, 0.0, 35.0));
}

#[test]
fn resolution_change_preserves_shape() {
    // tilted plane, y = 0.1x + 0.2z
    let res = 10;
    let dims = Dimensions::new(50.0, 50.0);
    let step = 50.0 / 9.0;
    let heights = (0..res * res)
        .map(|i| {
            let (row, col) = ((i / res) as f32, (i % res) as f32);
            0.1 * col * step + 0.2 * row * step
        })
        .collect();
    let before = Terrain::from_heights("lot", "site-a", res, dims, MaterialType::Grass, heights).unwrap();

    let sink = MemorySink::new();
    let mut session = LayoutSession::new(Catalog::builtin(), before.clone(), SessionConfig::default(), Some(Box::new(sink.clone())));
    session
        .update_terrain(&TerrainPatch {
            resolution: Some(20),
            ..Default::default()
        })
        .unwrap();

    let after = session.terrain();
    assert_eq!(after.points().len(), 400);
    assert_eq!(after.revision(), before.revision() + 1);
    for p in before.points() {
        let y = after.sample_elevation(p.x, p.z).unwrap();
        assert!((y - p.y).abs() < 1e-3, "at ({}, {}): {} vs {}", p.x, p.z, y, p.y);
    }
    assert_eq!(sink.terrains().unwrap().len(), 1);
    assert_eq!(session.terrain_history().len(), 2);
}

#[test]
fn layout_survives_json_round_trip() {
    let sink = MemorySink::new();
    let mut session = LayoutSession::new(Catalog::builtin(), lot(), SessionConfig::default(), Some(Box::new(sink.clone())));
    session.set_active_template(Some("shrub")).unwrap();
    drop_at(&mut session, (40.0, 40.0), (12.0, 8.0), 0);
    session.rotate_selected(2).unwrap();

    let json = session.scene().to_json().unwrap();
    let restored = layout_core::Scene::from_json(&json).unwrap();
    assert_eq!(restored.elements(), session.scene().elements());
    assert_eq!(sink.latest_layout().unwrap().unwrap().elements, session.scene().elements());
}

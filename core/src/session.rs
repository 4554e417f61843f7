//! One editing session: raw input in, committed placements out.
//!
//! Everything runs on the caller's event loop. Each [`LayoutSession::tick`]
//! folds the tick's raw events through the arbiter, feeds the authoritative
//! gesture into the placement pipeline and lets the scene commit or discard
//! the result.

use std::time::Duration;

use crate::catalog::Catalog;
use crate::element::{PlacedElement, Transform};
use crate::error::{LayoutError, PersistenceError, Result};
use crate::geometry::{Footprint, ScreenPoint};
use crate::history::{DEFAULT_HISTORY_DEPTH, TerrainHistory};
use crate::input::{Arbiter, ArbiterConfig, ArmedGesture, GestureSignal, InputEvent, InputKind};
use crate::persistence::SnapshotSink;
use crate::placement::{DragTarget, PlacementPipeline, PlacementResolution, Rejection, SnapSettings};
use crate::scene::{ElementEdit, Scene, SceneState};
use crate::terrain::{SculptStroke, Terrain, TerrainPatch};

/// Camera collaborator: screen point to terrain-plane `(x, z)`, `None` when
/// the ray misses.
pub trait Projector {
    fn project(&self, point: ScreenPoint) -> Option<(f32, f32)>;
}

impl<F> Projector for F
where
    F: Fn(ScreenPoint) -> Option<(f32, f32)>,
{
    fn project(&self, point: ScreenPoint) -> Option<(f32, f32)> {
        self(point)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub arbiter: ArbiterConfig,
    pub snap: SnapSettings,
    pub history_depth: usize,
    // radians per rotate step
    pub rotate_step: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            arbiter: ArbiterConfig::default(),
            snap: SnapSettings::default(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            rotate_step: 15.0_f32.to_radians(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DragStarted { target: DragTarget, input: InputKind },
    PreviewUpdated { transform: Transform, overlaps: Vec<String> },
    PlacementRejected(Rejection),
    Committed(PlacedElement),
    Cancelled,
    Selected(String),
    Deselected,
    Deleted(String),
    TerrainChanged { revision: u64 },
    PersistenceUnavailable,
    PersistenceFailed(PersistenceError),
}

pub struct LayoutSession<'c> {
    catalog: &'c Catalog,
    terrain: TerrainHistory,
    scene: Scene,
    arbiter: Arbiter,
    snap: SnapSettings,
    rotate_step: f32,
    active_template: Option<String>,
    sink: Option<Box<dyn SnapshotSink>>,
    unavailable_reported: bool,
}

impl<'c> LayoutSession<'c> {
    /// `sink` may be `None`; the session then runs in memory only and says so
    /// once, on the first change it cannot store.
    pub fn new(
        catalog: &'c Catalog,
        terrain: Terrain,
        config: SessionConfig,
        sink: Option<Box<dyn SnapshotSink>>,
    ) -> Self {
        let scene = Scene::new(terrain.project_id());
        Self {
            catalog,
            terrain: TerrainHistory::with_depth(terrain, config.history_depth),
            scene,
            arbiter: Arbiter::new(config.arbiter),
            snap: config.snap,
            rotate_step: config.rotate_step,
            active_template: None,
            sink,
            unavailable_reported: false,
        }
    }

    // Swap in previously stored placements; any drag in flight is dropped.
    pub fn set_scene(&mut self, scene: Scene) {
        self.arbiter.cancel();
        self.scene = scene;
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn terrain(&self) -> &Terrain {
        self.terrain.current()
    }

    pub fn terrain_history(&self) -> &TerrainHistory {
        &self.terrain
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn active_template(&self) -> Option<&str> {
        self.active_template.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.sink.is_some()
    }

    pub fn set_snap(&mut self, snap: SnapSettings) {
        self.snap = snap;
    }

    pub fn snap(&self) -> SnapSettings {
        self.snap
    }

    /// Choose the template new drags will place. Unknown ids fail here, so a
    /// drag never arms for a template the catalog doesn't have.
    pub fn set_active_template(&mut self, id: Option<&str>) -> Result<()> {
        self.active_template = match id {
            Some(id) => Some(self.catalog.get_template(id)?.id.clone()),
            None => None,
        };
        Ok(())
    }

    pub fn tick(
        &mut self,
        now: Duration,
        events: &[InputEvent],
        projector: &dyn Projector,
    ) -> Result<Vec<SessionEvent>> {
        let mut out = Vec::new();
        for signal in self.arbiter.tick(now, events) {
            if let Err(err) = self.follow(signal, projector, &mut out) {
                // the scene already reflects these; the caller only sees the error
                for event in &out {
                    log::warn!("tick aborted by {err} after {event:?}");
                }
                return Err(err);
            }
        }
        Ok(out)
    }

    // True while a press or drag is in flight. Callers must keep ticking until
    // it clears, since a hold arms on elapsed time alone.
    pub fn is_pressed(&self) -> bool {
        self.arbiter.is_pressed()
    }

    fn follow(&mut self, signal: GestureSignal, projector: &dyn Projector, out: &mut Vec<SessionEvent>) -> Result<()> {
        match signal {
            GestureSignal::Armed(armed) => self.arm(&armed, projector, out)?,
            GestureSignal::Moved(point) => self.track(point, projector, out)?,
            GestureSignal::Released(point) => {
                if self.scene.gesture().is_some() {
                    self.track(point, projector, out)?;
                    self.release(out);
                }
            }
            GestureSignal::Cancelled => {
                if self.scene.cancel_drag().is_some() {
                    out.push(SessionEvent::Cancelled);
                }
            }
            GestureSignal::Tap(_, point) => self.tap(point, projector, out),
        }
        Ok(())
    }

    /// Escape: discard the in-flight drag entirely.
    pub fn cancel(&mut self) -> Vec<SessionEvent> {
        self.arbiter.cancel();
        match self.scene.cancel_drag() {
            Some(_) => vec![SessionEvent::Cancelled],
            None => Vec::new(),
        }
    }

    pub fn hover(&mut self, point: ScreenPoint, projector: &dyn Projector) -> Option<&str> {
        self.scene.set_hover(projector.project(point))
    }

    fn arm(&mut self, armed: &ArmedGesture, projector: &dyn Projector, out: &mut Vec<SessionEvent>) -> Result<()> {
        let picked = projector
            .project(armed.origin)
            .and_then(|(x, z)| self.scene.element_at(x, z))
            .map(|e| e.id.clone());
        let target = match (picked, &self.active_template) {
            (Some(id), _) => DragTarget::Element(id),
            (None, Some(template)) => DragTarget::Template(template.clone()),
            (None, None) => {
                log::debug!("drag armed with nothing to place");
                self.arbiter.cancel();
                return Ok(());
            }
        };

        let pipeline = PlacementPipeline::new(self.catalog, self.terrain.current(), self.snap);
        let existing = match &target {
            DragTarget::Element(id) => self.scene.get(id),
            DragTarget::Template(_) => None,
        };
        let gesture = match pipeline.begin(armed, target.clone(), existing) {
            Ok(gesture) => gesture,
            Err(err) => {
                self.arbiter.cancel();
                return Err(err);
            }
        };
        if let Err(err) = self.scene.start_drag(gesture) {
            log::debug!("ignoring drag: {err}");
            self.arbiter.cancel();
            return Ok(());
        }

        out.push(SessionEvent::DragStarted {
            target,
            input: armed.kind,
        });
        self.track(armed.current, projector, out)
    }

    fn track(&mut self, point: ScreenPoint, projector: &dyn Projector, out: &mut Vec<SessionEvent>) -> Result<()> {
        let pipeline = PlacementPipeline::new(self.catalog, self.terrain.current(), self.snap);
        let Some(gesture) = self.scene.gesture_mut() else {
            return Ok(());
        };

        let resolution = match pipeline.track(gesture, point, projector.project(point)) {
            Ok(resolution) => resolution,
            Err(err) => {
                self.arbiter.cancel();
                self.scene.cancel_drag();
                return Err(err);
            }
        };

        match resolution {
            PlacementResolution::Valid(transform) => {
                let exclude = match &gesture.target {
                    DragTarget::Element(id) => Some(id.clone()),
                    DragTarget::Template(_) => None,
                };
                let footprint = Footprint::around(
                    transform.position,
                    gesture.base.dimensions.mul(transform.scale),
                    transform.rotation.y,
                );
                let overlaps = self.scene.overlapping(&footprint, exclude.as_deref());
                out.push(SessionEvent::PreviewUpdated { transform, overlaps });
            }
            PlacementResolution::Rejected(rejection) => {
                out.push(SessionEvent::PlacementRejected(rejection));
            }
        }
        Ok(())
    }

    fn release(&mut self, out: &mut Vec<SessionEvent>) {
        let pipeline = PlacementPipeline::new(self.catalog, self.terrain.current(), self.snap);
        let transform = self.scene.gesture_mut().and_then(|g| pipeline.finish(g));

        let Some(transform) = transform else {
            log::warn!("drop discarded: no valid placement at release");
            self.scene.cancel_drag();
            out.push(SessionEvent::Cancelled);
            return;
        };
        match self.scene.commit(transform) {
            Ok(element) => {
                let element = element.clone();
                let id = element.id.clone();
                out.push(SessionEvent::Committed(element));
                out.push(SessionEvent::Selected(id));
                self.persist_layout(out);
            }
            Err(err) => {
                log::warn!("commit failed: {err}");
                out.push(SessionEvent::Cancelled);
            }
        }
    }

    fn tap(&mut self, point: ScreenPoint, projector: &dyn Projector, out: &mut Vec<SessionEvent>) {
        let hit = projector
            .project(point)
            .and_then(|(x, z)| self.scene.element_at(x, z))
            .map(|e| e.id.clone());
        match hit {
            Some(id) => {
                if self.scene.select(&id).is_ok() {
                    out.push(SessionEvent::Selected(id));
                }
            }
            None => {
                if matches!(self.scene.state(), SceneState::Selected(_)) && self.scene.deselect().is_ok() {
                    out.push(SessionEvent::Deselected);
                }
            }
        }
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        self.scene.select(id)
    }

    pub fn deselect(&mut self) -> Result<()> {
        self.scene.deselect()
    }

    pub fn begin_edit(&mut self) -> Result<()> {
        self.scene.begin_edit()
    }

    pub fn finish_edit(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        if self.scene.finish_edit().is_ok() {
            self.persist_layout(&mut out);
        }
        out
    }

    pub fn apply_edit(&mut self, edit: ElementEdit) -> Result<PlacedElement> {
        self.scene.apply_edit(edit).cloned()
    }

    // Rotate the focus by whole steps (negative turns the other way).
    pub fn rotate_selected(&mut self, steps: i32) -> Result<Vec<SessionEvent>> {
        self.scene.rotate_selected(self.rotate_step * steps as f32)?;
        let mut out = Vec::new();
        self.persist_layout(&mut out);
        Ok(out)
    }

    pub fn delete_selected(&mut self) -> Result<Vec<SessionEvent>> {
        let removed = self.scene.delete_selected()?;
        let mut out = vec![SessionEvent::Deleted(removed.id)];
        self.persist_layout(&mut out);
        Ok(out)
    }

    pub fn delete(&mut self, id: &str) -> Result<Vec<SessionEvent>> {
        let removed = self.scene.delete(id)?;
        let mut out = vec![SessionEvent::Deleted(removed.id)];
        self.persist_layout(&mut out);
        Ok(out)
    }

    pub fn update_terrain(&mut self, patch: &TerrainPatch) -> Result<Vec<SessionEvent>> {
        let next = self.terrain.current().apply_partial_update(patch)?;
        Ok(self.accept_terrain(next))
    }

    pub fn sculpt(&mut self, stroke: &SculptStroke) -> Vec<SessionEvent> {
        let next = self.terrain.current().sculpt(stroke);
        self.accept_terrain(next)
    }

    pub fn undo_terrain(&mut self) -> Vec<SessionEvent> {
        let Some(revision) = self.terrain.undo().map(|t| t.revision()) else {
            return Vec::new();
        };
        let mut out = vec![SessionEvent::TerrainChanged { revision }];
        self.persist_terrain(&mut out);
        out
    }

    pub fn redo_terrain(&mut self) -> Vec<SessionEvent> {
        let Some(revision) = self.terrain.redo().map(|t| t.revision()) else {
            return Vec::new();
        };
        let mut out = vec![SessionEvent::TerrainChanged { revision }];
        self.persist_terrain(&mut out);
        out
    }

    fn accept_terrain(&mut self, next: Terrain) -> Vec<SessionEvent> {
        let revision = self.terrain.commit(next).revision();
        log::info!("terrain revision {revision}");
        let mut out = vec![SessionEvent::TerrainChanged { revision }];
        self.persist_terrain(&mut out);
        out
    }

    fn persist_terrain(&mut self, out: &mut Vec<SessionEvent>) {
        let result = match &self.sink {
            Some(sink) => sink.store_terrain(self.terrain.current()),
            None => Err(PersistenceError::Unavailable),
        };
        self.report(result, out);
    }

    fn persist_layout(&mut self, out: &mut Vec<SessionEvent>) {
        let result = match &self.sink {
            Some(sink) => sink.store_layout(&self.scene.snapshot()),
            None => Err(PersistenceError::Unavailable),
        };
        self.report(result, out);
    }

    fn report(&mut self, result: std::result::Result<(), PersistenceError>, out: &mut Vec<SessionEvent>) {
        match result {
            Ok(()) => {}
            Err(PersistenceError::Unavailable) => {
                if !self.unavailable_reported {
                    self.unavailable_reported = true;
                    log::warn!("{}", LayoutError::PersistenceUnavailable);
                    out.push(SessionEvent::PersistenceUnavailable);
                }
            }
            Err(err) => {
                log::warn!("snapshot not stored: {err}");
                out.push(SessionEvent::PersistenceFailed(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{LayoutSession, SessionConfig, SessionEvent};
    use crate::catalog::Catalog;
    use crate::error::{LayoutError, PersistenceError};
    use crate::geometry::ScreenPoint;
    use crate::input::{InputEvent, InputKind, InputPhase};
    use crate::persistence::{MemorySink, SnapshotSink};
    use crate::scene::{LayoutSnapshot, SceneState};
    use crate::terrain::{Dimensions, MaterialType, Terrain, TerrainPatch};

    // screen units map 1:1 onto the terrain plane
    fn identity(p: ScreenPoint) -> Option<(f32, f32)> {
        Some((p.x, p.y))
    }

    fn terrain() -> Terrain {
        Terrain::flat("t", "p", 10, Dimensions::new(50.0, 50.0), MaterialType::Grass).unwrap()
    }

    fn mouse(phase: InputPhase, x: f32, y: f32, t: u64) -> InputEvent {
        InputEvent::new(InputKind::Mouse, phase, ScreenPoint::new(x, y), Duration::from_millis(t))
    }

    fn drag(session: &mut LayoutSession<'_>, from: (f32, f32), to: (f32, f32), t0: u64) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let steps = [
            mouse(InputPhase::Down, from.0, from.1, t0),
            mouse(InputPhase::Move, to.0, to.1, t0 + 16),
            mouse(InputPhase::Up, to.0, to.1, t0 + 32),
        ];
        for ev in steps {
            out.extend(session.tick(ev.time, &[ev], &identity).unwrap());
        }
        out
    }

    struct FailingSink;

    impl SnapshotSink for FailingSink {
        fn store_terrain(&self, _: &Terrain) -> Result<(), PersistenceError> {
            Err(PersistenceError::Backend("disk full".into()))
        }
        fn store_layout(&self, _: &LayoutSnapshot) -> Result<(), PersistenceError> {
            Err(PersistenceError::Backend("disk full".into()))
        }
    }

    #[test]
    fn session_drag_commits_and_persists() {
        let sink = MemorySink::new();
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), Some(Box::new(sink.clone())));
        s.set_active_template(Some("tree-large")).unwrap();

        let events = drag(&mut s, (0.0, 0.0), (3.2, 14.8), 0);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::DragStarted { .. })));
        let committed = events
            .iter()
            .find_map(|e| match e {
                SessionEvent::Committed(el) => Some(el.clone()),
                _ => None,
            })
            .expect("a committed element");
        assert_eq!(committed.template_id, "tree-large");
        assert_eq!(s.scene().state(), &SceneState::Selected(committed.id.clone()));
        assert_eq!(sink.latest_layout().unwrap().unwrap().elements, vec![committed]);
    }

    #[test]
    fn session_drag_on_element_repositions_it() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("parking")).unwrap();
        drag(&mut s, (0.0, 0.0), (10.0, 10.0), 0);
        assert_eq!(s.scene().elements().len(), 1);

        // press inside the parking bay, drop it elsewhere
        drag(&mut s, (11.0, 11.0), (30.0, 30.0), 100);
        assert_eq!(s.scene().elements().len(), 1);
        let el = &s.scene().elements()[0];
        assert_eq!((el.position.x, el.position.z), (30.0, 30.0));
    }

    #[test]
    fn session_off_terrain_drop_is_discarded() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("parking")).unwrap();
        let events = drag(&mut s, (40.0, 40.0), (60.0, 60.0), 0);
        assert!(events.contains(&SessionEvent::Cancelled));
        assert!(s.scene().elements().is_empty());
        assert_eq!(s.scene().state(), &SceneState::Idle);
    }

    #[test]
    fn session_missed_projection_is_discarded() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("bench")).unwrap();
        let sky = |p: ScreenPoint| if p.y > 100.0 { None } else { Some((p.x, p.y)) };
        s.tick(Duration::ZERO, &[mouse(InputPhase::Down, 5.0, 5.0, 0)], &sky).unwrap();
        s.tick(Duration::from_millis(16), &[mouse(InputPhase::Move, 5.0, 200.0, 16)], &sky).unwrap();
        let events = s
            .tick(Duration::from_millis(32), &[mouse(InputPhase::Up, 5.0, 200.0, 32)], &sky)
            .unwrap();
        assert!(events.contains(&SessionEvent::Cancelled));
        assert!(s.scene().elements().is_empty());
    }

    #[test]
    fn session_unknown_template_rejected_up_front() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        assert!(matches!(
            s.set_active_template(Some("pagoda")),
            Err(LayoutError::NotFound { .. })
        ));
        assert_eq!(s.active_template(), None);
    }

    #[test]
    fn session_escape_cancels() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("bench")).unwrap();
        s.tick(Duration::ZERO, &[mouse(InputPhase::Down, 5.0, 5.0, 0)], &identity).unwrap();
        s.tick(Duration::from_millis(16), &[mouse(InputPhase::Move, 25.0, 5.0, 16)], &identity).unwrap();
        assert!(matches!(s.scene().state(), SceneState::Dragging(_)));

        assert_eq!(s.cancel(), vec![SessionEvent::Cancelled]);
        let events = s
            .tick(Duration::from_millis(32), &[mouse(InputPhase::Up, 25.0, 5.0, 32)], &identity)
            .unwrap();
        assert!(events.iter().all(|e| !matches!(e, SessionEvent::Committed(_))));
        assert!(s.scene().elements().is_empty());
    }

    #[test]
    fn session_tap_selects_and_deselects() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("parking")).unwrap();
        drag(&mut s, (0.0, 0.0), (10.0, 10.0), 0);
        s.deselect().unwrap();

        let tap = [mouse(InputPhase::Down, 10.5, 10.5, 100), mouse(InputPhase::Up, 10.5, 10.5, 110)];
        let events = s.tick(Duration::from_millis(110), &tap, &identity).unwrap();
        assert!(matches!(events.as_slice(), [SessionEvent::Selected(_)]));

        let miss = [mouse(InputPhase::Down, 40.0, 40.0, 200), mouse(InputPhase::Up, 40.0, 40.0, 210)];
        let events = s.tick(Duration::from_millis(210), &miss, &identity).unwrap();
        assert_eq!(events, vec![SessionEvent::Deselected]);
    }

    #[test]
    fn session_in_memory_mode_reports_once() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        assert!(!s.is_persistent());
        s.set_active_template(Some("bench")).unwrap();

        let first = drag(&mut s, (0.0, 0.0), (20.0, 20.0), 0);
        assert!(first.contains(&SessionEvent::PersistenceUnavailable));
        let second = drag(&mut s, (0.0, 0.0), (5.0, 40.0), 100);
        assert!(!second.contains(&SessionEvent::PersistenceUnavailable));
        assert_eq!(s.scene().elements().len(), 2);
    }

    #[test]
    fn session_backend_failure_is_reported_not_fatal() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), Some(Box::new(FailingSink)));
        s.set_active_template(Some("bench")).unwrap();
        let events = drag(&mut s, (0.0, 0.0), (20.0, 20.0), 0);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::PersistenceFailed(_))));
        assert_eq!(s.scene().elements().len(), 1);
    }

    #[test]
    fn session_terrain_revisions() {
        let sink = MemorySink::new();
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), Some(Box::new(sink.clone())));
        let events = s
            .update_terrain(&TerrainPatch {
                resolution: Some(20),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(events, vec![SessionEvent::TerrainChanged { revision: 1 }]);
        assert_eq!(s.terrain().points().len(), 400);

        assert_eq!(s.undo_terrain(), vec![SessionEvent::TerrainChanged { revision: 0 }]);
        assert_eq!(s.terrain().resolution(), 10);
        assert_eq!(s.redo_terrain(), vec![SessionEvent::TerrainChanged { revision: 1 }]);
        assert_eq!(sink.terrains().unwrap().len(), 3);
    }

    #[test]
    fn session_rotate_and_delete_selected() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("bench")).unwrap();
        drag(&mut s, (0.0, 0.0), (20.0, 20.0), 0);

        s.rotate_selected(6).unwrap();
        let yaw = s.scene().elements()[0].rotation.y;
        assert!((yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-5);

        let events = s.delete_selected().unwrap();
        assert!(matches!(events.as_slice(), [SessionEvent::Deleted(_)]));
        assert_eq!(s.scene().state(), &SceneState::Idle);
        assert!(s.delete_selected().is_err());
    }

    #[test]
    fn session_flick_in_one_frame_places_element() {
        let mut s = LayoutSession::new(Catalog::builtin(), terrain(), SessionConfig::default(), None);
        s.set_active_template(Some("bench")).unwrap();
        let flick = [
            mouse(InputPhase::Down, 5.0, 5.0, 0),
            mouse(InputPhase::Move, 30.0, 30.0, 8),
            mouse(InputPhase::Up, 30.0, 30.0, 16),
        ];
        let events = s.tick(Duration::from_millis(16), &flick, &identity).unwrap();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::DragStarted { .. })));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::Committed(_))));
        assert_eq!(s.scene().elements().len(), 1);
        let el = &s.scene().elements()[0];
        assert_eq!((el.position.x, el.position.z), (30.0, 30.0));
        assert!(!s.is_pressed());
    }

    #[test]
    fn session_degenerate_terrain_aborts_drag() {
        let mut value = serde_json::to_value(terrain()).unwrap();
        value["dimensions"]["depth"] = serde_json::json!(-1.0);
        let bad: Terrain = serde_json::from_value(value).unwrap();

        let mut s = LayoutSession::new(Catalog::builtin(), bad, SessionConfig::default(), None);
        s.set_active_template(Some("bench")).unwrap();
        let events = s.tick(Duration::ZERO, &[mouse(InputPhase::Down, 5.0, 5.0, 0)], &identity).unwrap();
        assert!(events.is_empty());
        assert!(s.is_pressed());

        let err = s
            .tick(Duration::from_millis(16), &[mouse(InputPhase::Move, 25.0, 5.0, 16)], &identity)
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidTerrain(_)));
        assert_eq!(s.scene().state(), &SceneState::Idle);
        assert!(!s.is_pressed());

        // the rest of the gesture goes nowhere
        let events = s
            .tick(Duration::from_millis(32), &[mouse(InputPhase::Up, 25.0, 5.0, 32)], &identity)
            .unwrap();
        assert!(events.iter().all(|e| !matches!(e, SessionEvent::DragStarted { .. })));
        assert!(s.scene().elements().is_empty());
    }
}

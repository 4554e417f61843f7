use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{Color32, ColorImage, Pos2, Rect, Sense, Stroke, StrokeKind, TextureHandle, Vec2};
use layout_core::preview::terrain_image;
use layout_core::{
    Catalog, Dimensions, ElementEdit, ElementType, Footprint, InputEvent, InputKind, InputPhase, LayoutSession,
    MaterialType, Scene, SceneState, ScreenPoint, SculptStroke, SessionConfig, SessionEvent, SnapshotSink,
    Terrain, TemplateFilter, TerrainPatch, Vec3,
};
use layout_storage::{LayoutStorage, MongoSink, PersistenceFailure, StorageConfig};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;

const PROJECT_ID: &str = "default";
const EVENT_LOG_LEN: usize = 8;

// Background writer plus what it reports back.
struct Persistence {
    _runtime: Runtime,
    failures: UnboundedReceiver<PersistenceFailure>,
}

// Only the finger that started a press may move or end it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TouchLatch {
    owner: Option<egui::TouchId>,
}

impl TouchLatch {
    // Whether this touch event belongs to the tracked finger. `on_canvas`
    // decides if a new finger may take over an empty latch.
    fn accept(&mut self, id: egui::TouchId, phase: InputPhase, on_canvas: bool) -> bool {
        match (self.owner, phase) {
            (None, InputPhase::Down) if on_canvas => {
                self.owner = Some(id);
                true
            }
            (Some(owner), InputPhase::Up | InputPhase::Cancel) if owner == id => {
                self.owner = None;
                true
            }
            (Some(owner), InputPhase::Move) => owner == id,
            _ => false,
        }
    }
}

// Terrain-plane rectangle currently drawn on screen.
#[derive(Clone, Copy)]
struct View {
    rect: Rect,
    width: f32,
    depth: f32,
}

impl View {
    fn to_world(&self, p: ScreenPoint) -> Option<(f32, f32)> {
        let (w, h) = (self.rect.width(), self.rect.height());
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        // straight-down camera: every screen point lands on the ground plane
        Some((
            (p.x - self.rect.min.x) / w * self.width,
            (p.y - self.rect.min.y) / h * self.depth,
        ))
    }

    fn to_screen(&self, x: f32, z: f32) -> Pos2 {
        Pos2::new(
            self.rect.min.x + x / self.width * self.rect.width(),
            self.rect.min.y + z / self.depth * self.rect.height(),
        )
    }

    fn footprint_rect(&self, fp: &Footprint) -> Rect {
        Rect::from_two_pos(self.to_screen(fp.min_x, fp.min_z), self.to_screen(fp.max_x, fp.max_z))
    }
}

struct SiteApp {
    session: LayoutSession<'static>,
    persistence: Option<Persistence>,
    started: Instant,

    // catalog filter
    type_filter: Option<ElementType>,

    // terrain patch inputs
    material: MaterialType,
    resolution: u32,
    width: f32,
    depth: f32,

    // sculpting
    sculpt_mode: bool,
    sculpt_radius: f32,
    sculpt_strength: f32,

    // property panel inputs while editing
    edit_scale: Vec3,
    edit_yaw_deg: f32,

    // generated texture
    terrain_texture: Option<TextureHandle>,
    texture_revision: Option<u64>,

    touch: TouchLatch,

    // timing & status
    status_message: String,
    events: VecDeque<String>,
}

impl SiteApp {
    fn new(session: LayoutSession<'static>, persistence: Option<Persistence>) -> Self {
        let terrain = session.terrain();
        let dims = terrain.dimensions();
        let status_message = if persistence.is_some() {
            "Connected to MongoDB".to_string()
        } else {
            "MongoDB unavailable, working in memory".to_string()
        };
        Self {
            material: terrain.material(),
            resolution: terrain.resolution(),
            width: dims.width,
            depth: dims.depth,
            session,
            persistence,
            started: Instant::now(),
            type_filter: None,
            sculpt_mode: false,
            sculpt_radius: 8.0,
            sculpt_strength: 1.0,
            edit_scale: Vec3::ONE,
            edit_yaw_deg: 0.0,
            terrain_texture: None,
            texture_revision: None,
            touch: TouchLatch::default(),
            status_message,
            events: VecDeque::new(),
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn record(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            let line = match &event {
                SessionEvent::DragStarted { target, input } => format!("{} drag: {target:?}", input.label()),
                SessionEvent::PreviewUpdated { .. } => continue,
                SessionEvent::PlacementRejected(r) => format!("rejected: {r:?}"),
                SessionEvent::Committed(e) => format!("placed {} ({})", e.id, e.template_id),
                SessionEvent::Cancelled => "drag cancelled".to_string(),
                SessionEvent::Selected(id) => format!("selected {id}"),
                SessionEvent::Deselected => "deselected".to_string(),
                SessionEvent::Deleted(id) => format!("deleted {id}"),
                SessionEvent::TerrainChanged { revision } => format!("terrain revision {revision}"),
                SessionEvent::PersistenceUnavailable => {
                    self.status_message = "Persistence unavailable, changes kept in memory".into();
                    continue;
                }
                SessionEvent::PersistenceFailed(err) => format!("not saved: {err}"),
            };
            self.events.push_front(line);
            self.events.truncate(EVENT_LOG_LEN);
        }
    }

    fn report<T>(&mut self, result: layout_core::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("{err}");
                self.status_message = err.to_string();
                None
            }
        }
    }

    fn poll_failures(&mut self) {
        let Some(persistence) = self.persistence.as_mut() else {
            return;
        };
        while let Ok(failure) = persistence.failures.try_recv() {
            self.status_message = format!("Failed to store {}: {}", failure.what, failure.error);
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let terrain = self.session.terrain();
        if self.texture_revision == Some(terrain.revision()) && self.terrain_texture.is_some() {
            return;
        }
        let size = terrain.resolution() as usize;
        let img = terrain_image(terrain);
        let color_image = ColorImage::from_rgb([size, size], &img);
        self.terrain_texture = Some(ctx.load_texture("terrain", color_image, egui::TextureOptions::LINEAR));
        self.texture_revision = Some(terrain.revision());
    }

    // Raw egui events for this frame, in device terms.
    fn collect_input(&mut self, ctx: &egui::Context, canvas: Rect) -> Vec<InputEvent> {
        let now = self.now();
        let dragging = matches!(self.session.scene().state(), SceneState::Dragging(_));
        let touch = &mut self.touch;
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| {
                    let (kind, phase, pos) = match event {
                        egui::Event::PointerButton {
                            pos,
                            button: egui::PointerButton::Primary,
                            pressed,
                            ..
                        } => {
                            let phase = if *pressed { InputPhase::Down } else { InputPhase::Up };
                            (InputKind::Mouse, phase, *pos)
                        }
                        egui::Event::PointerMoved(pos) => (InputKind::Mouse, InputPhase::Move, *pos),
                        egui::Event::Touch { id, phase, pos, .. } => {
                            let phase = match phase {
                                egui::TouchPhase::Start => InputPhase::Down,
                                egui::TouchPhase::Move => InputPhase::Move,
                                egui::TouchPhase::End => InputPhase::Up,
                                egui::TouchPhase::Cancel => InputPhase::Cancel,
                            };
                            if !touch.accept(*id, phase, canvas.contains(*pos)) {
                                return None;
                            }
                            (InputKind::Touch, phase, *pos)
                        }
                        _ => return None,
                    };
                    // presses only start on the canvas; a drag may leave it
                    if phase == InputPhase::Down && !canvas.contains(pos) {
                        return None;
                    }
                    if phase == InputPhase::Move && !dragging && !canvas.contains(pos) {
                        return None;
                    }
                    Some(InputEvent::new(kind, phase, ScreenPoint::new(pos.x, pos.y), now))
                })
                .collect()
        })
    }

    fn catalog_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Catalog");
        let label = self.type_filter.map_or("All", |t| t.label());
        egui::ComboBox::from_label("Type")
            .selected_text(label)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.type_filter, None, "All");
                for t in ElementType::ALL {
                    ui.selectable_value(&mut self.type_filter, Some(t), t.label());
                }
            });

        let filter = TemplateFilter {
            element_type: self.type_filter,
            category: None,
        };
        let active = self.session.active_template().map(str::to_string);
        let mut chosen = None;
        egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
            for template in self.session.catalog().list_templates(Some(filter)) {
                let selected = active.as_deref() == Some(template.id.as_str());
                if ui
                    .selectable_label(selected, format!("{} ({})", template.name, template.category))
                    .on_hover_text(&template.description)
                    .clicked()
                {
                    chosen = Some(if selected { None } else { Some(template.id.clone()) });
                }
            }
        });
        if let Some(choice) = chosen {
            let result = self.session.set_active_template(choice.as_deref());
            self.report(result);
        }

        let mut snap = self.session.snap();
        ui.horizontal(|ui| {
            ui.checkbox(&mut snap.translate_snap, "Snap to grid");
            ui.add(
                egui::DragValue::new(&mut snap.translate_increment)
                    .speed(0.05)
                    .range(0.05..=10.0),
            );
        });
        self.session.set_snap(snap);
    }

    fn selection_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Selection");
        let Some(selected) = self.session.scene().selected().cloned() else {
            ui.label("Nothing selected");
            return;
        };
        let editing = matches!(self.session.scene().state(), SceneState::Editing(_));
        let p = selected.position;
        ui.label(format!("{} · {}", selected.id, selected.template_id));
        ui.label(format!("at ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));

        ui.horizontal(|ui| {
            if ui.button("⟲").clicked() {
                let result = self.session.rotate_selected(-1).map(|e| self.record(e));
                self.report(result);
            }
            if ui.button("⟳").clicked() {
                let result = self.session.rotate_selected(1).map(|e| self.record(e));
                self.report(result);
            }
            if ui.button("Delete").clicked() {
                let result = self.session.delete_selected().map(|e| self.record(e));
                self.report(result);
            }
        });

        if !editing {
            if ui.button("Edit…").clicked() {
                self.edit_scale = selected.scale;
                self.edit_yaw_deg = selected.rotation.y.to_degrees();
                let result = self.session.begin_edit();
                self.report(result);
            }
            return;
        }

        ui.horizontal(|ui| {
            ui.label("Scale");
            ui.add(egui::DragValue::new(&mut self.edit_scale.x).speed(0.05));
            ui.add(egui::DragValue::new(&mut self.edit_scale.y).speed(0.05));
            ui.add(egui::DragValue::new(&mut self.edit_scale.z).speed(0.05));
        });
        ui.add(egui::Slider::new(&mut self.edit_yaw_deg, 0.0..=360.0).text("Yaw °"));
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                let mut rotation = selected.rotation;
                rotation.y = self.edit_yaw_deg.to_radians();
                let result = self.session.apply_edit(ElementEdit {
                    rotation: Some(rotation),
                    scale: Some(self.edit_scale),
                });
                if let Some(element) = self.report(result) {
                    self.edit_scale = element.scale;
                }
            }
            if ui.button("Done").clicked() {
                let events = self.session.finish_edit();
                self.record(events);
            }
        });
    }

    fn terrain_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Terrain");
        egui::ComboBox::from_label("Material")
            .selected_text(self.material.label())
            .show_ui(ui, |ui| {
                for m in MaterialType::ALL {
                    ui.selectable_value(&mut self.material, m, m.label());
                }
            });
        ui.add(egui::Slider::new(&mut self.resolution, 2..=129).text("Resolution"));
        ui.horizontal(|ui| {
            ui.label("Size (m)");
            ui.add(egui::DragValue::new(&mut self.width).speed(0.5).range(1.0..=2000.0));
            ui.add(egui::DragValue::new(&mut self.depth).speed(0.5).range(1.0..=2000.0));
        });
        if ui.button("Apply terrain changes").clicked() {
            let patch = TerrainPatch {
                material: Some(self.material),
                resolution: Some(self.resolution),
                dimensions: Some(Dimensions::new(self.width, self.depth)),
            };
            let result = self.session.update_terrain(&patch).map(|e| self.record(e));
            self.report(result);
        }

        ui.checkbox(&mut self.sculpt_mode, "Sculpt (click the ground)");
        if self.sculpt_mode {
            ui.add(egui::Slider::new(&mut self.sculpt_radius, 1.0..=50.0).text("Radius"));
            ui.add(egui::Slider::new(&mut self.sculpt_strength, -5.0..=5.0).text("Strength"));
        }

        ui.horizontal(|ui| {
            let history = self.session.terrain_history();
            let (can_undo, can_redo) = (history.can_undo(), history.can_redo());
            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                let events = self.session.undo_terrain();
                self.record(events);
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                let events = self.session.redo_terrain();
                self.record(events);
            }
        });
    }

    fn sync_terrain_inputs(&mut self) {
        let terrain = self.session.terrain();
        let dims = terrain.dimensions();
        self.material = terrain.material();
        self.resolution = terrain.resolution();
        self.width = dims.width;
        self.depth = dims.depth;
    }

    fn export_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Files");
        if ui.button("Export layout JSON…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("json", &["json"])
                .set_file_name("layout.json")
                .save_file()
            {
                self.status_message = match self.session.scene().to_json() {
                    Ok(json) => match std::fs::write(&path, json) {
                        Ok(()) => format!("Saved {}", path.display()),
                        Err(e) => format!("Write error: {e}"),
                    },
                    Err(e) => format!("Encode error: {e}"),
                };
            }
        }
        if ui.button("Import layout JSON…").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter("json", &["json"]).pick_file() {
                let loaded = std::fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|json| Scene::from_json(&json).map_err(|e| e.to_string()));
                self.status_message = match loaded {
                    Ok(scene) => {
                        let count = scene.elements().len();
                        self.session.set_scene(scene);
                        format!("Loaded {count} element(s)")
                    }
                    Err(e) => format!("Import error: {e}"),
                };
            }
        }
        if ui.button("Save terrain PNG…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("png", &["png"])
                .set_file_name("terrain.png")
                .save_file()
            {
                let terrain = self.session.terrain();
                let size = terrain.resolution();
                let img = terrain_image(terrain);
                self.status_message = match image::save_buffer(&path, &img, size, size, image::ColorType::Rgb8) {
                    Ok(()) => format!("Saved {}", path.display()),
                    Err(e) => format!("PNG error: {e}"),
                };
            }
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let dims = self.session.terrain().dimensions();
        let available = ui.available_size();
        let scale = (available.x / dims.width).min(available.y / dims.depth).max(0.0);
        let (rect, response) = ui.allocate_exact_size(Vec2::new(dims.width * scale, dims.depth * scale), Sense::click());
        let view = View {
            rect,
            width: dims.width,
            depth: dims.depth,
        };
        let projector = move |p: ScreenPoint| view.to_world(p);

        if self.sculpt_mode {
            if let Some(pos) = response.interact_pointer_pos().filter(|_| response.clicked()) {
                if let Some((x, z)) = view.to_world(ScreenPoint::new(pos.x, pos.y)) {
                    let events = self.session.sculpt(&SculptStroke {
                        center: (x, z),
                        radius: self.sculpt_radius,
                        strength: self.sculpt_strength,
                    });
                    self.record(events);
                }
            }
        } else {
            let input = self.collect_input(ui.ctx(), rect);
            // a held press must keep ticking so its hold can complete
            if !input.is_empty() || self.session.is_pressed() {
                let now = self.now();
                let result = self.session.tick(now, &input, &projector).map(|e| self.record(e));
                self.report(result);
            }
            if let Some(pos) = response.hover_pos() {
                self.session.hover(ScreenPoint::new(pos.x, pos.y), &projector);
            }
        }

        let painter = ui.painter_at(rect);
        if let Some(tex) = &self.terrain_texture {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.image(tex.id(), rect, uv, Color32::WHITE);
        }

        let scene = self.session.scene();
        let focus = scene.selected().map(|e| e.id.as_str());
        for element in scene.elements() {
            let kind = self
                .session
                .catalog()
                .get_template(&element.template_id)
                .map(|t| t.element_type)
                .ok();
            let r = view.footprint_rect(&element.footprint());
            painter.rect_filled(r, 2.0, element_color(kind));
            let outline = if focus == Some(element.id.as_str()) {
                Stroke::new(2.5, Color32::YELLOW)
            } else if scene.hovered() == Some(element.id.as_str()) {
                Stroke::new(1.5, Color32::WHITE)
            } else {
                Stroke::new(1.0, Color32::from_black_alpha(160))
            };
            painter.rect_stroke(r, 2.0, outline, StrokeKind::Middle);
        }

        // ghost of the element being dragged
        if let Some(gesture) = scene.gesture() {
            match gesture.preview {
                Some(transform) => {
                    let fp = Footprint::around(
                        transform.position,
                        gesture.base.dimensions.mul(transform.scale),
                        transform.rotation.y,
                    );
                    let r = view.footprint_rect(&fp);
                    painter.rect_filled(r, 2.0, Color32::from_rgba_unmultiplied(255, 255, 255, 90));
                    painter.rect_stroke(r, 2.0, Stroke::new(1.5, Color32::WHITE), StrokeKind::Middle);
                }
                None => {
                    let at = Pos2::new(gesture.current.x, gesture.current.y);
                    painter.circle_stroke(at, 10.0, Stroke::new(2.0, Color32::RED));
                }
            }
        }
    }
}

fn element_color(kind: Option<ElementType>) -> Color32 {
    match kind {
        Some(ElementType::Vegetation) => Color32::from_rgb(40, 120, 50),
        Some(ElementType::Infrastructure) => Color32::from_rgb(90, 90, 110),
        Some(ElementType::Utility) => Color32::from_rgb(200, 150, 40),
        Some(ElementType::Hardscape) => Color32::from_rgb(170, 120, 90),
        None => Color32::GRAY,
    }
}

impl App for SiteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_failures();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            let events = self.session.cancel();
            self.record(events);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) && self.session.scene().selected().is_some() {
            let result = self.session.delete_selected().map(|e| self.record(e));
            self.report(result);
        }

        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Site Layout");
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.catalog_panel(ui);
                ui.separator();
                self.selection_panel(ui);
                ui.separator();
                self.terrain_panel(ui);
                ui.separator();
                self.export_panel(ui);
                ui.separator();
                ui.label(&self.status_message);
                for line in &self.events {
                    ui.small(line);
                }
            });
        });

        // keep the panel inputs on the accepted terrain after undo/redo
        if self.texture_revision != Some(self.session.terrain().revision()) {
            self.sync_terrain_inputs();
        }
        self.refresh_texture(ctx);

        // central display
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| self.canvas(ui));
        });

        if self.session.is_pressed() {
            ctx.request_repaint();
        }
    }
}

// Connect to MongoDB and start the snapshot writer; `None` means in-memory mode.
fn connect(config: &StorageConfig) -> Option<(Arc<LayoutStorage>, Runtime)> {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::warn!("no async runtime: {e}");
            return None;
        }
    };
    match runtime.block_on(LayoutStorage::init(config)) {
        Ok(storage) => Some((Arc::new(storage), runtime)),
        Err(e) => {
            log::warn!("MongoDB init error: {e}");
            None
        }
    }
}

fn open_session() -> Result<(LayoutSession<'static>, Option<Persistence>), layout_core::LayoutError> {
    let config = StorageConfig::from_env();
    let connected = connect(&config);

    let mut terrain = None;
    let mut layout = None;
    if let Some((storage, runtime)) = &connected {
        terrain = runtime.block_on(storage.load_terrain(PROJECT_ID)).unwrap_or_else(|e| {
            log::warn!("could not load terrain: {e}");
            None
        });
        layout = runtime.block_on(storage.load_layout(PROJECT_ID)).unwrap_or_else(|e| {
            log::warn!("could not load layout: {e}");
            None
        });
    }
    let terrain = match terrain {
        Some(t) => t,
        None => Terrain::flat("terrain-1", PROJECT_ID, 33, Dimensions::new(60.0, 40.0), MaterialType::Grass)?,
    };

    let (sink, persistence): (Option<Box<dyn SnapshotSink>>, _) = match connected {
        Some((storage, runtime)) => {
            let (sink, failures) = MongoSink::spawn(storage, runtime.handle());
            let sink: Box<dyn SnapshotSink> = Box::new(sink);
            let persistence = Persistence {
                _runtime: runtime,
                failures,
            };
            (Some(sink), Some(persistence))
        }
        None => (None, None),
    };

    let mut session = LayoutSession::new(Catalog::builtin(), terrain, SessionConfig::default(), sink);
    if let Some(layout) = layout {
        log::info!("restored {} element(s)", layout.elements.len());
        session.set_scene(Scene::from_snapshot(layout));
    }
    Ok((session, persistence))
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let (session, persistence) = match open_session() {
        Ok(opened) => opened,
        Err(e) => {
            log::error!("cannot start: {e}");
            std::process::exit(1);
        }
    };

    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };
    run_native(
        "Site Layout",
        opts,
        Box::new(|_cc| Ok(Box::new(SiteApp::new(session, persistence)))),
    )
}

#[cfg(test)]
mod tests {
    use super::TouchLatch;
    use eframe::egui::TouchId;
    use layout_core::InputPhase;

    #[test]
    fn touch_latch_follows_first_finger_only() {
        let mut latch = TouchLatch::default();
        let (first, second) = (TouchId(1), TouchId(2));

        assert!(latch.accept(first, InputPhase::Down, true));
        assert!(!latch.accept(second, InputPhase::Down, true));
        assert!(latch.accept(first, InputPhase::Move, true));
        assert!(!latch.accept(second, InputPhase::Move, true));
        // lifting the other finger does not end the press
        assert!(!latch.accept(second, InputPhase::Up, true));
        assert!(latch.accept(first, InputPhase::Up, false));

        assert!(latch.accept(second, InputPhase::Down, true));
    }

    #[test]
    fn touch_latch_ignores_presses_off_canvas() {
        let mut latch = TouchLatch::default();
        assert!(!latch.accept(TouchId(7), InputPhase::Down, false));
        assert!(!latch.accept(TouchId(7), InputPhase::Up, true));
        assert_eq!(latch, TouchLatch::default());
    }
}

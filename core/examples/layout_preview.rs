use std::path::Path;
use std::time::Duration;

use image::{Rgb, RgbImage};
use layout_core::preview::material_rgb;
use layout_core::{
    Catalog, Dimensions, InputEvent, InputKind, InputPhase, LayoutSession, MaterialType, MemorySink,
    ScreenPoint, SculptStroke, SessionConfig, Terrain,
};
use palette::{Gradient, LinSrgb};

const IMAGE_SIZE: u32 = 512;

fn main() {
    // A 60×40 m lot, gently mounded in two places
    let terrain = Terrain::flat("demo-terrain", "demo", 33, Dimensions::new(60.0, 40.0), MaterialType::Grass)
        .expect("valid terrain");
    let sink = MemorySink::new();
    let mut session = LayoutSession::new(
        Catalog::builtin(),
        terrain,
        SessionConfig::default(),
        Some(Box::new(sink.clone())),
    );
    session.sculpt(&SculptStroke {
        center: (15.0, 12.0),
        radius: 12.0,
        strength: 2.5,
    });
    session.sculpt(&SculptStroke {
        center: (45.0, 30.0),
        radius: 9.0,
        strength: -1.5,
    });

    // The "camera" looks straight down: one screen unit per metre
    let project = |p: ScreenPoint| Some((p.x, p.y));
    let drops = [
        ("tree-large", (15.0, 12.0)),
        ("tree-small", (20.0, 8.0)),
        ("parking", (40.0, 10.0)),
        ("parking", (46.0, 10.0)),
        ("bench", (30.0, 30.0)),
        ("light-pole", (35.0, 20.0)),
        ("paver-patio", (45.0, 30.0)),
    ];
    let mut t = 0;
    for (template, (x, z)) in drops {
        session.set_active_template(Some(template)).expect("builtin template");
        // press on empty ground, drag to the drop point
        let steps = [
            (InputPhase::Down, ScreenPoint::new(1.0, 1.0)),
            (InputPhase::Move, ScreenPoint::new(x, z)),
            (InputPhase::Up, ScreenPoint::new(x, z)),
        ];
        for (phase, point) in steps {
            t += 16;
            let now = Duration::from_millis(t);
            let event = InputEvent::new(InputKind::Mouse, phase, point, now);
            session.tick(now, &[event], &project).expect("tick");
        }
        session.deselect().ok();
    }

    // Colour the ground by elevation, from hollow to rise
    let base = material_rgb(session.terrain().material());
    let tone = |c: u8, f: f32| (c as f32 / 255.0 * f).min(1.0);
    let gradient = Gradient::with_domain(vec![
        (-2.0, LinSrgb::new(tone(base[0], 0.5), tone(base[1], 0.5), tone(base[2], 0.5))),
        (0.0, LinSrgb::new(tone(base[0], 1.0), tone(base[1], 1.0), tone(base[2], 1.0))),
        (3.0, LinSrgb::new(tone(base[0], 1.4), tone(base[1], 1.4), tone(base[2], 1.4))),
    ]);

    let dims = session.terrain().dimensions();
    let scale = (dims.width / IMAGE_SIZE as f32).max(dims.depth / IMAGE_SIZE as f32);
    let (w, h) = ((dims.width / scale) as u32, (dims.depth / scale) as u32);
    let mut img = RgbImage::new(w, h);
    for py in 0..h {
        for px in 0..w {
            let (x, z) = (px as f32 * scale, py as f32 * scale);
            let y = session.terrain().sample_elevation(x, z).unwrap_or(0.0);
            let col: LinSrgb = gradient.get(y.clamp(-2.0, 3.0));
            let rgb = col.into_format::<u8>();
            img.put_pixel(px, py, Rgb([rgb.red, rgb.green, rgb.blue]));
        }
    }

    // Footprints on top, darkest last
    for element in session.scene().elements() {
        let fp = element.footprint();
        let x0 = (fp.min_x / scale).max(0.0) as u32;
        let x1 = ((fp.max_x / scale) as u32).min(w.saturating_sub(1));
        let z0 = (fp.min_z / scale).max(0.0) as u32;
        let z1 = ((fp.max_z / scale) as u32).min(h.saturating_sub(1));
        for py in z0..=z1 {
            for px in x0..=x1 {
                let edge = px == x0 || px == x1 || py == z0 || py == z1;
                let pixel = if edge { Rgb([20, 20, 20]) } else { Rgb([230, 220, 90]) };
                img.put_pixel(px, py, pixel);
            }
        }
    }

    let path = Path::new("layout_preview.png");
    img.save(path).unwrap();
    println!(
        "Saved {} placements ({} layout snapshots stored) to {:?}",
        session.scene().elements().len(),
        sink.layouts().unwrap().len(),
        path
    );
}

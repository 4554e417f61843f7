use crate::terrain::{MaterialType, Terrain};

// below this elevation spread the ground renders as one flat shade
const FLAT_SPREAD: f32 = 0.001;
const SHADE_LOW: f32 = 0.7;
const SHADE_HIGH: f32 = 1.15;

// Base colour of each surface material.
pub fn material_rgb(material: MaterialType) -> [u8; 3] {
    match material {
        MaterialType::Soil => [121, 85, 58],
        MaterialType::Grass => [74, 140, 62],
        MaterialType::Pavement => [128, 128, 132],
        MaterialType::Gravel => [168, 160, 146],
        MaterialType::Sand => [210, 192, 140],
    }
}

// Linearly interpolate between two RGB triples
fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t) as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t) as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t) as u8,
    ]
}

fn shade(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    rgb.map(|c| (c as f32 * factor).clamp(0.0, 255.0) as u8)
}

// Map a height in [0.0,1.0] to the material colour, darker in hollows and
// lighter on rises.
fn height_to_rgb(material: MaterialType, h: f32) -> [u8; 3] {
    let base = material_rgb(material);
    lerp_color(shade(base, SHADE_LOW), shade(base, SHADE_HIGH), h)
}

/// Elevations rescaled to `[0, 1]`, row-major. A flat terrain maps to 0.5
/// everywhere.
pub fn normalized_heights(terrain: &Terrain) -> Vec<f32> {
    let heights = terrain.heights();
    let (min, max) = heights
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));
    let range = max - min;
    if range < FLAT_SPREAD {
        return vec![0.5; heights.len()];
    }
    heights.iter().map(|h| (h - min) / range).collect()
}

/// Top-down RGB buffer of the terrain, `resolution × resolution` pixels,
/// row-major with row 0 at `z = 0`.
pub fn terrain_image(terrain: &Terrain) -> Vec<u8> {
    let material = terrain.material();
    let heights = normalized_heights(terrain);
    let mut buf = Vec::with_capacity(heights.len() * 3);
    for h in heights {
        buf.extend_from_slice(&height_to_rgb(material, h));
    }
    buf
}

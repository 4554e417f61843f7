use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    // Component-wise product, used for extent * scale.
    pub fn mul(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }
}

// Raw screen-space position reported by an input device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: ScreenPoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle on the terrain plane covered by an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Footprint {
    /// Bounds of a box centred on `center` with full `extent`, turned by `yaw`
    /// radians around the vertical axis.
    pub fn around(center: Vec3, extent: Vec3, yaw: f32) -> Self {
        let (sin, cos) = yaw.sin_cos();
        let (hx, hz) = (extent.x.abs() * 0.5, extent.z.abs() * 0.5);
        let half_x = cos.abs() * hx + sin.abs() * hz;
        let half_z = sin.abs() * hx + cos.abs() * hz;
        Self {
            min_x: center.x - half_x,
            max_x: center.x + half_x,
            min_z: center.z - half_z,
            max_z: center.z + half_z,
        }
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    // Shared area, touching edges don't count.
    pub fn intersects(&self, other: &Footprint) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_z < other.max_z
            && other.min_z < self.max_z
    }
}

use serde::{Deserialize, Serialize};

use crate::catalog::ElementTemplate;
use crate::geometry::{Footprint, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// A template instance on the terrain. Refers to its template by id only and
/// owns its own transform; `position` is terrain-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedElement {
    pub id: String,
    pub template_id: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    pub scale: Vec3,
    // (width, height, depth) before scaling
    pub dimensions: Vec3,
}

impl PlacedElement {
    pub fn from_template(id: impl Into<String>, template: &ElementTemplate, transform: Transform) -> Self {
        Self {
            id: id.into(),
            template_id: template.id.clone(),
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            dimensions: template.dimensions,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
        self.scale = transform.scale;
    }

    // World-space extent after scaling.
    pub fn extent(&self) -> Vec3 {
        self.dimensions.mul(self.scale)
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::around(self.position, self.extent(), self.rotation.y)
    }
}

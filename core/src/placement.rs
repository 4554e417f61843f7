//! Turns a drag gesture into a validated transform on the active terrain.
//!
//! The camera collaborator projects screen points onto the terrain plane; this
//! module only sees the resulting `(x, z)`, or `None` when the ray missed. Each
//! movement re-snaps the element onto the surface and checks that its footprint
//! still touches the terrain. Elements may overlap each other freely.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ElementTemplate};
use crate::element::{PlacedElement, Transform};
use crate::error::{LayoutError, Result};
use crate::geometry::{Footprint, ScreenPoint, Vec3};
use crate::input::{ArmedGesture, InputKind};
use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragTarget {
    // first placement of a catalog template
    Template(String),
    // reposition of an element already in the scene
    Element(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Armed,
    Dragging,
    Committing,
}

// What the dragged thing keeps while it moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBase {
    pub rotation: Vec3,
    pub scale: Vec3,
    pub dimensions: Vec3,
}

impl DragBase {
    pub fn for_template(template: &ElementTemplate) -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: template.default_scale,
            dimensions: template.dimensions,
        }
    }

    pub fn for_element(element: &PlacedElement) -> Self {
        Self {
            rotation: element.rotation,
            scale: element.scale,
            dimensions: element.dimensions,
        }
    }
}

/// Transient state of one drag. Lives only between arming and commit/cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub active_input: Option<InputKind>,
    pub origin: ScreenPoint,
    pub current: ScreenPoint,
    pub target: DragTarget,
    pub phase: GesturePhase,
    pub base: DragBase,
    // last transform that passed validation; cleared by a rejection
    pub preview: Option<Transform>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    // the camera ray never hit the terrain plane
    MissedTerrain,
    // footprint shares no area with the terrain
    OutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementResolution {
    Valid(Transform),
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    pub translate_snap: bool,
    pub translate_increment: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            translate_snap: false,
            translate_increment: 0.25,
        }
    }
}

impl SnapSettings {
    pub fn snap(&self, x: f32, z: f32) -> (f32, f32) {
        if !self.translate_snap || self.translate_increment <= 0.0 {
            return (x, z);
        }
        let inc = self.translate_increment;
        ((x / inc).round() * inc, (z / inc).round() * inc)
    }
}

pub struct PlacementPipeline<'a> {
    catalog: &'a Catalog,
    terrain: &'a Terrain,
    snap: SnapSettings,
}

impl<'a> PlacementPipeline<'a> {
    pub fn new(catalog: &'a Catalog, terrain: &'a Terrain, snap: SnapSettings) -> Self {
        Self {
            catalog,
            terrain,
            snap,
        }
    }

    /// Check preconditions and arm a gesture. Unknown ids and malformed
    /// terrain fail here, before any gesture state exists. `existing` is the
    /// scene's copy of the element for a reposition.
    pub fn begin(
        &self,
        armed: &ArmedGesture,
        target: DragTarget,
        existing: Option<&PlacedElement>,
    ) -> Result<GestureState> {
        let base = match &target {
            DragTarget::Template(id) => DragBase::for_template(self.catalog.get_template(id)?),
            DragTarget::Element(id) => {
                let element = existing
                    .filter(|e| &e.id == id)
                    .ok_or_else(|| LayoutError::element_not_found(id.as_str()))?;
                DragBase::for_element(element)
            }
        };
        self.terrain.validate()?;

        Ok(GestureState {
            active_input: Some(armed.kind),
            origin: armed.origin,
            current: armed.current,
            target,
            phase: GesturePhase::Armed,
            base,
            preview: None,
        })
    }

    /// Elevation-snap and bounds-check the element at a projected point.
    /// Only a malformed terrain is an error; everything else resolves to a
    /// [`Rejection`].
    pub fn resolve(&self, base: &DragBase, projected: Option<(f32, f32)>) -> Result<PlacementResolution> {
        self.terrain.validate()?;

        let Some((x, z)) = projected.filter(|(x, z)| x.is_finite() && z.is_finite()) else {
            return Ok(PlacementResolution::Rejected(Rejection::MissedTerrain));
        };
        let (x, z) = self.snap.snap(x, z);
        let y = self.terrain.sample_elevation(x, z)?;
        let position = Vec3::new(x, y, z);

        let footprint = Footprint::around(position, base.dimensions.mul(base.scale), base.rotation.y);
        if !self.terrain.overlaps_rect(footprint.min_x, footprint.max_x, footprint.min_z, footprint.max_z) {
            return Ok(PlacementResolution::Rejected(Rejection::OutOfBounds));
        }

        Ok(PlacementResolution::Valid(Transform {
            position,
            rotation: base.rotation,
            scale: base.scale,
        }))
    }

    // Move the gesture to `point` and refresh its preview.
    pub fn track(
        &self,
        gesture: &mut GestureState,
        point: ScreenPoint,
        projected: Option<(f32, f32)>,
    ) -> Result<PlacementResolution> {
        gesture.current = point;
        gesture.phase = GesturePhase::Dragging;
        let resolution = self.resolve(&gesture.base, projected)?;
        gesture.preview = match resolution {
            PlacementResolution::Valid(transform) => Some(transform),
            PlacementResolution::Rejected(_) => None,
        };
        Ok(resolution)
    }

    /// Gesture end: the transform to commit, or `None` when the last
    /// resolution was a rejection and the drop must be discarded.
    pub fn finish(&self, gesture: &mut GestureState) -> Option<Transform> {
        gesture.phase = GesturePhase::Committing;
        gesture.preview
    }
}

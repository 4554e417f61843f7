//! Committed placements plus the interaction state machine around them.
//!
//! ```text
//! idle --arm--> dragging --commit--> selected --edit--> editing
//!  ^               |                  |   ^                |
//!  +----cancel-----+                  |   +----finish------+
//!  +----------deselect/delete---------+
//! ```
//!
//! Deleting an element always lands in `idle`, whatever the previous state.

use serde::{Deserialize, Serialize};

use crate::element::{PlacedElement, Transform};
use crate::error::{LayoutError, Result};
use crate::geometry::{Footprint, Vec3};
use crate::placement::{DragTarget, GestureState};

const MIN_SCALE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SceneState {
    #[default]
    Idle,
    Dragging(GestureState),
    Selected(String),
    Editing(String),
}

impl SceneState {
    pub fn name(&self) -> &'static str {
        match self {
            SceneState::Idle => "idle",
            SceneState::Dragging(_) => "dragging",
            SceneState::Selected(_) => "selected",
            SceneState::Editing(_) => "editing",
        }
    }
}

/// Property-panel change applied while `editing`. Position only moves
/// through a drag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementEdit {
    pub rotation: Option<Vec3>,
    pub scale: Option<Vec3>,
}

/// Serialized form of the committed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub project_id: String,
    pub elements: Vec<PlacedElement>,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    project_id: String,
    elements: Vec<PlacedElement>,
    state: SceneState,
    hovered: Option<String>,
    next_id: u64,
}

impl Scene {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn from_snapshot(snapshot: LayoutSnapshot) -> Self {
        let next_id = snapshot
            .elements
            .iter()
            .filter_map(|e| e.id.strip_prefix("el-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            project_id: snapshot.project_id,
            elements: snapshot.elements,
            next_id,
            ..Default::default()
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    pub fn get(&self, id: &str) -> Option<&PlacedElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn gesture(&self) -> Option<&GestureState> {
        match &self.state {
            SceneState::Dragging(g) => Some(g),
            _ => None,
        }
    }

    pub fn gesture_mut(&mut self) -> Option<&mut GestureState> {
        match &mut self.state {
            SceneState::Dragging(g) => Some(g),
            _ => None,
        }
    }

    // Focused element, in `selected` or `editing`.
    pub fn selected(&self) -> Option<&PlacedElement> {
        match &self.state {
            SceneState::Selected(id) | SceneState::Editing(id) => self.get(id),
            _ => None,
        }
    }

    pub fn start_drag(&mut self, gesture: GestureState) -> Result<()> {
        match self.state {
            SceneState::Idle | SceneState::Selected(_) => {
                self.state = SceneState::Dragging(gesture);
                Ok(())
            }
            _ => Err(self.refuse("start a drag")),
        }
    }

    /// Commit the current drag with its final transform and select the result.
    /// A reposition updates the dragged element in place, so committing the
    /// same drag twice never duplicates it.
    pub fn commit(&mut self, transform: Transform) -> Result<&PlacedElement> {
        let gesture = match std::mem::take(&mut self.state) {
            SceneState::Dragging(gesture) => gesture,
            other => {
                self.state = other;
                return Err(self.refuse("commit"));
            }
        };

        let id = match gesture.target {
            DragTarget::Template(template_id) => {
                let id = format!("el-{}", self.next_id);
                self.next_id += 1;
                self.elements.push(PlacedElement {
                    id: id.clone(),
                    template_id,
                    position: transform.position,
                    rotation: transform.rotation,
                    scale: transform.scale,
                    dimensions: gesture.base.dimensions,
                });
                id
            }
            DragTarget::Element(id) => {
                let Some(element) = self.elements.iter_mut().find(|e| e.id == id) else {
                    return Err(LayoutError::element_not_found(id));
                };
                element.set_transform(transform);
                id
            }
        };

        let p = transform.position;
        log::info!("committed {id} at ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
        self.state = SceneState::Selected(id.clone());
        self.get(&id).ok_or_else(|| LayoutError::element_not_found(id))
    }

    // Drop the in-flight drag without touching the committed set.
    pub fn cancel_drag(&mut self) -> Option<GestureState> {
        match std::mem::take(&mut self.state) {
            SceneState::Dragging(gesture) => Some(gesture),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        if matches!(self.state, SceneState::Dragging(_)) {
            return Err(self.refuse("select"));
        }
        if self.get(id).is_none() {
            return Err(LayoutError::element_not_found(id));
        }
        self.state = SceneState::Selected(id.to_string());
        Ok(())
    }

    pub fn deselect(&mut self) -> Result<()> {
        match self.state {
            SceneState::Idle | SceneState::Selected(_) => {
                self.state = SceneState::Idle;
                Ok(())
            }
            _ => Err(self.refuse("deselect")),
        }
    }

    pub fn begin_edit(&mut self) -> Result<()> {
        match &self.state {
            SceneState::Selected(id) => {
                self.state = SceneState::Editing(id.clone());
                Ok(())
            }
            _ => Err(self.refuse("edit")),
        }
    }

    pub fn finish_edit(&mut self) -> Result<()> {
        match &self.state {
            SceneState::Editing(id) => {
                self.state = SceneState::Selected(id.clone());
                Ok(())
            }
            _ => Err(self.refuse("finish editing")),
        }
    }

    pub fn apply_edit(&mut self, edit: ElementEdit) -> Result<&PlacedElement> {
        let SceneState::Editing(id) = &self.state else {
            return Err(self.refuse("apply an edit"));
        };
        let id = id.clone();
        let element = self.element_mut(&id)?;
        if let Some(rotation) = edit.rotation {
            element.rotation = Vec3::new(
                wrap_angle(rotation.x),
                wrap_angle(rotation.y),
                wrap_angle(rotation.z),
            );
        }
        if let Some(scale) = edit.scale.filter(|s| s.x.is_finite() && s.y.is_finite() && s.z.is_finite()) {
            element.scale = Vec3::new(
                scale.x.max(MIN_SCALE),
                scale.y.max(MIN_SCALE),
                scale.z.max(MIN_SCALE),
            );
        }
        Ok(element)
    }

    /// Turn the focused element around the vertical axis; yaw stays in `[0, 2π)`.
    pub fn rotate_selected(&mut self, delta: f32) -> Result<&PlacedElement> {
        let id = match &self.state {
            SceneState::Selected(id) | SceneState::Editing(id) => id.clone(),
            _ => return Err(self.refuse("rotate")),
        };
        let element = self.element_mut(&id)?;
        element.rotation.y = wrap_angle(element.rotation.y + delta);
        Ok(element)
    }

    pub fn delete(&mut self, id: &str) -> Result<PlacedElement> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| LayoutError::element_not_found(id))?;
        let removed = self.elements.remove(index);
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        self.state = SceneState::Idle;
        log::info!("deleted {id}");
        Ok(removed)
    }

    pub fn delete_selected(&mut self) -> Result<PlacedElement> {
        let Some(id) = self.selected().map(|e| e.id.clone()) else {
            return Err(self.refuse("delete the selection"));
        };
        self.delete(&id)
    }

    // Top-most element covering the terrain point; later placements sit on top.
    pub fn element_at(&self, x: f32, z: f32) -> Option<&PlacedElement> {
        self.elements.iter().rev().find(|e| e.footprint().contains(x, z))
    }

    pub fn set_hover(&mut self, point: Option<(f32, f32)>) -> Option<&str> {
        self.hovered = point
            .and_then(|(x, z)| self.element_at(x, z))
            .map(|e| e.id.clone());
        self.hovered.as_deref()
    }

    // Advisory only, never blocks a commit.
    pub fn overlapping(&self, footprint: &Footprint, exclude: Option<&str>) -> Vec<String> {
        self.elements
            .iter()
            .filter(|e| Some(e.id.as_str()) != exclude)
            .filter(|e| e.footprint().intersects(footprint))
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            project_id: self.project_id.clone(),
            elements: self.elements.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(Self::from_snapshot)
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut PlacedElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| LayoutError::element_not_found(id))
    }

    fn refuse(&self, action: &'static str) -> LayoutError {
        LayoutError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }
}

fn wrap_angle(radians: f32) -> f32 {
    radians.rem_euclid(std::f32::consts::TAU)
}

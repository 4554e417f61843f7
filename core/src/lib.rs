// core holds the terrain model, element catalog, placement pipeline,
// input arbitration and the scene state machine
pub mod catalog;
pub mod element;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod persistence;
pub mod placement;
pub mod preview;
pub mod scene;
pub mod session;
pub mod terrain;

pub use catalog::{Catalog, ElementTemplate, ElementType, TemplateFilter};
pub use element::{PlacedElement, Transform};
pub use error::{LayoutError, PersistenceError, Result};
pub use geometry::{Footprint, ScreenPoint, Vec3};
pub use history::TerrainHistory;
pub use input::{ActivationConstraint, Arbiter, ArbiterConfig, ArmedGesture, GestureSignal, InputEvent, InputKind, InputPhase};
pub use persistence::{MemorySink, SnapshotSink};
pub use placement::{DragTarget, GestureState, PlacementPipeline, PlacementResolution, Rejection, SnapSettings};
pub use scene::{ElementEdit, LayoutSnapshot, Scene, SceneState};
pub use session::{LayoutSession, Projector, SessionConfig, SessionEvent};
pub use terrain::{Dimensions, MaterialType, SculptStroke, Terrain, TerrainPatch, TerrainPoint};

use bson::oid::ObjectId;
use layout_core::{Dimensions, LayoutError, LayoutSnapshot, MaterialType, PlacedElement, Terrain};
use serde::{Deserialize, Serialize};

// One document per project: the latest accepted terrain revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub terrain_id: String,
    pub project_id: String,
    // bson has no unsigned 64-bit integer
    pub revision: i64,
    pub resolution: u32,
    pub width: f32,
    pub depth: f32,
    pub material: MaterialType,
    // Flattened row-major: length = resolution×resolution
    pub heights: Vec<f32>,
}

impl From<&Terrain> for TerrainDoc {
    fn from(terrain: &Terrain) -> Self {
        let dims = terrain.dimensions();
        Self {
            id: None,
            terrain_id: terrain.id().to_string(),
            project_id: terrain.project_id().to_string(),
            revision: i64::try_from(terrain.revision()).unwrap_or(i64::MAX),
            resolution: terrain.resolution(),
            width: dims.width,
            depth: dims.depth,
            material: terrain.material(),
            heights: terrain.heights(),
        }
    }
}

impl TryFrom<TerrainDoc> for Terrain {
    type Error = LayoutError;

    // Grid positions are rebuilt from resolution and dimensions; a document
    // whose height count doesn't match is rejected.
    fn try_from(doc: TerrainDoc) -> Result<Self, Self::Error> {
        let terrain = Terrain::from_heights(
            doc.terrain_id,
            doc.project_id,
            doc.resolution,
            Dimensions::new(doc.width, doc.depth),
            doc.material,
            doc.heights,
        )?;
        Ok(terrain.with_revision(doc.revision.max(0) as u64))
    }
}

// One document per project: the committed element set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub project_id: String,
    pub elements: Vec<PlacedElement>,
    pub updated_at: bson::DateTime,
}

impl From<&LayoutSnapshot> for LayoutDoc {
    fn from(snapshot: &LayoutSnapshot) -> Self {
        Self {
            id: None,
            project_id: snapshot.project_id.clone(),
            elements: snapshot.elements.clone(),
            updated_at: bson::DateTime::now(),
        }
    }
}

impl From<LayoutDoc> for LayoutSnapshot {
    fn from(doc: LayoutDoc) -> Self {
        LayoutSnapshot {
            project_id: doc.project_id,
            elements: doc.elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutDoc, TerrainDoc};
    use layout_core::{Dimensions, LayoutError, LayoutSnapshot, MaterialType, SculptStroke, Terrain};

    fn sculpted() -> Terrain {
        Terrain::flat("t-1", "site", 5, Dimensions::new(20.0, 10.0), MaterialType::Gravel)
            .unwrap()
            .sculpt(&SculptStroke {
                center: (10.0, 5.0),
                radius: 6.0,
                strength: 1.5,
            })
    }

    #[test]
    fn terrain_doc_keeps_grid_and_revision() {
        let terrain = sculpted();
        let doc = TerrainDoc::from(&terrain);
        assert_eq!(doc.heights.len(), 25);
        assert_eq!(doc.revision, 1);

        let bytes = bson::to_document(&doc).unwrap();
        assert_eq!(bytes.get_str("material").unwrap(), "gravel");
        assert!(bytes.get("_id").is_none());

        let back: TerrainDoc = bson::from_document(bytes).unwrap();
        let restored = Terrain::try_from(back).unwrap();
        assert_eq!(restored, terrain);
    }

    #[test]
    fn terrain_doc_with_wrong_height_count_is_rejected() {
        let mut doc = TerrainDoc::from(&sculpted());
        doc.heights.pop();
        assert!(matches!(Terrain::try_from(doc), Err(LayoutError::InvalidTerrain(_))));
    }

    #[test]
    fn layout_doc_converts_back_to_snapshot() {
        let snapshot = LayoutSnapshot {
            project_id: "site".into(),
            elements: Vec::new(),
        };
        let doc = LayoutDoc::from(&snapshot);
        assert_eq!(LayoutSnapshot::from(doc), snapshot);
    }
}

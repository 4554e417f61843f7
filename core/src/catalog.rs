use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Vegetation,
    Infrastructure,
    Utility,
    Hardscape,
}

impl ElementType {
    pub const ALL: [ElementType; 4] = [
        ElementType::Vegetation,
        ElementType::Infrastructure,
        ElementType::Utility,
        ElementType::Hardscape,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ElementType::Vegetation => "vegetation",
            ElementType::Infrastructure => "infrastructure",
            ElementType::Utility => "utility",
            ElementType::Hardscape => "hardscape",
        }
    }
}

/// A placeable object type. Instances only keep the `id`, so nothing here
/// ever flows back into elements already on the terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTemplate {
    pub id: String,
    pub name: String,
    pub element_type: ElementType,
    pub category: String,
    pub description: String,
    // rendering hint for the model collaborator
    pub model_ref: String,
    pub default_scale: Vec3,
    // model extent before scaling
    pub dimensions: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemplateFilter<'a> {
    pub element_type: Option<ElementType>,
    pub category: Option<&'a str>,
}

impl TemplateFilter<'_> {
    fn matches(&self, template: &ElementTemplate) -> bool {
        self.element_type.is_none_or(|t| t == template.element_type)
            && self.category.is_none_or(|c| c == template.category)
    }
}

// Read-only template registry, declaration order preserved.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<ElementTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<ElementTemplate>) -> Self {
        Self { templates }
    }

    /// Process-wide catalog of the built-in site elements, built on first use.
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(|| Catalog::new(builtin_templates()))
    }

    pub fn list_templates(&self, filter: Option<TemplateFilter<'_>>) -> Vec<&ElementTemplate> {
        let filter = filter.unwrap_or_default();
        self.templates.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn get_template(&self, id: &str) -> Result<&ElementTemplate> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| LayoutError::template_not_found(id))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    id: &str,
    name: &str,
    element_type: ElementType,
    category: &str,
    description: &str,
    model_ref: &str,
    default_scale: Vec3,
    dimensions: Vec3,
) -> ElementTemplate {
    ElementTemplate {
        id: id.into(),
        name: name.into(),
        element_type,
        category: category.into(),
        description: description.into(),
        model_ref: model_ref.into(),
        default_scale,
        dimensions,
    }
}

fn builtin_templates() -> Vec<ElementTemplate> {
    use ElementType::*;
    vec![
        template("tree-large", "Large Tree", Vegetation, "trees", "Mature deciduous shade tree", "models/tree_large.glb", Vec3::ONE, Vec3::ONE),
        template("tree-small", "Small Tree", Vegetation, "trees", "Ornamental tree", "models/tree_small.glb", Vec3::new(0.6, 0.6, 0.6), Vec3::ONE),
        template("shrub", "Shrub", Vegetation, "shrubs", "Low flowering shrub", "models/shrub.glb", Vec3::new(0.5, 0.4, 0.5), Vec3::ONE),
        template("hedge", "Hedge Row", Vegetation, "shrubs", "Clipped hedge segment", "models/hedge.glb", Vec3::new(3.0, 1.0, 0.8), Vec3::ONE),
        template("parking", "Parking Bay", Infrastructure, "parking", "Single paved parking bay", "models/parking.glb", Vec3::new(5.0, 0.1, 5.0), Vec3::ONE),
        template("building-module", "Building Module", Infrastructure, "modules", "Editable prefab building module", "models/module.glb", Vec3::new(6.0, 3.0, 4.0), Vec3::ONE),
        template("path", "Footpath", Infrastructure, "paths", "Straight footpath segment", "models/path.glb", Vec3::new(1.5, 0.05, 4.0), Vec3::ONE),
        template("light-pole", "Light Pole", Utility, "lighting", "Street light on a steel pole", "models/light_pole.glb", Vec3::new(0.3, 4.0, 0.3), Vec3::ONE),
        template("bench", "Bench", Utility, "furniture", "Two-seat park bench", "models/bench.glb", Vec3::new(1.8, 0.8, 0.6), Vec3::ONE),
        template("bin", "Waste Bin", Utility, "furniture", "Litter bin", "models/bin.glb", Vec3::new(0.5, 1.0, 0.5), Vec3::ONE),
        template("paver-patio", "Paver Patio", Hardscape, "paving", "Square paver patio", "models/patio.glb", Vec3::new(4.0, 0.1, 4.0), Vec3::ONE),
        template("retaining-wall", "Retaining Wall", Hardscape, "walls", "Stone retaining wall segment", "models/wall.glb", Vec3::new(4.0, 1.2, 0.4), Vec3::ONE),
    ]
}

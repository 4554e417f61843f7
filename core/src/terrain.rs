use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

// A single grid sample. `y` is elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    #[default]
    Soil,
    Grass,
    Pavement,
    Gravel,
    Sand,
}

impl MaterialType {
    pub const ALL: [MaterialType; 5] = [
        MaterialType::Soil,
        MaterialType::Grass,
        MaterialType::Pavement,
        MaterialType::Gravel,
        MaterialType::Sand,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Soil => "soil",
            MaterialType::Grass => "grass",
            MaterialType::Pavement => "pavement",
            MaterialType::Gravel => "gravel",
            MaterialType::Sand => "sand",
        }
    }
}

// World extent of the terrain along x (width) and z (depth).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub depth: f32,
}

impl Dimensions {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.depth.is_finite() && self.width > 0.0 && self.depth > 0.0
    }
}

/// Partial change merged by [`Terrain::apply_partial_update`]. `None` keeps the
/// current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainPatch {
    pub material: Option<MaterialType>,
    pub resolution: Option<u32>,
    pub dimensions: Option<Dimensions>,
}

/// Raise (positive strength) or lower (negative) the ground around `center`
/// with a smoothstep falloff reaching zero at `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SculptStroke {
    pub center: (f32, f32),
    pub radius: f32,
    pub strength: f32,
}

/// Regular height grid, row-major: `index = row * resolution + col`, with
/// `x = col * width / (resolution - 1)` and `z = row * depth / (resolution - 1)`.
///
/// A terrain value is never edited in place. Every edit returns a new terrain
/// with a bumped `revision`, so a caller can keep older revisions around for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    id: String,
    project_id: String,
    revision: u64,
    points: Vec<TerrainPoint>,
    resolution: u32,
    dimensions: Dimensions,
    material: MaterialType,
}

impl Terrain {
    pub fn flat(
        id: impl Into<String>,
        project_id: impl Into<String>,
        resolution: u32,
        dimensions: Dimensions,
        material: MaterialType,
    ) -> Result<Self> {
        let count = (resolution as usize).pow(2);
        Self::from_heights(id, project_id, resolution, dimensions, material, vec![0.0; count])
    }

    // Build a terrain from row-major elevations, one per grid point.
    pub fn from_heights(
        id: impl Into<String>,
        project_id: impl Into<String>,
        resolution: u32,
        dimensions: Dimensions,
        material: MaterialType,
        heights: Vec<f32>,
    ) -> Result<Self> {
        check_layout(resolution, dimensions)?;
        let expected = (resolution as usize).pow(2);
        if heights.len() != expected {
            return Err(LayoutError::InvalidTerrain(format!(
                "expected {expected} heights for resolution {resolution}, got {}",
                heights.len()
            )));
        }

        Ok(Self {
            id: id.into(),
            project_id: project_id.into(),
            revision: 0,
            points: grid_points(resolution, dimensions, |i| heights[i]),
            resolution,
            dimensions,
            material,
        })
    }

    // Restore a stored revision number.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn points(&self) -> &[TerrainPoint] {
        &self.points
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn material(&self) -> MaterialType {
        self.material
    }

    // Row-major elevations, the layout the document store keeps.
    pub fn heights(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Checks the invariants the placement pipeline relies on: positive finite
    /// dimensions, `resolution >= 1` and `len(points) == resolution²`.
    pub fn validate(&self) -> Result<()> {
        check_layout(self.resolution, self.dimensions)?;
        let expected = (self.resolution as usize).pow(2);
        if self.points.len() != expected {
            return Err(LayoutError::InvalidTerrain(format!(
                "{} points for resolution {} (expected {expected})",
                self.points.len(),
                self.resolution
            )));
        }
        Ok(())
    }

    // Size of one grid cell along x and z.
    pub fn cell_size(&self) -> (f32, f32) {
        let cells = self.resolution.saturating_sub(1).max(1) as f32;
        (
            self.dimensions.width / cells,
            self.dimensions.depth / cells,
        )
    }

    // Clamp a world point into the terrain extent.
    pub fn clamp(&self, x: f32, z: f32) -> (f32, f32) {
        let clamp_axis = |v: f32, max: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, max) };
        (
            clamp_axis(x, self.dimensions.width),
            clamp_axis(z, self.dimensions.depth),
        )
    }

    /// Bilinear elevation at world `(x, z)`.
    ///
    /// Points outside the terrain are clamped to the nearest in-bounds point,
    /// since drag input routinely overshoots the edge. Only a terrain without
    /// extent fails. One cell lookup, no scan.
    pub fn sample_elevation(&self, x: f32, z: f32) -> Result<f32> {
        if !self.dimensions.is_valid() {
            return Err(LayoutError::OutOfBounds { x, z });
        }
        if self.resolution <= 1 {
            return self
                .points
                .first()
                .map(|p| p.y)
                .ok_or_else(|| LayoutError::InvalidTerrain("terrain has no points".into()));
        }

        let (x, z) = self.clamp(x, z);
        let (cell_w, cell_d) = self.cell_size();
        let last = (self.resolution - 2) as usize;
        let col = ((x / cell_w).floor() as usize).min(last);
        let row = ((z / cell_d).floor() as usize).min(last);

        let tx = ((x - col as f32 * cell_w) / cell_w).clamp(0.0, 1.0);
        let tz = ((z - row as f32 * cell_d) / cell_d).clamp(0.0, 1.0);

        let a = self.height_at(row, col)?;
        let b = self.height_at(row, col + 1)?;
        let c = self.height_at(row + 1, col)?;
        let d = self.height_at(row + 1, col + 1)?;

        let ab = a * (1.0 - tx) + b * tx;
        let cd = c * (1.0 - tx) + d * tx;
        Ok(ab * (1.0 - tz) + cd * tz)
    }

    fn height_at(&self, row: usize, col: usize) -> Result<f32> {
        let res = self.resolution as usize;
        self.points
            .get(row * res + col)
            .map(|p| p.y)
            .ok_or_else(|| {
                LayoutError::InvalidTerrain(format!(
                    "grid point ({row}, {col}) missing, {} points for resolution {res}",
                    self.points.len()
                ))
            })
    }

    /// Merge `patch` into a new terrain revision; `self` is left untouched.
    ///
    /// A resolution change regenerates every point by bilinear sampling of the
    /// current surface at the same relative position, so grid points shared by
    /// both grids keep their exact elevation. A dimension change alone keeps
    /// elevations by index and only moves the points.
    pub fn apply_partial_update(&self, patch: &TerrainPatch) -> Result<Terrain> {
        let resolution = patch.resolution.unwrap_or(self.resolution);
        let dimensions = patch.dimensions.unwrap_or(self.dimensions);
        check_layout(resolution, dimensions)?;
        self.validate()?;

        let points = if resolution != self.resolution {
            let old = self.dimensions;
            let span = resolution.saturating_sub(1).max(1) as f32;
            let res = resolution as usize;
            let mut heights = Vec::with_capacity(res * res);
            for row in 0..res {
                for col in 0..res {
                    let u = col as f32 / span;
                    let v = row as f32 / span;
                    heights.push(self.sample_elevation(u * old.width, v * old.depth)?);
                }
            }
            grid_points(resolution, dimensions, |i| heights[i])
        } else if dimensions != self.dimensions {
            grid_points(resolution, dimensions, |i| self.points[i].y)
        } else {
            self.points.clone()
        };

        let next = Terrain {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            revision: self.revision + 1,
            points,
            resolution,
            dimensions,
            material: patch.material.unwrap_or(self.material),
        };
        log::debug!(
            "terrain {} revision {} -> {} (resolution {}, {}x{}, {})",
            next.id,
            self.revision,
            next.revision,
            next.resolution,
            next.dimensions.width,
            next.dimensions.depth,
            next.material.label()
        );
        Ok(next)
    }

    // New revision with the stroke applied; a non-positive radius changes nothing.
    pub fn sculpt(&self, stroke: &SculptStroke) -> Terrain {
        let mut next = self.clone();
        next.revision += 1;
        if stroke.radius <= 0.0 || !stroke.radius.is_finite() {
            return next;
        }

        let (cx, cz) = stroke.center;
        next.points = self
            .points
            .iter()
            .map(|p| {
                let dist = ((p.x - cx).powi(2) + (p.z - cz).powi(2)).sqrt();
                if dist >= stroke.radius {
                    return *p;
                }
                let t = 1.0 - dist / stroke.radius;
                let falloff = t * t * (3.0 - 2.0 * t);
                TerrainPoint {
                    y: p.y + stroke.strength * falloff,
                    ..*p
                }
            })
            .collect();
        next
    }

    // Does the axis-aligned rectangle share any area with the terrain extent?
    pub fn overlaps_rect(&self, min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> bool {
        min_x < self.dimensions.width && max_x > 0.0 && min_z < self.dimensions.depth && max_z > 0.0
    }
}

fn check_layout(resolution: u32, dimensions: Dimensions) -> Result<()> {
    if resolution == 0 {
        return Err(LayoutError::InvalidTerrain("resolution must be at least 1".into()));
    }
    if !dimensions.is_valid() {
        return Err(LayoutError::InvalidTerrain(format!(
            "dimensions must be positive, got {}x{}",
            dimensions.width, dimensions.depth
        )));
    }
    Ok(())
}

fn grid_points(
    resolution: u32,
    dimensions: Dimensions,
    height: impl Fn(usize) -> f32,
) -> Vec<TerrainPoint> {
    let res = resolution as usize;
    let span = resolution.saturating_sub(1).max(1) as f32;
    let mut points = Vec::with_capacity(res * res);
    for row in 0..res {
        for col in 0..res {
            points.push(TerrainPoint {
                x: col as f32 * dimensions.width / span,
                y: height(row * res + col),
                z: row as f32 * dimensions.depth / span,
            });
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::{Dimensions, MaterialType, SculptStroke, Terrain, TerrainPatch};
    use crate::error::LayoutError;

    const EPS: f32 = 1e-4;

    // 10x10 grid over 50x50 with a tilted, bumpy surface.
    fn bumpy() -> Terrain {
        let res = 10;
        let heights = (0..res * res)
            .map(|i| {
                let (row, col) = (i / res, i % res);
                (row as f32 * 0.7).sin() + col as f32 * 0.3
            })
            .collect();
        Terrain::from_heights("t", "p", res as u32, Dimensions::new(50.0, 50.0), MaterialType::Grass, heights)
            .unwrap()
    }

    // y = 0.1x + 0.2z, which bilinear interpolation reproduces exactly.
    fn plane(res: u32) -> Terrain {
        let flat = Terrain::flat("t", "p", res, Dimensions::new(50.0, 40.0), MaterialType::Soil).unwrap();
        let heights = flat.points().iter().map(|p| 0.1 * p.x + 0.2 * p.z).collect();
        Terrain::from_heights("t", "p", res, Dimensions::new(50.0, 40.0), MaterialType::Soil, heights).unwrap()
    }

    #[test]
    fn terrain_layout_is_row_major() {
        let t = plane(10);
        assert_eq!(t.points().len(), 100);
        let p = t.points()[2 * 10 + 3];
        let (cw, cd) = t.cell_size();
        assert!((p.x - 3.0 * cw).abs() < EPS);
        assert!((p.z - 2.0 * cd).abs() < EPS);
        let last = t.points()[99];
        assert!((last.x - 50.0).abs() < EPS && (last.z - 40.0).abs() < EPS);
    }

    #[test]
    fn terrain_rejects_bad_heights_len() {
        let err = Terrain::from_heights("t", "p", 4, Dimensions::new(1.0, 1.0), MaterialType::Soil, vec![0.0; 15])
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidTerrain(_)));
    }

    #[test]
    fn terrain_sample_hits_grid_points() {
        let t = bumpy();
        for p in t.points() {
            let y = t.sample_elevation(p.x, p.z).unwrap();
            assert!((y - p.y).abs() < EPS, "({}, {}) sampled {y}, stored {}", p.x, p.z, p.y);
        }
    }

    #[test]
    fn terrain_sample_continuous_across_cells() {
        let t = bumpy();
        let (cw, cd) = t.cell_size();
        for k in 1..9 {
            let edge = k as f32 * cw;
            for z in [3.3f32, 17.1, 41.9] {
                let left = t.sample_elevation(edge - 1e-3, z).unwrap();
                let right = t.sample_elevation(edge + 1e-3, z).unwrap();
                assert!((left - right).abs() < 1e-2, "jump at x={edge}: {left} vs {right}");
            }
            let edge = k as f32 * cd;
            let below = t.sample_elevation(12.5, edge - 1e-3).unwrap();
            let above = t.sample_elevation(12.5, edge + 1e-3).unwrap();
            assert!((below - above).abs() < 1e-2, "jump at z={edge}");
        }
    }

    #[test]
    fn terrain_sample_clamps_outside() {
        let t = bumpy();
        let cases = [
            ((-5.0, 10.0), (0.0, 10.0)),
            ((70.0, 10.0), (50.0, 10.0)),
            ((20.0, -1.0), (20.0, 0.0)),
            ((80.0, 99.0), (50.0, 50.0)),
        ];
        for ((x, z), (cx, cz)) in cases {
            let outside = t.sample_elevation(x, z).unwrap();
            let inside = t.sample_elevation(cx, cz).unwrap();
            assert!((outside - inside).abs() < EPS);
        }
    }

    #[test]
    fn terrain_sample_fails_without_extent() {
        let mut t = bumpy();
        t.dimensions = Dimensions::new(0.0, 50.0);
        assert!(matches!(
            t.sample_elevation(1.0, 1.0),
            Err(LayoutError::OutOfBounds { .. })
        ));
        assert!(t.validate().is_err());
    }

    #[test]
    fn terrain_single_point_grid() {
        let t = Terrain::from_heights("t", "p", 1, Dimensions::new(5.0, 5.0), MaterialType::Soil, vec![2.5]).unwrap();
        assert_eq!(t.sample_elevation(4.0, 1.0).unwrap(), 2.5);
    }

    #[test]
    fn terrain_resolution_change_preserves_shape() {
        let before = plane(10);
        let after = before
            .apply_partial_update(&TerrainPatch {
                resolution: Some(20),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(after.points().len(), 400);
        assert_eq!(after.resolution(), 20);
        assert_eq!(before.points().len(), 100);
        assert_eq!(after.revision(), before.revision() + 1);

        for (x, z) in [(0.0, 0.0), (3.2, 4.8), (25.0, 12.5), (49.0, 39.0), (50.0, 40.0)] {
            let a = before.sample_elevation(x, z).unwrap();
            let b = after.sample_elevation(x, z).unwrap();
            assert!((a - b).abs() < 1e-3, "({x}, {z}): {a} vs {b}");
        }
    }

    #[test]
    fn terrain_resolution_change_keeps_shared_points() {
        let before = bumpy();
        // 10 -> 19 puts every old grid line on a new one
        let after = before
            .apply_partial_update(&TerrainPatch {
                resolution: Some(19),
                ..Default::default()
            })
            .unwrap();
        for p in before.points() {
            let y = after.sample_elevation(p.x, p.z).unwrap();
            assert!((y - p.y).abs() < EPS);
        }
    }

    #[test]
    fn terrain_dimension_change_moves_points() {
        let before = bumpy();
        let after = before
            .apply_partial_update(&TerrainPatch {
                dimensions: Some(Dimensions::new(100.0, 25.0)),
                material: Some(MaterialType::Pavement),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(after.heights(), before.heights());
        assert_eq!(after.material(), MaterialType::Pavement);
        let last = after.points().last().unwrap();
        assert!((last.x - 100.0).abs() < EPS && (last.z - 25.0).abs() < EPS);
    }

    #[test]
    fn terrain_patch_rejects_degenerate_values() {
        let t = bumpy();
        let zero_res = TerrainPatch {
            resolution: Some(0),
            ..Default::default()
        };
        assert!(t.apply_partial_update(&zero_res).is_err());
        let flat_dims = TerrainPatch {
            dimensions: Some(Dimensions::new(10.0, -1.0)),
            ..Default::default()
        };
        assert!(t.apply_partial_update(&flat_dims).is_err());
    }

    #[test]
    fn terrain_sculpt_is_local() {
        let t = Terrain::flat("t", "p", 11, Dimensions::new(10.0, 10.0), MaterialType::Soil).unwrap();
        let raised = t.sculpt(&SculptStroke {
            center: (5.0, 5.0),
            radius: 2.0,
            strength: 1.0,
        });
        assert!((raised.sample_elevation(5.0, 5.0).unwrap() - 1.0).abs() < EPS);
        assert_eq!(raised.sample_elevation(0.0, 0.0).unwrap(), 0.0);
        // the original revision is untouched
        assert_eq!(t.sample_elevation(5.0, 5.0).unwrap(), 0.0);
        assert_eq!(raised.revision(), 1);
    }
}

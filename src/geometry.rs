use std::collections::HashSet;

use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::Serialize;

use crate::gpx_types::TrackSegment;
use crate::projection::Projection;

/// A track point in the local frame, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Projected points of one non-empty track segment, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointChain {
    pub points: Vec<ProjectedPoint>,
}

/// Project every non-empty segment into a chain.
///
/// z is the elevation when `use_elevation` is set and the point has one,
/// 0 otherwise.
pub fn project_segments(
    segments: &[TrackSegment],
    projection: &dyn Projection,
    use_elevation: bool,
) -> Vec<PointChain> {
    segments
        .iter()
        .filter(|s| !s.points.is_empty())
        .map(|seg| PointChain {
            points: seg
                .points
                .iter()
                .map(|pt| {
                    let (x, y) = projection.from_geographic(pt.lat, pt.lon);
                    let z = if use_elevation { pt.ele.unwrap_or(0.0) } else { 0.0 };
                    ProjectedPoint::new(x, y, z)
                })
                .collect(),
        })
        .collect()
}

/// Assembled output of an import.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Mesh(EdgeMesh),
    Curve(CurveSet),
}

/// Vertices joined by edges, one polyline per chain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EdgeMesh {
    pub vertices: Vec<ProjectedPoint>,
    pub edges: Vec<[usize; 2]>,
}

impl EdgeMesh {
    /// Edges connect consecutive points of a chain only, never two chains.
    pub fn from_chains(chains: &[PointChain]) -> Self {
        let mut mesh = EdgeMesh::default();
        for chain in chains {
            let first = mesh.vertices.len();
            mesh.vertices.extend_from_slice(&chain.points);
            mesh.edges
                .extend((first + 1..mesh.vertices.len()).map(|i| [i - 1, i]));
        }
        mesh
    }

    /// Weld vertices closer than `tolerance`, remapping edges and dropping
    /// the ones that collapse or repeat. Returns the number of removed vertices.
    pub fn merge_by_distance(&mut self, tolerance: f64) -> usize {
        if tolerance <= 0.0 || self.vertices.is_empty() {
            return 0;
        }

        // kept vertices, tagged with their index in `merged`
        let mut tree: RTree<GeomWithData<[f64; 3], usize>> = RTree::new();
        let mut merged: Vec<ProjectedPoint> = Vec::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());
        let max_distance_2 = tolerance * tolerance;

        for vertex in &self.vertices {
            let position = vertex.position();
            let found = tree
                .locate_within_distance(position, max_distance_2)
                .map(|kept| kept.data)
                .min();
            let index = match found {
                Some(index) => index,
                None => {
                    merged.push(*vertex);
                    tree.insert(GeomWithData::new(position, merged.len() - 1));
                    merged.len() - 1
                }
            };
            remap.push(index);
        }

        let removed = self.vertices.len() - merged.len();
        let mut seen = HashSet::new();
        self.edges = self
            .edges
            .iter()
            .map(|&[a, b]| [remap[a], remap[b]])
            .filter(|&[a, b]| a != b && seen.insert((a.min(b), a.max(b))))
            .collect();
        self.vertices = merged;
        removed
    }
}

/// Flat cross-section extruded along imported curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BevelProfile {
    pub name: String,
    /// Profile polyline in the curve's normal plane.
    pub points: Vec<[f64; 2]>,
    pub hidden: bool,
    pub selectable: bool,
}

impl BevelProfile {
    pub const NAME: &'static str = "gpx_bevel";

    /// A horizontal segment of `width`, giving curves a ribbon look.
    pub fn ribbon(width: f64) -> Self {
        let half = width / 2.0;
        Self {
            name: Self::NAME.to_string(),
            points: vec![[-half, 0.0], [half, 0.0]],
            hidden: true,
            selectable: false,
        }
    }
}

/// One poly spline, one control point per track point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spline {
    pub points: Vec<ProjectedPoint>,
}

/// Curve splines sharing one bevel profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveSet {
    pub splines: Vec<Spline>,
    pub bevel_profile: BevelProfile,
}

impl CurveSet {
    pub fn from_chains(chains: &[PointChain], bevel_profile: BevelProfile) -> Self {
        Self {
            splines: chains
                .iter()
                .map(|c| Spline {
                    points: c.points.clone(),
                })
                .collect(),
            bevel_profile,
        }
    }
}

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::geometry::{PointChain, ProjectedPoint};
use crate::importer::Import;

/// Render the projected chains of an import as GeoJSON in local coordinates.
///
/// Each chain becomes a `LineString` (a `Point` if it has a single point)
/// with `[x, y, z]` positions and a `chain` index property. The origin is
/// attached to the collection as `originLat` / `originLon`.
pub fn to_feature_collection(import: &Import) -> FeatureCollection {
    let features = import
        .chains
        .iter()
        .enumerate()
        .map(|(index, chain)| chain_to_feature(index, chain))
        .collect();

    let foreign_members = import.origin.map(|origin| {
        let mut members = Map::new();
        members.insert("originLat".to_string(), json_number(origin.lat));
        members.insert("originLon".to_string(), json_number(origin.lon));
        members
    });

    FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

fn chain_to_feature(index: usize, chain: &PointChain) -> Feature {
    let value = match chain.points.as_slice() {
        [single] => Value::Point(position(single)),
        points => Value::LineString(points.iter().map(position).collect()),
    };

    let mut props = Map::new();
    props.insert("chain".to_string(), JsonValue::Number(index.into()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn position(p: &ProjectedPoint) -> Vec<f64> {
    vec![p.x, p.y, p.z]
}

fn json_number(v: f64) -> JsonValue {
    JsonValue::Number(serde_json::Number::from_f64(v).unwrap_or(0.into()))
}

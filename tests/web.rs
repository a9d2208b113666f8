#![cfg(target_arch = "wasm32")]

use gpx2mesh_wasm::GpxImporter;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const GPX: &str = r#"<gpx><trk><trkseg>
<trkpt lat="40.0" lon="-105.0"><ele>1600</ele></trkpt>
<trkpt lat="40.0005" lon="-105.0"><ele>1605</ele></trkpt>
</trkseg></trk></gpx>"#;

#[wasm_bindgen_test]
fn import_json_string() {
    let mut importer = GpxImporter::new();
    let json = importer
        .import_gpx_string("scene", GPX, JsValue::UNDEFINED)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["originState"], "fresh");
    assert_eq!(value["geometry"]["type"], "mesh");
    assert_eq!(value["geometry"]["vertices"].as_array().unwrap().len(), 2);
    assert_eq!(value["geometry"]["edges"].as_array().unwrap().len(), 1);
}

#[wasm_bindgen_test]
fn origin_kept_between_calls() {
    let mut importer = GpxImporter::new();
    assert!(importer.origin("scene").unwrap().is_undefined());
    importer.import_gpx("scene", GPX, JsValue::NULL).unwrap();
    assert!(!importer.origin("scene").unwrap().is_undefined());

    let json = importer
        .import_gpx_string("scene", GPX, JsValue::NULL)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["originState"], "reused");
}

#[wasm_bindgen_test]
fn malformed_input_rejected() {
    let mut importer = GpxImporter::new();
    let bad = r#"<gpx><trk><trkseg><trkpt lat="1"/></trkseg></trk></gpx>"#;
    assert!(importer.to_geojson("scene", bad, JsValue::NULL).is_err());
    assert!(importer.origin("scene").unwrap().is_undefined());
}

pub mod converter;
pub mod error;
pub mod geometry;
pub mod georef;
pub mod gpx_types;
pub mod importer;
pub mod options;
pub mod parser;
pub mod projection;

use wasm_bindgen::prelude::*;

use crate::georef::{GeoreferenceStore, MemoryStore};
use crate::importer::{Import, Importer};
use crate::options::ImportOptions;

/// GPX importer for JavaScript hosts. Georeferencing and bevel profiles are
/// kept per destination for the lifetime of the object.
#[wasm_bindgen]
#[derive(Default)]
pub struct GpxImporter {
    store: MemoryStore,
}

#[wasm_bindgen]
impl GpxImporter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GpxImporter {
        console_error_panic_hook::set_once();
        GpxImporter::default()
    }

    /// Import a GPX string into `destination`, returned as a JS object.
    #[wasm_bindgen(js_name = importGpx)]
    pub fn import_gpx(
        &mut self,
        destination: &str,
        gpx_string: &str,
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let import = self.run(destination, gpx_string, options)?;
        serde_wasm_bindgen::to_value(&import).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Import a GPX string into `destination`, returned as a JSON string.
    #[wasm_bindgen(js_name = importGpxString)]
    pub fn import_gpx_string(
        &mut self,
        destination: &str,
        gpx_string: &str,
        options: JsValue,
    ) -> Result<String, JsValue> {
        let import = self.run(destination, gpx_string, options)?;
        serde_json::to_string(&import).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Import a GPX string into `destination`, returned as a GeoJSON string
    /// in local coordinates.
    #[wasm_bindgen(js_name = toGeoJson)]
    pub fn to_geojson(
        &mut self,
        destination: &str,
        gpx_string: &str,
        options: JsValue,
    ) -> Result<String, JsValue> {
        let import = self.run(destination, gpx_string, options)?;
        let fc = converter::to_feature_collection(&import);
        serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stored origin of `destination` as `{ lat, lon }`, or undefined.
    pub fn origin(&self, destination: &str) -> Result<JsValue, JsValue> {
        match self.store.origin(destination) {
            Some(origin) => {
                serde_wasm_bindgen::to_value(&origin).map_err(|e| JsValue::from_str(&e.to_string()))
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl GpxImporter {
    fn run(
        &mut self,
        destination: &str,
        gpx_string: &str,
        options: JsValue,
    ) -> Result<Import, JsValue> {
        let opts = parse_options(options)?;
        let import = Importer::new(opts).import_str(gpx_string, destination, &mut self.store)?;
        Ok(import)
    }
}

fn parse_options(options: JsValue) -> Result<ImportOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ImportOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

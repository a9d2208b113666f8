use thiserror::Error;
use wasm_bindgen::JsValue;

/// Fatal import failures. Any of these aborts the import before the
/// georeferencing store is touched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read GPX file: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Unexpected end of document inside <{element}>")]
    UnexpectedEof { element: &'static str },

    #[error("Invalid elevation '{0}' in <ele>")]
    InvalidElevation(String),

    #[error("Coordinate out of range: lat={lat}, lon={lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

impl ImportError {
    /// True for every error caused by the document content rather than I/O.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

impl From<quick_xml::events::attributes::AttrError> for ImportError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.into())
    }
}

impl From<ImportError> for JsValue {
    fn from(e: ImportError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Non-fatal conditions reported alongside an import result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportWarning {
    /// The document held no track points; no geometry was produced.
    EmptyTrack,
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTrack => write!(f, "GPX file contains no track points"),
        }
    }
}

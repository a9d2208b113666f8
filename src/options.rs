use serde::Deserialize;

/// Options for a single GPX import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Recompute the projection origin even if the destination already has one (default: false)
    #[serde(default)]
    pub ignore_georeferencing: bool,

    /// Use `<ele>` for the z-coordinate, otherwise the track is flat (default: true)
    #[serde(default = "default_true")]
    pub use_elevation: bool,

    /// Output representation (default: mesh)
    #[serde(default)]
    pub import_type: ImportType,

    /// Vertices closer than this are welded in mesh mode (default: 0.0001)
    #[serde(default = "default_merge_distance")]
    pub merge_distance: f64,

    /// Width of the ribbon cross-section used by curves (default: 1.0)
    #[serde(default = "default_bevel_width")]
    pub bevel_width: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            ignore_georeferencing: false,
            use_elevation: true,
            import_type: ImportType::default(),
            merge_distance: default_merge_distance(),
            bevel_width: default_bevel_width(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    #[default]
    Mesh,
    Curve,
}

fn default_true() -> bool {
    true
}

fn default_merge_distance() -> f64 {
    0.0001
}

fn default_bevel_width() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let opts: ImportOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.ignore_georeferencing);
        assert!(opts.use_elevation);
        assert_eq!(opts.import_type, ImportType::Mesh);
        assert!((opts.merge_distance - 0.0001).abs() < 1e-12);
        assert!((opts.bevel_width - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_camel_case_fields() {
        let opts: ImportOptions = serde_json::from_str(
            r#"{"ignoreGeoreferencing": true, "useElevation": false, "importType": "curve"}"#,
        )
        .unwrap();
        assert!(opts.ignore_georeferencing);
        assert!(!opts.use_elevation);
        assert_eq!(opts.import_type, ImportType::Curve);
    }
}

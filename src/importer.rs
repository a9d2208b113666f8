use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::error::{ImportError, ImportWarning};
use crate::geometry::{CurveSet, EdgeMesh, Geometry, PointChain, project_segments};
use crate::georef::{GeoreferenceStore, OriginState, resolve_origin, shared_bevel_profile};
use crate::gpx_types::ParsedGpx;
use crate::options::{ImportOptions, ImportType};
use crate::parser::{parse_gpx, read_gpx_file};
use crate::projection::{ProjectionOrigin, ProjectionProvider, select_projection};

/// Result of one import. `geometry` is `None` when nothing was produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub origin: Option<ProjectionOrigin>,
    pub origin_state: Option<OriginState>,
    /// Also carried by `geometry`, so it is left out of serialized output.
    #[serde(skip)]
    pub chains: Vec<PointChain>,
    pub geometry: Option<Geometry>,
    pub warnings: Vec<ImportWarning>,
}

impl Import {
    fn empty() -> Self {
        Self {
            origin: None,
            origin_state: None,
            chains: Vec::new(),
            geometry: None,
            warnings: vec![ImportWarning::EmptyTrack],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Runs parse, origin resolution, projection and assembly for one GPX document.
pub struct Importer<'p> {
    options: ImportOptions,
    provider: Option<&'p dyn ProjectionProvider>,
}

impl<'p> Importer<'p> {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            provider: None,
        }
    }

    /// Consult `provider` for the projection before falling back to transverse Mercator.
    pub fn with_provider(mut self, provider: &'p dyn ProjectionProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn import_file(
        &self,
        path: impl AsRef<Path>,
        destination: &str,
        store: &mut dyn GeoreferenceStore,
    ) -> Result<Import, ImportError> {
        let parsed = read_gpx_file(path, self.options.use_elevation)?;
        Ok(self.assemble(parsed, destination, store))
    }

    pub fn import_str(
        &self,
        xml: &str,
        destination: &str,
        store: &mut dyn GeoreferenceStore,
    ) -> Result<Import, ImportError> {
        let parsed = parse_gpx(xml, self.options.use_elevation)?;
        Ok(self.assemble(parsed, destination, store))
    }

    fn assemble(
        &self,
        parsed: ParsedGpx,
        destination: &str,
        store: &mut dyn GeoreferenceStore,
    ) -> Import {
        let Some(center) = parsed.center() else {
            warn!("no track points found, nothing imported into '{destination}'");
            return Import::empty();
        };

        let (origin, origin_state) = resolve_origin(
            store,
            destination,
            center,
            self.options.ignore_georeferencing,
        );
        let projection = select_projection(origin, self.provider);
        let chains = project_segments(&parsed.segments, projection.as_ref(), self.options.use_elevation);

        let geometry = match self.options.import_type {
            ImportType::Mesh => {
                let mut mesh = EdgeMesh::from_chains(&chains);
                let removed = mesh.merge_by_distance(self.options.merge_distance);
                info!(
                    "mesh: {} vertices, {} edges ({removed} merged)",
                    mesh.vertices.len(),
                    mesh.edges.len()
                );
                Geometry::Mesh(mesh)
            }
            ImportType::Curve => {
                let profile = shared_bevel_profile(store, destination, self.options.bevel_width);
                let curves = CurveSet::from_chains(&chains, profile);
                info!("curves: {} splines", curves.splines.len());
                Geometry::Curve(curves)
            }
        };

        Import {
            origin: Some(origin),
            origin_state: Some(origin_state),
            chains,
            geometry: Some(geometry),
            warnings: Vec::new(),
        }
    }
}

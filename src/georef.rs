//! Per-destination georeferencing state.
//!
//! A destination (one working document or scene) keeps the projection origin
//! of its first import so later tracks land in the same local frame, and the
//! bevel profile shared by its curves. The host injects the storage through
//! [`GeoreferenceStore`]; [`MemoryStore`] keeps everything in a map.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;

use crate::geometry::BevelProfile;
use crate::projection::ProjectionOrigin;

/// Key/value slots attached to a destination.
pub trait GeoreferenceStore {
    fn origin(&self, destination: &str) -> Option<ProjectionOrigin>;

    fn set_origin(&mut self, destination: &str, origin: ProjectionOrigin);

    fn bevel_profile(&self, destination: &str) -> Option<BevelProfile>;

    fn set_bevel_profile(&mut self, destination: &str, profile: BevelProfile);
}

#[derive(Debug, Default, Clone)]
struct DestinationState {
    origin: Option<ProjectionOrigin>,
    bevel_profile: Option<BevelProfile>,
}

/// In-memory [`GeoreferenceStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    destinations: HashMap<String, DestinationState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, destination: &str) -> &mut DestinationState {
        self.destinations.entry(destination.to_string()).or_default()
    }
}

impl GeoreferenceStore for MemoryStore {
    fn origin(&self, destination: &str) -> Option<ProjectionOrigin> {
        self.destinations.get(destination).and_then(|s| s.origin)
    }

    fn set_origin(&mut self, destination: &str, origin: ProjectionOrigin) {
        self.entry(destination).origin = Some(origin);
    }

    fn bevel_profile(&self, destination: &str) -> Option<BevelProfile> {
        self.destinations
            .get(destination)
            .and_then(|s| s.bevel_profile.clone())
    }

    fn set_bevel_profile(&mut self, destination: &str, profile: BevelProfile) {
        self.entry(destination).bevel_profile = Some(profile);
    }
}

/// Where the origin of an import came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginState {
    /// Computed from the track's bounding box and stored for the destination.
    Fresh,
    /// Loaded from the destination's stored georeferencing.
    Reused,
}

/// Choose the projection origin for an import into `destination`.
///
/// A stored origin wins unless `ignore_stored` is set. Otherwise `center`
/// becomes the origin and is written back to the store.
pub fn resolve_origin(
    store: &mut dyn GeoreferenceStore,
    destination: &str,
    center: (f64, f64),
    ignore_stored: bool,
) -> (ProjectionOrigin, OriginState) {
    if !ignore_stored {
        if let Some(origin) = store.origin(destination) {
            debug!(
                "reusing origin ({}, {}) of '{destination}', track center ({}, {}) discarded",
                origin.lat, origin.lon, center.0, center.1
            );
            return (origin, OriginState::Reused);
        }
    }

    let origin = ProjectionOrigin::new(center.0, center.1);
    store.set_origin(destination, origin);
    info!(
        "georeferenced '{destination}' at ({}, {})",
        origin.lat, origin.lon
    );
    (origin, OriginState::Fresh)
}

/// The destination's bevel profile, created with `width` on first use.
pub fn shared_bevel_profile(
    store: &mut dyn GeoreferenceStore,
    destination: &str,
    width: f64,
) -> BevelProfile {
    if let Some(profile) = store.bevel_profile(destination) {
        return profile;
    }
    let profile = BevelProfile::ribbon(width);
    store.set_bevel_profile(destination, profile.clone());
    debug!("created bevel profile for '{destination}'");
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_then_reused() {
        let mut store = MemoryStore::new();
        let (first, state) = resolve_origin(&mut store, "scene", (40.0, -105.0), false);
        assert_eq!(state, OriginState::Fresh);
        assert_eq!(store.origin("scene"), Some(first));

        let (second, state) = resolve_origin(&mut store, "scene", (10.0, 10.0), false);
        assert_eq!(state, OriginState::Reused);
        assert_eq!(second, first);
    }

    #[test]
    fn test_ignore_stored_overwrites() {
        let mut store = MemoryStore::new();
        resolve_origin(&mut store, "scene", (40.0, -105.0), false);
        let (origin, state) = resolve_origin(&mut store, "scene", (10.0, 20.0), true);
        assert_eq!(state, OriginState::Fresh);
        assert_eq!(origin, ProjectionOrigin::new(10.0, 20.0));
        assert_eq!(store.origin("scene"), Some(origin));
    }

    #[test]
    fn test_destinations_independent() {
        let mut store = MemoryStore::new();
        resolve_origin(&mut store, "a", (1.0, 2.0), false);
        let (origin, state) = resolve_origin(&mut store, "b", (3.0, 4.0), false);
        assert_eq!(state, OriginState::Fresh);
        assert_eq!(origin, ProjectionOrigin::new(3.0, 4.0));
        assert_eq!(store.origin("a"), Some(ProjectionOrigin::new(1.0, 2.0)));
    }

    #[test]
    fn test_bevel_profile_created_once() {
        let mut store = MemoryStore::new();
        assert!(store.bevel_profile("scene").is_none());
        let first = shared_bevel_profile(&mut store, "scene", 2.0);
        let second = shared_bevel_profile(&mut store, "scene", 5.0);
        assert_eq!(first, second);
        assert!(store.bevel_profile("other").is_none());
    }
}

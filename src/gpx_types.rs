/// Track segments of a GPX document, flattened across all `<trk>` elements.
#[derive(Debug, Default)]
pub struct ParsedGpx {
    pub segments: Vec<TrackSegment>,
    pub bounds: Option<BoundingBox>,
}

impl ParsedGpx {
    /// Default projection origin: the bounding-box midpoint, if any point was seen.
    pub fn center(&self) -> Option<(f64, f64)> {
        self.bounds.as_ref().map(BoundingBox::center)
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }

    /// Add a point to the last open segment and grow the bounds.
    pub(crate) fn push_point(&mut self, point: TrackPoint) {
        self.bounds
            .get_or_insert_with(BoundingBox::default)
            .extend(point.lat, point.lon);
        if let Some(segment) = self.segments.last_mut() {
            segment.points.push(point);
        }
    }
}

/// A single `<trkpt>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, ele: None }
    }
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Default)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

/// Running lat/lon extent of every point seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_lat: 90.0,
            max_lat: -90.0,
            min_lon: 180.0,
            max_lon: -180.0,
        }
    }
}

impl BoundingBox {
    pub fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point_bounds() {
        let mut bbox = BoundingBox::default();
        bbox.extend(40.0, -105.0);
        assert_eq!(bbox.min_lat, 40.0);
        assert_eq!(bbox.max_lat, 40.0);
        assert_eq!(bbox.min_lon, -105.0);
        assert_eq!(bbox.max_lon, -105.0);
        assert_eq!(bbox.center(), (40.0, -105.0));
    }

    #[test]
    fn test_decreasing_points_update_both_ends() {
        let mut bbox = BoundingBox::default();
        bbox.extend(41.0, -104.0);
        bbox.extend(40.0, -105.0);
        assert_eq!(bbox.max_lat, 41.0);
        assert_eq!(bbox.min_lat, 40.0);
        assert_eq!(bbox.center(), (40.5, -104.5));
    }

    #[test]
    fn test_no_points_no_center() {
        let parsed = ParsedGpx::default();
        assert!(parsed.center().is_none());
        assert_eq!(parsed.point_count(), 0);
    }
}

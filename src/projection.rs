//! Local planar projection of WGS84 coordinates.
//!
//! Imported tracks are placed in a metric frame tangent to the earth at a
//! [`ProjectionOrigin`]: x grows to the east, y to the north, and the origin
//! maps to `(0, 0)`. The default [`TransverseMercator`] uses the ellipsoidal
//! series expansion (meridional arc forward, footpoint latitude inverse),
//! which stays well below a metre of error within a few hundred kilometres of
//! the central meridian.

use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis in meters
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Latitude/longitude (degrees) that maps to the local `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOrigin {
    pub lat: f64,
    pub lon: f64,
}

impl ProjectionOrigin {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Forward/inverse conversion between geographic and local planar coordinates.
pub trait Projection {
    /// `(lat, lon)` in degrees to `(x, y)` in meters.
    fn from_geographic(&self, lat: f64, lon: f64) -> (f64, f64);

    /// `(x, y)` in meters to `(lat, lon)` in degrees.
    fn to_geographic(&self, x: f64, y: f64) -> (f64, f64);
}

/// Supplies an alternative projection for an origin.
///
/// Returning `None` falls back to [`TransverseMercator`].
pub trait ProjectionProvider {
    fn projection(&self, origin: ProjectionOrigin) -> Option<Box<dyn Projection>>;
}

/// Pick the projection for one import: the provider's if it has one,
/// transverse Mercator otherwise.
pub fn select_projection(
    origin: ProjectionOrigin,
    provider: Option<&dyn ProjectionProvider>,
) -> Box<dyn Projection> {
    provider
        .and_then(|p| p.projection(origin))
        .unwrap_or_else(|| Box::new(TransverseMercator::new(origin)))
}

/// Ellipsoidal transverse Mercator with scale factor 1 and no false
/// easting/northing, centered on the origin.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    lon0: f64,
    m0: f64,
    e2: f64,
    ep2: f64,
}

impl TransverseMercator {
    pub fn new(origin: ProjectionOrigin) -> Self {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        Self {
            lon0: origin.lon.to_radians(),
            m0: meridional_arc(origin.lat.to_radians(), e2),
            e2,
            ep2: e2 / (1.0 - e2),
        }
    }
}

impl Projection for TransverseMercator {
    fn from_geographic(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (e2, ep2) = (self.e2, self.ep2);
        let phi = lat.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = (lon.to_radians() - self.lon0) * cos_phi;
        let m = meridional_arc(phi, e2);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0);
        let y = m - self.m0
            + n * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0);
        (x, y)
    }

    fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let (e2, ep2) = (self.e2, self.ep2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let m = self.m0 + y;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let sqrt_1me2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        // footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = WGS84_A / w.sqrt();
        let r1 = WGS84_A * (1.0 - e2) / (w * w.sqrt());
        let d = x / n1;

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);
        let lambda = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                    / 120.0)
                / cos_phi1;

        (phi.to_degrees(), lambda.to_degrees())
    }
}

/// Distance along the meridian from the equator to latitude `phi` (radians).
fn meridional_arc(phi: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Roughly 1 cm in degrees of latitude.
    const ROUNDTRIP_TOLERANCE_DEG: f64 = 1e-7;

    fn boulder() -> TransverseMercator {
        TransverseMercator::new(ProjectionOrigin::new(40.0, -105.0))
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let (x, y) = boulder().from_geographic(40.0, -105.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_axes_point_east_and_north() {
        let tm = boulder();
        let (x, y) = tm.from_geographic(40.001, -105.0);
        assert!(x.abs() < 1e-6);
        // one millidegree of latitude is about 111 m at 40N
        assert!((y - 111.04).abs() < 0.5, "y = {y}");

        let (x, y) = tm.from_geographic(40.0, -104.999);
        assert!((x - 85.39).abs() < 0.5, "x = {x}");
        assert!(y > 0.0 && y < 0.01);
    }

    #[test]
    fn test_roundtrip_near_origin() {
        let tm = boulder();
        for &(lat, lon) in &[
            (40.0005, -105.0),
            (40.3, -104.6),
            (39.2, -106.1),
            (41.5, -103.2),
            (38.0, -107.0),
        ] {
            let (x, y) = tm.from_geographic(lat, lon);
            let (lat2, lon2) = tm.to_geographic(x, y);
            assert!((lat - lat2).abs() < ROUNDTRIP_TOLERANCE_DEG, "lat {lat} -> {lat2}");
            assert!((lon - lon2).abs() < ROUNDTRIP_TOLERANCE_DEG, "lon {lon} -> {lon2}");
        }
    }

    #[test]
    fn test_roundtrip_southern_hemisphere() {
        let tm = TransverseMercator::new(ProjectionOrigin::new(-33.86, 151.2));
        let (x, y) = tm.from_geographic(-34.5, 150.4);
        assert!(x < 0.0 && y < 0.0);
        let (lat, lon) = tm.to_geographic(x, y);
        assert!((lat + 34.5).abs() < ROUNDTRIP_TOLERANCE_DEG);
        assert!((lon - 150.4).abs() < ROUNDTRIP_TOLERANCE_DEG);
    }

    #[test]
    fn test_deterministic() {
        let tm = boulder();
        let a = tm.from_geographic(40.123456, -105.654321);
        let b = tm.from_geographic(40.123456, -105.654321);
        assert_eq!(a.0.to_bits(), b.0.to_bits());
        assert_eq!(a.1.to_bits(), b.1.to_bits());
    }

    struct Flat;

    impl Projection for Flat {
        fn from_geographic(&self, lat: f64, lon: f64) -> (f64, f64) {
            (lon, lat)
        }

        fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
            (y, x)
        }
    }

    struct FlatProvider;

    impl ProjectionProvider for FlatProvider {
        fn projection(&self, _origin: ProjectionOrigin) -> Option<Box<dyn Projection>> {
            Some(Box::new(Flat))
        }
    }

    struct NoProvider;

    impl ProjectionProvider for NoProvider {
        fn projection(&self, _origin: ProjectionOrigin) -> Option<Box<dyn Projection>> {
            None
        }
    }

    #[test]
    fn test_provider_takes_precedence() {
        let origin = ProjectionOrigin::new(40.0, -105.0);
        let projection = select_projection(origin, Some(&FlatProvider as &dyn ProjectionProvider));
        assert_eq!(projection.from_geographic(1.0, 2.0), (2.0, 1.0));
    }

    #[test]
    fn test_provider_fallback() {
        let origin = ProjectionOrigin::new(40.0, -105.0);
        let projection = select_projection(origin, Some(&NoProvider as &dyn ProjectionProvider));
        let (x, y) = projection.from_geographic(40.0, -105.0);
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }
}

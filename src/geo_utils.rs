//! # Geographic Utilities
//!
//! Geodesy primitives shared by the polyline, map-matcher and pipeline.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`cumulative_lengths`] | Running arc length at each point |
//! | [`planar_offset`] | Local equirectangular offset in meters |
//!
//! ## Example
//!
//! ```rust
//! use transit_tracker::{GpsPoint, geo_utils};
//!
//! let route = vec![
//!     GpsPoint::new(55.7558, 37.6173),
//!     GpsPoint::new(55.7568, 37.6173),
//!     GpsPoint::new(55.7578, 37.6183),
//! ];
//!
//! let cum = geo_utils::cumulative_lengths(&route);
//! assert_eq!(cum[0], 0.0);
//! assert!(cum[1] > 100.0 && cum[2] > cum[1]);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances are computed on a sphere of radius 6,371,000 m. `geo`'s own
//! `Haversine` uses the IUGG mean radius (6,371,008.8 m), so the formula is
//! evaluated here with [`EARTH_RADIUS_M`] to keep arc lengths reproducible.
//!
//! ### Local Planar Approximation
//!
//! Segment projection works in a tangent plane: longitude degrees are scaled
//! by `cos(lat) * 111,320` m and latitude degrees by `110,540` m. This is only
//! used to find the projection parameter; reported distances are always
//! great-circle distances.

use geo::Coord;

use crate::GpsPoint;

/// Spherical Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEG_LON_EQUATOR: f64 = 111_320.0;

/// Meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 110_540.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two GPS points in meters.
///
/// NaN coordinates propagate to a NaN distance.
///
/// # Example
///
/// ```rust
/// use transit_tracker::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_500.0).abs() < 1000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let phi1 = p1.latitude.to_radians();
    let phi2 = p2.latitude.to_radians();
    let dphi = (p2.latitude - p1.latitude).to_radians();
    let dlambda = (p2.longitude - p1.longitude).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Cumulative arc length at every point: `cum[0] == 0`, then the running sum
/// of consecutive haversine distances. Empty input yields an empty vector.
pub fn cumulative_lengths(points: &[GpsPoint]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(points.len());
    if points.is_empty() {
        return cum;
    }

    cum.push(0.0);
    for w in points.windows(2) {
        let prev = cum[cum.len() - 1];
        cum.push(prev + haversine_distance(&w[0], &w[1]));
    }
    cum
}

// =============================================================================
// Planar Approximation
// =============================================================================

/// Offset of `p` from `origin` in meters, in a tangent plane whose longitude
/// scale is taken at `reference_lat`.
///
/// `x` is east, `y` is north.
#[inline]
pub fn planar_offset(origin: &GpsPoint, p: &GpsPoint, reference_lat: f64) -> Coord<f64> {
    let kx = METERS_PER_DEG_LON_EQUATOR * reference_lat.to_radians().cos();
    Coord {
        x: (p.longitude - origin.longitude) * kx,
        y: (p.latitude - origin.latitude) * METERS_PER_DEG_LAT,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Haversine, Point};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(55.7558, 37.6173);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        // 1 degree of arc on a 6,371 km sphere
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(1.0, 0.0);
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!(approx_eq(haversine_distance(&a, &b), expected, 1e-6));
    }

    #[test]
    fn test_haversine_close_to_geo() {
        // geo uses a slightly larger radius; results agree to ~1.4 ppm
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let ours = haversine_distance(&london, &paris);
        let theirs = Haversine::distance(
            Point::new(london.longitude, london.latitude),
            Point::new(paris.longitude, paris.latitude),
        );
        assert!(((ours - theirs) / theirs).abs() < 1e-5);
    }

    #[test]
    fn test_haversine_nan_propagates() {
        let a = GpsPoint::new(f64::NAN, 0.0);
        let b = GpsPoint::new(1.0, 0.0);
        assert!(haversine_distance(&a, &b).is_nan());
    }

    #[test]
    fn test_cumulative_lengths() {
        let pts = vec![
            GpsPoint::new(0.0, 0.0),
            GpsPoint::new(0.001, 0.0),
            GpsPoint::new(0.001, 0.0),
            GpsPoint::new(0.002, 0.0),
        ];
        let cum = cumulative_lengths(&pts);
        assert_eq!(cum.len(), 4);
        assert_eq!(cum[0], 0.0);
        assert!(cum[1] > 100.0 && cum[1] < 120.0);
        assert_eq!(cum[1], cum[2]);
        assert!(cum.windows(2).all(|w| w[0] <= w[1]));
        assert!(cumulative_lengths(&[]).is_empty());
    }

    #[test]
    fn test_planar_offset_scales() {
        let origin = GpsPoint::new(0.0, 0.0);
        let p = GpsPoint::new(1.0, 1.0);
        let off = planar_offset(&origin, &p, 0.0);
        assert!(approx_eq(off.x, 111_320.0, 1e-6));
        assert!(approx_eq(off.y, 110_540.0, 1e-6));

        let off60 = planar_offset(&origin, &p, 60.0);
        assert!(approx_eq(off60.x, 55_660.0, 1e-3));
    }
}

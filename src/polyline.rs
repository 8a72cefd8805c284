//! # Route Polyline
//!
//! Immutable route geometry with cumulative arc length, plus the two
//! operations the tracker needs from it:
//!
//! - [`Polyline::nearest`]: map a GPS point to `(arc length, cross-track distance)`
//! - [`Polyline::interpolate`]: map an arc length back to a coordinate
//!
//! Nearest-point search is a linear scan over all segments. Route shapes are a
//! few hundred points at most, so no spatial index is kept.

use geo::Coord;

use crate::error::{Result, TrackerError};
use crate::geo_utils::{cumulative_lengths, haversine_distance, planar_offset};
use crate::GpsPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of a route shape table.
///
/// `shape_pt_sequence` is kept as raw text; it is coerced to an integer when
/// the polyline is built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeRow {
    pub shape_id: String,
    pub shape_pt_sequence: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
}

impl ShapeRow {
    pub fn new(shape_id: impl Into<String>, sequence: impl ToString, lat: f64, lon: f64) -> Self {
        Self {
            shape_id: shape_id.into(),
            shape_pt_sequence: sequence.to_string(),
            shape_pt_lat: lat,
            shape_pt_lon: lon,
        }
    }
}

/// Projection of a point onto a single segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Great-circle distance from the point to the projected point (meters)
    pub distance_m: f64,
    /// Position along the segment, clamped to [0, 1]
    pub t: f64,
    /// Projected coordinate
    pub point: GpsPoint,
}

/// Where a point lands on a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePosition {
    /// Arc length from the start of the route (meters)
    pub s_m: f64,
    /// Distance from the point to the route (meters). Infinite when the
    /// polyline has no segments.
    pub xtrack_m: f64,
    /// Index of the winning segment
    pub segment: Option<usize>,
    /// Fractional position within the winning segment
    pub t: f64,
}

/// Project `point` onto the segment `a`-`b`.
///
/// The projection parameter is found in a local plane scaled at the point's
/// latitude and clamped to the segment; the returned distance is the
/// haversine distance to the clamped projection. A zero-length segment
/// projects onto `a` with `t = 0`.
pub fn project_to_segment(point: &GpsPoint, a: &GpsPoint, b: &GpsPoint) -> SegmentProjection {
    let ap = planar_offset(a, point, point.latitude);
    let ab = planar_offset(a, b, point.latitude);
    let ab2 = ab.x * ab.x + ab.y * ab.y;

    if ab2 == 0.0 {
        return SegmentProjection {
            distance_m: haversine_distance(point, a),
            t: 0.0,
            point: *a,
        };
    }

    let t = ((ap.x * ab.x + ap.y * ab.y) / ab2).clamp(0.0, 1.0);
    let projected = lerp(a, b, t);

    SegmentProjection {
        distance_m: haversine_distance(point, &projected),
        t,
        point: projected,
    }
}

/// Linear interpolation in degree space.
fn lerp(a: &GpsPoint, b: &GpsPoint, t: f64) -> GpsPoint {
    let ca = Coord { x: a.longitude, y: a.latitude };
    let cb = Coord { x: b.longitude, y: b.latitude };
    let c = ca + (cb - ca) * t;
    GpsPoint::new(c.y, c.x)
}

/// Ordered route geometry with cumulative arc lengths.
///
/// Serializes as its point list; deserializing goes through [`Polyline::new`],
/// so arc lengths are always recomputed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<GpsPoint>", into = "Vec<GpsPoint>"))]
pub struct Polyline {
    points: Vec<GpsPoint>,
    cum: Vec<f64>,
}

impl Polyline {
    /// Build a polyline from ordered points.
    pub fn new(points: Vec<GpsPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(TrackerError::EmptyPolyline);
        }
        let cum = cumulative_lengths(&points);
        Ok(Self { points, cum })
    }

    /// Build the polyline for `shape_id` from a shape table.
    ///
    /// Rows are selected by string comparison of the shape id and ordered by
    /// the coerced sequence number. Equal sequence numbers keep table order.
    ///
    /// # Errors
    ///
    /// [`TrackerError::ShapeNotFound`] if no row carries `shape_id`, and
    /// [`TrackerError::InvalidSequence`] if a sequence value is not numeric.
    ///
    /// # Example
    ///
    /// ```rust
    /// use transit_tracker::{Polyline, ShapeRow};
    ///
    /// let rows = vec![
    ///     ShapeRow::new("A", 2, 55.7568, 37.6173),
    ///     ShapeRow::new("A", 1, 55.7558, 37.6173),
    ///     ShapeRow::new("B", 1, 10.0, 10.0),
    /// ];
    /// let line = Polyline::from_shape_rows(&rows, "A").unwrap();
    /// assert_eq!(line.len(), 2);
    /// assert_eq!(line.points()[0].latitude, 55.7558);
    /// ```
    pub fn from_shape_rows(rows: &[ShapeRow], shape_id: &str) -> Result<Self> {
        let mut selected: Vec<(i64, GpsPoint)> = Vec::new();
        for row in rows.iter().filter(|r| r.shape_id == shape_id) {
            let seq = parse_sequence(shape_id, &row.shape_pt_sequence)?;
            selected.push((seq, GpsPoint::new(row.shape_pt_lat, row.shape_pt_lon)));
        }

        if selected.is_empty() {
            return Err(TrackerError::ShapeNotFound {
                shape_id: shape_id.to_string(),
            });
        }

        selected.sort_by_key(|(seq, _)| *seq);
        Self::new(selected.into_iter().map(|(_, p)| p).collect())
    }

    pub fn points(&self) -> &[GpsPoint] {
        &self.points
    }

    /// Cumulative arc length at each point, starting at 0.
    pub fn cumulative(&self) -> &[f64] {
        &self.cum
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Total route length in meters.
    pub fn total_length(&self) -> f64 {
        self.cum.last().copied().unwrap_or(0.0)
    }

    /// Closest point on the route to `point`.
    ///
    /// Every segment is tried; on equal distances the lowest segment index
    /// wins. A single-point polyline returns `xtrack_m = INFINITY`.
    pub fn nearest(&self, point: &GpsPoint) -> RoutePosition {
        let mut best = RoutePosition {
            s_m: 0.0,
            xtrack_m: f64::INFINITY,
            segment: None,
            t: 0.0,
        };

        for (i, w) in self.points.windows(2).enumerate() {
            let proj = project_to_segment(point, &w[0], &w[1]);
            if proj.distance_m < best.xtrack_m {
                best = RoutePosition {
                    s_m: self.cum[i] + proj.t * (self.cum[i + 1] - self.cum[i]),
                    xtrack_m: proj.distance_m,
                    segment: Some(i),
                    t: proj.t,
                };
            }
        }

        best
    }

    /// Coordinate at arc length `s_m`.
    ///
    /// Clamps to the first point for `s <= 0` and to the last point for
    /// `s >= total_length()`. Inside the route the containing segment is the
    /// one starting at the rightmost cumulative length `<= s`.
    pub fn interpolate(&self, s_m: f64) -> GpsPoint {
        let last = self.points.len() - 1;
        if s_m <= 0.0 || last == 0 {
            return self.points[0];
        }
        if s_m >= self.cum[last] {
            return self.points[last];
        }

        let i = self
            .cum
            .partition_point(|&c| c <= s_m)
            .saturating_sub(1)
            .min(last - 1);

        let seg = self.cum[i + 1] - self.cum[i];
        if seg <= 0.0 {
            return self.points[i + 1];
        }

        let t = (s_m - self.cum[i]) / seg;
        lerp(&self.points[i], &self.points[i + 1], t)
    }
}

impl TryFrom<Vec<GpsPoint>> for Polyline {
    type Error = TrackerError;

    fn try_from(points: Vec<GpsPoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<Polyline> for Vec<GpsPoint> {
    fn from(polyline: Polyline) -> Self {
        polyline.points
    }
}

/// Coerce a raw sequence cell to an integer.
///
/// Integers parse directly; finite decimals are truncated toward zero.
fn parse_sequence(shape_id: &str, raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(TrackerError::InvalidSequence {
            shape_id: shape_id.to_string(),
            value: raw.to_string(),
        }),
    }
}

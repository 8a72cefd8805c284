//! Tests for polyline projection and interpolation

use transit_tracker::geo_utils::haversine_distance;
use transit_tracker::{project_to_segment, GpsPoint, Polyline, ShapeRow, TrackerError};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// A zig-zagging northbound route.
fn zigzag() -> Polyline {
    Polyline::new(vec![
        GpsPoint::new(55.7500, 37.6000),
        GpsPoint::new(55.7520, 37.6030),
        GpsPoint::new(55.7540, 37.6000),
        GpsPoint::new(55.7560, 37.6030),
        GpsPoint::new(55.7580, 37.6000),
    ])
    .unwrap()
}

#[test]
fn test_interpolate_endpoints() {
    let line = zigzag();
    assert_eq!(line.interpolate(0.0), line.points()[0]);
    assert_eq!(line.interpolate(line.total_length()), *line.points().last().unwrap());
}

#[test]
fn test_interpolate_continuous_and_monotonic() {
    let line = zigzag();
    let step = 5.0;
    let mut prev = line.interpolate(0.0);
    let mut s = step;
    while s <= line.total_length() {
        let p = line.interpolate(s);
        // northbound zig-zag: latitude never decreases
        assert!(p.latitude >= prev.latitude);
        // moving `step` meters along never jumps further than that
        assert!(haversine_distance(&prev, &p) <= step + 0.5);
        prev = p;
        s += step;
    }
}

#[test]
fn test_interpolated_point_lies_on_route() {
    let line = zigzag();
    for i in 0..40 {
        let s = line.total_length() * i as f64 / 39.0;
        let pos = line.nearest(&line.interpolate(s));
        assert!(pos.xtrack_m < 1.0, "s={} xtrack={}", s, pos.xtrack_m);
    }
}

#[test]
fn test_nearest_distance_non_negative() {
    let line = zigzag();
    for (lat, lon) in [(55.749, 37.599), (55.751, 37.610), (55.757, 37.590), (55.760, 37.603)] {
        let pos = line.nearest(&GpsPoint::new(lat, lon));
        assert!(pos.xtrack_m >= 0.0);
        assert!(pos.s_m >= 0.0 && pos.s_m <= line.total_length());
    }
}

#[test]
fn test_point_on_segment_has_true_fraction() {
    let a = GpsPoint::new(55.7500, 37.6000);
    let b = GpsPoint::new(55.7600, 37.6000);
    for f in [0.0, 0.1, 0.25, 0.5, 0.9, 1.0] {
        let p = GpsPoint::new(a.latitude + f * (b.latitude - a.latitude), a.longitude);
        let proj = project_to_segment(&p, &a, &b);
        assert!(approx_eq(proj.t, f, 1e-9));
        assert!(proj.distance_m < 1e-6);
    }
}

#[test]
fn test_shape_table_selection() {
    let rows = vec![
        ShapeRow::new("1", 3, 55.7540, 37.6000),
        ShapeRow::new("2", 1, 10.0, 10.0),
        ShapeRow::new("1", 1, 55.7500, 37.6000),
        ShapeRow::new("1", 2, 55.7520, 37.6000),
    ];
    let line = Polyline::from_shape_rows(&rows, "1").unwrap();
    assert_eq!(line.len(), 3);
    assert!(line.cumulative().windows(2).all(|w| w[0] <= w[1]));

    assert!(matches!(
        Polyline::from_shape_rows(&rows, "3"),
        Err(TrackerError::ShapeNotFound { .. })
    ));
}

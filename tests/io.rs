//! Tests for CSV table I/O
#![cfg(feature = "io")]

use transit_tracker::io::{read_pings, read_shapes, write_assignments, write_vehicles};
use transit_tracker::{cluster_users_into_vehicles, TrackingConfig};

const SHAPES: &str = "\
shape_id,shape_pt_sequence,shape_pt_lat,shape_pt_lon
R,1,55.750000,37.600000
R,2,55.759000,37.600000
";

const PINGS: &str = "\
user_id_hash,t,lat,lon,accuracy_m
a,2024-05-01T08:00:01Z,55.751000,37.600000,5
b,2024-05-01T08:00:02Z,55.751020,37.600010,
c,2024-05-01T08:00:03Z,55.751040,37.599990,bad
d,2024-05-01T08:00:04Z,55.751000,37.600000,500
";

#[test]
fn test_csv_round_trip_through_pipeline() {
    let pings = read_pings(PINGS.as_bytes()).unwrap();
    let shapes = read_shapes(SHAPES.as_bytes()).unwrap();
    assert_eq!(pings.len(), 4);
    assert_eq!(pings[3].accuracy_m, Some(500.0));

    let config = TrackingConfig::default();
    let tables = cluster_users_into_vehicles(&pings, &shapes, "R", &config).unwrap();
    assert_eq!(tables.vehicles.len(), 1);
    assert_eq!(tables.vehicles[0].n_users, 3);

    let mut out = Vec::new();
    write_vehicles(&mut out, &tables.vehicles).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("t_bin,vehicle_id,s_m,lat,lon,n_users"));
    let row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row[1], "1");
    assert_eq!(row[5], "3");

    let mut out = Vec::new();
    write_assignments(&mut out, &tables.assignments).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 4);
}

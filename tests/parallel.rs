//! Tests for parallel route processing
#![cfg(feature = "parallel")]

use transit_tracker::{
    cluster_users_into_vehicles, track_routes_parallel, Ping, RouteJob, ShapeRow, TrackerError,
    TrackingConfig,
};

fn shapes() -> Vec<ShapeRow> {
    vec![
        ShapeRow::new("east", 1, 55.750, 37.600),
        ShapeRow::new("east", 2, 55.759, 37.600),
        ShapeRow::new("west", 1, 55.750, 37.500),
        ShapeRow::new("west", 2, 55.759, 37.500),
    ]
}

fn riders(lon: f64, t: i64) -> Vec<Ping> {
    ["a", "b", "c"]
        .iter()
        .map(|u| Ping::new(*u, t, 55.752, lon))
        .collect()
}

#[test]
fn test_parallel_matches_sequential() {
    let jobs = vec![
        RouteJob { shape_id: "east".to_string(), pings: riders(37.600, 0) },
        RouteJob { shape_id: "west".to_string(), pings: riders(37.500, 10) },
        RouteJob { shape_id: "missing".to_string(), pings: riders(37.500, 0) },
    ];
    let config = TrackingConfig::default();
    let results = track_routes_parallel(&jobs, &shapes(), &config);
    assert_eq!(results.len(), 3);

    for (job, result) in jobs.iter().zip(&results).take(2) {
        let expected =
            cluster_users_into_vehicles(&job.pings, &shapes(), &job.shape_id, &config).unwrap();
        assert_eq!(result.as_ref().unwrap(), &expected);
        // each route has its own tracker, so ids restart at 1
        assert_eq!(expected.vehicles[0].vehicle_id, 1);
    }
    assert!(matches!(results[2], Err(TrackerError::ShapeNotFound { .. })));
}

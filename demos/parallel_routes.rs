//! Example of tracking several independent routes concurrently.
//!
//! Run with: cargo run --example parallel_routes --features parallel

use std::time::Instant;
use transit_tracker::{track_routes_parallel, Ping, RouteJob, ShapeRow, TrackingConfig};

const DEG_PER_M: f64 = 1.0 / 111_194.93;

fn main() {
    println!("Parallel Route Tracking Example\n");

    // Three parallel north-south routes, 1 km apart
    let routes = [("north-line", 37.600), ("centre-line", 37.616), ("river-line", 37.632)];
    let lat0 = 55.7500;

    let mut shapes = Vec::new();
    let mut jobs = Vec::new();
    for (r, (shape_id, lon)) in routes.iter().enumerate() {
        for seq in 0..=5 {
            shapes.push(ShapeRow::new(*shape_id, seq, lat0 + seq as f64 * 500.0 * DEG_PER_M, *lon));
        }

        let speed = 6.0 + 3.0 * r as f64;
        let mut pings = Vec::new();
        for t in (0..120).step_by(5) {
            for rider in 0..5 {
                let s = 50.0 + speed * t as f64 + rider as f64 * 4.0;
                let user = format!("{}-{}", shape_id, rider);
                pings.push(Ping::new(user, t, lat0 + s * DEG_PER_M, *lon));
            }
        }
        jobs.push(RouteJob {
            shape_id: shape_id.to_string(),
            pings,
        });
    }

    let config = TrackingConfig::default();
    let start = Instant::now();
    let results = track_routes_parallel(&jobs, &shapes, &config);
    println!("Tracked {} routes in {:?}\n", jobs.len(), start.elapsed());

    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(tables) => {
                let mut ids: Vec<u64> = tables.vehicles.iter().map(|v| v.vehicle_id).collect();
                ids.dedup();
                println!(
                    "  {}: {} vehicle rows, vehicle ids {:?}",
                    job.shape_id,
                    tables.vehicles.len(),
                    ids
                );
            }
            Err(e) => println!("  {}: error: {}", job.shape_id, e),
        }
    }
}

//! Basic example: two buses on one route, ridden by anonymous passengers.
//!
//! Run with: cargo run --example basic_tracking

use transit_tracker::{cluster_users_into_vehicles, Ping, ShapeRow, TrackingConfig};

/// Degrees of latitude per meter on a 6,371 km sphere
const DEG_PER_M: f64 = 1.0 / 111_194.93;

fn main() {
    // A straight 2 km route running north
    let (lat0, lon0) = (55.7500, 37.6000);
    let shapes = vec![
        ShapeRow::new("route-1", 1, lat0, lon0),
        ShapeRow::new("route-1", 2, lat0 + 1000.0 * DEG_PER_M, lon0),
        ShapeRow::new("route-1", 3, lat0 + 2000.0 * DEG_PER_M, lon0),
    ];

    // Bus A starts at 100 m doing 8 m/s, bus B starts at 900 m doing 12 m/s.
    // Each has four riders spread a few meters apart.
    let buses = [("A", 100.0, 8.0), ("B", 900.0, 12.0)];
    let mut pings = Vec::new();
    for t in (0..60).step_by(10) {
        for (bus, start, speed) in buses {
            for rider in 0..4 {
                let s = start + speed * t as f64 + rider as f64 * 3.0;
                let user = format!("{}-rider-{}", bus, rider);
                let ping = Ping::new(user, t, lat0 + s * DEG_PER_M, lon0);
                pings.push(ping.with_accuracy(Some(15.0)));
            }
        }
    }

    // A pedestrian far from the route is filtered out
    pings.push(Ping::new("walker", 20, lat0, lon0 + 0.01));

    let config = TrackingConfig::default();
    println!("Vehicle Tracking Example\n");
    println!(
        "Config: bin={}s, eps={}m, min_pts={}, gate={}m, vmax={}m/s\n",
        config.bin_sec, config.eps_m, config.min_pts, config.gate_m, config.vmax_mps
    );

    let tables = match cluster_users_into_vehicles(&pings, &shapes, "route-1", &config) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("tracking failed: {}", e);
            return;
        }
    };

    println!("Vehicles:");
    for v in &tables.vehicles {
        println!(
            "  t={:>3}s  vehicle {}  s={:>7.1}m  ({:.5}, {:.5})  riders={}",
            v.t_bin, v.vehicle_id, v.s_m, v.lat, v.lon, v.n_users
        );
    }

    println!("\n{} rider assignments", tables.assignments.len());
}

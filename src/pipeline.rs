//! Batch pipeline: pings + route shape in, vehicle and assignment tables out.
//!
//! Buckets are processed strictly in ascending time order through a single
//! [`MultiTracker`]. Independent routes can run concurrently with
//! [`track_routes_parallel`] (feature `parallel`), each with its own polyline
//! and tracker.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
    cluster_1d, match_pings, Assignment, MatchedPing, MultiTracker, Ping, Polyline, Result,
    ShapeRow, TrackingConfig, VehicleEstimate, VehicleTables,
};

/// Infer vehicles for the route `shape_id`.
///
/// # Errors
///
/// Fails if the shape is missing, a shape sequence is non-numeric, or the
/// configuration is invalid. Pings that do not match the route never cause
/// an error; if none survive, both tables are empty.
pub fn cluster_users_into_vehicles(
    pings: &[Ping],
    shapes: &[ShapeRow],
    shape_id: &str,
    config: &TrackingConfig,
) -> Result<VehicleTables> {
    let polyline = Polyline::from_shape_rows(shapes, shape_id)?;
    track_along_polyline(&polyline, pings, config)
}

/// Infer vehicles along an already-built polyline.
pub fn track_along_polyline(
    polyline: &Polyline,
    pings: &[Ping],
    config: &TrackingConfig,
) -> Result<VehicleTables> {
    config.validate()?;

    let matched = match_pings(pings, polyline, config);
    if matched.is_empty() {
        info!("no pings within route tolerances ({} received)", pings.len());
        return Ok(VehicleTables::default());
    }
    let accepted = matched.len();

    // Within a bucket, pings keep input order
    let mut buckets: BTreeMap<i64, Vec<MatchedPing>> = BTreeMap::new();
    for m in matched {
        buckets.entry(m.t_bin).or_default().push(m);
    }

    let mut tracker = MultiTracker::from_config(config);
    let mut vehicles: Vec<VehicleEstimate> = Vec::new();
    let mut assignments: Vec<Assignment> = Vec::new();

    for (&t_bin, group) in &buckets {
        let values: Vec<f64> = group.iter().map(|m| m.s_m).collect();
        let ids: Vec<Option<String>> = group.iter().map(|m| Some(m.user_id_hash.clone())).collect();

        let clusters = cluster_1d(&values, &ids, config.eps_m, config.min_pts);
        let first_new = tracker.next_id();
        let vehicle_ids = tracker.step(t_bin, &clusters);
        debug!(
            "bucket {}: {} pings -> {} clusters, {} new tracks",
            t_bin,
            group.len(),
            clusters.len(),
            tracker.next_id() - first_new
        );

        for (cluster, vehicle_id) in clusters.iter().zip(vehicle_ids) {
            let pos = polyline.interpolate(cluster.center_m);
            vehicles.push(VehicleEstimate {
                t_bin,
                vehicle_id,
                s_m: cluster.center_m,
                lat: pos.latitude,
                lon: pos.longitude,
                n_users: cluster.user_count(),
            });
            for user in cluster.user_ids() {
                assignments.push(Assignment {
                    t_bin,
                    user_id_hash: user.to_string(),
                    vehicle_id,
                });
            }
        }
    }

    vehicles.sort_by_key(|v| (v.t_bin, v.vehicle_id));
    assignments.sort_by(|a, b| (a.t_bin, &a.user_id_hash).cmp(&(b.t_bin, &b.user_id_hash)));

    info!(
        "{} of {} pings matched over {} buckets: {} vehicle rows, {} tracks",
        accepted,
        pings.len(),
        buckets.len(),
        vehicles.len(),
        tracker.tracks().len()
    );

    Ok(VehicleTables { vehicles, assignments })
}

/// One route's input for [`track_routes_parallel`].
#[cfg(feature = "parallel")]
#[derive(Debug, Clone)]
pub struct RouteJob {
    pub shape_id: String,
    pub pings: Vec<Ping>,
}

/// Run several independent routes concurrently.
///
/// Each job gets its own polyline and tracker; results come back in job order.
#[cfg(feature = "parallel")]
pub fn track_routes_parallel(
    jobs: &[RouteJob],
    shapes: &[ShapeRow],
    config: &TrackingConfig,
) -> Vec<Result<VehicleTables>> {
    use rayon::prelude::*;

    info!("tracking {} routes in parallel", jobs.len());
    jobs.par_iter()
        .map(|job| cluster_users_into_vehicles(&job.pings, shapes, &job.shape_id, config))
        .collect()
}

//! # Transit Tracker
//!
//! Infer where transit vehicles are along a known route from anonymous
//! passenger GPS pings, and keep each inferred vehicle's id stable over time.
//!
//! This library provides:
//! - Map-matching of pings onto a route polyline (arc length + cross-track distance)
//! - 1-D gap clustering of riders into candidate vehicles per time bucket
//! - A greedy, gated multi-target tracker that carries vehicle ids across buckets
//! - A batch pipeline producing vehicle-position and rider-assignment tables
//!
//! ## Features
//!
//! - **`parallel`** - Process independent routes concurrently with rayon
//! - **`serde`** - Serialize/deserialize public types and configuration
//! - **`io`** - CSV readers and writers for the input and output tables
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use transit_tracker::{cluster_users_into_vehicles, Ping, ShapeRow, TrackingConfig};
//!
//! // A straight ~1 km route running north
//! let shapes = vec![
//!     ShapeRow::new("R1", 1, 55.7500, 37.6000),
//!     ShapeRow::new("R1", 2, 55.7590, 37.6000),
//! ];
//!
//! // Three riders on the same bus, two buckets apart
//! let mut pings = Vec::new();
//! for (i, user) in ["a", "b", "c"].iter().enumerate() {
//!     let jitter = i as f64 * 0.00002;
//!     pings.push(Ping::new(*user, 100, 55.7510 + jitter, 37.6000));
//!     pings.push(Ping::new(*user, 110, 55.7519 + jitter, 37.6000));
//! }
//!
//! let config = TrackingConfig::default();
//! let tables = cluster_users_into_vehicles(&pings, &shapes, "R1", &config).unwrap();
//! assert_eq!(tables.vehicles.len(), 2);
//! assert_eq!(tables.vehicles[0].vehicle_id, tables.vehicles[1].vehicle_id);
//! assert_eq!(tables.assignments.len(), 6);
//! ```

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackerError};

// Geodesy helpers (haversine, planar scale factors)
pub mod geo_utils;

// Route geometry: projection and arc-length interpolation
pub mod polyline;
pub use polyline::{project_to_segment, Polyline, RoutePosition, SegmentProjection, ShapeRow};

// Per-ping accuracy / cross-track filter
pub mod matcher;
pub use matcher::{map_match, match_pings, time_bucket};

// 1-D gap clustering of positions within a bucket
pub mod clustering;
pub use clustering::{cluster_1d, Cluster};

// Stateful multi-target tracker
pub mod tracker;
pub use tracker::{MultiTracker, Track, TrackId};

// End-to-end batch pipeline
pub mod pipeline;
#[cfg(feature = "parallel")]
pub use pipeline::{track_routes_parallel, RouteJob};
pub use pipeline::{cluster_users_into_vehicles, track_along_polyline};

// CSV table I/O
#[cfg(feature = "io")]
pub mod io;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use transit_tracker::GpsPoint;
/// let point = GpsPoint::new(55.7558, 37.6173); // Moscow
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Time of a ping: Unix seconds or an absolute UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Timestamp {
    Unix(i64),
    DateTime(DateTime<Utc>),
}

impl Timestamp {
    /// Whole Unix seconds. Sub-second parts of a date-time are floored.
    pub fn unix_seconds(&self) -> i64 {
        match self {
            Timestamp::Unix(secs) => *secs,
            Timestamp::DateTime(dt) => dt.timestamp(),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp::Unix(secs)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::DateTime(dt)
    }
}

/// A raw observation from one passenger device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ping {
    /// Opaque, stable user hash
    pub user_id_hash: String,
    pub t: Timestamp,
    pub lat: f64,
    pub lon: f64,
    /// Reported horizontal accuracy in meters. `None` (or NaN) means unknown
    /// and is always accepted.
    pub accuracy_m: Option<f64>,
}

impl Ping {
    pub fn new(
        user_id_hash: impl Into<String>,
        t: impl Into<Timestamp>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            user_id_hash: user_id_hash.into(),
            t: t.into(),
            lat,
            lon,
            accuracy_m: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: Option<f64>) -> Self {
        self.accuracy_m = accuracy_m;
        self
    }

    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.lat, self.lon)
    }

    /// Accuracy if it is a real number.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy_m.filter(|a| !a.is_nan())
    }
}

/// A ping accepted by the map-matcher.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchedPing {
    pub user_id_hash: String,
    /// Start of the time bucket (seconds)
    pub t_bin: i64,
    /// Arc-length position along the route (meters)
    pub s_m: f64,
}

/// Configuration for map-matching, clustering and tracking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackingConfig {
    /// Width of a time bucket in seconds.
    /// Default: 10
    pub bin_sec: i64,

    /// Largest gap between neighbouring riders inside one cluster (meters).
    /// Default: 80.0
    pub eps_m: f64,

    /// Minimum number of identified riders for a cluster to count as a vehicle.
    /// Default: 3
    pub min_pts: usize,

    /// Maximum distance from the route for a ping to be accepted (meters).
    /// Default: 80.0
    pub xtrack_max_m: f64,

    /// Maximum reported accuracy for a ping to be accepted (meters).
    /// Default: 80.0
    pub acc_max_m: f64,

    /// Maximum plausible vehicle speed (m/s); widens the gate while coasting.
    /// Default: 25.0
    pub vmax_mps: f64,

    /// Base matching radius between a predicted track and a cluster (meters).
    /// Default: 150.0
    pub gate_m: f64,

    /// Number of non-empty buckets a track survives without a match.
    /// Default: 6
    pub ttl_bins: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            bin_sec: 10,
            eps_m: 80.0,
            min_pts: 3,
            xtrack_max_m: 80.0,
            acc_max_m: 80.0,
            vmax_mps: 25.0,
            gate_m: 150.0,
            ttl_bins: 6,
        }
    }
}

impl TrackingConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.bin_sec <= 0 {
            return Err(TrackerError::InvalidConfig {
                field: "bin_sec",
                reason: "must be positive",
            });
        }
        let thresholds = [
            ("eps_m", self.eps_m),
            ("xtrack_max_m", self.xtrack_max_m),
            ("acc_max_m", self.acc_max_m),
            ("vmax_mps", self.vmax_mps),
            ("gate_m", self.gate_m),
        ];
        for (field, value) in thresholds {
            if value.is_nan() || value < 0.0 {
                return Err(TrackerError::InvalidConfig {
                    field,
                    reason: "must be a non-negative number",
                });
            }
        }
        Ok(())
    }
}

/// One inferred vehicle position in one bucket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleEstimate {
    pub t_bin: i64,
    pub vehicle_id: TrackId,
    /// Cluster center as arc length (meters)
    pub s_m: f64,
    pub lat: f64,
    pub lon: f64,
    /// Identified riders in the cluster
    pub n_users: usize,
}

/// A rider attached to a vehicle in one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub t_bin: i64,
    pub user_id_hash: String,
    pub vehicle_id: TrackId,
}

/// Output of the pipeline.
///
/// `vehicles` is sorted by `(t_bin, vehicle_id)`, `assignments` by
/// `(t_bin, user_id_hash)`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleTables {
    pub vehicles: Vec<VehicleEstimate>,
    pub assignments: Vec<Assignment>,
}

impl VehicleTables {
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty() && self.assignments.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

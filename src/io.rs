//! CSV readers and writers for the pipeline's tables.
//!
//! Input columns:
//! - pings: `user_id_hash, t, lat, lon[, accuracy_m]`
//! - shapes: `shape_id, shape_pt_sequence, shape_pt_lat, shape_pt_lon` (extra columns ignored)
//!
//! Output columns:
//! - vehicles: `t_bin, vehicle_id, s_m, lat, lon, n_users`
//! - assignments: `t_bin, user_id_hash, vehicle_id`

use std::io::{Read, Write};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::{Assignment, Ping, Result, ShapeRow, Timestamp, TrackerError, VehicleEstimate};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Deserialize)]
struct PingRecord {
    user_id_hash: String,
    t: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    accuracy_m: Option<String>,
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr)
}

/// Read a ping table.
///
/// Empty or non-numeric `accuracy_m` cells become `None`.
pub fn read_pings<R: Read>(rdr: R) -> Result<Vec<Ping>> {
    let mut pings = Vec::new();
    for rec in reader(rdr).deserialize() {
        let rec: PingRecord = rec?;
        let accuracy = rec
            .accuracy_m
            .as_deref()
            .and_then(|a| a.parse::<f64>().ok())
            .filter(|a| !a.is_nan());

        pings.push(Ping {
            user_id_hash: rec.user_id_hash,
            t: parse_timestamp(&rec.t)?,
            lat: rec.lat,
            lon: rec.lon,
            accuracy_m: accuracy,
        });
    }
    Ok(pings)
}

/// Read a route shape table.
pub fn read_shapes<R: Read>(rdr: R) -> Result<Vec<ShapeRow>> {
    let mut rows = Vec::new();
    for rec in reader(rdr).deserialize() {
        let row: ShapeRow = rec?;
        rows.push(row);
    }
    Ok(rows)
}

/// Parse a `t` cell: integer seconds, decimal seconds (truncated), RFC 3339,
/// or a naive date-time taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    let s = raw.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return Ok(Timestamp::Unix(secs));
    }
    if let Ok(secs) = s.parse::<f64>() {
        if secs.is_finite() {
            return Ok(Timestamp::Unix(secs.trunc() as i64));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Timestamp::DateTime(dt.with_timezone(&Utc)));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Timestamp::DateTime(Utc.from_utc_datetime(&naive)));
        }
    }
    Err(TrackerError::InvalidTimestamp {
        value: raw.to_string(),
    })
}

/// Write the vehicle table. The header is written even when `rows` is empty.
pub fn write_vehicles<W: Write>(wtr: W, rows: &[VehicleEstimate]) -> Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(wtr);
    w.write_record(["t_bin", "vehicle_id", "s_m", "lat", "lon", "n_users"])?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Write the assignment table. The header is written even when `rows` is empty.
pub fn write_assignments<W: Write>(wtr: W, rows: &[Assignment]) -> Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(wtr);
    w.write_record(["t_bin", "user_id_hash", "vehicle_id"])?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

//! # Multi-Target Tracker
//!
//! Carries vehicle identities across time buckets by matching each bucket's
//! clusters to existing tracks.
//!
//! ## Algorithm (per bucket)
//! 1. Predict every active track forward: `s + v * dt`
//! 2. Admit (track, cluster) pairs whose prediction error is within
//!    `gate_m + vmax_mps * dt`
//! 3. Greedily commit pairs by ascending error; each track and cluster is
//!    used at most once. Equal errors resolve in discovery order (track id,
//!    then cluster index)
//! 4. Unmatched clusters spawn new tracks
//! 5. Matched tracks take the cluster position and a backward-difference velocity
//! 6. Unmatched tracks lose one unit of time-to-live, but only in buckets that
//!    had at least one cluster
//!
//! Tracks are kept in an arena indexed by id and are never removed. A track
//! whose time-to-live reaches zero leaves the active set for good.
//!
//! `step` must be called with strictly increasing buckets; velocity is derived
//! from the previous update.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::{Cluster, TrackingConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Vehicle / track identifier. Assigned from 1 upwards, never reused.
pub type TrackId = u64;

/// Lower bound on elapsed time between updates (seconds).
const MIN_DT_SEC: f64 = 1e-3;

/// State of one inferred vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    pub id: TrackId,
    /// Arc length at the last update (meters)
    pub last_s: f64,
    /// Bucket of the last update
    pub last_t: i64,
    /// Estimated speed along the route (m/s, negative when moving backwards)
    pub velocity: f64,
    /// Remaining buckets before the track expires
    pub ttl: u32,
}

impl Track {
    pub fn is_alive(&self) -> bool {
        self.ttl > 0
    }

    /// Seconds since the last update, never below `MIN_DT_SEC`.
    fn elapsed(&self, t_bin: i64) -> f64 {
        (t_bin.saturating_sub(self.last_t) as f64).max(MIN_DT_SEC)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    track: TrackId,
    cluster: usize,
}

/// Greedy gated tracker. One instance per route stream.
#[derive(Debug, Clone)]
pub struct MultiTracker {
    vmax_mps: f64,
    gate_m: f64,
    ttl_bins: u32,
    /// Arena: `tracks[id - 1]`
    tracks: Vec<Track>,
    active: BTreeSet<TrackId>,
    next_id: TrackId,
    last_bucket: Option<i64>,
}

impl Default for MultiTracker {
    fn default() -> Self {
        Self::from_config(&TrackingConfig::default())
    }
}

impl MultiTracker {
    pub fn new(vmax_mps: f64, gate_m: f64, ttl_bins: u32) -> Self {
        Self {
            vmax_mps,
            gate_m,
            ttl_bins,
            tracks: Vec::new(),
            active: BTreeSet::new(),
            next_id: 1,
            last_bucket: None,
        }
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(config.vmax_mps, config.gate_m, config.ttl_bins)
    }

    /// Process one bucket and return the track id for each cluster, by index.
    ///
    /// # Example
    ///
    /// ```
    /// use transit_tracker::{Cluster, MultiTracker};
    ///
    /// let mut tracker = MultiTracker::new(25.0, 150.0, 6);
    /// let c = |s: f64| Cluster::new(s, vec![Some("u".to_string())]);
    ///
    /// assert_eq!(tracker.step(0, &[c(0.0)]), vec![1]);
    /// assert_eq!(tracker.step(10, &[c(150.0)]), vec![1]);
    /// assert_eq!(tracker.track(1).unwrap().velocity, 15.0);
    /// ```
    pub fn step(&mut self, t_bin: i64, clusters: &[Cluster]) -> Vec<TrackId> {
        if let Some(prev) = self.last_bucket {
            if t_bin <= prev {
                warn!(
                    "tracker step for bucket {} after bucket {}; buckets must increase",
                    t_bin, prev
                );
            }
        }
        self.last_bucket = Some(t_bin);

        // Admissible pairs, discovered in (track id, cluster index) order
        let mut pairs: Vec<Candidate> = Vec::new();
        for &tid in &self.active {
            let track = &self.tracks[arena_index(tid)];
            let dt = track.elapsed(t_bin);
            let predicted = track.last_s + track.velocity * dt;
            let gate = self.gate_m + self.vmax_mps * dt;

            for (j, cluster) in clusters.iter().enumerate() {
                let cost = (cluster.center_m - predicted).abs();
                if cost <= gate {
                    pairs.push(Candidate { cost, track: tid, cluster: j });
                }
            }
        }

        // Stable sort: equal costs keep discovery order
        pairs.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let mut matched: Vec<Option<TrackId>> = vec![None; clusters.len()];
        let mut matched_tracks: BTreeSet<TrackId> = BTreeSet::new();
        for pair in pairs {
            if matched_tracks.contains(&pair.track) || matched[pair.cluster].is_some() {
                continue;
            }
            matched[pair.cluster] = Some(pair.track);
            matched_tracks.insert(pair.track);
        }

        let mut assignment = Vec::with_capacity(clusters.len());
        for (cluster, slot) in clusters.iter().zip(&matched) {
            let tid = match slot {
                Some(tid) => {
                    self.update(*tid, t_bin, cluster.center_m);
                    *tid
                }
                None => self.spawn(t_bin, cluster.center_m),
            };
            assignment.push(tid);
        }

        if !clusters.is_empty() {
            self.age_unmatched(t_bin, &matched_tracks);
        }

        assignment
    }

    fn spawn(&mut self, t_bin: i64, s: f64) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;

        let track = Track {
            id,
            last_s: s,
            last_t: t_bin,
            velocity: 0.0,
            ttl: self.ttl_bins,
        };
        if track.is_alive() {
            self.active.insert(id);
        }
        self.tracks.push(track);

        debug!("bucket {}: new track {} at s={:.1}m", t_bin, id, s);
        id
    }

    fn update(&mut self, tid: TrackId, t_bin: i64, s: f64) {
        let ttl_bins = self.ttl_bins;
        let track = &mut self.tracks[arena_index(tid)];
        let dt = track.elapsed(t_bin);

        track.velocity = (s - track.last_s) / dt;
        track.last_s = s;
        track.last_t = t_bin;
        track.ttl = ttl_bins;

        if !track.is_alive() {
            self.active.remove(&tid);
        }
    }

    fn age_unmatched(&mut self, t_bin: i64, matched_tracks: &BTreeSet<TrackId>) {
        let mut expired = Vec::new();
        for &tid in &self.active {
            if matched_tracks.contains(&tid) {
                continue;
            }
            let track = &mut self.tracks[arena_index(tid)];
            if track.last_t < t_bin {
                track.ttl = track.ttl.saturating_sub(1);
                if !track.is_alive() {
                    expired.push(tid);
                }
            }
        }

        for tid in expired {
            self.active.remove(&tid);
            debug!("bucket {}: track {} expired", t_bin, tid);
        }
    }

    /// Look up a track by id, alive or not.
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        let idx = id.checked_sub(1)? as usize;
        self.tracks.get(idx)
    }

    /// Every track ever created, in id order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Ids of tracks still eligible for matching, ascending.
    pub fn active_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.active.iter().copied()
    }

    pub fn is_active(&self, id: TrackId) -> bool {
        self.active.contains(&id)
    }

    /// Id the next spawned track will receive.
    pub fn next_id(&self) -> TrackId {
        self.next_id
    }
}

#[inline]
fn arena_index(id: TrackId) -> usize {
    (id - 1) as usize
}

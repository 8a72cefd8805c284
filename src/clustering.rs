//! # 1-D Gap Clustering
//!
//! Groups arc-length positions from one time bucket into candidate vehicles.
//!
//! ## Algorithm
//! 1. Sort positions ascending (stable, so equal positions keep input order)
//! 2. Walk the sorted list; a gap larger than `eps_m` to the previous member
//!    closes the current cluster
//! 3. Each cluster's center is the median of its members
//! 4. Drop clusters with fewer than `min_pts` identified members
//!
//! Members without an id are placeholders: they bridge gaps while scanning but
//! do not count toward `min_pts` and are never assigned to a vehicle.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A group of riders that plausibly share one vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    /// Median arc length of the members (meters)
    pub center_m: f64,
    /// Members in ascending position order; `None` marks a placeholder
    pub members: Vec<Option<String>>,
}

impl Cluster {
    pub fn new(center_m: f64, members: Vec<Option<String>>) -> Self {
        Self { center_m, members }
    }

    /// Number of identified (non-placeholder) members.
    pub fn user_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_some()).count()
    }

    /// Identified members in position order.
    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| m.as_deref())
    }
}

/// Median of `values`; the mean of the two middle values for even lengths.
/// Empty input yields NaN.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Cluster positions by gaps larger than `eps_m`.
///
/// `ids[i]` is the member id for `values[i]`. Positions past the end of `ids`,
/// and `None` ids, become placeholders.
///
/// # Example
///
/// ```
/// use transit_tracker::cluster_1d;
///
/// let values = [0.0, 10.0, 20.0, 200.0, 210.0];
/// let ids: Vec<Option<String>> = (0..5).map(|i| Some(format!("u{}", i))).collect();
///
/// let clusters = cluster_1d(&values, &ids, 80.0, 2);
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters[0].center_m, 10.0);
/// assert_eq!(clusters[1].center_m, 205.0);
/// ```
pub fn cluster_1d(
    values: &[f64],
    ids: &[Option<String>],
    eps_m: f64,
    min_pts: usize,
) -> Vec<Cluster> {
    if values.is_empty() {
        return vec![];
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut groups: Vec<Cluster> = Vec::new();
    let mut cur_values: Vec<f64> = Vec::new();
    let mut cur_ids: Vec<Option<String>> = Vec::new();

    for idx in order {
        let v = values[idx];
        let id = ids.get(idx).cloned().flatten();

        if let Some(&prev) = cur_values.last() {
            if (v - prev).abs() > eps_m || v.is_nan() {
                groups.push(close(&mut cur_values, &mut cur_ids));
            }
        }
        cur_values.push(v);
        cur_ids.push(id);
    }
    groups.push(close(&mut cur_values, &mut cur_ids));

    groups.retain(|c| c.user_count() >= min_pts);
    groups
}

fn close(values: &mut Vec<f64>, ids: &mut Vec<Option<String>>) -> Cluster {
    let center_m = median(values);
    values.clear();
    Cluster::new(center_m, std::mem::take(ids))
}

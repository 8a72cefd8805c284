//! Map-matching filter: turns raw pings into arc-length positions per bucket.
//!
//! A ping is rejected when its coordinates are out of range or not finite,
//! when its reported accuracy is worse than `acc_max_m`, or when it lies more
//! than `xtrack_max_m` from the route. Unknown accuracy is accepted.

use log::debug;

use crate::{MatchedPing, Ping, Polyline, TrackingConfig};

/// Start of the bucket containing `t_sec` (floor division, so negative times
/// fall into the bucket below).
///
/// `bin_sec` must be positive. The lowest bucket start that does not fit in
/// an `i64` saturates to `i64::MIN`.
///
/// ```
/// use transit_tracker::time_bucket;
/// assert_eq!(time_bucket(127, 10), 120);
/// assert_eq!(time_bucket(-1, 10), -10);
/// ```
#[inline]
pub fn time_bucket(t_sec: i64, bin_sec: i64) -> i64 {
    t_sec.div_euclid(bin_sec).saturating_mul(bin_sec)
}

/// Match a single ping, or `None` if it is filtered out.
///
/// `config.bin_sec` must be positive; see [`TrackingConfig::validate`].
pub fn map_match(ping: &Ping, polyline: &Polyline, config: &TrackingConfig) -> Option<MatchedPing> {
    let position = ping.position();
    if !position.is_valid() {
        return None;
    }
    if let Some(acc) = ping.accuracy() {
        if acc > config.acc_max_m {
            return None;
        }
    }

    let pos = polyline.nearest(&position);
    if pos.xtrack_m.is_nan() || pos.xtrack_m > config.xtrack_max_m {
        return None;
    }

    Some(MatchedPing {
        user_id_hash: ping.user_id_hash.clone(),
        t_bin: time_bucket(ping.t.unix_seconds(), config.bin_sec),
        s_m: pos.s_m,
    })
}

/// Match every ping, keeping accepted ones in input order.
pub fn match_pings(
    pings: &[Ping],
    polyline: &Polyline,
    config: &TrackingConfig,
) -> Vec<MatchedPing> {
    let matched: Vec<MatchedPing> = pings
        .iter()
        .filter_map(|p| map_match(p, polyline, config))
        .collect();

    debug!(
        "map-matched {} of {} pings ({} rejected)",
        matched.len(),
        pings.len(),
        pings.len() - matched.len()
    );

    matched
}

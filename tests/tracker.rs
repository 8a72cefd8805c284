//! Tests for the multi-target tracker

use transit_tracker::{Cluster, MultiTracker, TrackingConfig};

fn clusters(positions: &[f64]) -> Vec<Cluster> {
    positions
        .iter()
        .map(|&s| Cluster::new(s, vec![Some("a".to_string()), None, Some("b".to_string())]))
        .collect()
}

#[test]
fn test_replay_is_deterministic() {
    let script: Vec<(i64, Vec<f64>)> = (0..30)
        .map(|k| {
            let t = k * 10;
            let mut pos = vec![t as f64 * 9.0, 2000.0 - t as f64 * 7.0];
            if k % 4 == 0 {
                pos.push(1000.0);
            }
            if k % 7 == 3 {
                pos.clear();
            }
            (t, pos)
        })
        .collect();

    let mut a = MultiTracker::from_config(&TrackingConfig::default());
    let mut b = MultiTracker::from_config(&TrackingConfig::default());
    for (t, pos) in &script {
        let c = clusters(pos);
        assert_eq!(a.step(*t, &c), b.step(*t, &c));
    }
    assert_eq!(a.tracks(), b.tracks());
}

#[test]
fn test_continuity_at_gate_edge() {
    let mut tracker = MultiTracker::new(25.0, 150.0, 6);
    let first = tracker.step(0, &clusters(&[0.0]));
    let second = tracker.step(10, &clusters(&[150.0]));
    assert_eq!(first, second);
    assert_eq!(tracker.tracks().len(), 1);
}

#[test]
fn test_expiry_after_two_nonempty_buckets() {
    let mut tracker = MultiTracker::new(25.0, 150.0, 2);
    tracker.step(0, &clusters(&[0.0]));
    tracker.step(10, &clusters(&[9000.0]));
    assert!(tracker.is_active(1));
    tracker.step(20, &clusters(&[9000.0]));
    assert!(!tracker.is_active(1));
    assert!(!tracker.active_ids().any(|id| id == 1));

    // dead tracks stay addressable
    let dead = tracker.track(1).unwrap();
    assert_eq!(dead.ttl, 0);
    assert_eq!(dead.last_t, 0);
}

#[test]
fn test_empty_bucket_preserves_ttl() {
    let mut tracker = MultiTracker::new(25.0, 150.0, 2);
    let id = tracker.step(0, &clusters(&[0.0]))[0];
    tracker.step(10, &[]);
    tracker.step(20, &[]);
    tracker.step(30, &[]);
    assert_eq!(tracker.track(id).unwrap().ttl, 2);
    assert_eq!(tracker.step(40, &clusters(&[120.0])), vec![id]);
}

#[test]
fn test_ids_never_reused() {
    let mut tracker = MultiTracker::new(25.0, 10.0, 1);
    let mut seen = Vec::new();
    for k in 0..10 {
        // each bucket's cluster is far from every prediction
        let ids = tracker.step(k * 10, &clusters(&[k as f64 * 10_000.0]));
        seen.extend(ids);
    }
    let mut sorted = seen.clone();
    sorted.dedup();
    assert_eq!(sorted, seen);
    assert_eq!(seen, (1..=10).collect::<Vec<_>>());
}

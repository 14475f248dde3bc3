//! Phase 3 tests: Multi-restart search, elbow selection, cancellation and deadlines.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use metadata_cluster::engine::{cluster, elbow, CancelToken, ClusterConfig, KSearch};
use metadata_cluster::metric::DistanceMetric;
use metadata_cluster::types::{ClusterError, FeatureVector, FeatureVectorBuilder};

// ==================== Helpers ====================

fn point(id: &str, x: f64, y: f64) -> FeatureVector {
    FeatureVectorBuilder::new(id)
        .feature("x", x)
        .feature("y", y)
        .build()
}

fn four_corners() -> Vec<FeatureVector> {
    vec![
        point("a", 0.0, 0.0),
        point("b", 0.0, 1.0),
        point("c", 10.0, 0.0),
        point("d", 10.0, 1.0),
    ]
}

/// Three well-separated blobs of `per_blob` points each.
fn three_blobs(seed: u64, per_blob: usize) -> Vec<FeatureVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = [(0.0, 0.0), (100.0, 0.0), (50.0, 90.0)];
    let mut points = Vec::new();
    for (b, &(cx, cy)) in centers.iter().enumerate() {
        for i in 0..per_blob {
            points.push(point(
                &format!("blob{}-{}", b, i),
                cx + rng.gen_range(-1.0..1.0),
                cy + rng.gen_range(-1.0..1.0),
            ));
        }
    }
    points
}

fn concepts(id: &str, names: &[&str]) -> FeatureVector {
    names
        .iter()
        .fold(FeatureVectorBuilder::new(id), |b, name| b.feature(*name, 1.0))
        .build()
}

fn fast_config() -> ClusterConfig {
    ClusterConfig::default()
        .with_seed(42)
        .with_restarts(10)
        .with_iterations(50)
}

// ==================== Elbow Tests ====================

#[test]
fn test_elbow_picks_candidate_after_steepest_drop() {
    assert_eq!(elbow(&[10.0, 2.0, 1.5, 1.2]), Some(1));
    assert_eq!(elbow(&[10.0, 9.0, 1.0, 0.9]), Some(2));
    assert_eq!(elbow(&[3.0, 2.0, 1.0]), Some(1));
}

#[test]
fn test_elbow_needs_two_values() {
    assert_eq!(elbow(&[]), None);
    assert_eq!(elbow(&[1.0]), None);
    assert_eq!(elbow(&[1.0, 0.5]), Some(1));
}

// ==================== Fixed-k Tests ====================

#[test]
fn test_four_corners_converge_to_pairs() {
    let points = four_corners();
    let config = ClusterConfig::default().with_seed(7).with_k(Some(2));
    let result = KSearch::new(&points, config).unwrap().run().unwrap();

    assert_eq!(result.k, 2);
    assert!(result.distortion <= 0.5, "distortion {}", result.distortion);
    assert_eq!(result.cluster_of("a"), result.cluster_of("b"));
    assert_eq!(result.cluster_of("c"), result.cluster_of("d"));
    assert_ne!(result.cluster_of("a"), result.cluster_of("c"));
}

#[test]
fn test_repeated_point_single_cluster() {
    let points: Vec<FeatureVector> = (0..5)
        .map(|i| point(&format!("p{}", i), 2.5, -4.0))
        .collect();
    let search = KSearch::new(&points, fast_config()).unwrap();
    let run = search.best_of(1).unwrap();
    assert_eq!(run.distortion, 0.0);
}

#[test]
fn test_partition_covers_every_point_once() {
    let points = three_blobs(3, 8);
    for metric in DistanceMetric::ALL {
        let config = fast_config().with_metric(metric).with_k(Some(3));
        let result = KSearch::new(&points, config).unwrap().run().unwrap();
        assert!(result.distortion >= 0.0);
        assert_eq!(result.point_count(), points.len());
        assert_eq!(result.clusters.len(), 3);

        let mut seen = HashSet::new();
        for members in result.clusters.values() {
            assert!(!members.is_empty());
            for member in members {
                assert!(seen.insert(member.identity().unwrap().to_string()));
            }
        }
        assert_eq!(seen.len(), points.len());
    }
}

#[test]
fn test_seeded_search_is_deterministic() {
    let points = three_blobs(5, 10);
    for metric in [DistanceMetric::Euclidean, DistanceMetric::Cosine] {
        let config = fast_config().with_metric(metric).with_k(Some(3));
        let first = KSearch::new(&points, config.clone()).unwrap().best_of(3).unwrap();
        let second = KSearch::new(&points, config).unwrap().best_of(3).unwrap();
        assert_eq!(first.distortion, second.distortion);
        assert_eq!(first.assignment.labels, second.assignment.labels);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let points = three_blobs(8, 10);
    let parallel = KSearch::new(&points, fast_config().with_parallel(true))
        .unwrap()
        .best_of(3)
        .unwrap();
    let sequential = KSearch::new(&points, fast_config().with_parallel(false))
        .unwrap()
        .best_of(3)
        .unwrap();
    assert_eq!(parallel.distortion, sequential.distortion);
    assert_eq!(parallel.assignment.labels, sequential.assignment.labels);
}

#[test]
fn test_more_restarts_never_worse() {
    let points = three_blobs(13, 10);
    let few = KSearch::new(&points, fast_config().with_restarts(0))
        .unwrap()
        .best_of(3)
        .unwrap();
    let many = KSearch::new(&points, fast_config().with_restarts(20))
        .unwrap()
        .best_of(3)
        .unwrap();
    assert!(many.distortion <= few.distortion);
}

#[test]
fn test_medoid_result_reports_clustroids() {
    let points = vec![
        concepts("ice-1", &["ice", "snow"]),
        concepts("ice-2", &["ice", "snow", "glacier"]),
        concepts("ice-3", &["ice", "glacier"]),
        concepts("sea-1", &["ocean", "salinity"]),
        concepts("sea-2", &["ocean", "salinity", "current"]),
        concepts("sea-3", &["ocean", "current"]),
    ];
    let result = cluster(&points, DistanceMetric::Jaccard, Some(2)).unwrap();
    assert_eq!(result.metric, DistanceMetric::Jaccard);
    assert_eq!(result.cluster_of("ice-1"), result.cluster_of("ice-3"));
    assert_eq!(result.cluster_of("sea-1"), result.cluster_of("sea-3"));
    assert_ne!(result.cluster_of("ice-1"), result.cluster_of("sea-1"));
    assert!(result.representatives.values().all(|r| r.is_some()));
}

#[test]
fn test_euclidean_result_has_synthetic_centroids() {
    let points = four_corners();
    let result = cluster(&points, DistanceMetric::Euclidean, Some(2)).unwrap();
    assert_eq!(result.representatives.len(), 2);
    assert!(result.representatives.values().all(|r| r.is_none()));
}

// ==================== Auto-k Tests ====================

#[test]
fn test_auto_k_finds_three_blobs() {
    let points = three_blobs(1, 10);
    let config = ClusterConfig::default().with_seed(99).with_early_stop(true);
    let search = KSearch::new(&points, config).unwrap();

    let sweep = search.sweep().unwrap();
    let ks: Vec<usize> = sweep.distortions().iter().map(|(k, _)| *k).collect();
    assert_eq!(ks, vec![2, 3, 4, 5]);
    assert_eq!(sweep.chosen_k(), 3);

    let result = search.run().unwrap();
    assert_eq!(result.k, 3);
    for b in 0..3 {
        let first = result.cluster_of(&format!("blob{}-0", b));
        for i in 1..10 {
            assert_eq!(result.cluster_of(&format!("blob{}-{}", b, i)), first);
        }
    }
}

#[test]
fn test_sweep_choice_matches_elbow() {
    let points = three_blobs(17, 6);
    let search = KSearch::new(&points, fast_config().with_metric(DistanceMetric::Cosine)).unwrap();
    let sweep = search.sweep().unwrap();
    let distortions: Vec<f64> = sweep.distortions().iter().map(|(_, d)| *d).collect();
    assert_eq!(elbow(&distortions), Some(sweep.chosen));
    assert_eq!(sweep.chosen_run().k, sweep.chosen_k());
}

#[test]
fn test_auto_k_range_clamped_to_point_count() {
    let points = four_corners();
    let search = KSearch::new(&points, fast_config()).unwrap();
    let sweep = search.sweep().unwrap();
    assert_eq!(sweep.candidates.len(), 3);
    assert_eq!(sweep.candidates.last().unwrap().k, 4);
}

// ==================== Validation Tests ====================

#[test]
fn test_empty_input_rejected() {
    let err = KSearch::new(&[], ClusterConfig::default()).err().unwrap();
    assert!(matches!(err, ClusterError::EmptyInput));
}

#[test]
fn test_fixed_k_out_of_range() {
    let points = four_corners();
    for k in [0, 1, 5] {
        let err = cluster(&points, DistanceMetric::Euclidean, Some(k)).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidK { min: 2, max: 4, .. }));
    }
}

#[test]
fn test_auto_k_range_too_small() {
    let points = vec![point("a", 0.0, 0.0), point("b", 1.0, 1.0)];
    let err = cluster(&points, DistanceMetric::Euclidean, None).unwrap_err();
    assert!(matches!(err, ClusterError::KRangeTooSmall { candidates: 1 }));

    let points = four_corners();
    let config = fast_config().with_k_range(3, 3);
    let err = KSearch::new(&points, config).unwrap().run().unwrap_err();
    assert!(matches!(err, ClusterError::KRangeTooSmall { candidates: 1 }));
}

#[test]
fn test_duplicate_identity_rejected() {
    let points = vec![point("same", 0.0, 0.0), point("same", 1.0, 1.0)];
    let err = KSearch::new(&points, ClusterConfig::default()).err().unwrap();
    assert!(matches!(err, ClusterError::DuplicateIdentity(ref id) if id == "same"));
}

#[test]
fn test_non_finite_feature_rejected() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let points = vec![
            point("a", 0.0, 0.0),
            point("b", 1.0, 1.0),
            point("c", bad, 5.0),
            point("d", 2.0, 2.0),
        ];
        let err = KSearch::new(&points, fast_config().with_k(Some(2)))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ClusterError::NonFiniteFeature { ref identity, ref feature }
                if identity == "c" && feature == "x"
        ));
    }
}

// ==================== Cancellation Tests ====================

#[test]
fn test_cancelled_search() {
    let points = three_blobs(2, 5);
    let token = CancelToken::new();
    let search = KSearch::new(&points, fast_config())
        .unwrap()
        .with_cancel_token(token.clone());
    token.cancel();
    assert!(search.cancel_token().is_cancelled());
    let err = search.run().unwrap_err();
    assert!(matches!(err, ClusterError::Cancelled));
}

#[test]
fn test_deadline_exceeded() {
    let points = three_blobs(2, 5);
    let config = fast_config().with_deadline(Duration::ZERO).with_k(Some(2));
    let err = KSearch::new(&points, config).unwrap().run().unwrap_err();
    assert!(matches!(err, ClusterError::DeadlineExceeded));
}

#[test]
fn test_unbounded_deadline_saturates() {
    let config = fast_config().with_deadline(Duration::MAX).with_k(Some(2));
    assert_eq!(config.deadline_ms, Some(u64::MAX));
    let result = KSearch::new(&four_corners(), config).unwrap().run().unwrap();
    assert_eq!(result.k, 2);
}

use chrono::NaiveDate;
use fireid::{
    cluster_detections, ClusterError, DetectionPoint, EventClusterer, Labels, SearchStrategy,
};
use strum::IntoEnumIterator;

/*-------------------------------------------------------------------------------------------------
 *
 *                                       Test helpers
 *
 *-----------------------------------------------------------------------------------------------*/
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn pnt(lat: f64, lon: f64, dt: NaiveDate) -> DetectionPoint {
    DetectionPoint::new(lat, lon, dt)
}

/// A deterministic scatter of detections over a small region and a couple of weeks.
///
/// Integer hashing of the index spreads the points out so there is a mix of isolated points, small
/// groups, and long chains at the thresholds used below.
fn scatter(num: u64) -> Vec<DetectionPoint> {
    (0..num)
        .map(|i| {
            let lat = 38.0 + ((i * 7_919) % 1_000) as f64 * 0.0005;
            let lon = -121.0 + ((i * 104_729) % 1_000) as f64 * 0.0005;
            let day = 1 + ((i * 31) % 14) as u32;
            pnt(lat, lon, date(2021, 8, day))
        })
        .collect()
}

/// All the pairs of points that share an event.
fn co_membership(labels: &Labels) -> Vec<(usize, usize)> {
    let mut pairs = vec![];
    for i in 0..labels.len() {
        for j in (i + 1)..labels.len() {
            if labels.same_event(i, j) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/*-------------------------------------------------------------------------------------------------
 *
 *                                    Concrete scenarios
 *
 *-----------------------------------------------------------------------------------------------*/
#[test]
fn test_close_points_share_an_event() {
    let a = pnt(39.0, -121.0, date(2021, 7, 1));
    let b = pnt(39.0005, -121.0005, date(2021, 7, 1));
    let c = pnt(41.0, -120.0, date(2021, 7, 1));

    let labels = cluster_detections(&[a, b, c], 0.01, 0).unwrap();

    assert_eq!(labels.len(), 3);
    assert!(labels.same_event(0, 1));
    assert!(!labels.same_event(0, 2));
    assert_eq!(labels.num_events(), 2);
}

#[test]
fn test_date_gap_larger_than_threshold_separates() {
    let a = pnt(39.0, -121.0, date(2021, 7, 1));
    let b = pnt(39.0005, -121.0005, date(2021, 7, 3));

    let labels = cluster_detections(&[a, b], 0.01, 1).unwrap();

    assert!(!labels.same_event(0, 1));
    assert_eq!(labels.num_events(), 2);

    // Opening the window to the gap joins them.
    let labels = cluster_detections(&[a, b], 0.01, 2).unwrap();
    assert!(labels.same_event(0, 1));
}

#[test]
fn test_chains_connect_distant_points() {
    let a = pnt(39.0, -121.0, date(2021, 7, 1));
    let b = pnt(39.008, -121.0, date(2021, 7, 1));
    let c = pnt(39.016, -121.0, date(2021, 7, 1));

    // A and C are too far apart to be neighbors, but both are neighbors of B.
    assert!((c.lat - a.lat).abs() > 0.01);

    for strategy in SearchStrategy::iter() {
        // Input order puts the middle of the chain last.
        let labels = EventClusterer::new(0.01, 0)
            .unwrap()
            .search_strategy(strategy)
            .cluster(&[a, c, b])
            .unwrap();

        assert_eq!(labels.num_events(), 1);
        assert!(labels.same_event(0, 1));
        assert!(labels.same_event(1, 2));
    }
}

#[test]
fn test_chains_connect_across_days() {
    // Each day the fire moves a little, over a week it moves much farther than the threshold.
    let pnts: Vec<DetectionPoint> = (1..=7)
        .map(|day| pnt(39.0 + f64::from(day) * 0.008, -121.0, date(2021, 7, day)))
        .collect();

    let labels = cluster_detections(&pnts, 0.01, 1).unwrap();
    assert_eq!(labels.num_events(), 1);

    // Same day only, nothing connects.
    let labels = cluster_detections(&pnts, 0.01, 0).unwrap();
    assert_eq!(labels.num_events(), 7);
}

#[test]
fn test_empty_input() {
    let labels = cluster_detections(&[], 0.01, 1).unwrap();

    assert!(labels.is_empty());
    assert_eq!(labels.num_events(), 0);
    assert!(labels.members().is_empty());
}

#[test]
fn test_invalid_thresholds_fail_fast() {
    let pnts = [pnt(39.0, -121.0, date(2021, 7, 1))];

    assert_eq!(
        cluster_detections(&pnts, 0.0, 1),
        Err(ClusterError::InvalidSpatialThreshold(0.0))
    );
    assert_eq!(
        cluster_detections(&pnts, 0.01, -3),
        Err(ClusterError::NegativeTemporalThreshold(-3))
    );

    // Even with nothing to cluster the configuration is checked.
    assert!(cluster_detections(&[], -1.0, 1).is_err());
}

/*-------------------------------------------------------------------------------------------------
 *
 *                                        Properties
 *
 *-----------------------------------------------------------------------------------------------*/
#[test]
fn test_every_point_gets_a_positive_label() {
    let pnts = scatter(500);
    let labels = cluster_detections(&pnts, 0.01, 1).unwrap();

    assert_eq!(labels.len(), pnts.len());
    assert!(labels.iter().all(|(_, event)| event.get() >= 1));

    // Ids are contiguous from 1.
    let members = labels.members();
    assert_eq!(members.len(), labels.num_events());
    assert!(members.iter().all(|(_, group)| !group.is_empty()));
    assert_eq!(
        members.iter().map(|(_, group)| group.len()).sum::<usize>(),
        pnts.len()
    );
}

#[test]
fn test_isolated_points_are_singletons() {
    let pnts = [
        pnt(39.0, -121.0, date(2021, 7, 1)),
        // Close in space, too far in time.
        pnt(39.0, -121.0, date(2021, 7, 10)),
        // Close in time, too far in latitude.
        pnt(39.5, -121.0, date(2021, 7, 1)),
        // Close in time, too far in longitude.
        pnt(39.0, -121.5, date(2021, 7, 1)),
    ];

    let labels = cluster_detections(&pnts, 0.1, 2).unwrap();
    assert_eq!(labels.num_events(), 4);
}

#[test]
fn test_partition_is_the_same_on_every_run() {
    let pnts = scatter(400);
    let clusterer = EventClusterer::new(0.01, 1).unwrap();

    let first = clusterer.cluster(&pnts).unwrap();
    for _ in 0..3 {
        let again = clusterer.cluster(&pnts).unwrap();
        assert_eq!(co_membership(&first), co_membership(&again));
    }
}

#[test]
fn test_strategies_agree() {
    for (spatial, temporal) in [(0.002, 0), (0.01, 1), (0.03, 3), (1.0, 30)] {
        let pnts = scatter(600);

        let linear = EventClusterer::new(spatial, temporal)
            .unwrap()
            .search_strategy(SearchStrategy::Linear)
            .cluster(&pnts)
            .unwrap();

        let grid = EventClusterer::new(spatial, temporal)
            .unwrap()
            .search_strategy(SearchStrategy::Grid)
            .cluster(&pnts)
            .unwrap();

        // Seeds are taken in the same order, so even the numbering matches.
        assert_eq!(linear, grid, "spatial={} temporal={}", spatial, temporal);
    }
}

#[test]
fn test_larger_thresholds_only_merge() {
    let pnts = scatter(500);

    let mut prev_events = usize::MAX;
    let mut prev_pairs: Vec<(usize, usize)> = vec![];
    for spatial in [0.001, 0.005, 0.01, 0.02, 0.05] {
        let labels = cluster_detections(&pnts, spatial, 1).unwrap();
        let pairs = co_membership(&labels);

        assert!(labels.num_events() <= prev_events);
        assert!(prev_pairs.iter().all(|pair| pairs.binary_search(pair).is_ok()));

        prev_events = labels.num_events();
        prev_pairs = pairs;
    }

    let mut prev_events = usize::MAX;
    let mut prev_pairs: Vec<(usize, usize)> = vec![];
    for temporal in [0, 1, 2, 5, 14] {
        let labels = cluster_detections(&pnts, 0.01, temporal).unwrap();
        let pairs = co_membership(&labels);

        assert!(labels.num_events() <= prev_events);
        assert!(prev_pairs.iter().all(|pair| pairs.binary_search(pair).is_ok()));

        prev_events = labels.num_events();
        prev_pairs = pairs;
    }
}

#[test]
fn test_input_order_does_not_change_the_partition() {
    let pnts = scatter(300);
    let forward = cluster_detections(&pnts, 0.01, 1).unwrap();

    let reversed: Vec<DetectionPoint> = pnts.iter().rev().copied().collect();
    let backward = cluster_detections(&reversed, 0.01, 1).unwrap();

    let n = pnts.len();
    for i in 0..n {
        for j in (i + 1)..n {
            assert_eq!(
                forward.same_event(i, j),
                backward.same_event(n - 1 - i, n - 1 - j)
            );
        }
    }
}

#[test]
fn test_membership_matches_brute_force_reachability() {
    let pnts = scatter(200);
    let (spatial, temporal) = (0.01, 1);
    let labels = cluster_detections(&pnts, spatial, temporal).unwrap();

    let is_neighbor = |l: &DetectionPoint, r: &DetectionPoint| {
        (l.date - r.date).num_days().abs() <= temporal
            && (l.lat - r.lat).abs() <= spatial
            && (l.lon - r.lon).abs() <= spatial
    };

    // Reachability by repeated relaxation over an adjacency matrix.
    let n = pnts.len();
    let mut component: Vec<usize> = (0..n).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..n {
            for j in 0..n {
                if i != j && is_neighbor(&pnts[i], &pnts[j]) && component[j] < component[i] {
                    component[i] = component[j];
                    changed = true;
                }
            }
        }
    }

    for i in 0..n {
        for j in 0..n {
            assert_eq!(labels.same_event(i, j), component[i] == component[j]);
        }
    }
}

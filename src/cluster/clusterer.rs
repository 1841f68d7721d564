use super::{
    label::{ClusterState, EventId, Labels},
    neighbors::{build_search, NeighborSearch, SearchStrategy, Thresholds},
};
use crate::{detection::DetectionPoint, error::ClusterError};

/// Reported to a [ClusterObserver] each time a point receives its event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelAssigned {
    /// Position of the point in the collection being clustered.
    pub point: usize,
    /// The event the point joined.
    pub event: EventId,
    /// How many points have been labeled so far, including this one.
    pub labeled: usize,
    /// How many points are being clustered.
    pub total: usize,
}

/// Something that wants to watch a clustering run, e.g. to report progress.
///
/// Any `FnMut(&LabelAssigned)` closure is an observer.
pub trait ClusterObserver {
    fn label_assigned(&mut self, assignment: &LabelAssigned);
}

impl<F> ClusterObserver for F
where
    F: FnMut(&LabelAssigned),
{
    fn label_assigned(&mut self, assignment: &LabelAssigned) {
        self(assignment)
    }
}

/// Groups detections into wildfire events.
///
/// Two detections are in the same event if and only if there is a chain of detections between
/// them where each consecutive pair are neighbors under the [Thresholds].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventClusterer {
    thresholds: Thresholds,
    strategy: SearchStrategy,
}

impl EventClusterer {
    /// Create a clusterer, failing if the thresholds are invalid.
    pub fn new(spatial_threshold: f64, temporal_threshold_days: i64) -> Result<Self, ClusterError> {
        let thresholds = Thresholds::new(spatial_threshold, temporal_threshold_days)?;
        Ok(Self::with_thresholds(thresholds))
    }

    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        EventClusterer {
            thresholds,
            strategy: SearchStrategy::default(),
        }
    }

    /// Choose how neighborhoods are looked up. The resulting partition is the same either way.
    pub fn search_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Assign every point an event id.
    ///
    /// The returned [Labels] are indexed by the position of each point in `points`. An empty
    /// slice gives empty labels.
    pub fn cluster(&self, points: &[DetectionPoint]) -> Result<Labels, ClusterError> {
        self.cluster_with_observer(points, &mut |_: &LabelAssigned| {})
    }

    /// Same as [EventClusterer::cluster], but `observer` is told about every label assignment
    /// as it happens.
    pub fn cluster_with_observer<O>(
        &self,
        points: &[DetectionPoint],
        observer: &mut O,
    ) -> Result<Labels, ClusterError>
    where
        O: ClusterObserver + ?Sized,
    {
        if let Some(index) = points.iter().position(|pnt| !pnt.coord().is_finite()) {
            return Err(ClusterError::NonFiniteCoordinate { index });
        }

        let total = points.len();

        // Process in date order. The sort is stable so same day points keep their input order,
        // which keeps the event numbering reproducible.
        let mut order: Vec<usize> = (0..total).collect();
        order.sort_by_key(|&idx| points[idx].date);
        let sorted: Vec<DetectionPoint> = order.iter().map(|&idx| points[idx]).collect();

        let search = build_search(self.strategy, &sorted, self.thresholds);
        let states = sweep(search.as_ref(), total, |sorted_idx, event, labeled| {
            observer.label_assigned(&LabelAssigned {
                point: order[sorted_idx],
                event,
                labeled,
                total,
            })
        });

        let mut ids = vec![EventId::FIRST; total];
        for (sorted_idx, state) in states.into_iter().enumerate() {
            match state {
                ClusterState::Labeled(event) => ids[order[sorted_idx]] = event,
                ClusterState::Unmarked => panic!(
                    "detection {} was never assigned to a wildfire",
                    order[sorted_idx]
                ),
            }
        }

        let labels = Labels::new(ids);
        log::debug!(
            "clustered {} detections into {} wildfires using {} search",
            total,
            labels.num_events(),
            self.strategy
        );

        Ok(labels)
    }
}

/// Label connected components with a worklist flood fill.
///
/// Points are visited in index order. Each point still unmarked seeds a new event, and anything
/// reachable from it through a chain of neighbors is labeled with the same id. A point is labeled
/// at the moment it is pushed, so it is pushed at most once.
fn sweep<F>(search: &dyn NeighborSearch, num_points: usize, mut notify: F) -> Vec<ClusterState>
where
    F: FnMut(usize, EventId, usize),
{
    let mut states = vec![ClusterState::Unmarked; num_points];
    let mut next_event = EventId::FIRST;
    let mut num_labeled = 0;

    let mut stack: Vec<usize> = vec![];
    let mut neighborhood: Vec<usize> = vec![];

    for seed in 0..num_points {
        if states[seed] != ClusterState::Unmarked {
            continue;
        }

        let event = next_event;
        next_event = next_event.next();

        states[seed] = ClusterState::Labeled(event);
        num_labeled += 1;
        notify(seed, event, num_labeled);
        stack.push(seed);

        while let Some(current) = stack.pop() {
            neighborhood.clear();
            search.neighbors_of(current, &mut neighborhood);

            for &neighbor in &neighborhood {
                if states[neighbor] == ClusterState::Unmarked {
                    states[neighbor] = ClusterState::Labeled(event);
                    num_labeled += 1;
                    notify(neighbor, event, num_labeled);
                    stack.push(neighbor);
                }
            }
        }

        log::trace!("wildfire {} complete, {} points labeled", event, num_labeled);
    }

    states
}

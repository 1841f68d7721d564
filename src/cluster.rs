/*!
 * Types and functions for grouping detections into wildfire events.
 *
 * An event (or cluster) is a maximal group of [DetectionPoint](crate::DetectionPoint) objects that
 * are connected through a chain of detections, each close enough in both space and time to the
 * next one. Being in the same event does NOT imply two detections are close to each other, only
 * that they are reachable from each other.
 */

pub use clusterer::{ClusterObserver, EventClusterer, LabelAssigned};
pub use label::{EventId, Labels};
pub use neighbors::{
    SearchStrategy, Thresholds, DEFAULT_SPATIAL_THRESHOLD, DEFAULT_TEMPORAL_THRESHOLD_DAYS,
};

use crate::{detection::DetectionPoint, error::ClusterError};

mod clusterer;
mod label;
mod neighbors;

/**
 * Group detections into wildfire events.
 *
 * #Arguments
 * points - the detections, a detection's identity is its position in this slice.
 * spatial_threshold - the largest difference in degrees, along each axis, between neighbors.
 * temporal_threshold_days - the largest difference in days between neighbors.
 *
 * #Returns
 * An event id for every point, indexed the same as `points`.
 */
pub fn cluster_detections(
    points: &[DetectionPoint],
    spatial_threshold: f64,
    temporal_threshold_days: i64,
) -> Result<Labels, ClusterError> {
    EventClusterer::new(spatial_threshold, temporal_threshold_days)?.cluster(points)
}

pub use cluster::{
    cluster_detections, ClusterObserver, EventClusterer, EventId, LabelAssigned, Labels,
    SearchStrategy, Thresholds, DEFAULT_SPATIAL_THRESHOLD, DEFAULT_TEMPORAL_THRESHOLD_DAYS,
};
pub use database::{
    AddCountiesTransaction, AddDetectionsTransaction, AssignLabelsTransaction, DetectionDatabase,
    DetectionRows,
};
pub use detection::DetectionPoint;
pub use error::{ClusterError, FireIdResult};
pub use event::{summarize_events, CountyTable, EventDay, MIN_COUNTY_SHARE};
pub use geo::{BoundingBox, Coord, HALF_CELL_MARGIN, SQUARE_SIDE_DEGREES};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod cluster;
mod database;
mod detection;
mod error;
mod event;
mod geo;

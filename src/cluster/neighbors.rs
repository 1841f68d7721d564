use crate::{detection::DetectionPoint, error::ClusterError, geo::SQUARE_SIDE_DEGREES};
use rustc_hash::FxHashMap as HashMap;
use std::ops::Range;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Default spatial threshold, a hair over one grid cell so adjacent cells always connect.
pub const DEFAULT_SPATIAL_THRESHOLD: f64 = 1.01 * SQUARE_SIDE_DEGREES;

/// Default temporal threshold, detections on consecutive days connect.
pub const DEFAULT_TEMPORAL_THRESHOLD_DAYS: i64 = 1;

/// How close two detections must be to count as neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    spatial: f64,
    temporal_days: i64,
}

impl Thresholds {
    /// Validate and build a set of thresholds.
    ///
    /// # Arguments
    /// * spatial - the largest allowed difference in degrees of latitude, and separately of
    ///   longitude. Must be greater than zero.
    /// * temporal_days - the largest allowed difference in days. Zero means same day only.
    pub fn new(spatial: f64, temporal_days: i64) -> Result<Self, ClusterError> {
        if !(spatial.is_finite() && spatial > 0.0) {
            return Err(ClusterError::InvalidSpatialThreshold(spatial));
        }

        if temporal_days < 0 {
            return Err(ClusterError::NegativeTemporalThreshold(temporal_days));
        }

        Ok(Thresholds {
            spatial,
            temporal_days,
        })
    }

    pub fn spatial(&self) -> f64 {
        self.spatial
    }

    pub fn temporal_days(&self) -> i64 {
        self.temporal_days
    }

    /// The neighbor predicate.
    ///
    /// This is an axis aligned box test in degrees combined with a window in days. It is
    /// symmetric, and a point is always its own neighbor, callers exclude self matches.
    pub fn are_neighbors(&self, left: &DetectionPoint, right: &DetectionPoint) -> bool {
        (left.day_number() - right.day_number()).abs() <= self.temporal_days
            && (left.lat - right.lat).abs() <= self.spatial
            && (left.lon - right.lon).abs() <= self.spatial
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            spatial: DEFAULT_SPATIAL_THRESHOLD,
            temporal_days: DEFAULT_TEMPORAL_THRESHOLD_DAYS,
        }
    }
}

/// How neighborhoods are looked up during a sweep.
///
/// This never changes which points end up together, only how fast they are found.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum SearchStrategy {
    /// Binary search the date window, then scan every point in it.
    Linear,
    /// Bucket points by spatial cell, then search the date window in nearby cells only.
    #[default]
    Grid,
}

/// Neighborhood queries over a date sorted slice of points.
///
/// Indexes are positions in that slice.
pub(crate) trait NeighborSearch {
    /// Append the index of every neighbor of `center`, excluding `center` itself, to `buffer`.
    fn neighbors_of(&self, center: usize, buffer: &mut Vec<usize>);
}

/// Build the search structure for a strategy.
pub(crate) fn build_search<'a>(
    strategy: SearchStrategy,
    points: &'a [DetectionPoint],
    thresholds: Thresholds,
) -> Box<dyn NeighborSearch + 'a> {
    match strategy {
        SearchStrategy::Linear => Box::new(LinearScan::new(points, thresholds)),
        SearchStrategy::Grid => Box::new(GridIndex::new(points, thresholds)),
    }
}

/// The range of positions in the ascending `days` whose value is within `radius` of `day`.
fn day_window(days: &[i64], day: i64, radius: i64) -> Range<usize> {
    let first = day.saturating_sub(radius);
    let last = day.saturating_add(radius);

    let start = days.partition_point(|&d| d < first);
    let end = days.partition_point(|&d| d <= last);

    start..end
}

pub(crate) struct LinearScan<'a> {
    points: &'a [DetectionPoint],
    days: Vec<i64>,
    thresholds: Thresholds,
}

impl<'a> LinearScan<'a> {
    pub(crate) fn new(points: &'a [DetectionPoint], thresholds: Thresholds) -> Self {
        let days: Vec<i64> = points.iter().map(DetectionPoint::day_number).collect();
        debug_assert!(days.windows(2).all(|w| w[0] <= w[1]));

        LinearScan {
            points,
            days,
            thresholds,
        }
    }
}

impl<'a> NeighborSearch for LinearScan<'a> {
    fn neighbors_of(&self, center: usize, buffer: &mut Vec<usize>) {
        let center_pnt = &self.points[center];
        let window = day_window(&self.days, self.days[center], self.thresholds.temporal_days);

        buffer.extend(window.filter(|&idx| {
            idx != center && self.thresholds.are_neighbors(center_pnt, &self.points[idx])
        }));
    }
}

/// Points in one spatial cell, kept in date order.
#[derive(Debug, Default)]
struct GridCell {
    days: Vec<i64>,
    members: Vec<usize>,
}

/// A spatial hash with cells as wide as the spatial threshold.
///
/// A query looks at every cell overlapping the query box plus one more cell on each side, which
/// absorbs any rounding in the cell calculation. Points are inserted in date order, so each cell
/// stays date sorted and the temporal window is a binary search.
pub(crate) struct GridIndex<'a> {
    points: &'a [DetectionPoint],
    thresholds: Thresholds,
    cells: HashMap<(i64, i64), GridCell>,
}

impl<'a> GridIndex<'a> {
    pub(crate) fn new(points: &'a [DetectionPoint], thresholds: Thresholds) -> Self {
        let mut grid = GridIndex {
            points,
            thresholds,
            cells: HashMap::default(),
        };

        for (idx, pnt) in points.iter().enumerate() {
            let key = (grid.cell_of(pnt.lat), grid.cell_of(pnt.lon));
            let cell = grid.cells.entry(key).or_default();

            debug_assert!(cell.days.last().map_or(true, |&d| d <= pnt.day_number()));
            cell.days.push(pnt.day_number());
            cell.members.push(idx);
        }

        grid
    }

    fn cell_of(&self, val: f64) -> i64 {
        // Float to int casts saturate, so this stays monotone even for extreme values.
        (val / self.thresholds.spatial).floor() as i64
    }

    fn cell_range(&self, val: f64) -> std::ops::RangeInclusive<i64> {
        let spatial = self.thresholds.spatial;
        let first = self.cell_of(val - spatial).saturating_sub(1);
        let last = self.cell_of(val + spatial).saturating_add(1);

        first..=last
    }
}

impl<'a> NeighborSearch for GridIndex<'a> {
    fn neighbors_of(&self, center: usize, buffer: &mut Vec<usize>) {
        let center_pnt = &self.points[center];
        let center_day = center_pnt.day_number();

        for lat_cell in self.cell_range(center_pnt.lat) {
            for lon_cell in self.cell_range(center_pnt.lon) {
                let cell = match self.cells.get(&(lat_cell, lon_cell)) {
                    Some(cell) => cell,
                    None => continue,
                };

                let window = day_window(&cell.days, center_day, self.thresholds.temporal_days);
                buffer.extend(cell.members[window].iter().copied().filter(|&idx| {
                    idx != center && self.thresholds.are_neighbors(center_pnt, &self.points[idx])
                }));
            }
        }
    }
}

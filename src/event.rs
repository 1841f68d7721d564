/*!
 * Summaries of wildfire events for display.
 *
 * Once every detection has an [EventId], an event is described day by day with the bounding box of
 * that day's detections. Boxes can then be attributed to counties using a table of county
 * reference points.
 */
use crate::{
    cluster::{EventId, Labels},
    detection::DetectionPoint,
    geo::{BoundingBox, Coord},
};
use chrono::NaiveDate;
use rustc_hash::FxHashMap as HashMap;
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

/// The smallest share of the reference points in a box a county needs to be listed for it.
pub const MIN_COUNTY_SHARE: f64 = 0.01;

/// The extent of one event on one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDay {
    pub event: EventId,
    pub date: NaiveDate,
    /// Box around the day's detections, already expanded by the margin.
    pub bbox: BoundingBox,
    /// Number of detections in the event on this day.
    pub count: usize,
}

impl Display for EventDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "{:>6} {} {:>5} {}",
            self.event, self.date, self.count, self.bbox
        )
    }
}

/**
 * Describe each event, one entry per day it was detected.
 *
 * #Arguments
 * points - the detections that were clustered.
 * labels - the result of clustering `points`.
 * margin - degrees added to every side of each box, usually [HALF_CELL_MARGIN](crate::HALF_CELL_MARGIN)
 *          so the box covers the whole grid cell of the outermost detections.
 *
 * #Returns
 * The summaries ordered by event and then date.
 */
pub fn summarize_events(points: &[DetectionPoint], labels: &Labels, margin: f64) -> Vec<EventDay> {
    debug_assert_eq!(points.len(), labels.len());

    let mut days: BTreeMap<(EventId, NaiveDate), (BoundingBox, usize)> = BTreeMap::new();

    for (pnt, (_, event)) in points.iter().zip(labels.iter()) {
        let coord = pnt.coord();
        days.entry((event, pnt.date))
            .and_modify(|(bbox, count)| {
                bbox.extend(coord);
                *count += 1;
            })
            .or_insert((
                BoundingBox {
                    ll: coord,
                    ur: coord,
                },
                1,
            ));
    }

    days.into_iter()
        .map(|((event, date), (bbox, count))| EventDay {
            event,
            date,
            bbox: bbox.expand(margin),
            count,
        })
        .collect()
}

/// Reference points tagging locations with the county they are in.
///
/// Dense, evenly spaced points work best, a county's share of the points inside a box then
/// approximates its share of the box's area.
#[derive(Debug, Clone, Default)]
pub struct CountyTable {
    entries: Vec<(Coord, String)>,
}

impl CountyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, coord: Coord, county: S) {
        self.entries.push((coord, county.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counties with at least [MIN_COUNTY_SHARE] of the reference points inside `bbox`.
    ///
    /// Names are listed in the order they first appear in the table with any trailing
    /// " County" removed. Empty if no reference point is in the box.
    pub fn counties_within(&self, bbox: &BoundingBox) -> Vec<&str> {
        let mut order: Vec<&str> = vec![];
        let mut counts: HashMap<&str, usize> = HashMap::default();
        let mut total = 0usize;

        for (_, county) in self.entries.iter().filter(|(c, _)| bbox.contains(*c)) {
            total += 1;

            let count = counts.entry(county.as_str()).or_insert(0);
            if *count == 0 {
                order.push(county.as_str());
            }
            *count += 1;
        }

        order
            .into_iter()
            .filter(|county| counts[county] as f64 / total as f64 >= MIN_COUNTY_SHARE)
            .map(|county| county.strip_suffix(" County").unwrap_or(county))
            .collect()
    }
}

impl FromIterator<(Coord, String)> for CountyTable {
    fn from_iter<I: IntoIterator<Item = (Coord, String)>>(iter: I) -> Self {
        CountyTable {
            entries: iter.into_iter().collect(),
        }
    }
}

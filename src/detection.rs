/*!
 * A single observation of fire.
 *
 * A DetectionPoint is where and on which day fire was observed. Its identity is its position in
 * the collection handed to the clusterer, so two detections with the same location and date are
 * still two different points.
 */
use crate::geo::Coord;
use chrono::{Datelike, NaiveDate};

/// A location and day on which fire was detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// The day of the detection.
    pub date: NaiveDate,
}

impl DetectionPoint {
    pub fn new(lat: f64, lon: f64, date: NaiveDate) -> Self {
        DetectionPoint { lat, lon, date }
    }

    pub fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Day number used for temporal comparisons.
    pub(crate) fn day_number(&self) -> i64 {
        i64::from(self.date.num_days_from_ce())
    }
}

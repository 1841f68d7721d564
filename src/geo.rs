/*!
 * Geographic types.
 *
 * Everything here works directly in decimal degrees of latitude and longitude. No projection or
 * geodesic math is done, clustering only ever compares coordinate differences axis by axis.
 */
use std::fmt::{self, Display};

/// The side length of a grid cell in degrees, one mile at the equator.
pub const SQUARE_SIDE_DEGREES: f64 = 1.0 / (24_901.461 / 360.0);

/// Margin added on every side of an event's bounding box, half a grid cell.
pub const HALF_CELL_MARGIN: f64 = SQUARE_SIDE_DEGREES / 2.0;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Both the latitude and longitude are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// An axis aligned box described by its lower left and upper right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower left (south west) corner.
    pub ll: Coord,
    /// Upper right (north east) corner.
    pub ur: Coord,
}

impl BoundingBox {
    /// The smallest box containing all the coordinates, or `None` if there aren't any.
    pub fn enclosing<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;

        let mut bbox = BoundingBox {
            ll: first,
            ur: first,
        };

        for coord in iter {
            bbox.extend(coord);
        }

        Some(bbox)
    }

    /// Grow the box just enough to contain `coord`.
    pub fn extend(&mut self, coord: Coord) {
        self.ll.lat = self.ll.lat.min(coord.lat);
        self.ll.lon = self.ll.lon.min(coord.lon);
        self.ur.lat = self.ur.lat.max(coord.lat);
        self.ur.lon = self.ur.lon.max(coord.lon);
    }

    /// Grow the box by `margin` degrees on every side.
    pub fn expand(&self, margin: f64) -> Self {
        BoundingBox {
            ll: Coord {
                lat: self.ll.lat - margin,
                lon: self.ll.lon - margin,
            },
            ur: Coord {
                lat: self.ur.lat + margin,
                lon: self.ur.lon + margin,
            },
        }
    }

    /// Is the coordinate inside the box? Points on the boundary are inside.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.lat >= self.ll.lat
            && coord.lat <= self.ur.lat
            && coord.lon >= self.ll.lon
            && coord.lon <= self.ur.lon
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "({:.6}, {:.6}) <---> ({:.6}, {:.6})",
            self.ll.lat, self.ll.lon, self.ur.lat, self.ur.lon
        )
    }
}

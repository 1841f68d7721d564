/*! Storage of detections, their wildfire labels, and county reference points. */

use crate::{
    cluster::EventId,
    detection::DetectionPoint,
    event::CountyTable,
    geo::Coord,
    FireIdResult,
};
use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, ToSql};
use std::path::Path;

/// Represents a connection to the database where detections and their labels are stored.
pub struct DetectionDatabase {
    conn: Connection,
}

/// Detections as loaded from the database.
///
/// `ids[i]` is the row id of `points[i]`, and the points are in row id order.
#[derive(Debug, Clone, Default)]
pub struct DetectionRows {
    pub ids: Vec<i64>,
    pub points: Vec<DetectionPoint>,
}

impl DetectionDatabase {
    /// Open a connection, creating the database and its tables if they don't exist yet.
    pub fn connect<P: AsRef<Path>>(path: P) -> FireIdResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        const QUERY: &str = include_str!("database/create_db.sql");
        conn.execute_batch(QUERY)?;

        Ok(DetectionDatabase { conn })
    }

    /// Get a handle for adding detections. Everything added is committed when it is dropped.
    pub fn add_detection_handle(&self) -> FireIdResult<AddDetectionsTransaction> {
        const QUERY: &str = include_str!("database/add_detection.sql");
        let stmt = self.conn.prepare(QUERY)?;

        self.conn.execute("BEGIN", [])?;
        Ok(AddDetectionsTransaction(stmt, &self.conn))
    }

    /// Load every detection in row id order.
    pub fn load_detections(&self) -> FireIdResult<DetectionRows> {
        const QUERY: &str = include_str!("database/query_detections.sql");
        let mut stmt = self.conn.prepare(QUERY)?;

        let mut rows = DetectionRows::default();
        for res in stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let lat: f64 = row.get(1)?;
            let lon: f64 = row.get(2)?;
            let date: NaiveDate = row.get(3)?;

            Ok((id, DetectionPoint::new(lat, lon, date)))
        })? {
            let (id, point) = res?;
            rows.ids.push(id);
            rows.points.push(point);
        }

        log::debug!("loaded {} detections", rows.points.len());

        Ok(rows)
    }

    /// Get a handle for storing the wildfire label of each detection.
    ///
    /// Labels are only stored by [AssignLabelsTransaction::commit], if the handle is dropped
    /// without it every label assigned through it is rolled back.
    pub fn label_handle(&self) -> FireIdResult<AssignLabelsTransaction> {
        const QUERY: &str = include_str!("database/assign_label.sql");
        let stmt = self.conn.prepare(QUERY)?;

        self.conn.execute("BEGIN", [])?;
        Ok(AssignLabelsTransaction(stmt, &self.conn, false))
    }

    /// Load the stored wildfire label of every detection in row id order, `None` if the
    /// detection hasn't been labeled.
    pub fn load_labels(&self) -> FireIdResult<Vec<(i64, Option<u32>)>> {
        const QUERY: &str = include_str!("database/query_labels.sql");
        let mut stmt = self.conn.prepare(QUERY)?;

        let labels = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let wildfire_id: Option<u32> = row.get(1)?;

                Ok((id, wildfire_id))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(labels)
    }

    /// Get a handle for adding county reference points, committed when it is dropped.
    pub fn add_county_handle(&self) -> FireIdResult<AddCountiesTransaction> {
        const QUERY: &str = include_str!("database/add_county.sql");
        let stmt = self.conn.prepare(QUERY)?;

        self.conn.execute("BEGIN", [])?;
        Ok(AddCountiesTransaction(stmt, &self.conn))
    }

    /// Load all the county reference points.
    pub fn load_county_table(&self) -> FireIdResult<CountyTable> {
        const QUERY: &str = include_str!("database/query_counties.sql");
        let mut stmt = self.conn.prepare(QUERY)?;

        let table = stmt
            .query_map([], |row| {
                let lat: f64 = row.get(0)?;
                let lon: f64 = row.get(1)?;
                let county: String = row.get(2)?;

                Ok((Coord { lat, lon }, county))
            })?
            .collect::<Result<CountyTable, _>>()?;

        log::debug!("loaded {} county reference points", table.len());

        Ok(table)
    }
}

fn commit(conn: &Connection) {
    if let Err(err) = conn.execute("COMMIT", []) {
        log::error!("error committing to the database: {}", err);
    }
}

fn rollback(conn: &Connection) {
    if let Err(err) = conn.execute("ROLLBACK", []) {
        log::error!("error rolling back the database: {}", err);
    }
}

pub struct AddDetectionsTransaction<'a>(rusqlite::Statement<'a>, &'a Connection);

impl<'a> AddDetectionsTransaction<'a> {
    /// Add a detection and return its row id.
    pub fn add(&mut self, point: &DetectionPoint) -> FireIdResult<i64> {
        let _ = self
            .0
            .execute([&point.lat as &dyn ToSql, &point.lon, &point.date])?;

        Ok(self.1.last_insert_rowid())
    }
}

impl<'a> Drop for AddDetectionsTransaction<'a> {
    fn drop(&mut self) {
        commit(self.1);
    }
}

/// Stores labels all at once or not at all. The flag is set once the labels are committed.
pub struct AssignLabelsTransaction<'a>(rusqlite::Statement<'a>, &'a Connection, bool);

impl<'a> AssignLabelsTransaction<'a> {
    pub fn assign(&mut self, row_id: i64, event: EventId) -> FireIdResult<()> {
        let num_rows = self.0.execute([&event.get() as &dyn ToSql, &row_id])?;

        if num_rows != 1 {
            return Err(format!("no detection with row id {}", row_id).into());
        }

        Ok(())
    }

    /// Store every label assigned so far.
    pub fn commit(mut self) -> FireIdResult<()> {
        self.1.execute("COMMIT", [])?;
        self.2 = true;

        Ok(())
    }
}

impl<'a> Drop for AssignLabelsTransaction<'a> {
    fn drop(&mut self) {
        if !self.2 {
            log::warn!("labels were not committed, rolling back");
            rollback(self.1);
        }
    }
}

pub struct AddCountiesTransaction<'a>(rusqlite::Statement<'a>, &'a Connection);

impl<'a> AddCountiesTransaction<'a> {
    pub fn add(&mut self, coord: Coord, county: &str) -> FireIdResult<()> {
        let _ = self
            .0
            .execute([&coord.lat as &dyn ToSql, &coord.lon, &county])?;

        Ok(())
    }
}

impl<'a> Drop for AddCountiesTransaction<'a> {
    fn drop(&mut self) {
        commit(self.1);
    }
}

use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use fireid::{
    summarize_events, ClusterObserver, CountyTable, DetectionDatabase, EventClusterer, EventDay,
    EventId, FireIdResult, LabelAssigned, SearchStrategy, Thresholds, DEFAULT_SPATIAL_THRESHOLD,
    DEFAULT_TEMPORAL_THRESHOLD_DAYS, HALF_CELL_MARGIN,
};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Group fire detections into wildfires.
///
/// Every detection in the database is labeled with the id of the wildfire it belongs to.
/// Detections are part of the same wildfire when they are connected by a chain of detections that
/// are each close to the next in both space and time.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "identify_wildfires")]
#[clap(author, version, about)]
struct IdentifyOptionsInit {
    /// The path to the detections database file.
    ///
    /// If this is not specified, then the program will check for it in the "FIRES_DB"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "FIRES_DB")]
    database: PathBuf,

    /// The largest difference in degrees of latitude, and of longitude, between neighbors.
    #[clap(short, long)]
    #[clap(default_value_t = DEFAULT_SPATIAL_THRESHOLD)]
    spatial_threshold: f64,

    /// The largest difference in days between neighbors.
    #[clap(short, long)]
    #[clap(default_value_t = DEFAULT_TEMPORAL_THRESHOLD_DAYS)]
    temporal_threshold: i64,

    /// How neighbors are looked up, "grid" or "linear". Both give the same wildfires.
    #[clap(long)]
    #[clap(default_value_t = SearchStrategy::Grid)]
    search: SearchStrategy,

    /// List the counties each wildfire was in using the county_coords table.
    #[clap(short, long)]
    counties: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct IdentifyOptionsChecked {
    /// The path to the database file.
    database: PathBuf,

    /// Validated neighbor thresholds.
    thresholds: Thresholds,

    /// Neighbor lookup strategy.
    search: SearchStrategy,

    /// Attribute counties.
    counties: bool,

    /// Verbose output
    verbose: bool,
}

impl Display for IdentifyOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "          Database: {}", self.database.display())?;
        writeln!(f, " Spatial Threshold: {:.6} degrees", self.thresholds.spatial())?;
        writeln!(f, "Temporal Threshold: {} days", self.thresholds.temporal_days())?;
        writeln!(f, "            Search: {}", self.search)?;
        writeln!(f, "          Counties: {}", self.counties)?;
        writeln!(f, "\n")?;

        Ok(())
    }
}

/// Get the command line arguments and check them.
fn parse_args() -> FireIdResult<IdentifyOptionsChecked> {
    let IdentifyOptionsInit {
        database,
        spatial_threshold,
        temporal_threshold,
        search,
        counties,
        verbose,
    } = IdentifyOptionsInit::parse();

    let thresholds = Thresholds::new(spatial_threshold, temporal_threshold)?;

    Ok(IdentifyOptionsChecked {
        database,
        thresholds,
        search,
        counties,
        verbose,
    })
}

/*-------------------------------------------------------------------------------------------------
 *                                     Progress Reporting
 *-----------------------------------------------------------------------------------------------*/
/// Log how far along a run is, and when it should finish, every 10% of the detections.
struct ProgressLogger {
    start: DateTime<Utc>,
    step: usize,
    next_report: usize,
}

impl ProgressLogger {
    fn new(total: usize) -> Self {
        let step = (total / 10).max(1);

        ProgressLogger {
            start: Utc::now(),
            step,
            next_report: step,
        }
    }
}

impl ClusterObserver for ProgressLogger {
    fn label_assigned(&mut self, assignment: &LabelAssigned) {
        if assignment.labeled < self.next_report {
            return;
        }
        self.next_report += self.step;

        let elapsed = Utc::now() - self.start;
        let fraction = assignment.labeled as f64 / assignment.total as f64;
        let projected_ms = elapsed.num_milliseconds() as f64 / fraction;
        let finish = self.start + Duration::milliseconds(projected_ms as i64);

        info!(
            "labeled {:>9} of {:>9} detections ({:>3.0}%), estimated finish {}",
            assignment.labeled,
            assignment.total,
            fraction * 100.0,
            finish.format("%Y-%m-%d %H:%M:%SZ")
        );
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                         Output
 *-----------------------------------------------------------------------------------------------*/
fn print_event_days(days: &[EventDay], counties: Option<&CountyTable>) {
    println!(
        "{:>6} {:>10} {:>5} {:^48} Counties",
        "Fire", "Date", "Count", "Bounding Box"
    );

    for day in days {
        let names = match counties {
            Some(table) => {
                let names = table.counties_within(&day.bbox);
                if names.is_empty() {
                    "Unknown".to_owned()
                } else {
                    names.join("/")
                }
            }
            None => String::new(),
        };

        println!("{} {}", day, names);
    }
}

fn log_largest_event(days: &[EventDay]) {
    let mut totals: Vec<(EventId, usize, usize)> = vec![];
    for day in days {
        match totals.last_mut() {
            Some((event, count, num_days)) if *event == day.event => {
                *count += day.count;
                *num_days += 1;
            }
            _ => totals.push((day.event, day.count, 1)),
        }
    }

    if let Some((event, count, num_days)) = totals.iter().max_by_key(|(_, count, _)| *count) {
        info!("");
        info!("Largest wildfire:");
        info!("            id - {:>19}", event);
        info!("    detections - {:>19}", count);
        info!("          days - {:>19}", num_days);
        info!("");
    } else {
        warn!("");
        warn!("No wildfires identified!");
        warn!("");
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FireIdResult<()> {
    let opts = parse_args()?;

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;

    if opts.verbose {
        info!("{}", opts);
    }

    let db = DetectionDatabase::connect(&opts.database)?;
    let rows = db.load_detections()?;

    let clusterer = EventClusterer::with_thresholds(opts.thresholds).search_strategy(opts.search);
    let mut progress = ProgressLogger::new(rows.points.len());
    let labels = clusterer.cluster_with_observer(&rows.points, &mut progress)?;

    let mut assign = db.label_handle()?;
    for (idx, event) in labels.iter() {
        assign.assign(rows.ids[idx], event)?;
    }
    assign.commit()?;

    info!(
        "{} detections grouped into {} wildfires",
        labels.len(),
        labels.num_events()
    );

    let days = summarize_events(&rows.points, &labels, HALF_CELL_MARGIN);
    log_largest_event(&days);

    let county_table = if opts.counties {
        Some(db.load_county_table()?)
    } else {
        None
    };

    print_event_days(&days, county_table.as_ref());

    Ok(())
}

//! Time-indexed census series types produced by the loader and consumed
//! by the aggregation engine.

use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp format used throughout the census data: `MM/DD/YY-HH`,
/// 2-digit year, 24-hour hour, no minutes or seconds.
pub const DATE_FORMAT: &str = "%m/%d/%y-%H";

pub const DATE_COLUMN: &str = "Date";
pub const BIRTH_QUEUE_COLUMN: &str = "Birth Queue";
pub const POPULATION_COLUMN: &str = "Population";
pub const PREGNANT_COLUMN: &str = "Pregnant Mothers";

/// The four logical CSV columns, in their fixed positional order.
pub const EXPECTED_COLUMNS: [&str; 4] = [
    DATE_COLUMN,
    BIRTH_QUEUE_COLUMN,
    POPULATION_COLUMN,
    PREGNANT_COLUMN,
];

/// Parses a census timestamp in [`DATE_FORMAT`].
///
/// Chrono cannot build a `NaiveDateTime` from a date plus a bare hour, so
/// the date and hour parts are parsed separately and rejoined at minute 0.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let (date_part, hour_part) = raw.split_once('-')?;
    let date = NaiveDate::parse_from_str(date_part, "%m/%d/%y").ok()?;
    let hour: u32 = hour_part.parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

/// Formats a timestamp back into [`DATE_FORMAT`]. Inverse of [`parse_timestamp`].
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(DATE_FORMAT).to_string()
}

/// One hourly observation of the simulated population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub population: i64,
    pub birth_queue: i64,
    pub pregnant: i64,
}

/// A non-Date column of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Population,
    BirthQueue,
    PregnantMothers,
}

impl Column {
    fn value(self, sample: &Sample) -> i64 {
        match self {
            Column::Population => sample.population,
            Column::BirthQueue => sample.birth_queue,
            Column::PregnantMothers => sample.pregnant,
        }
    }
}

/// One consecutive difference, attributed to the timestamp of the later
/// of the two samples it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaPoint {
    pub timestamp: NaiveDateTime,
    pub change: i64,
}

/// A validated, time-indexed series of census samples.
///
/// Invariants (established by the loader, not re-checked downstream):
/// samples are in ingestion order, every column is fully populated, and
/// the pregnant-mothers offset correction has been applied exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesFrame {
    samples: Vec<Sample>,
}

impl SeriesFrame {
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Values of one column, in series order.
    pub fn column(&self, column: Column) -> Vec<i64> {
        self.samples.iter().map(|s| column.value(s)).collect()
    }

    /// Consecutive differences of one column. The result is one element
    /// shorter than the series; an empty or single-sample series has no
    /// deltas.
    pub fn delta(&self, column: Column) -> Vec<DeltaPoint> {
        self.samples
            .windows(2)
            .map(|pair| DeltaPoint {
                timestamp: pair[1].timestamp,
                change: column.value(&pair[1]) - column.value(&pair[0]),
            })
            .collect()
    }
}

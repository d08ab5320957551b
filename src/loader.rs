//! Loader/normalizer for raw census CSV data.
//!
//! Turns loosely-structured CSV text (header optional, produced either by
//! the scraper or by hand-edited exports) into a validated [`SeriesFrame`].

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::fetch::HttpClient;
use crate::series::{
    BIRTH_QUEUE_COLUMN, DATE_COLUMN, EXPECTED_COLUMNS, POPULATION_COLUMN, PREGNANT_COLUMN,
    Sample, SeriesFrame, parse_timestamp,
};
use crate::source::CensusSource;

/// Resolves the source and parses its contents into a normalized series.
pub async fn load_series<C: HttpClient>(
    source: CensusSource,
    client: &C,
) -> Result<SeriesFrame, LoadError> {
    let source_id = source.id();
    let text = source.resolve(client).await?;
    let frame = parse_series(&text, &source_id)?;
    info!(source = %source_id, samples = frame.len(), "Census series loaded");
    Ok(frame)
}

/// Classifies the first line of a resource as a header row.
///
/// The upstream data is sometimes produced without a header (raw scrape
/// output) and sometimes with one (after manual editing); a line that
/// contains all four expected column names as substrings is a header.
pub fn header_present(first_line: &str) -> bool {
    EXPECTED_COLUMNS.iter().all(|c| first_line.contains(c))
}

/// Parses CSV text into a [`SeriesFrame`], supplying column names
/// positionally when no header is present.
///
/// Duplicate-timestamp policy: a row whose timestamp equals the previous
/// row's replaces it (last write wins).
pub fn parse_series(text: &str, source_id: &str) -> Result<SeriesFrame, LoadError> {
    let first_line = text.lines().next().unwrap_or("");
    let has_header = header_present(first_line);
    debug!(source = %source_id, has_header, "Parsing census CSV");

    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let positions = if has_header {
        let headers = reader.headers().map_err(|e| LoadError::Read {
            source_id: source_id.to_string(),
            reason: e.to_string(),
        })?;
        column_positions(headers, source_id)?
    } else {
        // Positional schema: Date, Birth Queue, Population, Pregnant Mothers.
        [0, 1, 2, 3]
    };
    let [date_pos, queue_pos, pop_pos, preg_pos] = positions;

    let mut samples: Vec<Sample> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::Read {
            source_id: source_id.to_string(),
            reason: e.to_string(),
        })?;

        let timestamp = {
            let raw = field(&record, date_pos, DATE_COLUMN, source_id)?;
            parse_timestamp(raw).ok_or_else(|| {
                LoadError::invalid(source_id, DATE_COLUMN, format!("unparseable date '{raw}'"))
            })?
        };
        let sample = Sample {
            timestamp,
            birth_queue: count_field(&record, queue_pos, BIRTH_QUEUE_COLUMN, source_id)?,
            population: count_field(&record, pop_pos, POPULATION_COLUMN, source_id)?,
            pregnant: count_field(&record, preg_pos, PREGNANT_COLUMN, source_id)?,
        };

        // Last write wins for a repeated timestamp.
        if samples
            .last()
            .is_some_and(|last| last.timestamp == sample.timestamp)
        {
            samples.pop();
        }
        samples.push(sample);
    }

    if correct_pregnant_offset(&mut samples) {
        info!(source = %source_id, "Applied pregnant-mothers offset correction");
    }

    Ok(SeriesFrame::from_samples(samples))
}

/// One-shot correction for a known upstream off-by-one bias.
///
/// The source shifts the pregnant-mothers count up by one exactly when the
/// true minimum is 0, so a raw minimum of 1 means every value is offset.
/// A raw minimum of 0 or of 2+ is left untouched. Returns whether the
/// correction fired.
pub fn correct_pregnant_offset(samples: &mut [Sample]) -> bool {
    let min = samples.iter().map(|s| s.pregnant).min();
    if min != Some(1) {
        return false;
    }
    for sample in samples.iter_mut() {
        sample.pregnant -= 1;
    }
    true
}

/// Maps each expected column name to its index in the header row,
/// failing with the name of the first missing column.
fn column_positions(headers: &StringRecord, source_id: &str) -> Result<[usize; 4], LoadError> {
    let mut positions = [0usize; 4];
    for (slot, name) in positions.iter_mut().zip(EXPECTED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::invalid(source_id, name, "column not present"))?;
    }
    Ok(positions)
}

fn field<'r>(
    record: &'r StringRecord,
    pos: usize,
    column: &str,
    source_id: &str,
) -> Result<&'r str, LoadError> {
    record
        .get(pos)
        .ok_or_else(|| LoadError::invalid(source_id, column, "value missing from row"))
}

/// Reads one non-negative integer cell.
fn count_field(
    record: &StringRecord,
    pos: usize,
    column: &str,
    source_id: &str,
) -> Result<i64, LoadError> {
    let raw = field(record, pos, column, source_id)?;
    let value: i64 = raw.parse().map_err(|_| {
        LoadError::invalid(source_id, column, format!("non-numeric value '{raw}'"))
    })?;
    if value < 0 {
        return Err(LoadError::invalid(
            source_id,
            column,
            format!("negative count {value}"),
        ));
    }
    Ok(value)
}

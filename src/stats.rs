//! Aggregation engine: monthly lower-bound event counts and summary
//! metrics derived from a normalized census series.
//!
//! Exact birth and death counts cannot be recovered from hourly totals: a
//! birth and a death inside one sampling interval cancel in the delta.
//! Everything here is therefore a lower bound.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::series::{Column, DeltaPoint, SeriesFrame};

/// Lower-bound event counts for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRow {
    pub month: String,
    pub births: i64,
    pub deaths: i64,
    pub pregnancies: i64,
}

/// Monthly aggregate table, rows in chronological order.
///
/// The earliest month present in the input is always dropped: its deltas
/// span into an unobserved period and would understate the true counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyAggregate {
    pub rows: Vec<MonthlyRow>,
}

/// A named summary metric with its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Record {
    /// Human-readable value, e.g. `"3.4 months"`.
    pub fn formatted_value(&self) -> String {
        format!("{:.1} {}", self.value, self.unit)
    }
}

/// Derives the monthly aggregate table from a normalized series.
pub fn monthly_aggregate(frame: &SeriesFrame) -> MonthlyAggregate {
    let population_delta = frame.delta(Column::Population);
    let mother_delta = frame.delta(Column::PregnantMothers);

    // Zero deltas mean no net change and are attributed to no bucket.
    let births = sum_by_month(population_delta.iter().filter(|d| d.change > 0), |c| c);
    let deaths = sum_by_month(population_delta.iter().filter(|d| d.change < 0), |c| -c);
    let pregnancies = sum_by_month(mother_delta.iter().filter(|d| d.change > 0), |c| c);

    let earliest = frame.samples().first().map(|s| month_of(s.timestamp));

    let mut months: BTreeSet<NaiveDate> = BTreeSet::new();
    months.extend(births.keys());
    months.extend(deaths.keys());
    months.extend(pregnancies.keys());
    if let Some(first_month) = earliest {
        months.remove(&first_month);
    }

    // Outer join on the month key; a bucket with no events that month is 0.
    let rows = months
        .into_iter()
        .map(|month| MonthlyRow {
            month: pretty_month(month),
            births: births.get(&month).copied().unwrap_or(0),
            deaths: deaths.get(&month).copied().unwrap_or(0),
            pregnancies: pregnancies.get(&month).copied().unwrap_or(0),
        })
        .collect();

    MonthlyAggregate { rows }
}

/// Computes the fixed set of three summary records.
///
/// Ratios are taken as-is: a zero mean or a month with zero pregnancies
/// produces a non-finite value that propagates into the output rather
/// than being skipped or raised.
pub fn summary_records(frame: &SeriesFrame, monthly: &MonthlyAggregate) -> [Record; 3] {
    let births: Vec<f64> = monthly.rows.iter().map(|r| r.births as f64).collect();
    let avg_births_per_month = mean(&births);

    let queue = frame.column(Column::BirthQueue);
    let queue_f: Vec<f64> = queue.iter().map(|&v| v as f64).collect();
    let avg_queue_size = mean(&queue_f);
    let current_queue_size = queue.last().copied().unwrap_or(0) as f64;

    let babies_per_pregnancy: Vec<f64> = monthly
        .rows
        .iter()
        .map(|r| r.births as f64 / r.pregnancies as f64)
        .collect();
    // No months means no ratios to average; NaN, not a fabricated 0.0.
    let babies_value = if babies_per_pregnancy.is_empty() {
        f64::NAN
    } else {
        mean(&babies_per_pregnancy)
    };

    [
        Record {
            name: "Average Birth Queue Time",
            value: avg_queue_size / avg_births_per_month,
            unit: "months",
        },
        Record {
            name: "Projected Birth Queue Time Entering Now",
            value: current_queue_size / avg_births_per_month,
            unit: "months",
        },
        Record {
            name: "Average Number of Babies per Pregnancy",
            value: babies_value,
            unit: "babies",
        },
    ]
}

/// First-of-month key for a timestamp.
fn month_of(ts: NaiveDateTime) -> NaiveDate {
    ts.date().with_day(1).unwrap_or_else(|| ts.date())
}

/// Human-readable month label, e.g. `"March 2024"`.
fn pretty_month(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

fn sum_by_month<'a>(
    deltas: impl Iterator<Item = &'a DeltaPoint>,
    magnitude: impl Fn(i64) -> i64,
) -> BTreeMap<NaiveDate, i64> {
    let mut totals = BTreeMap::new();
    for delta in deltas {
        *totals.entry(month_of(delta.timestamp)).or_insert(0) += magnitude(delta.change);
    }
    totals
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Case counts for one country (or the globe) on one date. Active cases
/// are always derived at read time, never stored as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseCounts {
    pub confirmed_cases: i64,
    pub active_cases: i64,
    pub recovered_cases: i64,
    pub deaths: i64,
}

impl CaseCounts {
    pub fn derive(confirmed_cases: i64, recovered_cases: i64, deaths: i64) -> Self {
        Self {
            confirmed_cases,
            active_cases: confirmed_cases - deaths - recovered_cases,
            recovered_cases,
            deaths,
        }
    }
}

/// Per-country snapshot at the resolved last date, with the same counts at
/// the reference date for day-over-day deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
    pub country: String,
    pub current: CaseCounts,
    pub reference: CaseCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalTotalsRow {
    pub date: NaiveDate,
    pub totals: CaseCounts,
}

/// Global sums for the reference and current date. Row order is a
/// contract: reference (earlier) first, current second — consumers index
/// positionally to compute deltas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalTotals {
    pub rows: Vec<GlobalTotalsRow>,
}

impl GlobalTotals {
    pub fn reference(&self) -> Option<&GlobalTotalsRow> {
        self.rows.first()
    }

    pub fn current(&self) -> Option<&GlobalTotalsRow> {
        self.rows.get(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub confirmed_cases: i64,
    pub recovered_cases: i64,
    pub deaths: i64,
}

/// One country's category values indexed by date, from the dataset epoch
/// through the resolved last date. Leading zero entries are retained;
/// trimming them is a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySeries {
    pub country: String,
    pub points: Vec<SeriesPoint>,
}

impl CountrySeries {
    pub fn empty(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

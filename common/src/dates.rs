use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date-column naming convention of the backing tables.
///
/// The public dataset names its columns `_1_22_20`; some mirrors zero-pad
/// the month and day. Which one applies is a configuration decision so the
/// formatter stays deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTokenStyle {
    Unpadded,
    ZeroPadded,
}

/// A date-column identifier: a calendar date plus its rendering as the
/// column name it must exactly match in the backing dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DateToken {
    date: NaiveDate,
    style: DateTokenStyle,
    text: String,
}

impl DateToken {
    pub fn new(date: NaiveDate, style: DateTokenStyle) -> Self {
        let text = match style {
            DateTokenStyle::Unpadded => format!(
                "_{}_{}_{:02}",
                date.month(),
                date.day(),
                date.year() % 100
            ),
            DateTokenStyle::ZeroPadded => format!(
                "_{:02}_{:02}_{:02}",
                date.month(),
                date.day(),
                date.year() % 100
            ),
        };
        Self { date, style, text }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Token for the preceding calendar day. No probing; the prior column
    /// is assumed to exist.
    pub fn previous(&self) -> Self {
        Self::new(prev_day(self.date), self.style)
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn prev_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().expect("calendar underflow")
}

/// All tokens from `start` through `end` inclusive, one per calendar day.
/// The dataset has no gaps; a missing day is a data-integrity problem for
/// the caller, not a sparse series.
pub fn token_range(start: NaiveDate, end: NaiveDate, style: DateTokenStyle) -> Vec<DateToken> {
    let mut tokens = Vec::new();
    let mut current = start;
    while current <= end {
        tokens.push(DateToken::new(current, style));
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    tokens
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use common::category::Category;
use common::dates::{DateTokenStyle, token_range};
use common::{Error, Result};

use crate::gateway::QueryGateway;
use crate::gateway::sql;
use crate::models::{CountrySeries, SeriesPoint};
use crate::normalize::SchemaNormalizer;
use crate::resolver::ResolvedDates;

/// Reshapes the wide per-category rows of one country into a long series
/// indexed by calendar date. The date axis runs from the dataset's first
/// recorded date through the resolved last date with no gaps.
pub struct CountrySeriesBuilder {
    gateway: Arc<dyn QueryGateway>,
    normalizer: Arc<SchemaNormalizer>,
    dates: ResolvedDates,
    start_date: NaiveDate,
    style: DateTokenStyle,
}

impl CountrySeriesBuilder {
    pub fn new(
        gateway: Arc<dyn QueryGateway>,
        normalizer: Arc<SchemaNormalizer>,
        dates: ResolvedDates,
        start_date: NaiveDate,
        style: DateTokenStyle,
    ) -> Self {
        Self {
            gateway,
            normalizer,
            dates,
            start_date,
            style,
        }
    }

    /// One query per category, each summing every date column for the
    /// requested country, reshaped into one point per day. An empty series
    /// means the country has no matching rows — "not found", not "zero
    /// cases" — and is also what a degraded query yields.
    pub async fn country_series(&self, country: &str) -> Result<CountrySeries> {
        let canonical = self.normalizer.canonical(country);
        let tokens = token_range(self.start_date, self.dates.last.date(), self.style);

        let mut per_category: HashMap<Category, Vec<i64>> = HashMap::new();
        for category in Category::ALL {
            let statement = sql::series(category, &tokens, &canonical)?;
            let table = match self.gateway.execute(&statement).await {
                Ok(table) => table,
                Err(Error::QueryFailure(reason)) => {
                    warn!(category = %category, country = %canonical, %reason, "Series data unavailable");
                    return Ok(CountrySeries::empty(canonical));
                }
                Err(other) => return Err(other),
            };

            // A SUM over zero matching rows yields one all-null row.
            let values: Option<Vec<i64>> = if table.is_empty() {
                None
            } else {
                let cells: Vec<Option<i64>> = tokens
                    .iter()
                    .map(|t| table.cell(t.as_str(), 0).and_then(|c| c.as_i64()))
                    .collect();
                if cells.iter().all(Option::is_none) {
                    None
                } else {
                    Some(cells.into_iter().map(|v| v.unwrap_or(0)).collect())
                }
            };

            match values {
                Some(values) => {
                    per_category.insert(category, values);
                }
                None => {
                    info!(country = %canonical, category = %category, "No rows for country");
                    return Ok(CountrySeries::empty(canonical));
                }
            }
        }

        let value_at = |category: Category, idx: usize| -> i64 {
            per_category
                .get(&category)
                .and_then(|v| v.get(idx))
                .copied()
                .unwrap_or(0)
        };

        let points = tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| SeriesPoint {
                date: token.date(),
                confirmed_cases: value_at(Category::ConfirmedCases, idx),
                recovered_cases: value_at(Category::RecoveredCases, idx),
                deaths: value_at(Category::Deaths, idx),
            })
            .collect();

        Ok(CountrySeries {
            country: canonical,
            points,
        })
    }
}

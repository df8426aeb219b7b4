use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{info, warn};

use common::category::Category;
use common::{Error, Result};

use crate::gateway::sql::{self, COUNTRY, CURRENT_VALUE, REFERENCE_VALUE};
use crate::gateway::QueryGateway;
use crate::models::{CaseCounts, GlobalTotals, GlobalTotalsRow, OverviewRow};
use crate::normalize::SchemaNormalizer;
use crate::resolver::ResolvedDates;

pub const MIN_OVERVIEW_LIMIT: usize = 2;
pub const MAX_OVERVIEW_LIMIT: usize = 20;

/// Pair of (current, reference) values for one country in one category.
type SnapshotValues = HashMap<String, (i64, i64)>;

/// Combines the three per-category tables into derived views: the ranked
/// overview, global totals, and a single-country snapshot. Active cases are
/// computed here, never read from the store. Underlying query failures
/// degrade to empty results; only bad input surfaces as an error.
pub struct AggregationEngine {
    gateway: Arc<dyn QueryGateway>,
    normalizer: Arc<SchemaNormalizer>,
    dates: ResolvedDates,
}

impl AggregationEngine {
    pub fn new(
        gateway: Arc<dyn QueryGateway>,
        normalizer: Arc<SchemaNormalizer>,
        dates: ResolvedDates,
    ) -> Self {
        Self {
            gateway,
            normalizer,
            dates,
        }
    }

    /// Top countries ranked by confirmed cases, at most `limit` rows.
    /// `limit` outside [MIN_OVERVIEW_LIMIT, MAX_OVERVIEW_LIMIT] is rejected
    /// before any query is issued.
    pub async fn overview(&self, limit: usize) -> Result<Vec<OverviewRow>> {
        if !(MIN_OVERVIEW_LIMIT..=MAX_OVERVIEW_LIMIT).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between {MIN_OVERVIEW_LIMIT} and {MAX_OVERVIEW_LIMIT}, got {limit}"
            )));
        }

        info!(limit, "Making overview query");
        let Some(snapshots) = self.category_snapshots(None).await? else {
            return Ok(Vec::new());
        };
        let mut rows = combine(&snapshots);
        rows.sort_by(|a, b| {
            b.current
                .confirmed_cases
                .cmp(&a.current.confirmed_cases)
                .then_with(|| a.country.cmp(&b.country))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    /// Category sums across all countries for the reference and current
    /// date. Exactly two rows on success, reference first; empty on a
    /// degraded query.
    pub async fn global_totals(&self) -> Result<GlobalTotals> {
        let mut current = HashMap::new();
        let mut reference = HashMap::new();

        for category in Category::ALL {
            let statement = sql::global_total(category, &self.dates.last, &self.dates.reference)?;
            let table = match self.gateway.execute(&statement).await {
                Ok(table) => table,
                Err(Error::QueryFailure(reason)) => {
                    warn!(category = %category, %reason, "Global total data unavailable");
                    return Ok(GlobalTotals::default());
                }
                Err(other) => return Err(other),
            };
            let cur = table
                .cell(CURRENT_VALUE, 0)
                .and_then(|c| c.as_i64())
                .unwrap_or(0);
            let refv = table
                .cell(REFERENCE_VALUE, 0)
                .and_then(|c| c.as_i64())
                .unwrap_or(0);
            current.insert(category, cur);
            reference.insert(category, refv);
        }

        let totals_for = |values: &HashMap<Category, i64>| {
            CaseCounts::derive(
                values.get(&Category::ConfirmedCases).copied().unwrap_or(0),
                values.get(&Category::RecoveredCases).copied().unwrap_or(0),
                values.get(&Category::Deaths).copied().unwrap_or(0),
            )
        };

        Ok(GlobalTotals {
            rows: vec![
                GlobalTotalsRow {
                    date: self.dates.reference.date(),
                    totals: totals_for(&reference),
                },
                GlobalTotalsRow {
                    date: self.dates.last.date(),
                    totals: totals_for(&current),
                },
            ],
        })
    }

    /// Snapshot for a single country. `Ok(None)` covers both an absent
    /// country and a degraded query; the caller decides how to present it.
    pub async fn country_overview(&self, country: &str) -> Result<Option<OverviewRow>> {
        let canonical = self.normalizer.canonical(country);
        let Some(snapshots) = self.category_snapshots(Some(&canonical)).await? else {
            return Ok(None);
        };
        let mut rows = combine(&snapshots);
        if rows.is_empty() {
            info!(country = %canonical, "Country not present in dataset");
            return Ok(None);
        }
        Ok(Some(rows.remove(0)))
    }

    /// Queries every category at the resolved and reference tokens,
    /// normalizing each result. `Ok(None)` signals a degraded (failed)
    /// query; partial data is never returned.
    async fn category_snapshots(
        &self,
        country: Option<&str>,
    ) -> Result<Option<HashMap<Category, SnapshotValues>>> {
        let mut per_category = HashMap::new();

        for category in Category::ALL {
            let statement =
                sql::snapshot(category, &self.dates.last, &self.dates.reference, country)?;
            let table = match self.gateway.execute(&statement).await {
                Ok(table) => table,
                Err(Error::QueryFailure(reason)) => {
                    warn!(category = %category, %reason, "Snapshot data unavailable");
                    return Ok(None);
                }
                Err(other) => return Err(other),
            };
            let merged = self.normalizer.merge_aliases(&table);

            let mut values = SnapshotValues::new();
            for row in 0..merged.num_rows() {
                let name = merged
                    .cell(COUNTRY, row)
                    .and_then(|c| c.as_str())
                    .unwrap_or_default()
                    .to_string();
                let cur = merged
                    .cell(CURRENT_VALUE, row)
                    .and_then(|c| c.as_i64())
                    .unwrap_or(0);
                let refv = merged
                    .cell(REFERENCE_VALUE, row)
                    .and_then(|c| c.as_i64())
                    .unwrap_or(0);
                values.insert(name, (cur, refv));
            }
            per_category.insert(category, values);
        }

        Ok(Some(per_category))
    }
}

/// Joins the per-category maps on country name. A country missing from one
/// category contributes zero there; the recovered table in particular lags
/// the other two for some countries.
fn combine(per_category: &HashMap<Category, SnapshotValues>) -> Vec<OverviewRow> {
    let countries: BTreeSet<&String> = per_category.values().flat_map(|m| m.keys()).collect();

    let value_of = |category: Category, country: &str| -> (i64, i64) {
        per_category
            .get(&category)
            .and_then(|m| m.get(country))
            .copied()
            .unwrap_or((0, 0))
    };

    countries
        .into_iter()
        .map(|country| {
            let confirmed = value_of(Category::ConfirmedCases, country);
            let recovered = value_of(Category::RecoveredCases, country);
            let deaths = value_of(Category::Deaths, country);
            OverviewRow {
                country: country.clone(),
                current: CaseCounts::derive(confirmed.0, recovered.0, deaths.0),
                reference: CaseCounts::derive(confirmed.1, recovered.1, deaths.1),
            }
        })
        .collect()
}

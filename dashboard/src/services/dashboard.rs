use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::config::Settings;
use common::{Error, Result};

use crate::aggregate::AggregationEngine;
use crate::cache::{CacheKey, ResultCache};
use crate::gateway::{DataFusionGateway, QueryGateway};
use crate::models::{CountrySeries, GlobalTotals, OverviewRow};
use crate::normalize::SchemaNormalizer;
use crate::resolver::{DateResolver, ResolvedDates};
use crate::series::CountrySeriesBuilder;

/// Resolved data recency, exposed by the status endpoint. `stale` means the
/// date probe exhausted its budget and the service is running on the last
/// attempted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub last_updated: NaiveDate,
    pub last_column: String,
    pub stale: bool,
}

/// Wires the gateway, resolver, normalizer and cache together behind the
/// operations the presentation layer consumes. Date resolution runs once
/// at construction; everything downstream is parameterized by its outcome.
pub struct DashboardService {
    engine: AggregationEngine,
    series: CountrySeriesBuilder,
    normalizer: Arc<SchemaNormalizer>,
    cache: ResultCache,
    dates: ResolvedDates,
}

impl DashboardService {
    pub async fn new(settings: &Settings) -> Result<Self> {
        let gateway =
            Arc::new(DataFusionGateway::from_data_dir(Path::new(&settings.data.dir)).await?);
        Self::with_gateway(settings, gateway, Local::now().date_naive()).await
    }

    /// Assembly against an arbitrary gateway and a fixed "today", so tests
    /// and alternative stores skip the Parquet directory.
    pub async fn with_gateway(
        settings: &Settings,
        gateway: Arc<dyn QueryGateway>,
        today: NaiveDate,
    ) -> Result<Self> {
        let resolver = DateResolver::new(settings.date.token_style, settings.date.probe_attempts);
        let (last, stale) = match resolver.resolve_last_date(gateway.as_ref(), today).await {
            Ok(token) => (token, false),
            Err(Error::DateProbeExhausted {
                last_attempted,
                attempts,
            }) => {
                warn!(
                    %last_attempted,
                    attempts,
                    "Date probe exhausted, serving possibly-stale data from last attempted column"
                );
                (resolver.fallback_token(today), true)
            }
            Err(other) => return Err(other),
        };
        let dates = ResolvedDates::from_last(last, stale);
        info!(last = %dates.last, reference = %dates.reference, stale, "Resolved dataset dates");

        let normalizer = Arc::new(SchemaNormalizer::new(&settings.aliases));
        let engine = AggregationEngine::new(
            Arc::clone(&gateway),
            Arc::clone(&normalizer),
            dates.clone(),
        );
        let series = CountrySeriesBuilder::new(
            gateway,
            Arc::clone(&normalizer),
            dates.clone(),
            settings.data.start_date,
            settings.date.token_style,
        );
        let cache = ResultCache::new(Duration::from_secs(settings.cache.ttl_secs));

        Ok(Self {
            engine,
            series,
            normalizer,
            cache,
            dates,
        })
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            last_updated: self.dates.last.date(),
            last_column: self.dates.last.as_str().to_string(),
            stale: self.dates.stale,
        }
    }

    pub async fn overview(&self, limit: usize) -> Result<Vec<OverviewRow>> {
        let key = CacheKey::new("overview", &[&limit.to_string()]);
        if let Some(value) = self.cache.get(&key) {
            return Ok(serde_json::from_value(value)?);
        }
        let rows = self.engine.overview(limit).await?;
        self.cache.put(key, serde_json::to_value(&rows)?);
        Ok(rows)
    }

    pub async fn global_totals(&self) -> Result<GlobalTotals> {
        let key = CacheKey::new("global_totals", &[]);
        if let Some(value) = self.cache.get(&key) {
            return Ok(serde_json::from_value(value)?);
        }
        let totals = self.engine.global_totals().await?;
        self.cache.put(key, serde_json::to_value(&totals)?);
        Ok(totals)
    }

    /// `NotFound` when the country has no rows (or data is unavailable);
    /// callers show "country not recognized" instead of an empty chart.
    pub async fn country_overview(&self, country: &str) -> Result<OverviewRow> {
        let canonical = self.normalizer.canonical(country);
        let key = CacheKey::new("country_overview", &[&canonical]);
        if let Some(value) = self.cache.get(&key) {
            return Ok(serde_json::from_value(value)?);
        }
        match self.engine.country_overview(&canonical).await? {
            Some(row) => {
                self.cache.put(key, serde_json::to_value(&row)?);
                Ok(row)
            }
            None => Err(Error::NotFound(country.to_string())),
        }
    }

    pub async fn country_series(&self, country: &str) -> Result<CountrySeries> {
        let canonical = self.normalizer.canonical(country);
        let key = CacheKey::new("country_series", &[&canonical]);
        if let Some(value) = self.cache.get(&key) {
            return Ok(serde_json::from_value(value)?);
        }
        let series = self.series.country_series(&canonical).await?;
        if series.is_empty() {
            return Err(Error::NotFound(country.to_string()));
        }
        self.cache.put(key, serde_json::to_value(&series)?);
        Ok(series)
    }
}

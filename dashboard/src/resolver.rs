use chrono::NaiveDate;
use tracing::{debug, info};

use common::category::Category;
use common::dates::{DateToken, DateTokenStyle, prev_day};
use common::{Error, Result};

use crate::gateway::{QueryGateway, sql};

/// The resolved last date column and its reference (previous-day) column.
/// `stale` is set when the resolver exhausted its probe budget and the
/// service fell back to the last attempted token.
#[derive(Debug, Clone)]
pub struct ResolvedDates {
    pub last: DateToken,
    pub reference: DateToken,
    pub stale: bool,
}

impl ResolvedDates {
    pub fn from_last(last: DateToken, stale: bool) -> Self {
        let reference = last.previous();
        Self {
            last,
            reference,
            stale,
        }
    }
}

/// Finds the most recent populated date column by probing backwards from
/// today, one trial query per candidate day. Probing is strictly
/// sequential: each trial depends on the previous one having failed.
pub struct DateResolver {
    style: DateTokenStyle,
    max_attempts: u32,
}

impl DateResolver {
    pub fn new(style: DateTokenStyle, max_attempts: u32) -> Self {
        Self {
            style,
            max_attempts,
        }
    }

    /// Probes candidate date columns starting at `today`. A query failure
    /// means the column does not exist yet (the dataset lags the calendar);
    /// the candidate moves back one day and the trial repeats. Exhausting
    /// the budget surfaces `DateProbeExhausted` so the caller can decide
    /// between retrying later and serving possibly-stale data.
    pub async fn resolve_last_date(
        &self,
        gateway: &dyn QueryGateway,
        today: NaiveDate,
    ) -> Result<DateToken> {
        let mut candidate = today;
        let mut last_attempted = None;

        for attempt in 0..self.max_attempts {
            let token = DateToken::new(candidate, self.style);
            let statement = sql::probe(Category::ConfirmedCases, &token)?;
            match gateway.execute(&statement).await {
                Ok(_) => {
                    info!(token = %token, attempt, "Resolved last date column");
                    return Ok(token);
                }
                Err(Error::QueryFailure(reason)) => {
                    debug!(token = %token, attempt, %reason, "Date column probe failed");
                    candidate = prev_day(candidate);
                    last_attempted = Some(token);
                }
                Err(other) => return Err(other),
            }
        }

        Err(Error::DateProbeExhausted {
            last_attempted: last_attempted.map(|t| t.as_str().to_string()).unwrap_or_default(),
            attempts: self.max_attempts,
        })
    }

    /// Best-effort token after an exhausted probe: the last candidate the
    /// resolver tried. Data behind it may not exist; callers adopting it
    /// should mark their results stale.
    pub fn fallback_token(&self, today: NaiveDate) -> DateToken {
        let mut date = today;
        for _ in 1..self.max_attempts {
            date = prev_day(date);
        }
        DateToken::new(date, self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::gateway::Statement;
    use crate::models::Table;

    /// Gateway that fails every probe whose text references a column not in
    /// the allow list, counting attempts.
    struct ScriptedGateway {
        present_column: &'static str,
        probes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QueryGateway for ScriptedGateway {
        async fn execute(&self, statement: &Statement) -> common::Result<Table> {
            self.probes.lock().unwrap().push(statement.text.clone());
            if statement.text.contains(self.present_column) {
                Ok(Table::empty())
            } else {
                Err(Error::QueryFailure("column does not exist".to_string()))
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn resolves_after_four_failed_probes() {
        // today .. today-3 missing, today-4 present
        let gateway = ScriptedGateway {
            present_column: "_5_6_20",
            probes: Mutex::new(Vec::new()),
        };
        let resolver = DateResolver::new(DateTokenStyle::Unpadded, 5);

        let token = resolver
            .resolve_last_date(&gateway, date(2020, 5, 10))
            .await
            .unwrap();

        assert_eq!(token.as_str(), "_5_6_20");
        assert_eq!(token.date(), date(2020, 5, 6));
        assert_eq!(gateway.probes.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn immediate_hit_probes_once() {
        let gateway = ScriptedGateway {
            present_column: "_5_10_20",
            probes: Mutex::new(Vec::new()),
        };
        let resolver = DateResolver::new(DateTokenStyle::Unpadded, 5);

        let token = resolver
            .resolve_last_date(&gateway, date(2020, 5, 10))
            .await
            .unwrap();

        assert_eq!(token.as_str(), "_5_10_20");
        assert_eq!(gateway.probes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_last_attempt() {
        let gateway = ScriptedGateway {
            present_column: "_1_1_19",
            probes: Mutex::new(Vec::new()),
        };
        let resolver = DateResolver::new(DateTokenStyle::Unpadded, 5);

        let err = resolver
            .resolve_last_date(&gateway, date(2020, 5, 10))
            .await
            .unwrap_err();

        match err {
            Error::DateProbeExhausted {
                last_attempted,
                attempts,
            } => {
                assert_eq!(last_attempted, "_5_6_20");
                assert_eq!(attempts, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            resolver.fallback_token(date(2020, 5, 10)).as_str(),
            "_5_6_20"
        );
    }
}

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use common::config::{CacheConfig, DataConfig, DateConfig, Settings};
use common::dates::DateTokenStyle;
use common::naming::default_aliases;
use common::{Error, Result};
use dashboard::gateway::{QueryGateway, Statement};
use dashboard::models::{Cell, Column, Table};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_settings(start_date: NaiveDate) -> Settings {
    Settings {
        data: DataConfig {
            dir: "unused".to_string(),
            source_url: String::new(),
            start_date,
        },
        date: DateConfig {
            token_style: DateTokenStyle::Unpadded,
            probe_attempts: 5,
        },
        cache: CacheConfig { ttl_secs: 300 },
        api_port: 0,
        aliases: default_aliases(),
    }
}

/// Scripted gateway: answers the statement shapes the engine issues from
/// in-memory fixtures instead of a real store.
///
/// Statements are classified by their text: probes end in `LIMIT 1`,
/// global totals alias a SUM to `current_value`, series statements carry
/// one `SUM(...)` per date token, and everything else is a snapshot.
pub struct MockGateway {
    /// The one date column that exists; probes for anything else fail.
    pub present_token: String,
    /// table -> (country, current, reference) rows
    pub snapshots: HashMap<&'static str, Vec<(&'static str, i64, i64)>>,
    /// table -> country -> one value per date token
    pub series: HashMap<&'static str, HashMap<&'static str, Vec<i64>>>,
    /// When set, every non-probe statement fails.
    pub fail_data: bool,
    pub queries: Mutex<Vec<Statement>>,
}

impl MockGateway {
    pub fn new(present_token: &str) -> Self {
        Self {
            present_token: present_token.to_string(),
            snapshots: HashMap::new(),
            series: HashMap::new(),
            fail_data: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn table_name(text: &str) -> &str {
        text.split("FROM ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or_default()
    }

    fn quoted_tokens(text: &str) -> Vec<&str> {
        text.split("SUM(\"")
            .skip(1)
            .filter_map(|part| part.split('"').next())
            .collect()
    }

    fn bound_country(statement: &Statement) -> Option<&str> {
        statement.params.first().map(|p| match p {
            dashboard::gateway::Param::Str(s) => s.as_str(),
            dashboard::gateway::Param::Int(_) => "",
        })
    }
}

#[async_trait]
impl QueryGateway for MockGateway {
    async fn execute(&self, statement: &Statement) -> Result<Table> {
        self.queries.lock().unwrap().push(statement.clone());
        let text = statement.text.as_str();

        if text.ends_with("LIMIT 1") {
            let probed = text.split('"').nth(1).unwrap_or_default();
            return if probed == self.present_token {
                Ok(Table::empty())
            } else {
                Err(Error::QueryFailure(format!("no field named {probed}")))
            };
        }

        if self.fail_data {
            return Err(Error::QueryFailure("store unavailable".to_string()));
        }

        let table = Self::table_name(text);

        if text.contains("AS current_value") && text.contains("SUM(") {
            let rows = self.snapshots.get(table).cloned().unwrap_or_default();
            let current: i64 = rows.iter().map(|(_, cur, _)| cur).sum();
            let reference: i64 = rows.iter().map(|(_, _, refv)| refv).sum();
            return Ok(Table::new(vec![
                Column::new("current_value", vec![Cell::Int(current)]),
                Column::new("reference_value", vec![Cell::Int(reference)]),
            ]));
        }

        if text.contains("SUM(") {
            let tokens = Self::quoted_tokens(text);
            let country = Self::bound_country(statement).unwrap_or_default();
            let values = self
                .series
                .get(table)
                .and_then(|per_country| per_country.get(country));
            let columns = tokens
                .iter()
                .enumerate()
                .map(|(idx, token)| {
                    let cell = match values {
                        Some(values) => Cell::Int(values.get(idx).copied().unwrap_or(0)),
                        None => Cell::Null,
                    };
                    Column::new(token.to_string(), vec![cell])
                })
                .collect();
            return Ok(Table::new(columns));
        }

        // Snapshot shape, optionally filtered by the bound country.
        let mut rows = self.snapshots.get(table).cloned().unwrap_or_default();
        if let Some(country) = Self::bound_country(statement) {
            rows.retain(|(name, _, _)| *name == country);
        }
        Ok(Table::new(vec![
            Column::new(
                "country",
                rows.iter()
                    .map(|(name, _, _)| Cell::Str(name.to_string()))
                    .collect(),
            ),
            Column::new(
                "current_value",
                rows.iter().map(|(_, cur, _)| Cell::Int(*cur)).collect(),
            ),
            Column::new(
                "reference_value",
                rows.iter().map(|(_, _, refv)| Cell::Int(*refv)).collect(),
            ),
        ]))
    }
}

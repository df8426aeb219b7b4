pub mod sql;

mod datafusion;
pub use self::datafusion::{DataFusionGateway, batches_to_table};

use async_trait::async_trait;
use common::Result;

use crate::models::Table;

/// A bound value for a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Str(String),
    Int(i64),
}

/// A read-only statement with positional bound parameters. Identifiers are
/// rendered by the builders in [`sql`]; values travel as params.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Vec<Param>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
}

/// Executes statements against the backing columnar store.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// `Error::QueryFailure` means the store could not satisfy the
    /// statement — typically a referenced date column that does not exist
    /// yet — and carries no partial data.
    async fn execute(&self, statement: &Statement) -> Result<Table>;
}

use std::path::Path;

use arrow::array::{Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::execution::context::SessionContext;
use datafusion::prelude::ParquetReadOptions;
use datafusion::scalar::ScalarValue;
use tracing::debug;

use common::category::Category;
use common::{Error, Result};

use super::{Param, QueryGateway, Statement};
use crate::models::{Cell, Column, Table};

/// Production gateway: a DataFusion session with the three category tables
/// registered from the Parquet data directory at startup.
pub struct DataFusionGateway {
    ctx: SessionContext,
}

impl DataFusionGateway {
    pub async fn from_data_dir(dir: &Path) -> Result<Self> {
        let ctx = SessionContext::new();
        for category in Category::ALL {
            let path = dir.join(format!("{}.parquet", category.table_name()));
            if !path.exists() {
                return Err(Error::Storage(format!(
                    "missing table file {} (run the ingest pipeline first)",
                    path.display()
                )));
            }
            ctx.register_parquet(
                category.table_name(),
                path.to_string_lossy().as_ref(),
                ParquetReadOptions::default(),
            )
            .await?;
            debug!(table = category.table_name(), path = %path.display(), "Registered table");
        }
        Ok(Self { ctx })
    }

    /// Session with caller-registered tables; used by tests to run the
    /// real SQL path against in-memory tables.
    pub fn from_context(ctx: SessionContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl QueryGateway for DataFusionGateway {
    async fn execute(&self, statement: &Statement) -> Result<Table> {
        let df = self
            .ctx
            .sql(&statement.text)
            .await
            .map_err(|e| Error::QueryFailure(e.to_string()))?;
        let df = if statement.params.is_empty() {
            df
        } else {
            let values: Vec<ScalarValue> = statement
                .params
                .iter()
                .map(|p| match p {
                    Param::Str(s) => ScalarValue::from(s.as_str()),
                    Param::Int(i) => ScalarValue::from(*i),
                })
                .collect();
            df.with_param_values(values)
                .map_err(|e| Error::QueryFailure(e.to_string()))?
        };
        let batches = df
            .collect()
            .await
            .map_err(|e| Error::QueryFailure(e.to_string()))?;
        batches_to_table(&batches)
    }
}

/// Flattens record batches into the gateway's column-ordered table model.
pub fn batches_to_table(batches: &[RecordBatch]) -> Result<Table> {
    let Some(first) = batches.first() else {
        return Ok(Table::empty());
    };

    let schema = first.schema();
    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();

    for batch in batches {
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row_idx in 0..batch.num_rows() {
                column.cells.push(array_cell(array.as_ref(), row_idx));
            }
        }
    }

    Ok(Table::new(columns))
}

fn array_cell(array: &dyn Array, index: usize) -> Cell {
    if array.is_null(index) {
        return Cell::Null;
    }

    match array.data_type() {
        DataType::Int32 => {
            let array = array.as_any().downcast_ref::<Int32Array>().unwrap();
            Cell::Int(array.value(index) as i64)
        }
        DataType::Int64 => {
            let array = array.as_any().downcast_ref::<Int64Array>().unwrap();
            Cell::Int(array.value(index))
        }
        DataType::Float64 => {
            let array = array.as_any().downcast_ref::<Float64Array>().unwrap();
            Cell::Float(array.value(index))
        }
        DataType::Utf8 => {
            let array = array.as_any().downcast_ref::<StringArray>().unwrap();
            Cell::Str(array.value(index).to_string())
        }
        _ => Cell::Null,
    }
}

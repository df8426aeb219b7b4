use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use common::dates::{DateToken, DateTokenStyle};
use common::naming::AliasTable;
use common::{Error, Result};

const COUNTRY_HEADER: &str = "Country/Region";

/// Parses a source date header like `1/22/20` (month/day/two-digit year).
fn parse_date_header(header: &str) -> Option<NaiveDate> {
    let mut parts = header.split('/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Reduces the wide province-level source CSV to one row per canonical
/// country: provinces summed, aliases merged, date headers renamed to the
/// tokens the dashboard queries by. Latitude/longitude and every other
/// non-date column are dropped.
pub fn build_country_table(
    csv_bytes: &[u8],
    aliases: &AliasTable,
    style: DateTokenStyle,
) -> Result<RecordBatch> {
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(Cursor::new(csv_bytes), Some(1024))?;
    let schema = Arc::new(schema);

    let mut date_columns: Vec<(NaiveDate, usize)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter_map(|(idx, field)| parse_date_header(field.name()).map(|d| (d, idx)))
        .collect();
    date_columns.sort_by_key(|(date, _)| *date);
    if date_columns.is_empty() {
        return Err(Error::Storage("no date columns in source CSV".to_string()));
    }

    let country_idx = schema
        .fields()
        .iter()
        .position(|field| field.name() == COUNTRY_HEADER)
        .ok_or_else(|| Error::Storage(format!("source CSV missing '{COUNTRY_HEADER}' column")))?;

    // canonical country -> running totals, one slot per date column
    let mut totals: BTreeMap<String, Vec<i64>> = BTreeMap::new();

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .build(Cursor::new(csv_bytes))?;
    for batch in reader {
        let batch = batch?;
        let countries = batch
            .column(country_idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::Storage("country column is not a string column".to_string()))?;

        for row in 0..batch.num_rows() {
            let canonical = aliases.canonical(countries.value(row));
            let entry = totals
                .entry(canonical)
                .or_insert_with(|| vec![0; date_columns.len()]);
            for (slot, (_, col_idx)) in entry.iter_mut().zip(&date_columns) {
                *slot += numeric_value(batch.column(*col_idx).as_ref(), row);
            }
        }
    }

    let tokens: Vec<DateToken> = date_columns
        .iter()
        .map(|(date, _)| DateToken::new(*date, style))
        .collect();

    let mut fields = vec![Field::new("country", DataType::Utf8, false)];
    fields.extend(
        tokens
            .iter()
            .map(|t| Field::new(t.as_str(), DataType::Int64, false)),
    );
    let out_schema = Arc::new(Schema::new(fields));

    let country_names: Vec<String> = totals.keys().cloned().collect();
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(country_names))];
    for idx in 0..tokens.len() {
        let values: Vec<i64> = totals.values().map(|counts| counts[idx]).collect();
        arrays.push(Arc::new(Int64Array::from(values)));
    }

    RecordBatch::try_new(out_schema, arrays).map_err(Error::from)
}

/// Count cell as an integer. The inference step types the date columns as
/// Int64 unless a mirror widens them; anything unreadable counts as zero.
fn numeric_value(array: &dyn Array, row: usize) -> i64 {
    if array.is_null(row) {
        return 0;
    }
    match array.data_type() {
        DataType::Int64 => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(0, |a| a.value(row)),
        DataType::Float64 => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(0, |a| a.value(row) as i64),
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| a.value(row).trim().parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

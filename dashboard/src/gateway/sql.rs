//! Statement builders for the dashboard's read shapes. Date columns and
//! table names cannot be bound as parameters, so they are validated and
//! quoted here; country values are always bound as `$1`.

use common::category::Category;
use common::dates::DateToken;
use common::{Error, Result};

use super::{Param, Statement};

/// Column aliases used by every snapshot-shaped statement.
pub const CURRENT_VALUE: &str = "current_value";
pub const REFERENCE_VALUE: &str = "reference_value";
pub const COUNTRY: &str = "country";

fn quote_ident(ident: &str) -> Result<String> {
    let safe = !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')' | ','));
    if !safe {
        return Err(Error::InvalidInput(format!("unsafe identifier: {ident}")));
    }
    Ok(format!("\"{ident}\""))
}

/// Minimal trial statement: succeeds iff the date column exists.
pub fn probe(category: Category, token: &DateToken) -> Result<Statement> {
    Ok(Statement::new(format!(
        "SELECT {} FROM {} LIMIT 1",
        quote_ident(token.as_str())?,
        category.table_name()
    )))
}

/// Per-country values of one category at the resolved date and its
/// reference date, optionally filtered to a single canonical country.
pub fn snapshot(
    category: Category,
    date: &DateToken,
    reference: &DateToken,
    country: Option<&str>,
) -> Result<Statement> {
    let text = format!(
        "SELECT {COUNTRY}, {} AS {CURRENT_VALUE}, {} AS {REFERENCE_VALUE} FROM {}",
        quote_ident(date.as_str())?,
        quote_ident(reference.as_str())?,
        category.table_name()
    );
    Ok(match country {
        Some(name) => Statement::new(format!("{text} WHERE {COUNTRY} = $1"))
            .bind(Param::Str(name.to_string())),
        None => Statement::new(text),
    })
}

/// Category totals across all countries for both dates.
pub fn global_total(
    category: Category,
    date: &DateToken,
    reference: &DateToken,
) -> Result<Statement> {
    Ok(Statement::new(format!(
        "SELECT SUM({}) AS {CURRENT_VALUE}, SUM({}) AS {REFERENCE_VALUE} FROM {}",
        quote_ident(date.as_str())?,
        quote_ident(reference.as_str())?,
        category.table_name()
    )))
}

/// One summed value per date column for a single country. The SUM collapses
/// any rows that still share a canonical name into one country-level row.
pub fn series(category: Category, tokens: &[DateToken], country: &str) -> Result<Statement> {
    let columns = tokens
        .iter()
        .map(|t| {
            let ident = quote_ident(t.as_str())?;
            Ok(format!("SUM({ident}) AS {ident}"))
        })
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    Ok(Statement::new(format!(
        "SELECT {columns} FROM {} WHERE {COUNTRY} = $1",
        category.table_name()
    ))
    .bind(Param::Str(country.to_string())))
}

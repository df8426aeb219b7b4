mod overview;
mod table;

pub use common::dates::{DateToken, DateTokenStyle};
pub use overview::{CaseCounts, CountrySeries, GlobalTotals, GlobalTotalsRow, OverviewRow, SeriesPoint};
pub use table::{Cell, Column, Table};

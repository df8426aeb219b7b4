use serde::{Deserialize, Serialize};
use std::fmt;

/// The three independently-sourced case tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ConfirmedCases,
    RecoveredCases,
    Deaths,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::ConfirmedCases,
        Category::RecoveredCases,
        Category::Deaths,
    ];

    /// Backing-table name for this category.
    pub fn table_name(&self) -> &'static str {
        match self {
            Category::ConfirmedCases => "confirmed_cases",
            Category::RecoveredCases => "recovered_cases",
            Category::Deaths => "deaths",
        }
    }

    /// Slug used by the upstream CSV mirror's file names.
    pub fn source_slug(&self) -> &'static str {
        match self {
            Category::ConfirmedCases => "confirmed",
            Category::RecoveredCases => "recovered",
            Category::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

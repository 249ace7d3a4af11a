//! Provider-side sampling interval of a price series.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Intraday,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Intraday => "Intraday",
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }

    /// Lower-case name used in offline fixture file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Granularity::Intraday => "intraday",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

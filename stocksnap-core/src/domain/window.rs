//! Lookback window selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::granularity::Granularity;

/// Named lookback window applied to a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSelector {
    Latest,
    OneMonth,
    SixMonths,
    Ytd,
    OneYear,
    FiveYears,
    TenYears,
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown window '{0}' (expected one of: latest, 1m, 6m, ytd, 1y, 5y, 10y, all)")]
pub struct ParseWindowError(pub String);

impl WindowSelector {
    /// All selectors in display order.
    pub const ALL: [WindowSelector; 8] = [
        WindowSelector::Latest,
        WindowSelector::OneMonth,
        WindowSelector::SixMonths,
        WindowSelector::Ytd,
        WindowSelector::OneYear,
        WindowSelector::FiveYears,
        WindowSelector::TenYears,
        WindowSelector::AllTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WindowSelector::Latest => "Latest",
            WindowSelector::OneMonth => "1 Month",
            WindowSelector::SixMonths => "6 Months",
            WindowSelector::Ytd => "Year to Date",
            WindowSelector::OneYear => "1 Year",
            WindowSelector::FiveYears => "5 Years",
            WindowSelector::TenYears => "10 Years",
            WindowSelector::AllTime => "All Time",
        }
    }

    /// Short token accepted on the command line.
    pub fn token(self) -> &'static str {
        match self {
            WindowSelector::Latest => "latest",
            WindowSelector::OneMonth => "1m",
            WindowSelector::SixMonths => "6m",
            WindowSelector::Ytd => "ytd",
            WindowSelector::OneYear => "1y",
            WindowSelector::FiveYears => "5y",
            WindowSelector::TenYears => "10y",
            WindowSelector::AllTime => "all",
        }
    }

    /// Series granularity requested from the provider for this window.
    pub fn default_granularity(self) -> Granularity {
        match self {
            WindowSelector::Latest => Granularity::Intraday,
            WindowSelector::OneMonth => Granularity::Daily,
            _ => Granularity::Monthly,
        }
    }

    /// Whether the window refuses series that start after its cutoff.
    pub fn requires_full_history(self) -> bool {
        matches!(self, WindowSelector::FiveYears | WindowSelector::TenYears)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for WindowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindowSelector {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "");
        let selector = match normalized.as_str() {
            "latest" => WindowSelector::Latest,
            "1m" | "1month" | "onemonth" => WindowSelector::OneMonth,
            "6m" | "6months" | "sixmonths" => WindowSelector::SixMonths,
            "ytd" | "yeartodate" => WindowSelector::Ytd,
            "1y" | "1year" | "oneyear" => WindowSelector::OneYear,
            "5y" | "5years" | "fiveyears" => WindowSelector::FiveYears,
            "10y" | "10years" | "tenyears" => WindowSelector::TenYears,
            "all" | "alltime" | "max" => WindowSelector::AllTime,
            _ => return Err(ParseWindowError(s.to_string())),
        };
        Ok(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_from_str() {
        for selector in WindowSelector::ALL {
            assert_eq!(selector.token().parse::<WindowSelector>(), Ok(selector));
        }
    }

    #[test]
    fn parses_labels_and_aliases() {
        assert_eq!("All Time".parse(), Ok(WindowSelector::AllTime));
        assert_eq!("Year to Date".parse(), Ok(WindowSelector::Ytd));
        assert_eq!("six_months".parse(), Ok(WindowSelector::SixMonths));
        assert!("2w".parse::<WindowSelector>().is_err());
    }

    #[test]
    fn default_granularity_matches_request_choice() {
        assert_eq!(
            WindowSelector::Latest.default_granularity(),
            Granularity::Intraday
        );
        assert_eq!(
            WindowSelector::OneMonth.default_granularity(),
            Granularity::Daily
        );
        for selector in &WindowSelector::ALL[2..] {
            assert_eq!(selector.default_granularity(), Granularity::Monthly);
        }
    }

    #[test]
    fn only_long_windows_require_full_history() {
        let guarded: Vec<_> = WindowSelector::ALL
            .into_iter()
            .filter(|s| s.requires_full_history())
            .collect();
        assert_eq!(
            guarded,
            vec![WindowSelector::FiveYears, WindowSelector::TenYears]
        );
    }

    #[test]
    fn next_and_prev_cycle() {
        assert_eq!(WindowSelector::AllTime.next(), WindowSelector::Latest);
        assert_eq!(WindowSelector::Latest.prev(), WindowSelector::AllTime);
        assert_eq!(WindowSelector::Ytd.next().prev(), WindowSelector::Ytd);
    }
}

//! PriceSeries — chronologically ordered OHLCV records.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use super::record::PriceRecord;

/// An ordered sequence of [`PriceRecord`]s.
///
/// Invariant: timestamps are unique and strictly ascending. The only ways to
/// build one are [`crate::timeseries::normalize`] and the checked
/// [`PriceSeries::from_records`] constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesOrderError {
    #[error("records out of order at index {index}: {previous} is not before {current}")]
    NotStrictlyAscending {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from records that are already strictly ascending.
    pub fn from_records(records: Vec<PriceRecord>) -> Result<Self, SeriesOrderError> {
        if let Some(index) = records
            .windows(2)
            .position(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            return Err(SeriesOrderError::NotStrictlyAscending {
                index: index + 1,
                previous: records[index].timestamp,
                current: records[index + 1].timestamp,
            });
        }
        Ok(Self { records })
    }

    pub(crate) fn from_sorted_unchecked(records: Vec<PriceRecord>) -> Self {
        debug_assert!(records.windows(2).all(|p| p[0].timestamp < p[1].timestamp));
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    /// Timestamp of the oldest record.
    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.first().map(|r| r.timestamp)
    }

    /// Timestamp of the newest record.
    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.last().map(|r| r.timestamp)
    }

    /// Records with `timestamp >= cutoff`, order preserved.
    pub fn since(&self, cutoff: NaiveDateTime) -> PriceSeries {
        let start = self.records.partition_point(|r| r.timestamp < cutoff);
        Self {
            records: self.records[start..].to_vec(),
        }
    }

    /// `(timestamp, close)` pairs for a line chart.
    pub fn close_points(&self) -> Vec<(NaiveDateTime, f64)> {
        self.records.iter().map(|r| (r.timestamp, r.close)).collect()
    }

    /// Lowest and highest close in the series.
    pub fn close_range(&self) -> Option<(f64, f64)> {
        self.records.iter().fold(None, |acc, r| match acc {
            None => Some((r.close, r.close)),
            Some((lo, hi)) => Some((lo.min(r.close), hi.max(r.close))),
        })
    }

    pub fn into_records(self) -> Vec<PriceRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

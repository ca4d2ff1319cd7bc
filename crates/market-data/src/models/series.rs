use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily close of a historical series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Self { date, close }
    }
}

/// Finite, oldest-first sequence of daily closes.
///
/// Providers hand points over newest first; the series walks them backwards
/// instead of copying them into a reversed buffer.
#[derive(Debug)]
pub struct HistoricalSeries {
    inner: std::iter::Rev<std::vec::IntoIter<PricePoint>>,
}

impl HistoricalSeries {
    /// Builds a series from points ordered newest first.
    pub fn from_newest_first(points: Vec<PricePoint>) -> Self {
        Self {
            inner: points.into_iter().rev(),
        }
    }
}

impl Iterator for HistoricalSeries {
    type Item = PricePoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for HistoricalSeries {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for HistoricalSeries {}

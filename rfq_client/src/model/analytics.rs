//! Spread to predicted hit-rate table, decoded from the columnar `analytics` block.
use std::collections::BTreeMap;
use std::ops::Bound;

use ordered_float::OrderedFloat;
use serde_json::Value;

use crate::model::columnar::{RowError, check_width, header_names, number, position};

/// Header names of the spread/percent key column.
pub const SPREAD_COLUMNS: [&str; 2] = ["qtpct", "qtPercent"];
/// Header names of the predicted hit-rate column.
pub const HIT_RATE_COLUMNS: [&str; 2] = ["hit_rate_prediction", "hitRatePrediction"];

/// Predicted hit rate by spread level. Keys are unique; a later insert for the
/// same spread overwrites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analytics {
    points: BTreeMap<OrderedFloat<f64>, f64>,
}

impl Analytics {
    /// Set the hit rate for `spread`, returning the value it replaced.
    pub fn insert(&mut self, spread: f64, hit_rate: f64) -> Option<f64> {
        self.points.insert(OrderedFloat(spread), hit_rate)
    }

    /// Stored hit rate for exactly `spread`.
    pub fn get(&self, spread: f64) -> Option<f64> {
        self.points.get(&OrderedFloat(spread)).copied()
    }

    /// Number of spread levels.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when no analytics were received.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(spread, hit_rate)` pairs by ascending spread.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|(k, v)| (k.into_inner(), *v))
    }

    /// Hit rate at an arbitrary spread: the stored value on an exact key,
    /// otherwise linear interpolation between the nearest known levels on
    /// either side. `None` outside the known range.
    pub fn hit_rate_at(&self, spread: f64) -> Option<f64> {
        if !spread.is_finite() {
            return None;
        }
        let key = OrderedFloat(spread);
        if let Some(rate) = self.points.get(&key) {
            return Some(*rate);
        }
        let (x0, y0) = self.points.range(..key).next_back()?;
        let (x1, y1) = self
            .points
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()?;
        let (x0, x1) = (x0.into_inner(), x1.into_inner());
        Some(y0 + (spread - x0) * ((y1 - y0) / (x1 - x0)))
    }
}

/// Column layout of one `analytics` block.
#[derive(Debug, Clone)]
pub struct AnalyticsSchema {
    width: usize,
    spread: Option<usize>,
    hit_rate: Option<usize>,
}

impl AnalyticsSchema {
    /// Resolve the header row.
    pub fn from_header(header: &[Value]) -> Self {
        let names = header_names(header);
        AnalyticsSchema {
            width: names.len(),
            spread: position(&names, &SPREAD_COLUMNS),
            hit_rate: position(&names, &HIT_RATE_COLUMNS),
        }
    }

    /// First required column the header lacks, if any.
    pub fn missing_column(&self) -> Option<&'static str> {
        if self.spread.is_none() {
            Some(SPREAD_COLUMNS[0])
        } else if self.hit_rate.is_none() {
            Some(HIT_RATE_COLUMNS[0])
        } else {
            None
        }
    }

    /// Decode one data row into `(spread, hit_rate)`.
    pub fn decode(&self, row: &[Value]) -> Result<(f64, f64), RowError> {
        let spread_idx = self.spread.ok_or(RowError::MissingColumn(SPREAD_COLUMNS[0]))?;
        let rate_idx = self
            .hit_rate
            .ok_or(RowError::MissingColumn(HIT_RATE_COLUMNS[0]))?;
        check_width(self.width, row)?;
        Ok((
            number(&row[spread_idx], SPREAD_COLUMNS[0])?,
            number(&row[rate_idx], HIT_RATE_COLUMNS[0])?,
        ))
    }
}

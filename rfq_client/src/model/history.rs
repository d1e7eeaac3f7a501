//! Historical RFQs of the same product, decoded from the columnar `history` block.
use chrono::{DateTime, Utc};
use rfq_common::kinds::Side;
use serde_json::Value;

use crate::model::columnar::{RowError, check_width, epoch_seconds, header_names, number};

/// Column carrying the live-session join key; never stored.
pub const LIVE_ID: &str = "live_id";

/// One historical RFQ. Immutable once appended to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// When the historical RFQ occurred, seconds since epoch.
    pub timestamp: i64,
    /// Direction.
    pub side: Option<Side>,
    /// Traded quantity.
    pub quantity: Option<f64>,
    /// Traded percentile / spread.
    pub qt_percent: Option<f64>,
    /// Final upstream status.
    pub status_string: Option<String>,
}

impl HistoryEntry {
    /// `timestamp` as a UTC instant, if representable.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HistoryColumn {
    Timestamp,
    Side,
    Quantity,
    QtPercent,
    StatusString,
    Skip,
}

impl HistoryColumn {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("timestamp") => HistoryColumn::Timestamp,
            Some("side") => HistoryColumn::Side,
            Some("quantity" | "rfq_qty") => HistoryColumn::Quantity,
            Some("qtpct" | "qtPercent") => HistoryColumn::QtPercent,
            Some("statusString" | "status_string") => HistoryColumn::StatusString,
            Some(LIVE_ID) => HistoryColumn::Skip,
            _ => HistoryColumn::Skip,
        }
    }
}

/// Column layout of one `history` block, resolved from its header row.
#[derive(Debug, Clone)]
pub struct HistorySchema {
    columns: Vec<HistoryColumn>,
}

impl HistorySchema {
    /// Resolve the header row.
    pub fn from_header(header: &[Value]) -> Self {
        HistorySchema {
            columns: header_names(header)
                .into_iter()
                .map(HistoryColumn::from_name)
                .collect(),
        }
    }

    /// Decode one data row by position.
    pub fn decode(&self, row: &[Value]) -> Result<HistoryEntry, RowError> {
        check_width(self.columns.len(), row)?;

        let mut timestamp = None;
        let mut entry = HistoryEntry {
            timestamp: 0,
            side: None,
            quantity: None,
            qt_percent: None,
            status_string: None,
        };

        for (column, value) in self.columns.iter().zip(row) {
            if value.is_null() {
                continue;
            }
            match column {
                HistoryColumn::Timestamp => timestamp = Some(epoch_seconds(value, "timestamp")?),
                HistoryColumn::Side => {
                    let side = value
                        .as_str()
                        .and_then(|s| s.parse::<Side>().ok())
                        .ok_or(RowError::Value("side"))?;
                    entry.side = Some(side);
                }
                HistoryColumn::Quantity => entry.quantity = Some(number(value, "quantity")?),
                HistoryColumn::QtPercent => entry.qt_percent = Some(number(value, "qtpct")?),
                HistoryColumn::StatusString => {
                    let status = value.as_str().ok_or(RowError::Value("statusString"))?;
                    entry.status_string = Some(status.to_string());
                }
                HistoryColumn::Skip => {}
            }
        }

        entry.timestamp = timestamp.ok_or(RowError::MissingColumn("timestamp"))?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(names: &[&str]) -> HistorySchema {
        let header: Vec<Value> = names.iter().map(|n| json!(n)).collect();
        HistorySchema::from_header(&header)
    }

    #[test]
    fn decodes_by_position_and_drops_live_id() {
        let s = schema(&["live_id", "timestamp", "side", "rfq_qty", "qtpct", "status_string", "venue"]);
        let entry = s
            .decode(&[json!(77), json!(1000), json!("Sell"), json!(5), json!(1.5), json!("Done"), json!("X")])
            .unwrap();
        assert_eq!(
            entry,
            HistoryEntry {
                timestamp: 1000,
                side: Some(Side::Sell),
                quantity: Some(5.0),
                qt_percent: Some(1.5),
                status_string: Some("Done".into()),
            }
        );
        assert_eq!(entry.occurred_at().unwrap().timestamp(), 1000);
    }

    #[test]
    fn sparse_columns_are_fine() {
        let s = schema(&["timestamp", "qtpct"]);
        let entry = s.decode(&[json!(2000), json!(7)]).unwrap();
        assert_eq!(entry.timestamp, 2000);
        assert_eq!(entry.qt_percent, Some(7.0));
        assert_eq!(entry.side, None);
    }

    #[test]
    fn bad_rows_fail_alone() {
        let s = schema(&["timestamp", "side"]);
        assert_eq!(
            s.decode(&[json!(1)]),
            Err(RowError::Width { expected: 2, found: 1 })
        );
        assert_eq!(
            s.decode(&[json!(1), json!("Hold")]),
            Err(RowError::Value("side"))
        );
        assert_eq!(
            s.decode(&[json!(null), json!("Buy")]),
            Err(RowError::MissingColumn("timestamp"))
        );
        let no_ts = schema(&["qtpct"]);
        assert_eq!(
            no_ts.decode(&[json!(1)]),
            Err(RowError::MissingColumn("timestamp"))
        );
    }
}

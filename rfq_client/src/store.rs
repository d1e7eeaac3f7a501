//! In-memory RFQ record store.
//!
//! The store owns every `RfqRecord` and reconciles inbound snapshot/delta
//! envelopes into them:
//!
//! - `RfqStore::apply_snapshot_or_delta(fields)` — create on first sight, overwrite the
//!   scalar fields the envelope carries, append `history` rows, upsert `analytics`
//!   points, then delete the record if its status became terminal.
//! - `RfqStore::apply_client_update(update, origin)` — hand a claim status to the
//!   lifecycle machine; an unknown id is logged and ignored, never fabricated.
//! - `RfqStore::remove(id)` / `RfqStore::get(id)`.
//!
//! Malformed history/analytics rows are skipped one by one; the rest of the
//! envelope is still applied.
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};
use rfq_common::envelope::split_block;
use rfq_common::{ClientUpdate, RfqFields, RfqId};

use crate::lifecycle::{self, Origin, Transition};
use crate::model::analytics::AnalyticsSchema;
use crate::model::history::HistorySchema;
use crate::model::RfqRecord;

/// Mapping of RFQ id to record, iterable in arrival order.
#[derive(Debug, Default)]
pub struct RfqStore {
    records: HashMap<RfqId, RfqRecord>,
    order: BTreeMap<u64, RfqId>,
    next_seq: u64,
}

impl RfqStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile an `rfq_new` / `rfq_update` field set.
    pub fn apply_snapshot_or_delta(&mut self, fields: &RfqFields) -> Transition {
        let id = &fields.id;
        let record = self.entry(id);

        record.overwrite(fields);
        append_history(record, fields);
        upsert_analytics(record, fields);

        if !lifecycle::is_removal(record) {
            return Transition::Unchanged;
        }
        let focus = record.focus;
        info!(
            "RFQ {} reached terminal status {:?}; removing it",
            id,
            record.status_string.as_deref().unwrap_or_default()
        );
        self.remove(id);
        Transition::Removed { focus }
    }

    /// Apply a claim status. Returns `None` when the id is not in the store.
    pub fn apply_client_update(&mut self, update: &ClientUpdate, origin: Origin) -> Option<Transition> {
        let Some(record) = self.records.get_mut(&update.id) else {
            warn!(
                "{} status message received for unknown RFQ {}",
                update.frontend_status, update.id
            );
            return None;
        };
        if update.submit_price.is_some() {
            record.submit_price = update.submit_price;
        }
        let transition = lifecycle::apply_status(record, update.frontend_status, origin);
        debug!("RFQ {} {:?} via {:?}: {:?}", update.id, update.frontend_status, origin, transition);
        Some(transition)
    }

    /// Delete a record together with its history.
    pub fn remove(&mut self, id: &RfqId) -> Option<RfqRecord> {
        let record = self.records.remove(id)?;
        self.order.remove(&record.seq);
        Some(record)
    }

    /// Look up a record.
    pub fn get(&self, id: &RfqId) -> Option<&RfqRecord> {
        self.records.get(id)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no record is live.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &RfqRecord> {
        self.order.values().filter_map(|id| self.records.get(id))
    }

    /// Ids in arrival order.
    pub fn ids(&self) -> impl Iterator<Item = &RfqId> {
        self.order.values()
    }

    fn entry(&mut self, id: &RfqId) -> &mut RfqRecord {
        match self.records.entry(id.clone()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.order.insert(seq, id.clone());
                info!("Added RFQ with ID {} to the store", id);
                slot.insert(RfqRecord::new(id.clone(), seq))
            }
        }
    }
}

fn append_history(record: &mut RfqRecord, fields: &RfqFields) {
    let Some((header, rows)) = split_block(fields.history.as_ref()) else {
        return;
    };
    let schema = HistorySchema::from_header(header);
    let before = record.history.len();
    for (i, row) in rows.iter().enumerate() {
        match schema.decode(row) {
            Ok(entry) => record.history.push(entry),
            Err(e) => warn!("RFQ {}: skipping history row {}: {}", record.id, i + 1, e),
        }
    }
    debug!(
        "RFQ {}: appended {} of {} history rows",
        record.id,
        record.history.len() - before,
        rows.len()
    );
}

fn upsert_analytics(record: &mut RfqRecord, fields: &RfqFields) {
    let Some((header, rows)) = split_block(fields.analytics.as_ref()) else {
        return;
    };
    let schema = AnalyticsSchema::from_header(header);
    if let Some(column) = schema.missing_column() {
        warn!(
            "RFQ {}: analytics block has no `{}` column; skipping {} rows",
            record.id,
            column,
            rows.len()
        );
        return;
    }
    for (i, row) in rows.iter().enumerate() {
        match schema.decode(row) {
            Ok((spread, hit_rate)) => {
                record.analytics.insert(spread, hit_rate);
            }
            Err(e) => warn!("RFQ {}: skipping analytics row {}: {}", record.id, i + 1, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Focus, Phase};
    use rfq_common::kinds::{FrontendStatus, Side};
    use serde_json::{Value, json};

    fn fields(v: Value) -> RfqFields {
        serde_json::from_value(v).unwrap()
    }

    fn update(id: i64, status: FrontendStatus) -> ClientUpdate {
        ClientUpdate {
            id: RfqId::Num(id),
            timestamp: None,
            frontend_status: status,
            submit_price: None,
        }
    }

    #[test]
    fn creates_on_first_sight_and_keeps_arrival_order() {
        let mut store = RfqStore::new();
        store.apply_snapshot_or_delta(&fields(json!({"id": 3, "side": "Sell"})));
        store.apply_snapshot_or_delta(&fields(json!({"id": 1})));
        store.apply_snapshot_or_delta(&fields(json!({"id": 3, "quantity": 4})));
        let ids: Vec<_> = store.ids().cloned().collect();
        assert_eq!(ids, vec![RfqId::Num(3), RfqId::Num(1)]);
        let r = store.get(&RfqId::Num(3)).unwrap();
        assert_eq!(r.side, Some(Side::Sell));
        assert_eq!(r.quantity, Some(4.0));
        assert!(r.seq < store.get(&RfqId::Num(1)).unwrap().seq);
    }

    #[test]
    fn history_appends_and_skips_bad_rows() {
        let mut store = RfqStore::new();
        store.apply_snapshot_or_delta(&fields(json!({
            "id": 1,
            "history": [["timestamp", "live_id", "qtpct"], [10, 99, 1.0], [20, 98], [30, 97, 3.0]]
        })));
        store.apply_snapshot_or_delta(&fields(json!({
            "id": 1,
            "description": "after",
            "history": [["timestamp"]]
        })));
        store.apply_snapshot_or_delta(&fields(json!({
            "id": 1,
            "history": [["qtpct", "timestamp"], [4.0, 40]]
        })));
        let r = store.get(&RfqId::Num(1)).unwrap();
        let ts: Vec<i64> = r.history.iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![10, 30, 40]);
        assert_eq!(r.description.as_deref(), Some("after"));
    }

    #[test]
    fn analytics_overwrite_by_key() {
        let mut store = RfqStore::new();
        store.apply_snapshot_or_delta(&fields(json!({
            "id": 1,
            "analytics": [["qtpct", "hit_rate_prediction"], [5, 0.3], [7, 0.25], ["x", 0.1]]
        })));
        store.apply_snapshot_or_delta(&fields(json!({
            "id": 1,
            "analytics": [["hit_rate_prediction", "qtpct"], [0.4, 5]]
        })));
        let r = store.get(&RfqId::Num(1)).unwrap();
        assert_eq!(r.analytics.len(), 2);
        assert_eq!(r.analytics.get(5.0), Some(0.4));
        assert_eq!(r.analytics.get(7.0), Some(0.25));
    }

    #[test]
    fn analytics_without_key_column_is_ignored() {
        let mut store = RfqStore::new();
        store.apply_snapshot_or_delta(&fields(json!({
            "id": 1,
            "quantity": 2,
            "analytics": [["spread", "hit_rate_prediction"], [5, 0.3]]
        })));
        let r = store.get(&RfqId::Num(1)).unwrap();
        assert!(r.analytics.is_empty());
        assert_eq!(r.quantity, Some(2.0));
    }

    #[test]
    fn terminal_status_removes_record() {
        let mut store = RfqStore::new();
        store.apply_snapshot_or_delta(&fields(json!({"id": 1, "statusString": "New"})));
        store.apply_client_update(&update(1, FrontendStatus::InUse), Origin::Local);
        let t = store.apply_snapshot_or_delta(&fields(json!({"id": 1, "statusString": "Done"})));
        assert_eq!(t, Transition::Removed { focus: Focus::LocallyFocused });
        assert!(store.get(&RfqId::Num(1)).is_none());
        assert!(store.is_empty());
        assert_eq!(store.ids().count(), 0);
    }

    #[test]
    fn client_update_for_unknown_id_is_ignored() {
        let mut store = RfqStore::new();
        assert_eq!(
            store.apply_client_update(&update(5, FrontendStatus::InUse), Origin::Remote),
            None
        );
        assert!(store.is_empty());
    }

    #[test]
    fn client_update_records_submitted_price() {
        let mut store = RfqStore::new();
        store.apply_snapshot_or_delta(&fields(json!({"id": 1})));
        let mut priced = update(1, FrontendStatus::SubmitPrice);
        priced.submit_price = Some(101.25);
        store.apply_client_update(&priced, Origin::Remote);
        let r = store.get(&RfqId::Num(1)).unwrap();
        assert_eq!(r.phase, Phase::Pricing);
        assert_eq!(r.submit_price, Some(101.25));
    }
}

//! The per-RFQ record held by the store.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rfq_common::kinds::{Side, is_terminal_status};
use rfq_common::{RfqFields, RfqId};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::model::analytics::Analytics;
use crate::model::history::HistoryEntry;

/// Claim status of a record as seen by this client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Focus {
    /// Nobody holds it.
    #[default]
    Free,
    /// This client holds it.
    LocallyFocused,
    /// Another client holds it.
    RemotelyFocused,
}

/// Lifecycle phase of a live record. Removal is terminal and has no phase:
/// the record is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Phase {
    /// Visible and unclaimed.
    #[default]
    Queued,
    /// Held by this or another client.
    Claimed,
    /// A price was submitted.
    Pricing,
}

/// One RFQ on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RfqRecord {
    /// Identifier.
    pub id: RfqId,
    /// Arrival order; assigned on creation.
    pub seq: u64,
    /// Direction.
    pub side: Option<Side>,
    /// Instrument description.
    pub description: Option<String>,
    /// Instrument identifier.
    pub instrument_id: Option<String>,
    /// Requesting customer.
    pub cust_firm: Option<String>,
    /// Raw quantity.
    pub quantity: Option<f64>,
    /// Last upstream lifecycle tag.
    pub status_string: Option<String>,
    /// Timestamp of the last applied envelope.
    pub timestamp: Option<i64>,
    /// Last submitted price.
    pub submit_price: Option<f64>,
    /// Historical RFQs, in arrival order.
    pub history: Vec<HistoryEntry>,
    /// Hit-rate table.
    pub analytics: Analytics,
    /// Claim status.
    pub focus: Focus,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Fields without a dedicated slot, by wire name.
    pub extra: BTreeMap<String, Value>,
}

impl RfqRecord {
    /// Empty record for a newly seen id.
    pub fn new(id: RfqId, seq: u64) -> Self {
        RfqRecord {
            id,
            seq,
            side: None,
            description: None,
            instrument_id: None,
            cust_firm: None,
            quantity: None,
            status_string: None,
            timestamp: None,
            submit_price: None,
            history: Vec::new(),
            analytics: Analytics::default(),
            focus: Focus::Free,
            phase: Phase::Queued,
            extra: BTreeMap::new(),
        }
    }

    /// Overwrite every scalar field the envelope carries, `null` included.
    /// Last writer wins.
    pub fn overwrite(&mut self, fields: &RfqFields) {
        fn set<T: Clone>(slot: &mut Option<T>, value: &Option<Option<T>>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut self.timestamp, &fields.timestamp);
        set(&mut self.side, &fields.side);
        set(&mut self.description, &fields.description);
        set(&mut self.instrument_id, &fields.instrument_id);
        set(&mut self.cust_firm, &fields.cust_firm);
        set(&mut self.quantity, &fields.quantity);
        set(&mut self.status_string, &fields.status_string);
        for (name, value) in &fields.extra {
            self.extra.insert(name.clone(), value.clone());
        }
    }

    /// `true` once upstream has reported a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status_string.as_deref().is_some_and(is_terminal_status)
    }

    /// Predicted hit rate at `spread`, interpolated between known levels.
    pub fn hit_rate_at(&self, spread: f64) -> Option<f64> {
        self.analytics.hit_rate_at(spread)
    }

    /// History entries that occurred at or after `cutoff`, in stored order.
    pub fn history_since(&self, cutoff: DateTime<Utc>) -> impl Iterator<Item = &HistoryEntry> {
        let cutoff = cutoff.timestamp();
        self.history.iter().filter(move |e| e.timestamp >= cutoff)
    }
}

//! Read-only projection of the store onto the queue pane.
//!
//! The visible queue is every record in `Queued` or `Claimed` phase with a
//! non-terminal status, in arrival order. After each store mutation the view
//! is recomputed and diffed against the previous one so the renderer can add
//! and remove individual buttons instead of redrawing the pane.
use std::collections::HashSet;

use rfq_common::RfqId;

use crate::model::{Phase, RfqRecord};
use crate::store::RfqStore;

/// Incremental change to the visible queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueChange {
    /// Create a button for this id.
    Added(RfqId),
    /// Destroy the button for this id.
    Removed(RfqId),
}

/// Whether a record belongs in the queue pane.
pub fn is_visible(record: &RfqRecord) -> bool {
    matches!(record.phase, Phase::Queued | Phase::Claimed) && !record.is_terminal()
}

/// Ordered set of visible ids.
#[derive(Debug, Default)]
pub struct QueueView {
    visible: Vec<RfqId>,
}

impl QueueView {
    /// Empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible ids in arrival order.
    pub fn ids(&self) -> &[RfqId] {
        &self.visible
    }

    /// Recompute from `store`; removals come first, then additions in queue order.
    pub fn refresh(&mut self, store: &RfqStore) -> Vec<QueueChange> {
        let next: Vec<RfqId> = store
            .iter()
            .filter(|r| is_visible(r))
            .map(|r| r.id.clone())
            .collect();

        let before: HashSet<&RfqId> = self.visible.iter().collect();
        let after: HashSet<&RfqId> = next.iter().collect();

        let mut changes: Vec<QueueChange> = self
            .visible
            .iter()
            .filter(|id| !after.contains(id))
            .map(|id| QueueChange::Removed(id.clone()))
            .collect();
        changes.extend(
            next.iter()
                .filter(|id| !before.contains(id))
                .map(|id| QueueChange::Added(id.clone())),
        );

        self.visible = next;
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Origin;
    use rfq_common::kinds::FrontendStatus;
    use rfq_common::{ClientUpdate, RfqFields};
    use serde_json::{Value, json};

    fn apply(store: &mut RfqStore, v: Value) {
        let fields: RfqFields = serde_json::from_value(v).unwrap();
        store.apply_snapshot_or_delta(&fields);
    }

    fn status(store: &mut RfqStore, id: i64, s: FrontendStatus) {
        let update = ClientUpdate {
            id: RfqId::Num(id),
            timestamp: None,
            frontend_status: s,
            submit_price: None,
        };
        store.apply_client_update(&update, Origin::Remote);
    }

    #[test]
    fn emits_incremental_changes() {
        let mut store = RfqStore::new();
        let mut view = QueueView::new();
        apply(&mut store, json!({"id": 1}));
        apply(&mut store, json!({"id": 2}));
        assert_eq!(
            view.refresh(&store),
            vec![QueueChange::Added(RfqId::Num(1)), QueueChange::Added(RfqId::Num(2))]
        );
        assert!(view.refresh(&store).is_empty());

        status(&mut store, 1, FrontendStatus::InUse);
        assert!(view.refresh(&store).is_empty());
        assert_eq!(view.ids(), &[RfqId::Num(1), RfqId::Num(2)]);

        status(&mut store, 1, FrontendStatus::SubmitPrice);
        apply(&mut store, json!({"id": 3}));
        assert_eq!(
            view.refresh(&store),
            vec![QueueChange::Removed(RfqId::Num(1)), QueueChange::Added(RfqId::Num(3))]
        );
        assert_eq!(view.ids(), &[RfqId::Num(2), RfqId::Num(3)]);

        apply(&mut store, json!({"id": 2, "statusString": "CustRejected"}));
        assert_eq!(view.refresh(&store), vec![QueueChange::Removed(RfqId::Num(2))]);
    }

    #[test]
    fn freed_pricing_record_returns_in_arrival_order() {
        let mut store = RfqStore::new();
        let mut view = QueueView::new();
        apply(&mut store, json!({"id": 1}));
        apply(&mut store, json!({"id": 2}));
        status(&mut store, 1, FrontendStatus::SubmitPrice);
        view.refresh(&store);
        assert_eq!(view.ids(), &[RfqId::Num(2)]);
        status(&mut store, 1, FrontendStatus::Free);
        assert_eq!(view.refresh(&store), vec![QueueChange::Added(RfqId::Num(1))]);
        assert_eq!(view.ids(), &[RfqId::Num(1), RfqId::Num(2)]);
    }
}

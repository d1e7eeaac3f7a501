//! Client-side claim arbitration.
//!
//! At most one RFQ is locally focused at a time. Claiming another one first
//! releases the previous claim (`free`), then announces the new one (`in_use`).
//! Both are applied to the local store immediately without waiting for the
//! feed to echo them. There is no server-side lock: two desks racing for the
//! same RFQ both believe they hold it until one of them sees a contrary
//! `client_update` for that id.
use log::{info, warn};
use rfq_common::kinds::FrontendStatus;
use rfq_common::{ClientUpdate, OutboundEnvelope, RfqError, RfqId};
use rfq_common::Result;

use crate::lifecycle::{Origin, Transition};
use crate::model::Focus;
use crate::store::RfqStore;

/// Holder of the single locally focused RFQ id.
#[derive(Debug, Default)]
pub struct ClaimArbiter {
    local_focus: Option<RfqId>,
}

impl ClaimArbiter {
    /// Arbiter holding nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held RFQ.
    pub fn local_focus(&self) -> Option<&RfqId> {
        self.local_focus.as_ref()
    }

    /// `true` if `id` is the locally focused RFQ.
    pub fn holds(&self, id: &RfqId) -> bool {
        self.local_focus.as_ref() == Some(id)
    }

    /// Claim `id`, releasing any other local claim first.
    ///
    /// Returns the envelopes to send, in order.
    pub fn claim(&mut self, store: &mut RfqStore, id: &RfqId) -> Result<Vec<OutboundEnvelope>> {
        let Some(record) = store.get(id) else {
            return Err(RfqError::UnknownRfq(id.to_string()));
        };
        if record.focus == Focus::RemotelyFocused {
            warn!("Claiming RFQ {} which another desk reports in use", id);
        }
        let id = record.id.clone();

        let mut outbound = Vec::with_capacity(2);
        if let Some(previous) = self.local_focus.clone().filter(|p| *p != id) {
            let release = OutboundEnvelope::new(previous, FrontendStatus::Free);
            store.apply_client_update(&ClientUpdate::from(&release), Origin::Local);
            outbound.push(release);
        }

        let take = OutboundEnvelope::new(id.clone(), FrontendStatus::InUse);
        store.apply_client_update(&ClientUpdate::from(&take), Origin::Local);
        outbound.push(take);
        info!("Claimed RFQ {}", id);
        self.local_focus = Some(id);
        Ok(outbound)
    }

    /// Release the local claim, if any.
    pub fn release(&mut self, store: &mut RfqStore) -> Option<OutboundEnvelope> {
        let previous = self.local_focus.take()?;
        let release = OutboundEnvelope::new(previous, FrontendStatus::Free);
        store.apply_client_update(&ClientUpdate::from(&release), Origin::Local);
        info!("Released RFQ {}", release.id);
        Some(release)
    }

    /// Submit `price` for the locally focused RFQ `id`. Pricing ends the claim.
    pub fn submit_price(
        &mut self,
        store: &mut RfqStore,
        id: &RfqId,
        price: f64,
    ) -> Result<OutboundEnvelope> {
        let Some(record) = store.get(id) else {
            return Err(RfqError::UnknownRfq(id.to_string()));
        };
        let id = record.id.clone();
        if !self.holds(&id) {
            return Err(RfqError::NotClaimed(id.to_string()));
        }
        if !price.is_finite() {
            return Err(RfqError::Format(format!("price must be finite, got {}", price)));
        }

        let priced = OutboundEnvelope::price(id.clone(), price);
        store.apply_client_update(&ClientUpdate::from(&priced), Origin::Local);
        self.local_focus = None;
        info!("Submitted price {} for RFQ {}", price, id);
        Ok(priced)
    }

    /// Follow a transition the feed caused for `id`. Returns `true` if it
    /// ended our local claim.
    pub fn observe(&mut self, id: &RfqId, transition: &Transition) -> bool {
        if self.holds(id) && transition.drops_local_focus() {
            info!("Local claim on RFQ {} ended by the feed: {:?}", id, transition);
            self.local_focus = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Phase;
    use rfq_common::RfqFields;
    use serde_json::json;

    fn store_with(ids: &[i64]) -> RfqStore {
        let mut store = RfqStore::new();
        for id in ids {
            let fields: RfqFields = serde_json::from_value(json!({"id": id})).unwrap();
            store.apply_snapshot_or_delta(&fields);
        }
        store
    }

    fn summary(out: &[OutboundEnvelope]) -> Vec<(RfqId, FrontendStatus)> {
        out.iter().map(|e| (e.id.clone(), e.frontend_status)).collect()
    }

    #[test]
    fn switching_claims_frees_previous_first() {
        let mut store = store_with(&[7, 9]);
        let mut arb = ClaimArbiter::new();
        let first = arb.claim(&mut store, &RfqId::Num(7)).unwrap();
        assert_eq!(summary(&first), vec![(RfqId::Num(7), FrontendStatus::InUse)]);

        let second = arb.claim(&mut store, &RfqId::Num(9)).unwrap();
        assert_eq!(
            summary(&second),
            vec![
                (RfqId::Num(7), FrontendStatus::Free),
                (RfqId::Num(9), FrontendStatus::InUse),
            ]
        );
        assert_eq!(arb.local_focus(), Some(&RfqId::Num(9)));
        assert_eq!(store.get(&RfqId::Num(7)).unwrap().focus, Focus::Free);
        assert_eq!(store.get(&RfqId::Num(9)).unwrap().focus, Focus::LocallyFocused);
    }

    #[test]
    fn reclaiming_same_id_sends_only_in_use() {
        let mut store = store_with(&[7]);
        let mut arb = ClaimArbiter::new();
        arb.claim(&mut store, &RfqId::Num(7)).unwrap();
        let again = arb.claim(&mut store, &RfqId::Num(7)).unwrap();
        assert_eq!(summary(&again), vec![(RfqId::Num(7), FrontendStatus::InUse)]);
    }

    #[test]
    fn unknown_claim_is_refused() {
        let mut store = store_with(&[7]);
        let mut arb = ClaimArbiter::new();
        assert!(matches!(
            arb.claim(&mut store, &RfqId::Num(8)),
            Err(RfqError::UnknownRfq(_))
        ));
        assert_eq!(arb.local_focus(), None);
    }

    #[test]
    fn release_and_price() {
        let mut store = store_with(&[1, 2]);
        let mut arb = ClaimArbiter::new();
        assert!(arb.release(&mut store).is_none());

        arb.claim(&mut store, &RfqId::Num(1)).unwrap();
        let freed = arb.release(&mut store).unwrap();
        assert_eq!(freed.frontend_status, FrontendStatus::Free);
        assert_eq!(arb.local_focus(), None);

        assert!(matches!(
            arb.submit_price(&mut store, &RfqId::Num(2), 100.0),
            Err(RfqError::NotClaimed(_))
        ));
        arb.claim(&mut store, &RfqId::Num(2)).unwrap();
        assert!(matches!(
            arb.submit_price(&mut store, &RfqId::Num(2), f64::NAN),
            Err(RfqError::Format(_))
        ));
        let priced = arb.submit_price(&mut store, &RfqId::Num(2), 100.5).unwrap();
        assert_eq!(priced.submit_price, Some(100.5));
        assert_eq!(arb.local_focus(), None);
        let r = store.get(&RfqId::Num(2)).unwrap();
        assert_eq!(r.phase, Phase::Pricing);
        assert_eq!(r.submit_price, Some(100.5));
    }

    #[test]
    fn observe_clears_only_on_drop() {
        let mut store = store_with(&[1]);
        let mut arb = ClaimArbiter::new();
        arb.claim(&mut store, &RfqId::Num(1)).unwrap();
        assert!(!arb.observe(&RfqId::Num(1), &Transition::Unchanged));
        assert!(!arb.observe(&RfqId::Num(2), &Transition::Removed { focus: Focus::LocallyFocused }));
        assert!(arb.observe(&RfqId::Num(1), &Transition::Removed { focus: Focus::LocallyFocused }));
        assert_eq!(arb.local_focus(), None);
    }
}

//! Desk session: the single owner of client-side RFQ state.
//!
//! A `Session` wires the codec, the record store, the lifecycle machine, the
//! claim arbiter and the queue projection together. Each inbound envelope is
//! processed to completion (classify → reconcile → lifecycle → projection)
//! before the call returns; local claim actions run on the same `&mut self`, so
//! there is exactly one mutator.
//!
//! Two channels leave the session:
//! - outbound envelopes for the transport (fire-and-forget),
//! - `ViewEvent`s for the renderer, which reads full records back through
//!   [`Session::get`].
use std::io::Read;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use rfq_common::envelope::{self, MSG_CONTENT, MSG_CONTENT_ALIAS};
use rfq_common::kinds::MsgContent;
use rfq_common::{Envelope, OutboundEnvelope, RfqError, RfqId};
use rfq_common::Result;
use serde_json::Value;
use strum_macros::Display;

use crate::claim::ClaimArbiter;
use crate::lifecycle::{Origin, Transition};
use crate::model::{Focus, RfqRecord};
use crate::projection::{QueueChange, QueueView};
use crate::store::RfqStore;

/// Advisory link state reported by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum ConnectionState {
    /// Link is up.
    Connected,
    /// Link is down or not yet established.
    #[default]
    Disconnected,
}

/// Notification for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A queue button must be created or destroyed.
    Queue(QueueChange),
    /// A record's claim status changed; restyle its button.
    Focus {
        /// Record.
        id: RfqId,
        /// New focus.
        focus: Focus,
    },
    /// Replace the detail pane with this record.
    ShowDetail(RfqId),
    /// The detail pane no longer has a claimed record behind it.
    ClearDetail,
    /// Status indicator.
    Connection(ConnectionState),
}

/// One desk client's view of the RFQ feed.
#[derive(Debug)]
pub struct Session {
    store: RfqStore,
    arbiter: ClaimArbiter,
    queue: QueueView,
    connection: ConnectionState,
    outbound: Sender<OutboundEnvelope>,
    view: Sender<ViewEvent>,
}

impl Session {
    /// New session emitting to `outbound` and `view`.
    pub fn new(outbound: Sender<OutboundEnvelope>, view: Sender<ViewEvent>) -> Self {
        Session {
            store: RfqStore::new(),
            arbiter: ClaimArbiter::new(),
            queue: QueueView::new(),
            connection: ConnectionState::default(),
            outbound,
            view,
        }
    }

    /// Process one raw inbound message. Returns `false` if it was rejected.
    pub fn handle_raw(&mut self, raw: &str) -> bool {
        match envelope::classify(raw) {
            Ok(env) => {
                self.handle(env);
                true
            }
            Err(reason) => {
                warn!("Dropping inbound message: {}", reason);
                false
            }
        }
    }

    /// Process one parsed inbound message. Returns `false` if it was rejected.
    pub fn handle_value(&mut self, value: Value) -> bool {
        match envelope::classify_value(value) {
            Ok(env) => {
                self.handle(env);
                true
            }
            Err(reason) => {
                warn!("Dropping inbound message: {}", reason);
                false
            }
        }
    }

    /// Process one classified envelope.
    pub fn handle(&mut self, env: Envelope) {
        debug!("Inbound {} for RFQ {}", env.kind(), env.id());
        match env {
            Envelope::RfqNew(fields) | Envelope::RfqUpdate(fields) => {
                let transition = self.store.apply_snapshot_or_delta(&fields);
                self.follow(&fields.id, &transition);
            }
            Envelope::ClientUpdate(update) => {
                if let Some(transition) = self.store.apply_client_update(&update, Origin::Remote) {
                    self.follow(&update.id, &transition);
                }
            }
        }
        self.refresh_queue();
    }

    /// One-shot bulk load of a JSON array of RFQ records, each fed through the
    /// live path as `rfq_new`. Returns how many were accepted.
    pub fn bootstrap<R: Read>(&mut self, reader: R) -> Result<usize> {
        let document: Value = serde_json::from_reader(reader)?;
        let Value::Array(items) = document else {
            return Err(RfqError::Format("bootstrap document is not a JSON array".into()));
        };

        let total = items.len();
        let mut accepted = 0;
        for mut item in items {
            if let Value::Object(map) = &mut item {
                map.remove(MSG_CONTENT_ALIAS);
                map.insert(MSG_CONTENT.into(), Value::String(MsgContent::RfqNew.to_string()));
            }
            if self.handle_value(item) {
                accepted += 1;
            }
        }
        info!("Bootstrap accepted {} of {} records", accepted, total);
        Ok(accepted)
    }

    /// Transport reports the link is up.
    pub fn connected(&mut self) {
        self.set_connection(ConnectionState::Connected);
    }

    /// Transport reports the link is down. Reconciliation is not paused.
    pub fn disconnected(&mut self) {
        self.set_connection(ConnectionState::Disconnected);
    }

    /// Claim `id` for this desk, releasing any previous claim.
    pub fn claim(&mut self, id: &RfqId) -> Result<()> {
        let outbound = self.arbiter.claim(&mut self.store, id)?;
        for env in outbound {
            self.announce_focus(&env.id);
            self.emit(env);
        }
        self.emit_view(ViewEvent::ShowDetail(id.clone()));
        self.refresh_queue();
        Ok(())
    }

    /// Give back the local claim, if any.
    pub fn release(&mut self) {
        if let Some(env) = self.arbiter.release(&mut self.store) {
            self.announce_focus(&env.id);
            self.emit(env);
            self.emit_view(ViewEvent::ClearDetail);
            self.refresh_queue();
        }
    }

    /// Submit a price for the locally claimed RFQ `id`.
    pub fn submit_price(&mut self, id: &RfqId, price: f64) -> Result<()> {
        let env = self.arbiter.submit_price(&mut self.store, id, price)?;
        self.announce_focus(&env.id);
        self.emit(env);
        self.emit_view(ViewEvent::ClearDetail);
        self.refresh_queue();
        Ok(())
    }

    /// Full record for the renderer.
    pub fn get(&self, id: &RfqId) -> Option<&RfqRecord> {
        self.store.get(id)
    }

    /// Visible queue, in arrival order.
    pub fn queue(&self) -> &[RfqId] {
        self.queue.ids()
    }

    /// RFQ this desk currently holds.
    pub fn local_focus(&self) -> Option<&RfqId> {
        self.arbiter.local_focus()
    }

    /// Last reported link state.
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Read access to every live record.
    pub fn store(&self) -> &RfqStore {
        &self.store
    }

    fn follow(&mut self, id: &RfqId, transition: &Transition) {
        if self.arbiter.observe(id, transition) {
            self.emit_view(ViewEvent::ClearDetail);
        }
        if transition.entered_pricing() {
            info!("RFQ {} is being priced by another desk", id);
        }
        if matches!(transition, Transition::Moved { .. }) {
            self.announce_focus(id);
        }
    }

    fn refresh_queue(&mut self) {
        for change in self.queue.refresh(&self.store) {
            self.emit_view(ViewEvent::Queue(change));
        }
    }

    fn announce_focus(&self, id: &RfqId) {
        if let Some(record) = self.store.get(id) {
            self.emit_view(ViewEvent::Focus {
                id: id.clone(),
                focus: record.focus,
            });
        }
    }

    fn set_connection(&mut self, state: ConnectionState) {
        if self.connection != state {
            info!("{} to the RFQ feed", state);
        }
        self.connection = state;
        self.emit_view(ViewEvent::Connection(state));
    }

    fn emit(&self, env: OutboundEnvelope) {
        if let Err(e) = self.outbound.send(env) {
            warn!("Outbound envelope dropped: {}", e);
        }
    }

    fn emit_view(&self, event: ViewEvent) {
        if let Err(e) = self.view.send(event) {
            debug!("View event dropped: {}", e);
        }
    }
}

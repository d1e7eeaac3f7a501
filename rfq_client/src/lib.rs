//! Client-side RFQ state synchronisation and claim arbitration.
//!
//! A desk client watches a shared queue of RFQs pushed by the feed, claims one
//! for pricing and releases it when done. This crate holds everything between
//! the transport and the screen:
//!
//! - `model` — `RfqRecord`, its history and analytics, and the columnar decoders.
//! - `store` — `RfqStore`, reconciling snapshot/delta envelopes into records.
//! - `lifecycle` — per-record phase/focus transitions.
//! - `claim` — `ClaimArbiter`, the single-local-claim rule and its outbound messages.
//! - `projection` — `QueueView`, the ordered visible queue and its add/remove deltas.
//! - `session` — `Session`, owning all of the above for one desk.
#![warn(missing_docs)]
pub mod claim;
pub mod lifecycle;
pub mod model;
pub mod projection;
pub mod session;
pub mod store;

pub use session::{ConnectionState, Session, ViewEvent};

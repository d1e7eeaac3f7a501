//!
//! Common types and utilities shared by the RFQ desk crates.
//!
//! This crate aggregates:
//! - `error` — unified error type `RfqError` and the envelope rejection reasons.
//! - `result` — handy `Result<T, RfqError>` alias.
//! - `id` — the opaque `RfqId` carried by every envelope.
//! - `kinds` — wire tags (`msgContent`, `frontendStatus`, `side`) and terminal statuses.
//! - `envelope` — inbound envelope classification and outbound encoding.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod envelope;
pub mod error;
pub mod id;
pub mod kinds;
pub mod net;
pub mod result;

pub use envelope::{ClientUpdate, Envelope, OutboundEnvelope, RfqFields};
pub use error::{Rejected, RfqError};
pub use id::RfqId;
pub use result::Result;

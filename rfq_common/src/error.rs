//! Error types shared by the RFQ desk crates.
//!
//! `RfqError` unifies the failure cases of the client: I/O, JSON, channel
//! communication and the protocol-level refusals (unknown RFQ, missing claim).
//! `Rejected` describes why an inbound envelope was dropped at the boundary.
use std::io;

use thiserror::Error;

use crate::kinds::MsgContent;

/// Unified error type shared by the workspace.
#[derive(Error, Debug)]
pub enum RfqError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An inbound envelope did not pass classification.
    #[error("Envelope rejected: {0}")]
    Rejected(#[from] Rejected),

    /// The referenced RFQ is not in the store.
    #[error("Unknown RFQ: {0}")]
    UnknownRfq(String),

    /// The action requires the RFQ to be claimed by this client.
    #[error("RFQ {0} is not claimed by this client")]
    NotClaimed(String),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),
}

/// Reason an inbound envelope was refused by the codec.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejected {
    /// Raw text is not a JSON document.
    #[error("not valid JSON: {0}")]
    NotJson(String),

    /// The document is valid JSON but not an object.
    #[error("envelope is not a JSON object")]
    NotObject,

    /// No `id` field (or `id` is null).
    #[error("missing `id`")]
    MissingId,

    /// No `msgContent` discriminator.
    #[error("missing `msgContent`")]
    MissingKind,

    /// `msgContent` is not one of the known kinds.
    #[error("unknown msgContent `{0}`")]
    UnknownKind(String),

    /// A known field carries a value of the wrong shape.
    #[error("malformed {kind} envelope: {reason}")]
    Malformed {
        /// Kind the envelope claimed to be.
        kind: MsgContent,
        /// Decoder message.
        reason: String,
    },
}

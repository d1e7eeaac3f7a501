//! Wire tags shared between the codec and the client state machine.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Upstream status strings after which an RFQ leaves the queue for good.
pub const TERMINAL_STATUSES: [&str; 2] = ["CustRejected", "Done"];

/// Returns `true` when `status` ends the RFQ's life on the wire.
pub fn is_terminal_status(status: &str) -> bool {
    TERMINAL_STATUSES.contains(&status)
}

/// Envelope discriminator (`msgContent`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MsgContent {
    /// First sighting (or bulk bootstrap) of an RFQ.
    RfqNew,
    /// Partial or full update of a known RFQ.
    RfqUpdate,
    /// Claim/release/price notification between desk clients.
    ClientUpdate,
}

/// Claim status carried by `client_update` (`frontendStatus`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FrontendStatus {
    /// Nobody holds the RFQ.
    Free,
    /// A desk client holds the RFQ.
    InUse,
    /// A price was submitted for the RFQ.
    SubmitPrice,
}

/// Direction of the requested trade.
#[allow(missing_docs)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Side {
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

//! Envelope codec: classification of inbound messages and encoding of outbound ones.
//!
//! Every inbound message is a JSON object discriminated by `msgContent`. The raw
//! object is decoded once, here, into the tagged [`Envelope`]; nothing past this
//! module inspects untyped JSON except the columnar `history`/`analytics` blocks,
//! which are decoded row by row by the record store so that a bad row only costs
//! that row.
//!
//! Wire names are camelCase. The snake_case names used by the first generation
//! of the desk front-end are accepted as aliases.
use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Rejected;
use crate::id::RfqId;
use crate::kinds::{FrontendStatus, MsgContent, Side};
use crate::result::Result;

/// Discriminator field name.
pub const MSG_CONTENT: &str = "msgContent";
/// Legacy spelling of [`MSG_CONTENT`].
pub const MSG_CONTENT_ALIAS: &str = "msg_content";
/// Identifier field name.
pub const ID: &str = "id";

/// Columnar block: first row is the header, following rows are positional values.
pub type Block = Vec<Vec<Value>>;

/// Splits a block into `(header, data_rows)`.
///
/// Returns `None` when the block is absent, empty or header-only: such a block
/// means "no update" for its field.
pub fn split_block(block: Option<&Block>) -> Option<(&[Value], &[Vec<Value>])> {
    match block.map(Vec::as_slice) {
        Some([header, rows @ ..]) if !rows.is_empty() => Some((header.as_slice(), rows)),
        _ => None,
    }
}

/// Field set of an `rfq_new` / `rfq_update` envelope. Every field except `id`
/// is optional: updates may be partial.
///
/// Scalar fields distinguish an absent key (`None`, leave the record alone)
/// from an explicit `null` (`Some(None)`, clear the record's field).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqFields {
    /// Target RFQ.
    pub id: RfqId,
    /// Seconds since epoch at the origin.
    #[serde(default, deserialize_with = "present")]
    pub timestamp: Option<Option<i64>>,
    /// Trade direction.
    #[serde(default, deserialize_with = "present")]
    pub side: Option<Option<Side>>,
    /// Human readable instrument description.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// Instrument identifier.
    #[serde(default, deserialize_with = "present", alias = "instrument_id")]
    pub instrument_id: Option<Option<String>>,
    /// Requesting customer.
    #[serde(default, deserialize_with = "present", alias = "cust_firm")]
    pub cust_firm: Option<Option<String>>,
    /// Raw requested quantity.
    #[serde(default, deserialize_with = "present", alias = "rfq_qty")]
    pub quantity: Option<Option<f64>>,
    /// Upstream lifecycle tag.
    #[serde(default, deserialize_with = "present", alias = "status_string")]
    pub status_string: Option<Option<String>>,
    /// Historical RFQs of the same product, columnar.
    pub history: Option<Block>,
    /// Spread to predicted hit-rate table, columnar.
    pub analytics: Option<Block>,
    /// Any other field; stored by name on the record.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A key that is on the wire, possibly as `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Field set of a `client_update` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    /// Target RFQ.
    pub id: RfqId,
    /// Seconds since epoch at the origin.
    pub timestamp: Option<i64>,
    /// Claim status reported by a desk client.
    #[serde(alias = "frontend_status")]
    pub frontend_status: FrontendStatus,
    /// Price submitted alongside `submit_price`.
    #[serde(alias = "submit_price")]
    pub submit_price: Option<f64>,
}

/// Classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `rfq_new`
    RfqNew(RfqFields),
    /// `rfq_update`
    RfqUpdate(RfqFields),
    /// `client_update`
    ClientUpdate(ClientUpdate),
}

impl Envelope {
    /// Id of the RFQ the envelope refers to.
    pub fn id(&self) -> &RfqId {
        match self {
            Envelope::RfqNew(f) | Envelope::RfqUpdate(f) => &f.id,
            Envelope::ClientUpdate(u) => &u.id,
        }
    }

    /// Discriminator the envelope arrived with.
    pub fn kind(&self) -> MsgContent {
        match self {
            Envelope::RfqNew(_) => MsgContent::RfqNew,
            Envelope::RfqUpdate(_) => MsgContent::RfqUpdate,
            Envelope::ClientUpdate(_) => MsgContent::ClientUpdate,
        }
    }
}

/// Classify raw JSON text.
pub fn classify(raw: &str) -> std::result::Result<Envelope, Rejected> {
    let value: Value = serde_json::from_str(raw).map_err(|e| Rejected::NotJson(e.to_string()))?;
    classify_value(value)
}

/// Classify an already-parsed JSON document.
pub fn classify_value(value: Value) -> std::result::Result<Envelope, Rejected> {
    let Value::Object(mut map) = value else {
        return Err(Rejected::NotObject);
    };

    if matches!(map.get(ID), None | Some(Value::Null)) {
        return Err(Rejected::MissingId);
    }
    let kind = take_kind(&mut map)?;

    let body = Value::Object(map);
    let malformed = |e: serde_json::Error| Rejected::Malformed {
        kind,
        reason: e.to_string(),
    };
    let decoded = match kind {
        MsgContent::RfqNew => serde_json::from_value(body).map(Envelope::RfqNew),
        MsgContent::RfqUpdate => serde_json::from_value(body).map(Envelope::RfqUpdate),
        MsgContent::ClientUpdate => serde_json::from_value(body).map(Envelope::ClientUpdate),
    };
    decoded.map_err(malformed)
}

/// Removes both spellings of the discriminator so neither leaks into `extra`.
fn take_kind(map: &mut Map<String, Value>) -> std::result::Result<MsgContent, Rejected> {
    let primary = map.remove(MSG_CONTENT);
    let legacy = map.remove(MSG_CONTENT_ALIAS);
    match primary.or(legacy) {
        None | Some(Value::Null) => Err(Rejected::MissingKind),
        Some(Value::String(tag)) => tag
            .parse::<MsgContent>()
            .map_err(|_| Rejected::UnknownKind(tag)),
        Some(other) => Err(Rejected::UnknownKind(other.to_string())),
    }
}

/// Claim/release/price message sent to the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope {
    /// New claim status.
    pub frontend_status: FrontendStatus,
    /// Target RFQ.
    pub id: RfqId,
    /// Always `client_update`.
    pub msg_content: MsgContent,
    /// Seconds since epoch at emission.
    pub timestamp: i64,
    /// Price, only with `submit_price`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub submit_price: Option<f64>,
}

impl OutboundEnvelope {
    /// Creates a `client_update` for `id` stamped with the current time.
    pub fn new(id: RfqId, frontend_status: FrontendStatus) -> Self {
        OutboundEnvelope {
            frontend_status,
            id,
            msg_content: MsgContent::ClientUpdate,
            timestamp: Utc::now().timestamp(),
            submit_price: None,
        }
    }

    /// Creates a `submit_price` update carrying `price`.
    pub fn price(id: RfqId, price: f64) -> Self {
        OutboundEnvelope {
            submit_price: Some(price),
            ..Self::new(id, FrontendStatus::SubmitPrice)
        }
    }

    /// Encode the envelope to JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        Ok(json)
    }
}

/// Local echo of an outbound message, applied optimistically to our own store.
impl From<&OutboundEnvelope> for ClientUpdate {
    fn from(out: &OutboundEnvelope) -> Self {
        ClientUpdate {
            id: out.id.clone(),
            timestamp: Some(out.timestamp),
            frontend_status: out.frontend_status,
            submit_price: out.submit_price,
        }
    }
}

//! Opaque RFQ identifier.
//!
//! Upstream sends ids either as JSON integers or as JSON strings. The form is
//! preserved so that claims are echoed back exactly as the feed spelled them,
//! but identity follows the textual form: `7` and `"7"` name the same RFQ.
use std::borrow::Cow;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a single RFQ, stable for its lifetime.
///
/// Equality, hashing and ordering compare [`RfqId::canonical`], so a console id
/// parsed as `Num(123)` finds a record the feed keyed as `Text("123")`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RfqId {
    /// Numeric id (`"id": 7`).
    Num(i64),
    /// Textual id (`"id": "RFQ-7"`).
    Text(String),
}

impl RfqId {
    /// Textual form used for identity.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            RfqId::Num(n) => Cow::Owned(n.to_string()),
            RfqId::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl PartialEq for RfqId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RfqId::Num(a), RfqId::Num(b)) => a == b,
            (RfqId::Text(a), RfqId::Text(b)) => a == b,
            _ => self.canonical() == other.canonical(),
        }
    }
}

impl Eq for RfqId {}

impl Hash for RfqId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialOrd for RfqId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RfqId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl fmt::Display for RfqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RfqId::Num(n) => write!(f, "{}", n),
            RfqId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RfqId {
    fn from(n: i64) -> Self {
        RfqId::Num(n)
    }
}

impl From<&str> for RfqId {
    fn from(s: &str) -> Self {
        RfqId::Text(s.to_string())
    }
}

impl From<String> for RfqId {
    fn from(s: String) -> Self {
        RfqId::Text(s)
    }
}

/// Console input: digits become a numeric id, anything else a textual one.
impl FromStr for RfqId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => RfqId::Num(n),
            Err(_) => RfqId::Text(trimmed.to_string()),
        })
    }
}

//! Data model of the client-side RFQ state.
//!
//! - `record` — the per-RFQ `RfqRecord` with its claim `Focus` and lifecycle `Phase`.
//! - `history` — `HistoryEntry` and the schema-driven decoder of `history` blocks.
//! - `analytics` — the spread to hit-rate table and its block decoder.
//! - `columnar` — header/row helpers shared by both decoders.
pub mod analytics;
pub mod columnar;
pub mod history;
pub mod record;

pub use analytics::Analytics;
pub use history::HistoryEntry;
pub use record::{Focus, Phase, RfqRecord};

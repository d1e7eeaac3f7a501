//! Shared networking constants and helpers.

/// TCP port of the RFQ feed (line-delimited JSON envelopes in both directions).
pub const FEED_PORT: u16 = 8765;

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    if ip.contains(':') && !ip.starts_with('[') {
        format!("[{}]:{}", ip, port)
    } else {
        format!("{}:{}", ip, port)
    }
}

//! Threads feeding the session: the TCP link to the RFQ feed and the stdin console.
//!
//! The feed speaks one JSON document per line in both directions. Each side of
//! the socket runs on its own thread and talks to the single mutator loop in
//! `main` over `crossbeam_channel` channels, so the session itself is never
//! shared between threads.
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};
use rfq_common::{OutboundEnvelope, RfqError};

use crate::command::UserCommand;

/// Everything the mutator loop reacts to.
#[derive(Debug)]
pub enum Input {
    /// One raw line from the feed.
    Line(String),
    /// The feed closed the connection.
    Closed,
    /// A console command.
    Command(UserCommand),
}

/// Helper type for the socket threads.
pub struct FeedLink;

impl FeedLink {
    /// Spawn the thread that forwards feed lines to `tx` until EOF.
    pub fn spawn_reader(stream: TcpStream, tx: Sender<Input>) -> JoinHandle<()> {
        thread::spawn(move || {
            if let Err(e) = Self::read_lines(BufReader::new(stream), &tx) {
                error!("Feed read error: {}", e);
            }
            let _ = tx.send(Input::Closed);
            info!("Reader thread stopping...");
        })
    }

    /// Spawn the thread that writes outbound envelopes until the session drops its sender.
    pub fn spawn_writer(mut stream: TcpStream, rx: Receiver<OutboundEnvelope>) -> JoinHandle<()> {
        thread::spawn(move || {
            for envelope in rx.iter() {
                match Self::write_envelope(&mut stream, &envelope) {
                    Ok(()) => debug!("Sent {} for RFQ {}", envelope.frontend_status, envelope.id),
                    Err(e) => error!(
                        "Failed to send {} for RFQ {}: {}",
                        envelope.frontend_status, envelope.id, e
                    ),
                }
            }
            info!("Writer thread stopping...");
        })
    }

    /// Forward non-blank lines to `tx`. Returns when the reader is exhausted or
    /// the receiving side is gone.
    pub fn read_lines<R: BufRead>(reader: R, tx: &Sender<Input>) -> Result<(), RfqError> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            tx.send(Input::Line(line))
                .map_err(|e| RfqError::ChannelSend(e.to_string()))?;
        }
        Ok(())
    }

    /// Write one envelope as a JSON line.
    pub fn write_envelope<W: Write>(writer: &mut W, envelope: &OutboundEnvelope) -> Result<(), RfqError> {
        let mut bytes = envelope.to_json_bytes()?;
        bytes.push(b'\n');
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

/// Spawn the console thread reading commands from stdin.
pub fn spawn_console(tx: Sender<Input>) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Console read error: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<UserCommand>() {
                Ok(command) => {
                    if tx.send(Input::Command(command)).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
        debug!("Console thread stopping...");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use rfq_common::RfqId;
    use rfq_common::kinds::FrontendStatus;
    use std::io::Cursor;

    #[test]
    fn reads_non_blank_lines() {
        let (tx, rx) = unbounded();
        let input = Cursor::new("{\"a\":1}\n\n  \n{\"b\":2}\n");
        FeedLink::read_lines(input, &tx).unwrap();
        let lines: Vec<String> = rx
            .try_iter()
            .map(|i| match i {
                Input::Line(l) => l,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn writes_one_json_document_per_line() {
        let mut buf = Vec::new();
        let env = OutboundEnvelope::new(RfqId::Num(4), FrontendStatus::Free);
        FeedLink::write_envelope(&mut buf, &env).unwrap();
        FeedLink::write_envelope(&mut buf, &env).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let back: OutboundEnvelope = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(back, env);
    }
}

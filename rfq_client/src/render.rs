//! Log-based stand-in for the queue and detail panes.
use chrono::{DateTime, Duration, Utc};
use crossbeam_channel::Receiver;
use log::info;
use rfq_client::model::{HistoryEntry, RfqRecord};
use rfq_client::projection::QueueChange;
use rfq_client::{Session, ViewEvent};
use rfq_common::RfqId;
use rfq_common::kinds::Side;

/// Renders view events as log lines.
pub struct LogRenderer {
    history_window: Duration,
}

impl LogRenderer {
    /// Renderer showing `history_days` of history in the detail view.
    pub fn new(history_days: u32) -> Self {
        LogRenderer {
            history_window: Duration::days(i64::from(history_days)),
        }
    }

    /// Render every pending event.
    pub fn drain(&self, session: &Session, events: &Receiver<ViewEvent>) {
        for event in events.try_iter() {
            self.render(session, &event);
        }
    }

    fn render(&self, session: &Session, event: &ViewEvent) {
        match event {
            ViewEvent::Queue(QueueChange::Added(id)) => {
                if let Some(record) = session.get(id) {
                    info!("[queue +] {}", button_label(record));
                }
            }
            ViewEvent::Queue(QueueChange::Removed(id)) => info!("[queue -] RFQ {}", id),
            ViewEvent::Focus { id, focus } => info!("[queue] RFQ {} is now {}", id, focus),
            ViewEvent::ShowDetail(id) => self.show_detail(session, id),
            ViewEvent::ClearDetail => info!("[detail] cleared"),
            ViewEvent::Connection(state) => info!("[status] {}", state),
        }
    }

    /// Print the detail pane for `id`.
    pub fn show_detail(&self, session: &Session, id: &RfqId) {
        let Some(record) = session.get(id) else {
            info!("[detail] RFQ {} is not on the wire", id);
            return;
        };
        let cutoff = self.cutoff(Utc::now());
        let recent: Vec<&HistoryEntry> = record.history_since(cutoff).collect();
        info!(
            "[detail] {} | firm={} instrument={} status={} focus={} phase={}",
            button_label(record),
            record.cust_firm.as_deref().unwrap_or("-"),
            record.instrument_id.as_deref().unwrap_or("-"),
            record.status_string.as_deref().unwrap_or("-"),
            record.focus,
            record.phase,
        );
        info!(
            "[detail] history: {} entries ({} in the last {} days)",
            record.history.len(),
            recent.len(),
            self.history_window.num_days()
        );
        for entry in recent {
            info!("[detail] {}", history_line(entry, record));
        }
        for (spread, hit_rate) in record.analytics.iter() {
            info!("[detail] spread {:>8.2} -> hit rate {:.2}", spread, hit_rate);
        }
    }

    /// Oldest instant the detail view still shows, clamped to the earliest
    /// representable time.
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.history_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Print the visible queue.
    pub fn show_queue(&self, session: &Session) {
        info!("[queue] {} RFQs on the wire", session.queue().len());
        for id in session.queue() {
            if let Some(record) = session.get(id) {
                let mark = if session.local_focus() == Some(id) { '*' } else { ' ' };
                info!("[queue] {} {} ({})", mark, button_label(record), record.focus);
            }
        }
    }
}

/// One-line summary as shown on a queue button: side, description, quantity.
pub fn button_label(record: &RfqRecord) -> String {
    let side = match record.side {
        Some(Side::Buy) => "BUY",
        Some(Side::Sell) => "SELL",
        None => "?",
    };
    let quantity = record
        .quantity
        .map(|q| q.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{} {} {} x {}",
        record.id,
        side,
        record.description.as_deref().unwrap_or("(no description)"),
        quantity
    )
}

/// One past RFQ with the hit rate the current analytics predict at its spread.
fn history_line(entry: &HistoryEntry, record: &RfqRecord) -> String {
    let when = entry
        .occurred_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| entry.timestamp.to_string());
    let spread = entry
        .qt_percent
        .map(|q| format!("{:.2}", q))
        .unwrap_or_else(|| "-".to_string());
    let predicted = entry
        .qt_percent
        .and_then(|q| record.hit_rate_at(q))
        .map(|h| format!("{:.2}", h))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} spread={} predicted={} status={}",
        when,
        entry.side.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string()),
        spread,
        predicted,
        entry.status_string.as_deref().unwrap_or("-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_history_window_does_not_overflow() {
        let now = Utc::now();
        assert_eq!(LogRenderer::new(u32::MAX).cutoff(now), DateTime::<Utc>::MIN_UTC);
        assert_eq!(LogRenderer::new(30).cutoff(now), now - Duration::days(30));
    }

    #[test]
    fn history_lines_carry_predicted_hit_rate() {
        let mut record = RfqRecord::new(RfqId::Num(7), 0);
        record.analytics.insert(5.0, 0.3);
        record.analytics.insert(7.0, 0.2);
        let entry = HistoryEntry {
            timestamp: 0,
            side: Some(Side::Buy),
            quantity: None,
            qt_percent: Some(6.0),
            status_string: Some("Done".into()),
        };
        assert_eq!(
            history_line(&entry, &record),
            "1970-01-01 00:00 Buy spread=6.00 predicted=0.25 status=Done"
        );
        let bare = HistoryEntry { qt_percent: None, status_string: None, side: None, ..entry };
        assert_eq!(history_line(&bare, &record), "1970-01-01 00:00 ? spread=- predicted=- status=-");
    }

    #[test]
    fn labels_buttons() {
        let mut record = RfqRecord::new(RfqId::Num(7), 0);
        assert_eq!(button_label(&record), "#7 ? (no description) x -");
        record.side = Some(Side::Sell);
        record.description = Some("BUND 10Y".into());
        record.quantity = Some(12.0);
        assert_eq!(button_label(&record), "#7 SELL BUND 10Y x 12");
    }
}

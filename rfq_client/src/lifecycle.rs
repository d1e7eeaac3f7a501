//! Per-record lifecycle state machine.
//!
//! ```text
//! Queued ──in_use──▶ Claimed ──submit_price──▶ Pricing
//!    ▲                  │                         │
//!    └──────free────────┴──────────free───────────┘
//!
//! any phase ──statusString ∈ {CustRejected, Done}──▶ Removed (record deleted)
//! ```
//!
//! The machine is purely reactive. It mutates `phase`/`focus` of the record it
//! is handed and reports what happened; it never originates messages.
use rfq_common::kinds::FrontendStatus;

use crate::model::{Focus, Phase, RfqRecord};

/// Where a `client_update` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Our own claim action, applied optimistically.
    Local,
    /// Relayed by the feed.
    Remote,
}

/// Phase and focus of a live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Claim status.
    pub focus: Focus,
}

impl State {
    /// Current state of `record`.
    pub fn of(record: &RfqRecord) -> Self {
        State {
            phase: record.phase,
            focus: record.focus,
        }
    }
}

/// Outcome of feeding one envelope to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Phase and focus did not change.
    Unchanged,
    /// Phase and/or focus changed.
    Moved {
        /// Before.
        from: State,
        /// After.
        to: State,
    },
    /// Terminal status: the record is gone. `focus` is what it held last.
    Removed {
        /// Focus at removal time.
        focus: Focus,
    },
}

impl Transition {
    /// `true` when the record stopped being locally focused.
    pub fn drops_local_focus(&self) -> bool {
        match self {
            Transition::Moved { from, to } => {
                from.focus == Focus::LocallyFocused && to.focus != Focus::LocallyFocused
            }
            Transition::Removed { focus } => *focus == Focus::LocallyFocused,
            Transition::Unchanged => false,
        }
    }

    /// `true` when the record moved to `Pricing`.
    pub fn entered_pricing(&self) -> bool {
        matches!(self, Transition::Moved { from, to } if from.phase != Phase::Pricing && to.phase == Phase::Pricing)
    }
}

/// Whether an `rfq_new`/`rfq_update` left the record in a terminal status.
pub fn is_removal(record: &RfqRecord) -> bool {
    record.is_terminal()
}

/// Apply a `client_update` status to `record`.
///
/// `in_use` relayed by the feed for a record we hold locally stays
/// `LocallyFocused`: the feed echoes our own claims and the two cannot be told
/// apart.
pub fn apply_status(record: &mut RfqRecord, status: FrontendStatus, origin: Origin) -> Transition {
    let from = State::of(record);
    let to = match status {
        FrontendStatus::Free => State {
            phase: Phase::Queued,
            focus: Focus::Free,
        },
        FrontendStatus::InUse => {
            let focus = match origin {
                Origin::Local => Focus::LocallyFocused,
                Origin::Remote if record.focus == Focus::LocallyFocused => Focus::LocallyFocused,
                Origin::Remote => Focus::RemotelyFocused,
            };
            State {
                phase: Phase::Claimed,
                focus,
            }
        }
        FrontendStatus::SubmitPrice => State {
            phase: Phase::Pricing,
            focus: Focus::Free,
        },
    };

    record.phase = to.phase;
    record.focus = to.focus;
    if from == to {
        Transition::Unchanged
    } else {
        Transition::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfq_common::RfqId;

    fn record() -> RfqRecord {
        RfqRecord::new(RfqId::Num(1), 0)
    }

    #[test]
    fn remote_claim_then_free() {
        let mut r = record();
        let t = apply_status(&mut r, FrontendStatus::InUse, Origin::Remote);
        assert_eq!(r.focus, Focus::RemotelyFocused);
        assert_eq!(r.phase, Phase::Claimed);
        assert!(!t.drops_local_focus());

        let t = apply_status(&mut r, FrontendStatus::Free, Origin::Remote);
        assert_eq!(State::of(&r), State { phase: Phase::Queued, focus: Focus::Free });
        assert!(matches!(t, Transition::Moved { .. }));
    }

    #[test]
    fn local_claim_survives_echo() {
        let mut r = record();
        apply_status(&mut r, FrontendStatus::InUse, Origin::Local);
        assert_eq!(r.focus, Focus::LocallyFocused);
        let t = apply_status(&mut r, FrontendStatus::InUse, Origin::Remote);
        assert_eq!(t, Transition::Unchanged);
        assert_eq!(r.focus, Focus::LocallyFocused);
    }

    #[test]
    fn pricing_releases_local_focus() {
        let mut r = record();
        apply_status(&mut r, FrontendStatus::InUse, Origin::Local);
        let t = apply_status(&mut r, FrontendStatus::SubmitPrice, Origin::Remote);
        assert!(t.drops_local_focus());
        assert!(t.entered_pricing());
        assert_eq!(r.phase, Phase::Pricing);
        assert_eq!(r.focus, Focus::Free);
    }

    #[test]
    fn remote_free_drops_local_focus() {
        let mut r = record();
        apply_status(&mut r, FrontendStatus::InUse, Origin::Local);
        let t = apply_status(&mut r, FrontendStatus::Free, Origin::Remote);
        assert!(t.drops_local_focus());
    }

    #[test]
    fn removal_reports_focus() {
        assert!(Transition::Removed { focus: Focus::LocallyFocused }.drops_local_focus());
        assert!(!Transition::Removed { focus: Focus::RemotelyFocused }.drops_local_focus());
        let mut r = record();
        r.status_string = Some("Done".into());
        assert!(is_removal(&r));
    }
}

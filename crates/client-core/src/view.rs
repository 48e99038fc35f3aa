//! UI reflection
//!
//! Pure functions from panel state to what the front-end shows: which
//! controls are enabled, the incoming-call label and the status line. The
//! same snapshot always renders the same view.

use serde::{Serialize, Serializer};

use crate::call::CallState;

/// Label shown when nothing is ringing
pub const NO_INCOMING_CALL: &str = "No incoming call.";

/// Status line after the last transition. `Display` yields the exact text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusMessage {
    /// Nothing has happened yet
    #[default]
    Empty,
    MissingToken,
    AgentReady,
    AgentFailed(String),
    AgentRequired,
    MissingCallee,
    CallInProgress,
    Calling,
    StartFailed(String),
    CallState(String),
    CallEnded,
    IncomingCall(String),
    NoIncomingToAccept,
    NoIncomingToReject,
    NoActiveToHold,
    NoHeldToResume,
    NoActiveToHangUp,
    OnHold,
    Resumed,
    Accepted,
    Rejected,
    AcceptFailed(String),
    RejectFailed(String),
    HoldFailed(String),
    ResumeFailed(String),
    HangUpFailed(String),
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::MissingToken => {
                f.write_str("Provide an ACS user access token before initializing the agent.")
            }
            Self::AgentReady => f.write_str("Call agent initialized. Ready to place a call."),
            Self::AgentFailed(msg) => write!(f, "Failed to initialize call agent: {}", msg),
            Self::AgentRequired => f.write_str("Initialize the call agent first."),
            Self::MissingCallee => f.write_str("Provide a callee ACS user ID to start a call."),
            Self::CallInProgress => f.write_str("A call is already in progress."),
            Self::Calling => f.write_str("Calling..."),
            Self::StartFailed(msg) => write!(f, "Unable to start call: {}", msg),
            Self::CallState(state) => write!(f, "Call state: {}", state),
            Self::CallEnded => f.write_str("Call ended."),
            Self::IncomingCall(caller) => write!(f, "Incoming call from {}.", caller),
            Self::NoIncomingToAccept => f.write_str("No incoming call to accept."),
            Self::NoIncomingToReject => f.write_str("No incoming call to reject."),
            Self::NoActiveToHold => f.write_str("No active call to hold."),
            Self::NoHeldToResume => f.write_str("No held call to resume."),
            Self::NoActiveToHangUp => f.write_str("No active call to hang up."),
            Self::OnHold => f.write_str("Call on hold."),
            Self::Resumed => f.write_str("Call resumed."),
            Self::Accepted => f.write_str("Incoming call accepted."),
            Self::Rejected => f.write_str("Incoming call rejected."),
            Self::AcceptFailed(msg) => write!(f, "Unable to accept call: {}", msg),
            Self::RejectFailed(msg) => write!(f, "Unable to reject call: {}", msg),
            Self::HoldFailed(msg) => write!(f, "Unable to hold call: {}", msg),
            Self::ResumeFailed(msg) => write!(f, "Unable to resume call: {}", msg),
            Self::HangUpFailed(msg) => write!(f, "Unable to hang up: {}", msg),
        }
    }
}

impl Serialize for StatusMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read-only input to the reflector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSnapshot<'a> {
    /// A session exists
    pub agent_ready: bool,
    /// Caller id of the pending inbound call, if any
    pub pending_caller: Option<&'a str>,
    /// State of the active call; `Idle` when there is none
    pub call_state: CallState,
}

/// Enablement of the call controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CallControls {
    pub can_start: bool,
    pub can_hold: bool,
    pub can_resume: bool,
    pub can_end: bool,
}

/// Enablement and label of the incoming-call controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomingControls {
    pub can_accept: bool,
    pub can_reject: bool,
    pub label: String,
}

/// Everything the front-end renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub agent_ready: bool,
    pub can_initialize: bool,
    pub incoming: IncomingControls,
    pub call: CallControls,
    pub call_state: CallState,
    pub status: String,
}

/// Call-control enablement for a snapshot.
///
/// Hold is offered as soon as a call is placed; the controller itself only
/// honours it once the call is connected.
pub fn call_controls(snapshot: &PanelSnapshot<'_>) -> CallControls {
    let state = snapshot.call_state;
    CallControls {
        can_start: snapshot.agent_ready && state == CallState::Idle,
        can_hold: matches!(state, CallState::Connecting | CallState::Connected),
        can_resume: state == CallState::OnHold,
        can_end: state.is_active(),
    }
}

pub fn incoming_controls(snapshot: &PanelSnapshot<'_>) -> IncomingControls {
    match snapshot.pending_caller {
        Some(caller) => IncomingControls {
            can_accept: true,
            can_reject: true,
            label: format!("Incoming call from {}.", caller),
        },
        None => IncomingControls {
            can_accept: false,
            can_reject: false,
            label: NO_INCOMING_CALL.to_string(),
        },
    }
}

/// Render the full view for a snapshot and the current status.
pub fn render(snapshot: &PanelSnapshot<'_>, status: &StatusMessage) -> PanelView {
    PanelView {
        agent_ready: snapshot.agent_ready,
        can_initialize: !snapshot.agent_ready,
        incoming: incoming_controls(snapshot),
        call: call_controls(snapshot),
        call_state: snapshot.call_state,
        status: status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(agent_ready: bool, pending_caller: Option<&str>, call_state: CallState) -> PanelSnapshot<'_> {
        PanelSnapshot {
            agent_ready,
            pending_caller,
            call_state,
        }
    }

    #[test]
    fn start_requires_session_and_no_call() {
        let states = [
            CallState::Idle,
            CallState::Connecting,
            CallState::Connected,
            CallState::OnHold,
            CallState::Disconnected,
        ];
        for ready in [false, true] {
            for state in states {
                let controls = call_controls(&snapshot(ready, None, state));
                assert_eq!(controls.can_start, ready && state == CallState::Idle, "{ready} {state}");
            }
        }
    }

    #[test]
    fn connecting_call_offers_hold_and_end() {
        let controls = call_controls(&snapshot(true, None, CallState::Connecting));
        assert_eq!(
            controls,
            CallControls {
                can_start: false,
                can_hold: true,
                can_resume: false,
                can_end: true,
            }
        );
    }

    #[test]
    fn held_call_offers_resume_only() {
        let controls = call_controls(&snapshot(true, None, CallState::OnHold));
        assert!(controls.can_resume);
        assert!(!controls.can_hold);
        assert!(controls.can_end);
    }

    #[test]
    fn pending_call_enables_accept_and_reject() {
        let incoming = incoming_controls(&snapshot(true, Some("user456"), CallState::Idle));
        assert!(incoming.can_accept && incoming.can_reject);
        assert_eq!(incoming.label, "Incoming call from user456.");

        let idle = incoming_controls(&snapshot(true, None, CallState::Idle));
        assert!(!idle.can_accept && !idle.can_reject);
        assert_eq!(idle.label, NO_INCOMING_CALL);
    }

    #[test]
    fn render_is_deterministic() {
        let snap = snapshot(true, Some("user456"), CallState::Connected);
        let status = StatusMessage::CallState("Connected".into());
        assert_eq!(render(&snap, &status), render(&snap, &status));
        assert_eq!(render(&snap, &status).status, "Call state: Connected");
        assert!(!render(&snap, &status).can_initialize);
    }

    #[test]
    fn status_texts_match_panel_literals() {
        assert_eq!(
            StatusMessage::MissingToken.to_string(),
            "Provide an ACS user access token before initializing the agent."
        );
        assert_eq!(StatusMessage::AgentFailed("boom".into()).to_string(), "Failed to initialize call agent: boom");
        assert_eq!(StatusMessage::HangUpFailed("gone".into()).to_string(), "Unable to hang up: gone");
        assert_eq!(StatusMessage::NoHeldToResume.to_string(), "No held call to resume.");
        assert_eq!(serde_json::to_string(&StatusMessage::Calling).unwrap(), r#""Calling...""#);
    }
}

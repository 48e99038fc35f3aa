//! Call identity, lifecycle state and call information

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sdk::SdkCallState;

/// Locally assigned identifier for the active call
pub type CallId = uuid::Uuid;

/// Lifecycle state of the single active call, as seen by the panel
///
/// ```text
///   Idle ──start──► Connecting ──Connected──► Connected ◄──resume── OnHold
///                        │                      │   └────hold────────►│
///                        └──────────── end / Disconnected ────────────┘
///                                             │
///                                        Disconnected ──reset──► Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CallState {
    /// No call exists
    #[default]
    Idle,
    /// Outgoing call placed, not yet answered
    Connecting,
    /// Media flowing in both directions
    Connected,
    /// Held locally
    OnHold,
    /// Torn down; the controller resets to `Idle` right after
    Disconnected,
}

impl CallState {
    /// Whether the call is live and can be hung up
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::OnHold)
    }

    /// Map an SDK state onto the panel's lifecycle.
    ///
    /// Returns `None` for SDK states that do not move the panel state
    /// (ringing, early media, lobby, disconnecting).
    pub fn from_sdk(state: SdkCallState) -> Option<Self> {
        match state {
            SdkCallState::Connected | SdkCallState::RemoteHold => Some(Self::Connected),
            SdkCallState::LocalHold => Some(Self::OnHold),
            SdkCallState::Disconnected => Some(Self::Disconnected),
            SdkCallState::None
            | SdkCallState::Connecting
            | SdkCallState::Ringing
            | SdkCallState::EarlyMedia
            | SdkCallState::InLobby
            | SdkCallState::Disconnecting => None,
        }
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::OnHold => "OnHold",
            Self::Disconnected => "Disconnected",
        };
        f.write_str(name)
    }
}

/// Direction of a call relative to the local agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallDirection {
    /// Placed by this agent
    Outgoing,
    /// Accepted from an incoming notification
    Incoming,
}

/// Snapshot of the active call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallInfo {
    /// Locally assigned identifier
    pub call_id: CallId,
    /// Identifier the SDK uses for this call
    pub sdk_call_id: String,
    /// Who placed the call
    pub direction: CallDirection,
    /// Callee id for outgoing calls, caller id for accepted calls
    pub remote_id: String,
    /// Current lifecycle state
    pub state: CallState,
    /// When the call was placed or accepted
    pub created_at: DateTime<Utc>,
    /// When the call first reached `Connected`
    pub connected_at: Option<DateTime<Utc>>,
}

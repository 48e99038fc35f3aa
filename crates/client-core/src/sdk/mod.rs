//! Calling SDK contract
//!
//! The panel never touches a concrete SDK. It talks to these traits, and the
//! SDK talks back through a channel of [`SdkNotification`] values (the
//! equivalent of the SDK's `incomingCall` and `stateChanged` callbacks).
//!
//! ```text
//!   CallPanel ──create_agent──► CallingSdk
//!       │                           │
//!       ├──start_call──────────► CallAgent ──► SdkCall (hold/resume/hang_up)
//!       │                           │
//!       └──accept/reject──────► SdkIncomingCall
//!
//!   SDK ──SdkNotification──► mpsc channel ──► CallPanel::handle_notification
//! ```

#[cfg(any(test, feature = "mock-sdk"))]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::credential::TokenCredential;

/// Failure reported by the SDK; the message is shown to the user verbatim
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SdkError {
    pub message: String,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for SDK calls
pub type SdkResult<T> = Result<T, SdkError>;

/// Call states as reported by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SdkCallState {
    None,
    Connecting,
    Ringing,
    EarlyMedia,
    Connected,
    LocalHold,
    RemoteHold,
    InLobby,
    Disconnecting,
    Disconnected,
}

impl SdkCallState {
    const ALL: [SdkCallState; 10] = [
        Self::None,
        Self::Connecting,
        Self::Ringing,
        Self::EarlyMedia,
        Self::Connected,
        Self::LocalHold,
        Self::RemoteHold,
        Self::InLobby,
        Self::Disconnecting,
        Self::Disconnected,
    ];

    /// Name as it appears in `"Call state: {state}"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Connecting => "Connecting",
            Self::Ringing => "Ringing",
            Self::EarlyMedia => "EarlyMedia",
            Self::Connected => "Connected",
            Self::LocalHold => "LocalHold",
            Self::RemoteHold => "RemoteHold",
            Self::InLobby => "InLobby",
            Self::Disconnecting => "Disconnecting",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl std::fmt::Display for SdkCallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SdkCallState {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SdkError::new(format!("unknown call state: {}", s)))
    }
}

/// Options passed when creating an agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOptions {
    /// Name shown to remote participants
    pub display_name: Option<String>,
}

/// Asynchronous notifications delivered by the SDK
pub enum SdkNotification {
    /// A remote party is calling this agent
    IncomingCall(Box<dyn SdkIncomingCall>),
    /// The caller gave up before the incoming call was answered
    IncomingCallEnded { incoming_id: String },
    /// A call owned by this agent changed state
    CallStateChanged { call_id: String, state: SdkCallState },
}

impl std::fmt::Debug for SdkNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncomingCall(call) => f
                .debug_struct("IncomingCall")
                .field("incoming_id", &call.id())
                .field("caller_id", &call.caller_id())
                .finish(),
            Self::IncomingCallEnded { incoming_id } => f
                .debug_struct("IncomingCallEnded")
                .field("incoming_id", incoming_id)
                .finish(),
            Self::CallStateChanged { call_id, state } => f
                .debug_struct("CallStateChanged")
                .field("call_id", call_id)
                .field("state", state)
                .finish(),
        }
    }
}

/// Sending half handed to the SDK when an agent is created
pub type NotificationSender = mpsc::UnboundedSender<SdkNotification>;

/// Receiving half drained by the panel's event loop
pub type NotificationReceiver = mpsc::UnboundedReceiver<SdkNotification>;

/// Entry point of the calling SDK
#[async_trait]
pub trait CallingSdk: Send + Sync {
    /// Create an authenticated agent. Inbound calls and call-state changes
    /// for this agent are delivered through `notifications`.
    async fn create_agent(
        &self,
        credential: &TokenCredential,
        options: AgentOptions,
        notifications: NotificationSender,
    ) -> SdkResult<Box<dyn CallAgent>>;

    /// Ask the platform for microphone access. `Ok(false)` means denied.
    async fn request_audio_permission(&self) -> SdkResult<bool>;
}

/// An authenticated calling agent
#[async_trait]
pub trait CallAgent: Send + Sync {
    /// Place an outgoing call. The SDK returns the call immediately and
    /// reports progress through `CallStateChanged` notifications.
    fn start_call(&self, callee_id: &str) -> SdkResult<Box<dyn SdkCall>>;

    /// Release the agent and its registrations
    async fn dispose(&self) -> SdkResult<()>;
}

/// A call handle owned by the SDK
#[async_trait]
pub trait SdkCall: Send + Sync {
    /// SDK-assigned call id, matched against `CallStateChanged::call_id`
    fn id(&self) -> &str;

    async fn hold(&self) -> SdkResult<()>;

    async fn resume(&self) -> SdkResult<()>;

    async fn hang_up(&self, for_everyone: bool) -> SdkResult<()>;
}

/// A ringing inbound call
#[async_trait]
pub trait SdkIncomingCall: Send + Sync {
    fn id(&self) -> &str;

    /// Communication user id of the caller, when the SDK knows it
    fn caller_id(&self) -> Option<&str>;

    async fn accept(&self) -> SdkResult<Box<dyn SdkCall>>;

    async fn reject(&self) -> SdkResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_state_parses_case_insensitively() {
        assert_eq!("connected".parse::<SdkCallState>().unwrap(), SdkCallState::Connected);
        assert_eq!(" LocalHold ".parse::<SdkCallState>().unwrap(), SdkCallState::LocalHold);
        assert!("answered".parse::<SdkCallState>().is_err());
    }

    #[test]
    fn call_state_display_round_trips_names() {
        for state in SdkCallState::ALL {
            assert_eq!(state.to_string().parse::<SdkCallState>().unwrap(), state);
        }
    }
}

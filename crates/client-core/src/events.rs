//! Event handling for the call panel
//!
//! Every observable change (agent ready, incoming call, call-state
//! transition, status text, error) is broadcast as a [`ClientEvent`] so a
//! front-end can react without polling the panel.
//!
//! # Usage Examples
//!
//! ```rust
//! use voicedesk_client_core::events::{ClientEvent, EventEmitter, EventPriority};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let emitter = EventEmitter::new(16);
//! let mut events = emitter.subscribe_simple();
//!
//! emitter.emit(ClientEvent::StatusChanged { status: "Calling...".to_string() });
//!
//! let event = events.next().await.unwrap();
//! assert_eq!(event.priority(), EventPriority::Low);
//! # }
//! ```

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::call::{CallId, CallState};
use crate::error::ClientError;

/// Event priority levels for filtering and handling
///
/// ```rust
/// use voicedesk_client_core::events::EventPriority;
///
/// assert!(EventPriority::Critical > EventPriority::High);
/// assert!(EventPriority::High > EventPriority::Normal);
/// assert!(EventPriority::Normal > EventPriority::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    /// Status text updates
    Low,
    /// Call state changes
    Normal,
    /// Incoming calls, agent readiness
    High,
    /// Failures
    Critical,
}

/// Information about a ringing inbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallInfo {
    /// SDK identifier of the incoming call
    pub incoming_id: String,
    /// Caller id, `"Unknown caller"` when the SDK did not provide one
    pub caller_id: String,
    /// When the notification arrived
    pub received_at: DateTime<Utc>,
}

/// Information about a call state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStatusInfo {
    /// Call that changed state
    pub call_id: CallId,
    /// New call state after the transition
    pub new_state: CallState,
    /// Previous call state before the transition (if known)
    pub previous_state: Option<CallState>,
    /// Reason for the state change (e.g., "Remote hangup")
    pub reason: Option<String>,
    /// When the state change occurred
    pub timestamp: DateTime<Utc>,
}

impl CallStatusInfo {
    pub(crate) fn transition(
        call_id: CallId,
        previous_state: Option<CallState>,
        new_state: CallState,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            call_id,
            new_state,
            previous_state,
            reason: Some(reason.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Events emitted by the call panel
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A session was established
    AgentReady {
        /// Display name the agent registered with
        display_name: Option<String>,
        /// Communication user id from the token
        user_id: Option<String>,
    },
    /// An inbound call is waiting for accept or reject
    IncomingCall { info: IncomingCallInfo },
    /// The pending inbound call went away (accepted, rejected, cancelled)
    IncomingCallCleared { incoming_id: String, reason: String },
    /// The active call moved between lifecycle states
    CallStateChanged { info: CallStatusInfo },
    /// The status line changed
    StatusChanged { status: String },
    /// An operation failed at the handler boundary
    Error {
        error: ClientError,
        call_id: Option<CallId>,
    },
}

impl ClientEvent {
    pub fn priority(&self) -> EventPriority {
        match self {
            Self::Error { .. } => EventPriority::Critical,
            Self::AgentReady { .. } | Self::IncomingCall { .. } => EventPriority::High,
            Self::IncomingCallCleared { .. } | Self::CallStateChanged { .. } => EventPriority::Normal,
            Self::StatusChanged { .. } => EventPriority::Low,
        }
    }
}

/// Event stream type
pub type EventStream = BroadcastStream<ClientEvent>;

/// Simple event iterator that doesn't require StreamExt
pub struct EventIterator {
    stream: EventStream,
}

impl EventIterator {
    pub fn new(stream: EventStream) -> Self {
        Self { stream }
    }

    /// Get the next event, skipping over lag notifications
    pub async fn next(&mut self) -> Option<ClientEvent> {
        use tokio_stream::StreamExt;
        loop {
            match self.stream.next().await {
                Some(Ok(event)) => return Some(event),
                Some(Err(lagged)) => {
                    tracing::warn!("Event subscriber lagged: {}", lagged);
                }
                None => return None,
            }
        }
    }
}

/// Broadcasts [`ClientEvent`]s to any number of subscribers
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventEmitter {
    /// Create a new event emitter with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn emit(&self, event: ClientEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventStream {
        BroadcastStream::new(self.sender.subscribe())
    }

    pub fn subscribe_simple(&self) -> EventIterator {
        EventIterator::new(self.subscribe())
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

//! Incoming call notifier
//!
//! Holds at most one ringing inbound call. A newer notification replaces an
//! older one; accept fails closed (the call stays pending for a retry) and
//! reject fails open (the call is always cleared).

use chrono::{DateTime, Utc};

use crate::error::{ClientError, ClientResult};
use crate::events::{ClientEvent, EventEmitter, IncomingCallInfo};
use crate::sdk::{SdkCall, SdkIncomingCall};

/// Caller label used when the SDK does not identify the caller
pub const UNKNOWN_CALLER: &str = "Unknown caller";

/// A ringing inbound call waiting for a decision
pub struct PendingCall {
    caller_id: String,
    received_at: DateTime<Utc>,
    handle: Box<dyn SdkIncomingCall>,
}

impl PendingCall {
    /// SDK identifier of the incoming call
    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    fn info(&self) -> IncomingCallInfo {
        IncomingCallInfo {
            incoming_id: self.id().to_string(),
            caller_id: self.caller_id.clone(),
            received_at: self.received_at,
        }
    }
}

impl std::fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCall")
            .field("id", &self.id())
            .field("caller_id", &self.caller_id)
            .field("received_at", &self.received_at)
            .finish()
    }
}

/// A pending call the SDK has answered
pub struct AcceptedCall {
    pub call: Box<dyn SdkCall>,
    pub caller_id: String,
}

/// Tracks the single pending inbound call
pub struct IncomingCallNotifier {
    pending: Option<PendingCall>,
    events: EventEmitter,
}

impl IncomingCallNotifier {
    pub fn new(events: EventEmitter) -> Self {
        Self {
            pending: None,
            events,
        }
    }

    pub fn pending(&self) -> Option<&PendingCall> {
        self.pending.as_ref()
    }

    /// Record a new inbound call, replacing any older pending one.
    pub fn on_incoming(&mut self, handle: Box<dyn SdkIncomingCall>) -> &PendingCall {
        let caller_id = handle
            .caller_id()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_CALLER)
            .to_string();

        if let Some(previous) = self.pending.take() {
            tracing::warn!(
                "Incoming call {} from {} replaced by a newer one",
                previous.id(),
                previous.caller_id
            );
            self.cleared(&previous, "superseded");
        }

        let pending = PendingCall {
            caller_id,
            received_at: Utc::now(),
            handle,
        };
        tracing::info!("Incoming call {} from {}", pending.id(), pending.caller_id);
        self.events.emit(ClientEvent::IncomingCall { info: pending.info() });
        self.pending.insert(pending)
    }

    /// The caller hung up before an answer. Returns whether anything was
    /// cleared; ids that do not match the pending call are ignored.
    pub fn on_cancelled(&mut self, incoming_id: &str) -> bool {
        match self.pending.take_if(|pending| pending.id() == incoming_id) {
            Some(pending) => {
                tracing::info!("Incoming call {} cancelled by caller", incoming_id);
                self.cleared(&pending, "cancelled by caller");
                true
            }
            None => {
                tracing::debug!("Ignoring cancellation for unknown incoming call {}", incoming_id);
                false
            }
        }
    }

    /// Answer the pending call.
    ///
    /// On SDK failure the call stays pending so the user can retry.
    pub async fn accept(&mut self) -> ClientResult<AcceptedCall> {
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| ClientError::accept("no incoming call is pending"))?;

        let call = pending
            .handle
            .accept()
            .await
            .map_err(|e| ClientError::accept(e.message))?;

        let pending = self
            .pending
            .take()
            .ok_or_else(|| ClientError::accept("incoming call vanished while accepting"))?;
        self.cleared(&pending, "accepted");
        Ok(AcceptedCall {
            call,
            caller_id: pending.caller_id,
        })
    }

    /// Decline the pending call. The call is cleared even when the SDK
    /// reports a failure.
    pub async fn reject(&mut self) -> ClientResult<()> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| ClientError::reject("no incoming call is pending"))?;
        self.cleared(&pending, "rejected");

        pending
            .handle
            .reject()
            .await
            .map_err(|e| ClientError::reject(e.message))
    }

    /// Drop the pending call without telling the SDK.
    pub fn clear(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.cleared(&pending, "session replaced");
        }
    }

    fn cleared(&self, pending: &PendingCall, reason: &str) {
        self.events.emit(ClientEvent::IncomingCallCleared {
            incoming_id: pending.id().to_string(),
            reason: reason.to_string(),
        });
    }
}

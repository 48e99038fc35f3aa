//! Active call controller
//!
//! Owns the single active call and drives its lifecycle:
//!
//! - **Outgoing**: `start()` places the call in `Connecting`
//! - **Incoming**: `adopt()` installs an accepted call in `Connected`
//! - **Control**: `hold()` / `resume()` fail closed, `end()` fails open
//! - **SDK signals**: `on_sdk_state()` applies `Connected`, hold and
//!   `Disconnected` reports, ignoring anything about a call that is no
//!   longer tracked
//!
//! Reaching `Disconnected` always emits two transitions, the teardown and
//! the reset to `Idle`, after which no active call exists.

use chrono::Utc;

use super::bootstrap::Session;
use crate::call::{CallDirection, CallId, CallInfo, CallState};
use crate::error::{CallOperation, ClientError, ClientResult, ValidationError};
use crate::events::{CallStatusInfo, ClientEvent, EventEmitter};
use crate::sdk::{SdkCall, SdkCallState};

struct ActiveCall {
    info: CallInfo,
    handle: Box<dyn SdkCall>,
}

/// Drives the single active call through its lifecycle
pub struct ActiveCallController {
    active: Option<ActiveCall>,
    hang_up_for_everyone: bool,
    events: EventEmitter,
}

impl ActiveCallController {
    pub fn new(events: EventEmitter, hang_up_for_everyone: bool) -> Self {
        Self {
            active: None,
            hang_up_for_everyone,
            events,
        }
    }

    /// Current lifecycle state; `Idle` when no call exists
    pub fn state(&self) -> CallState {
        self.active
            .as_ref()
            .map(|call| call.info.state)
            .unwrap_or(CallState::Idle)
    }

    pub fn active(&self) -> Option<&CallInfo> {
        self.active.as_ref().map(|call| &call.info)
    }

    pub fn has_active_call(&self) -> bool {
        self.active.is_some()
    }

    /// Fails with `CallInProgress` while a call exists
    pub fn ensure_idle(&self) -> ClientResult<()> {
        if self.active.is_some() {
            return Err(ValidationError::CallInProgress.into());
        }
        Ok(())
    }

    /// Place an outgoing call: `Idle -> Connecting`.
    ///
    /// # Errors
    ///
    /// * `ValidationError::NoSession` - no agent to place the call with
    /// * `ValidationError::MissingCallee` - blank callee id
    /// * `ValidationError::CallInProgress` - a call already exists
    /// * `ClientError::Operation` - the SDK refused to place the call
    pub fn start(&mut self, session: Option<&Session>, callee_id: &str) -> ClientResult<&CallInfo> {
        let session = session.ok_or(ValidationError::NoSession)?;
        let callee_id = callee_id.trim();
        if callee_id.is_empty() {
            return Err(ValidationError::MissingCallee.into());
        }
        self.ensure_idle()?;

        let handle = session
            .agent()
            .start_call(callee_id)
            .map_err(|e| ClientError::operation(CallOperation::Start, e.message))?;

        let info = CallInfo {
            call_id: CallId::new_v4(),
            sdk_call_id: handle.id().to_string(),
            direction: CallDirection::Outgoing,
            remote_id: callee_id.to_string(),
            state: CallState::Connecting,
            created_at: Utc::now(),
            connected_at: None,
        };
        tracing::info!(
            "Created outgoing call to {} (call_id: {}, sdk: {})",
            info.remote_id,
            info.call_id,
            info.sdk_call_id
        );
        self.emit_transition(info.call_id, Some(CallState::Idle), CallState::Connecting, "Call placed");

        Ok(&self.active.insert(ActiveCall { info, handle }).info)
    }

    /// Install an accepted inbound call as the active call, in `Connected`.
    pub fn adopt(&mut self, handle: Box<dyn SdkCall>, caller_id: &str) -> ClientResult<&CallInfo> {
        self.ensure_idle()?;

        let now = Utc::now();
        let info = CallInfo {
            call_id: CallId::new_v4(),
            sdk_call_id: handle.id().to_string(),
            direction: CallDirection::Incoming,
            remote_id: caller_id.to_string(),
            state: CallState::Connected,
            created_at: now,
            connected_at: Some(now),
        };
        tracing::info!(
            "Answered call from {} (call_id: {}, sdk: {})",
            info.remote_id,
            info.call_id,
            info.sdk_call_id
        );
        self.emit_transition(info.call_id, Some(CallState::Idle), CallState::Connected, "Call answered");

        Ok(&self.active.insert(ActiveCall { info, handle }).info)
    }

    /// `Connected -> OnHold`. State is unchanged on failure.
    pub async fn hold(&mut self) -> ClientResult<()> {
        self.transfer(CallOperation::Hold, CallState::Connected, CallState::OnHold)
            .await
    }

    /// `OnHold -> Connected`. State is unchanged on failure.
    pub async fn resume(&mut self) -> ClientResult<()> {
        self.transfer(CallOperation::Resume, CallState::OnHold, CallState::Connected)
            .await
    }

    async fn transfer(
        &mut self,
        operation: CallOperation,
        from: CallState,
        to: CallState,
    ) -> ClientResult<()> {
        let call = self
            .active
            .as_mut()
            .ok_or_else(|| ClientError::operation(operation, "no active call"))?;

        if call.info.state != from {
            return Err(ClientError::operation(
                operation,
                format!("call is {} but must be {}", call.info.state, from),
            ));
        }

        let result = match operation {
            CallOperation::Hold => call.handle.hold().await,
            CallOperation::Resume => call.handle.resume().await,
            CallOperation::Start => {
                return Err(ClientError::operation(operation, "start does not apply to a live call"));
            }
        };
        result.map_err(|e| ClientError::operation(operation, e.message))?;

        call.info.state = to;
        let call_id = call.info.call_id;
        tracing::info!("Call {} {} succeeded", call_id, operation.verb());
        self.emit_transition(call_id, Some(from), to, format!("Local {}", operation.verb()));
        Ok(())
    }

    /// Hang up. The call is torn down and the controller reset to `Idle`
    /// even when the SDK reports a failure, which is returned as
    /// `ClientError::Hangup`. Without an active call this is a no-op.
    pub async fn end(&mut self) -> ClientResult<()> {
        let Some(call) = self.active.as_ref() else {
            return Ok(());
        };

        let result = call
            .handle
            .hang_up(self.hang_up_for_everyone)
            .await
            .map_err(|e| ClientError::hangup(e.message));
        if let Err(e) = &result {
            tracing::warn!("Hang up of call {} failed, clearing it anyway: {}", call.info.call_id, e);
        }

        self.teardown("Local hangup");
        result
    }

    /// Apply a state report from the SDK.
    ///
    /// Returns the panel state after the report, or `None` when the report
    /// concerns a call that is not (or no longer) the active one.
    pub fn on_sdk_state(&mut self, sdk_call_id: &str, state: SdkCallState) -> Option<CallState> {
        let Some(call) = self.active.as_mut().filter(|call| call.info.sdk_call_id == sdk_call_id) else {
            tracing::debug!("Ignoring {} for untracked call {}", state, sdk_call_id);
            return None;
        };

        let previous = call.info.state;
        let next = match CallState::from_sdk(state) {
            Some(CallState::Disconnected) => {
                self.teardown("Remote hangup");
                return Some(CallState::Idle);
            }
            Some(CallState::Connected) if matches!(previous, CallState::Connecting | CallState::OnHold) => {
                CallState::Connected
            }
            Some(CallState::OnHold) if previous == CallState::Connected => CallState::OnHold,
            _ => return Some(previous),
        };

        call.info.state = next;
        if next == CallState::Connected && call.info.connected_at.is_none() {
            call.info.connected_at = Some(Utc::now());
        }
        let call_id = call.info.call_id;
        self.emit_transition(call_id, Some(previous), next, format!("SDK reported {}", state));
        Some(next)
    }

    /// Drop the active call without telling the SDK, emitting the
    /// teardown transitions. Used when the session is replaced.
    pub fn reset(&mut self) {
        self.teardown("Session replaced");
    }

    fn teardown(&mut self, reason: &str) {
        let Some(call) = self.active.take() else {
            return;
        };
        let call_id = call.info.call_id;
        tracing::info!("Call {} ended: {}", call_id, reason);
        self.emit_transition(call_id, Some(call.info.state), CallState::Disconnected, reason);
        self.emit_transition(call_id, Some(CallState::Disconnected), CallState::Idle, "Reset");
    }

    fn emit_transition(
        &self,
        call_id: CallId,
        previous: Option<CallState>,
        new_state: CallState,
        reason: impl Into<String>,
    ) {
        self.events.emit(ClientEvent::CallStateChanged {
            info: CallStatusInfo::transition(call_id, previous, new_state, reason),
        });
    }
}

//! In-memory calling SDK
//!
//! `MockSdk` stands in for the real SDK in tests and in the terminal demo.
//! Every command the panel issues is recorded, any operation can be made to
//! fail, and the test (or the demo user) plays the remote side by ringing the
//! agent and pushing call-state changes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{
    AgentOptions, CallAgent, CallingSdk, NotificationSender, SdkCall, SdkCallState, SdkError,
    SdkIncomingCall, SdkNotification, SdkResult,
};
use crate::credential::TokenCredential;

/// SDK operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    CreateAgent,
    RequestPermission,
    StartCall,
    Hold,
    Resume,
    HangUp,
    Accept,
    Reject,
    Dispose,
}

/// A command the panel sent to the SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCommand {
    CreateAgent { user_id: Option<String>, display_name: Option<String> },
    RequestPermission,
    StartCall { callee_id: String, call_id: String },
    Hold { call_id: String },
    Resume { call_id: String },
    HangUp { call_id: String, for_everyone: bool },
    Accept { incoming_id: String, call_id: String },
    Reject { incoming_id: String },
    DisposeAgent,
}

#[derive(Debug)]
struct MockState {
    notifications: Option<NotificationSender>,
    failures: HashMap<MockOp, String>,
    permission_granted: bool,
    commands: Vec<MockCommand>,
    next_call: u64,
    next_incoming: u64,
    last_call_id: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            notifications: None,
            failures: HashMap::new(),
            permission_granted: true,
            commands: Vec::new(),
            next_call: 0,
            next_incoming: 0,
            last_call_id: None,
        }
    }
}

/// Scriptable in-memory SDK. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSdk {
    state: Arc<Mutex<MockState>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an unsigned token the credential parser accepts. An expiry past
    /// the representable range is clamped to the latest instant.
    pub fn issue_token(user_id: &str, ttl: chrono::Duration) -> String {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::token_expiring_at(user_id, expires_at)
    }

    /// Like [`MockSdk::issue_token`], but fails when `ttl` overflows.
    pub fn try_issue_token(user_id: &str, ttl: chrono::Duration) -> SdkResult<String> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| SdkError::new(format!("token lifetime out of range: {}", ttl)))?;
        Ok(Self::token_expiring_at(user_id, expires_at))
    }

    fn token_expiring_at(user_id: &str, expires_at: DateTime<Utc>) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = serde_json::json!({
            "skypeid": user_id,
            "exp": expires_at.timestamp(),
        });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.{}", header, payload, URL_SAFE_NO_PAD.encode("mock"))
    }

    /// Make `op` fail with `message` until cleared.
    pub fn fail(&self, op: MockOp, message: impl Into<String>) {
        self.state.lock().failures.insert(op, message.into());
    }

    pub fn clear_failure(&self, op: MockOp) {
        self.state.lock().failures.remove(&op);
    }

    /// Answer permission prompts with "denied".
    pub fn deny_audio_permission(&self) {
        self.state.lock().permission_granted = false;
    }

    /// Everything the panel asked the SDK to do, in order.
    pub fn commands(&self) -> Vec<MockCommand> {
        self.state.lock().commands.clone()
    }

    /// SDK id of the most recently started or accepted call
    pub fn last_call_id(&self) -> Option<String> {
        self.state.lock().last_call_id.clone()
    }

    /// Whether an agent currently holds a notification channel
    pub fn has_agent(&self) -> bool {
        self.state.lock().notifications.is_some()
    }

    /// Ring the agent. Returns the SDK id of the incoming call.
    pub fn ring(&self, caller_id: Option<&str>) -> String {
        let incoming_id = {
            let mut state = self.state.lock();
            state.next_incoming += 1;
            format!("incoming-{}", state.next_incoming)
        };
        let call = MockIncomingCall {
            id: incoming_id.clone(),
            caller_id: caller_id.map(str::to_string),
            sdk: self.clone(),
        };
        self.notify(SdkNotification::IncomingCall(Box::new(call)));
        incoming_id
    }

    /// The caller hangs up before the call is answered.
    pub fn cancel_ring(&self, incoming_id: &str) {
        self.notify(SdkNotification::IncomingCallEnded {
            incoming_id: incoming_id.to_string(),
        });
    }

    /// Report a state change for `call_id`.
    pub fn set_call_state(&self, call_id: &str, state: SdkCallState) {
        self.notify(SdkNotification::CallStateChanged {
            call_id: call_id.to_string(),
            state,
        });
    }

    fn notify(&self, notification: SdkNotification) {
        let sender = self.state.lock().notifications.clone();
        match sender {
            Some(sender) => {
                if sender.send(notification).is_err() {
                    tracing::warn!("Mock SDK notification dropped; receiver is gone");
                }
            }
            None => tracing::warn!("Mock SDK has no agent to notify: {:?}", notification),
        }
    }

    /// Record `command`, then fail if `op` is scripted to.
    fn record(&self, op: MockOp, command: MockCommand) -> SdkResult<()> {
        let mut state = self.state.lock();
        state.commands.push(command);
        match state.failures.get(&op) {
            Some(message) => Err(SdkError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn next_call_id(&self) -> String {
        let mut state = self.state.lock();
        state.next_call += 1;
        format!("call-{}", state.next_call)
    }

    fn call(&self, id: String) -> Box<dyn SdkCall> {
        self.state.lock().last_call_id = Some(id.clone());
        Box::new(MockCall {
            id,
            sdk: self.clone(),
        })
    }
}

#[async_trait]
impl CallingSdk for MockSdk {
    async fn create_agent(
        &self,
        credential: &TokenCredential,
        options: AgentOptions,
        notifications: NotificationSender,
    ) -> SdkResult<Box<dyn CallAgent>> {
        self.record(
            MockOp::CreateAgent,
            MockCommand::CreateAgent {
                user_id: credential.user_id().map(str::to_string),
                display_name: options.display_name,
            },
        )?;
        self.state.lock().notifications = Some(notifications);
        Ok(Box::new(MockAgent { sdk: self.clone() }))
    }

    async fn request_audio_permission(&self) -> SdkResult<bool> {
        self.record(MockOp::RequestPermission, MockCommand::RequestPermission)?;
        Ok(self.state.lock().permission_granted)
    }
}

struct MockAgent {
    sdk: MockSdk,
}

#[async_trait]
impl CallAgent for MockAgent {
    fn start_call(&self, callee_id: &str) -> SdkResult<Box<dyn SdkCall>> {
        let call_id = self.sdk.next_call_id();
        self.sdk.record(
            MockOp::StartCall,
            MockCommand::StartCall {
                callee_id: callee_id.to_string(),
                call_id: call_id.clone(),
            },
        )?;
        Ok(self.sdk.call(call_id))
    }

    async fn dispose(&self) -> SdkResult<()> {
        self.sdk.state.lock().notifications = None;
        self.sdk.record(MockOp::Dispose, MockCommand::DisposeAgent)
    }
}

struct MockCall {
    id: String,
    sdk: MockSdk,
}

#[async_trait]
impl SdkCall for MockCall {
    fn id(&self) -> &str {
        &self.id
    }

    async fn hold(&self) -> SdkResult<()> {
        self.sdk.record(MockOp::Hold, MockCommand::Hold { call_id: self.id.clone() })
    }

    async fn resume(&self) -> SdkResult<()> {
        self.sdk.record(MockOp::Resume, MockCommand::Resume { call_id: self.id.clone() })
    }

    async fn hang_up(&self, for_everyone: bool) -> SdkResult<()> {
        self.sdk.record(
            MockOp::HangUp,
            MockCommand::HangUp {
                call_id: self.id.clone(),
                for_everyone,
            },
        )
    }
}

struct MockIncomingCall {
    id: String,
    caller_id: Option<String>,
    sdk: MockSdk,
}

#[async_trait]
impl SdkIncomingCall for MockIncomingCall {
    fn id(&self) -> &str {
        &self.id
    }

    fn caller_id(&self) -> Option<&str> {
        self.caller_id.as_deref()
    }

    async fn accept(&self) -> SdkResult<Box<dyn SdkCall>> {
        if let Some(message) = self.sdk.state.lock().failures.get(&MockOp::Accept) {
            return Err(SdkError::new(message.clone()));
        }
        let call_id = self.sdk.next_call_id();
        self.sdk.state.lock().commands.push(MockCommand::Accept {
            incoming_id: self.id.clone(),
            call_id: call_id.clone(),
        });
        Ok(self.sdk.call(call_id))
    }

    async fn reject(&self) -> SdkResult<()> {
        self.sdk.record(MockOp::Reject, MockCommand::Reject { incoming_id: self.id.clone() })
    }
}

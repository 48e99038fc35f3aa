//! The call panel: application context and handler boundary
//!
//! `CallPanel` owns the session, the incoming-call notifier and the active
//! call controller. Each public command mirrors one panel button. Commands
//! never return errors: failures are logged, broadcast as
//! [`ClientEvent::Error`] and surfaced through the status line.
//!
//! SDK notifications arrive on an internal channel. The front-end's event
//! loop awaits [`CallPanel::next_notification`] next to its input source and
//! hands each notification back to [`CallPanel::handle_notification`]:
//!
//! ```rust,no_run
//! # use voicedesk_client_core::CallPanel;
//! # async fn run(mut panel: CallPanel, mut commands: tokio::sync::mpsc::Receiver<String>) {
//! loop {
//!     tokio::select! {
//!         Some(notification) = panel.next_notification() => {
//!             panel.handle_notification(notification);
//!         }
//!         Some(callee) = commands.recv() => {
//!             panel.start_call(&callee);
//!         }
//!         else => break,
//!     }
//! }
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use super::bootstrap::{Bootstrapper, Session};
use super::calls::ActiveCallController;
use super::config::ClientConfig;
use super::incoming::{IncomingCallNotifier, PendingCall};
use crate::call::{CallInfo, CallState};
use crate::error::{AuthError, ClientError, ValidationError};
use crate::events::{ClientEvent, EventEmitter, EventIterator, EventStream};
use crate::sdk::{
    CallingSdk, NotificationReceiver, NotificationSender, SdkCallState, SdkNotification,
};
use crate::view::{self, PanelSnapshot, PanelView, StatusMessage};

/// Explicit application context for one calling panel
pub struct CallPanel {
    config: ClientConfig,
    bootstrapper: Bootstrapper,
    session: Option<Session>,
    notifier: IncomingCallNotifier,
    controller: ActiveCallController,
    status: StatusMessage,
    events: EventEmitter,
    notification_tx: NotificationSender,
    notification_rx: NotificationReceiver,
}

impl CallPanel {
    pub fn new(sdk: Arc<dyn CallingSdk>, config: ClientConfig) -> Self {
        let events = EventEmitter::new(config.event_capacity);
        let (notification_tx, notification_rx) = mpsc::unbounded_channel();
        Self {
            bootstrapper: Bootstrapper::new(sdk, config.require_audio_permission),
            notifier: IncomingCallNotifier::new(events.clone()),
            controller: ActiveCallController::new(events.clone(), config.hang_up_for_everyone),
            session: None,
            status: StatusMessage::Empty,
            events,
            notification_tx,
            notification_rx,
            config,
        }
    }

    // ===== COMMANDS =====

    /// Initialize (or re-initialize) the calling agent.
    ///
    /// A blank token leaves any existing session untouched. Otherwise the
    /// existing session, its pending call and its active call are released
    /// before the new agent is created.
    pub async fn initialize(&mut self, token: &str, display_name: Option<&str>) {
        if let Err(e) = self.bootstrapper.credential(token) {
            let status = Self::init_status(&e);
            self.report(e, status);
            return;
        }

        self.release_session().await;

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.display_name.clone());
        let result = self
            .bootstrapper
            .initialize(token, display_name.as_deref(), self.notification_tx.clone())
            .await;

        match result {
            Ok(session) => {
                self.events.emit(ClientEvent::AgentReady {
                    display_name: session.display_name().map(str::to_string),
                    user_id: session.user_id().map(str::to_string),
                });
                self.session = Some(session);
                self.set_status(StatusMessage::AgentReady);
            }
            Err(e) => {
                let status = Self::init_status(&e);
                self.report(e, status);
            }
        }
    }

    /// Place an outgoing call to `callee_id`.
    pub fn start_call(&mut self, callee_id: &str) {
        let result = self
            .controller
            .start(self.session.as_ref(), callee_id)
            .map(|info| info.call_id);

        match result {
            Ok(_) => self.set_status(StatusMessage::Calling),
            Err(e) => {
                let status = match &e {
                    ClientError::Validation(ValidationError::NoSession) => StatusMessage::AgentRequired,
                    ClientError::Validation(ValidationError::MissingCallee) => StatusMessage::MissingCallee,
                    ClientError::Validation(ValidationError::CallInProgress) => StatusMessage::CallInProgress,
                    other => StatusMessage::StartFailed(other.reason()),
                };
                self.report(e, status);
            }
        }
    }

    /// Answer the pending incoming call.
    pub async fn accept_incoming(&mut self) {
        if self.notifier.pending().is_none() {
            self.set_status(StatusMessage::NoIncomingToAccept);
            return;
        }
        if let Err(e) = self.controller.ensure_idle() {
            let status = StatusMessage::AcceptFailed(e.reason());
            self.report(e, status);
            return;
        }

        let adopted = match self.notifier.accept().await {
            Ok(accepted) => self
                .controller
                .adopt(accepted.call, &accepted.caller_id)
                .map(|info| info.call_id),
            Err(e) => Err(e),
        };

        match adopted {
            Ok(_) => self.set_status(StatusMessage::Accepted),
            Err(e) => {
                let status = StatusMessage::AcceptFailed(e.reason());
                self.report(e, status);
            }
        }
    }

    /// Decline the pending incoming call. The pending call is cleared even
    /// if the SDK fails to reject it.
    pub async fn reject_incoming(&mut self) {
        if self.notifier.pending().is_none() {
            self.set_status(StatusMessage::NoIncomingToReject);
            return;
        }

        match self.notifier.reject().await {
            Ok(()) => self.set_status(StatusMessage::Rejected),
            Err(e) => {
                let status = StatusMessage::RejectFailed(e.reason());
                self.report(e, status);
            }
        }
    }

    pub async fn hold(&mut self) {
        if !self.controller.has_active_call() {
            self.set_status(StatusMessage::NoActiveToHold);
            return;
        }

        match self.controller.hold().await {
            Ok(()) => self.set_status(StatusMessage::OnHold),
            Err(e) => {
                let status = StatusMessage::HoldFailed(e.reason());
                self.report(e, status);
            }
        }
    }

    pub async fn resume(&mut self) {
        if !self.controller.has_active_call() {
            self.set_status(StatusMessage::NoHeldToResume);
            return;
        }

        match self.controller.resume().await {
            Ok(()) => self.set_status(StatusMessage::Resumed),
            Err(e) => {
                let status = StatusMessage::ResumeFailed(e.reason());
                self.report(e, status);
            }
        }
    }

    /// Hang up the active call. The call is cleared locally whatever the SDK
    /// says; a hang-up failure is reported and then superseded by
    /// "Call ended.".
    pub async fn end_call(&mut self) {
        if !self.controller.has_active_call() {
            self.set_status(StatusMessage::NoActiveToHangUp);
            return;
        }

        let call_id = self.controller.active().map(|info| info.call_id);
        if let Err(e) = self.controller.end().await {
            let status = StatusMessage::HangUpFailed(e.reason());
            tracing::error!("Hang up of call {:?} failed: {}", call_id, e);
            self.events.emit(ClientEvent::Error { error: e, call_id });
            self.set_status(status);
        }
        self.set_status(StatusMessage::CallEnded);
    }

    // ===== SDK NOTIFICATIONS =====

    /// Wait for the next SDK notification.
    pub async fn next_notification(&mut self) -> Option<SdkNotification> {
        self.notification_rx.recv().await
    }

    /// Apply every notification already queued. Returns how many were
    /// applied.
    pub fn pump_notifications(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(notification) = self.notification_rx.try_recv() {
            self.handle_notification(notification);
            applied += 1;
        }
        applied
    }

    pub fn handle_notification(&mut self, notification: SdkNotification) {
        match notification {
            SdkNotification::IncomingCall(handle) => {
                let caller = self.notifier.on_incoming(handle).caller_id().to_string();
                self.set_status(StatusMessage::IncomingCall(caller));
            }
            SdkNotification::IncomingCallEnded { incoming_id } => {
                self.notifier.on_cancelled(&incoming_id);
            }
            SdkNotification::CallStateChanged { call_id, state } => {
                if self.controller.on_sdk_state(&call_id, state).is_none() {
                    return;
                }
                self.set_status(StatusMessage::CallState(state.to_string()));
                if state == SdkCallState::Disconnected {
                    self.set_status(StatusMessage::CallEnded);
                }
            }
        }
    }

    // ===== QUERIES =====

    /// Render the current view.
    pub fn view(&self) -> PanelView {
        view::render(&self.snapshot(), &self.status)
    }

    pub fn snapshot(&self) -> PanelSnapshot<'_> {
        PanelSnapshot {
            agent_ready: self.session.as_ref().is_some_and(Session::is_ready),
            pending_caller: self.notifier.pending().map(PendingCall::caller_id),
            call_state: self.controller.state(),
        }
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingCall> {
        self.notifier.pending()
    }

    pub fn active_call(&self) -> Option<&CallInfo> {
        self.controller.active()
    }

    pub fn call_state(&self) -> CallState {
        self.controller.state()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    pub fn subscribe_simple(&self) -> EventIterator {
        self.events.subscribe_simple()
    }

    // ===== INTERNALS =====

    async fn release_session(&mut self) {
        let Some(previous) = self.session.take() else {
            return;
        };
        tracing::info!("Replacing existing call agent session");
        self.notifier.clear();
        self.controller.reset();
        if let Err(e) = previous.agent().dispose().await {
            tracing::warn!("Failed to dispose previous call agent: {}", e);
        }
    }

    fn init_status(error: &ClientError) -> StatusMessage {
        match error {
            ClientError::Auth(AuthError::MissingToken) => StatusMessage::MissingToken,
            other => StatusMessage::AgentFailed(other.reason()),
        }
    }

    fn report(&mut self, error: ClientError, status: StatusMessage) {
        let call_id = self.controller.active().map(|info| info.call_id);
        tracing::error!("{}", error);
        self.events.emit(ClientEvent::Error { error, call_id });
        self.set_status(status);
    }

    fn set_status(&mut self, status: StatusMessage) {
        tracing::debug!("Status: {}", status);
        self.events.emit(ClientEvent::StatusChanged {
            status: status.to_string(),
        });
        self.status = status;
    }
}

impl std::fmt::Debug for CallPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallPanel")
            .field("session", &self.session)
            .field("pending", &self.notifier.pending())
            .field("active_call", &self.controller.active())
            .field("status", &self.status)
            .finish()
    }
}

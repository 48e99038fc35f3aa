//! # VoiceDesk Client Core
//!
//! The call-control core behind a voice-call panel: initialize an agent from
//! an access token, place, accept, reject, hold, resume and end a call.
//!
//! Every piece of real call work (signaling, media negotiation, the call's
//! own state machine) is delegated to an external calling SDK reached through
//! the narrow traits in [`sdk`]. This crate only sequences commands into the
//! SDK and mirrors SDK-driven state back into control enablement and status
//! text.
//!
//! ## Components
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      CallPanel                       │
//! │  ┌──────────────┐ ┌────────────────┐ ┌────────────┐  │
//! │  │ Bootstrapper │ │ IncomingCall   │ │ ActiveCall │  │
//! │  │              │ │ Notifier       │ │ Controller │  │
//! │  └──────┬───────┘ └───────┬────────┘ └─────┬──────┘  │
//! │         └─────────────────┼────────────────┘         │
//! │                     view::render                     │
//! └──────────────────────────┬───────────────────────────┘
//!                            │
//!                 ┌──────────▼──────────┐
//!                 │  CallingSdk traits  │
//!                 └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use voicedesk_client_core::{CallPanel, ClientConfig, CallState};
//! use voicedesk_client_core::sdk::{mock::MockSdk, SdkCallState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sdk = MockSdk::new();
//! let token = MockSdk::issue_token("8:acs:alice", chrono::Duration::hours(1));
//! let mut panel = CallPanel::new(Arc::new(sdk.clone()), ClientConfig::default());
//!
//! panel.initialize(&token, Some("Alice")).await;
//! assert!(panel.view().agent_ready);
//!
//! panel.start_call("8:acs:bob");
//! assert_eq!(panel.view().status, "Calling...");
//!
//! let call_id = sdk.last_call_id().unwrap();
//! sdk.set_call_state(&call_id, SdkCallState::Connected);
//! panel.pump_notifications();
//! assert_eq!(panel.call_state(), CallState::Connected);
//! # }
//! ```

pub mod call;
pub mod client;
pub mod credential;
pub mod error;
pub mod events;
pub mod sdk;
pub mod view;

pub use call::{CallDirection, CallId, CallInfo, CallState};
pub use client::{
    ActiveCallController, Bootstrapper, CallPanel, CallPanelBuilder, ClientConfig,
    IncomingCallNotifier, PendingCall, Session,
};
pub use credential::TokenCredential;
pub use error::{AuthError, CallOperation, ClientError, ClientResult, ValidationError};
pub use events::{
    CallStatusInfo, ClientEvent, EventEmitter, EventPriority, EventStream, IncomingCallInfo,
};
pub use view::{CallControls, IncomingControls, PanelSnapshot, PanelView, StatusMessage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! End-to-end panel scenarios: every command goes through `CallPanel`, the
//! in-memory SDK plays the remote side, and assertions are made on the
//! rendered view exactly as a front-end would see it.

use std::sync::Arc;

use voicedesk_client_core::sdk::mock::{MockCommand, MockOp, MockSdk};
use voicedesk_client_core::sdk::SdkCallState;
use voicedesk_client_core::{CallPanel, CallState, ClientConfig, ClientEvent, StatusMessage};

fn panel(sdk: &MockSdk) -> CallPanel {
    CallPanel::new(Arc::new(sdk.clone()), ClientConfig::default())
}

fn token() -> String {
    MockSdk::issue_token("8:acs:agent", chrono::Duration::hours(1))
}

async fn ready_panel(sdk: &MockSdk) -> CallPanel {
    let mut panel = panel(sdk);
    panel.initialize(&token(), Some("Agent")).await;
    assert!(panel.view().agent_ready);
    panel
}

/// Ready panel with a placed call the SDK reports as connected.
async fn connected_panel(sdk: &MockSdk) -> CallPanel {
    let mut panel = ready_panel(sdk).await;
    panel.start_call("user123");
    sdk.set_call_state(&sdk.last_call_id().unwrap(), SdkCallState::Connected);
    panel.pump_notifications();
    assert_eq!(panel.call_state(), CallState::Connected);
    panel
}

#[tokio::test]
async fn initial_view_has_everything_disabled() {
    let sdk = MockSdk::new();
    let view = panel(&sdk).view();

    assert!(!view.agent_ready);
    assert!(view.can_initialize);
    assert!(!view.call.can_start && !view.call.can_hold && !view.call.can_resume && !view.call.can_end);
    assert!(!view.incoming.can_accept && !view.incoming.can_reject);
    assert_eq!(view.incoming.label, "No incoming call.");
}

#[tokio::test]
async fn empty_token_never_makes_agent_ready() {
    let sdk = MockSdk::new();
    let mut panel = panel(&sdk);

    for token in ["", " ", "\t\n"] {
        panel.initialize(token, Some("Agent")).await;
        let view = panel.view();
        assert_eq!(view.status, "Provide an ACS user access token before initializing the agent.");
        assert!(!view.agent_ready);
        assert!(!view.call.can_start);
    }
    assert!(sdk.commands().is_empty());
}

#[tokio::test]
async fn malformed_token_reports_initialization_failure() {
    let sdk = MockSdk::new();
    let mut panel = panel(&sdk);

    panel.initialize("definitely-not-a-jwt", None).await;
    let view = panel.view();
    assert!(view.status.starts_with("Failed to initialize call agent: malformed access token"));
    assert!(!view.agent_ready);
}

#[tokio::test]
async fn sdk_refusal_reports_initialization_failure() {
    let sdk = MockSdk::new();
    sdk.fail(MockOp::CreateAgent, "The token is not valid for this resource");
    let mut panel = panel(&sdk);

    panel.initialize(&token(), None).await;
    assert_eq!(
        panel.view().status,
        "Failed to initialize call agent: The token is not valid for this resource"
    );
    assert!(!panel.view().agent_ready);
}

#[tokio::test]
async fn valid_token_makes_agent_ready() {
    let sdk = MockSdk::new();
    let panel = ready_panel(&sdk).await;
    let view = panel.view();

    assert_eq!(view.status, "Call agent initialized. Ready to place a call.");
    assert!(!view.can_initialize);
    assert!(view.call.can_start);
    assert_eq!(panel.session().unwrap().display_name(), Some("Agent"));
}

#[tokio::test]
async fn config_display_name_is_used_when_none_given() {
    let sdk = MockSdk::new();
    let mut panel = CallPanel::new(
        Arc::new(sdk.clone()),
        ClientConfig::new().with_display_name("Front desk"),
    );

    panel.initialize(&token(), None).await;
    assert_eq!(panel.session().unwrap().display_name(), Some("Front desk"));
}

#[tokio::test]
async fn blank_display_name_falls_back_to_config() {
    let sdk = MockSdk::new();
    let mut panel = CallPanel::new(Arc::new(sdk.clone()), ClientConfig::new().with_display_name("Desk"));

    panel.initialize(&token(), Some("   ")).await;
    assert_eq!(panel.session().unwrap().display_name(), Some("Desk"));
    assert!(sdk.commands().contains(&MockCommand::CreateAgent {
        user_id: Some("8:acs:agent".into()),
        display_name: Some("Desk".into()),
    }));
}

#[tokio::test]
async fn denied_permission_blocks_agent_when_required() {
    let sdk = MockSdk::new();
    sdk.deny_audio_permission();
    let mut panel = CallPanel::new(
        Arc::new(sdk.clone()),
        ClientConfig::new().with_audio_permission_required(true),
    );

    panel.initialize(&token(), None).await;
    let view = panel.view();
    assert_eq!(view.status, "Failed to initialize call agent: microphone access was denied");
    assert!(!view.agent_ready);
    assert!(view.can_initialize);
    assert!(!view.call.can_start);
    assert!(!sdk.has_agent());
    assert_eq!(sdk.commands().last(), Some(&MockCommand::DisposeAgent));
}

#[tokio::test]
async fn denied_permission_is_tolerated_by_default() {
    let sdk = MockSdk::new();
    sdk.deny_audio_permission();
    let mut panel = panel(&sdk);

    panel.initialize(&token(), None).await;
    assert_eq!(panel.view().status, "Call agent initialized. Ready to place a call.");
    assert!(panel.view().agent_ready);
}

#[tokio::test]
async fn placing_a_call_enters_connecting() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;

    panel.start_call("user123");
    let view = panel.view();
    assert_eq!(panel.call_state(), CallState::Connecting);
    assert_eq!(view.status, "Calling...");
    assert!(view.call.can_hold);
    assert!(view.call.can_end);
    assert!(!view.call.can_start);
    assert!(sdk.commands().contains(&MockCommand::StartCall {
        callee_id: "user123".into(),
        call_id: "call-1".into(),
    }));
}

#[tokio::test]
async fn start_call_reports_missing_preconditions() {
    let sdk = MockSdk::new();
    let mut panel = panel(&sdk);

    panel.start_call("user123");
    assert_eq!(panel.view().status, "Initialize the call agent first.");

    panel.initialize(&token(), None).await;
    panel.start_call("   ");
    assert_eq!(panel.view().status, "Provide a callee ACS user ID to start a call.");
    assert_eq!(panel.call_state(), CallState::Idle);

    panel.start_call("user123");
    panel.start_call("user789");
    assert_eq!(panel.view().status, "A call is already in progress.");
    assert_eq!(panel.active_call().unwrap().remote_id, "user123");
}

#[tokio::test]
async fn sdk_start_failure_leaves_panel_idle() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;
    sdk.fail(MockOp::StartCall, "callee unreachable");

    panel.start_call("user123");
    let view = panel.view();
    assert_eq!(view.status, "Unable to start call: callee unreachable");
    assert_eq!(panel.call_state(), CallState::Idle);
    assert!(panel.active_call().is_none());
    assert!(view.call.can_start);
    assert!(!view.call.can_hold && !view.call.can_end);
    assert!(sdk.last_call_id().is_none());

    sdk.clear_failure(MockOp::StartCall);
    panel.start_call("user123");
    assert_eq!(panel.view().status, "Calling...");
    assert_eq!(panel.call_state(), CallState::Connecting);
}

#[tokio::test]
async fn sdk_state_changes_are_mirrored_in_status() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;
    panel.start_call("user123");
    let call_id = sdk.last_call_id().unwrap();

    sdk.set_call_state(&call_id, SdkCallState::Ringing);
    panel.pump_notifications();
    assert_eq!(panel.view().status, "Call state: Ringing");
    assert_eq!(panel.call_state(), CallState::Connecting);

    sdk.set_call_state(&call_id, SdkCallState::Connected);
    panel.pump_notifications();
    let view = panel.view();
    assert_eq!(view.status, "Call state: Connected");
    assert!(view.call.can_hold && view.call.can_end && !view.call.can_start);
}

#[tokio::test]
async fn incoming_call_is_offered_for_decision() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;

    sdk.ring(Some("user456"));
    assert_eq!(panel.pump_notifications(), 1);

    let view = panel.view();
    assert_eq!(panel.pending().unwrap().caller_id(), "user456");
    assert_eq!(view.status, "Incoming call from user456.");
    assert_eq!(view.incoming.label, "Incoming call from user456.");
    assert!(view.incoming.can_accept);
    assert!(view.incoming.can_reject);
}

#[tokio::test]
async fn anonymous_caller_is_labelled_unknown() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;

    sdk.ring(None);
    panel.pump_notifications();
    assert_eq!(panel.view().status, "Incoming call from Unknown caller.");
}

#[tokio::test]
async fn accepting_incoming_call_makes_it_active() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;

    sdk.ring(Some("user456"));
    panel.pump_notifications();
    panel.accept_incoming().await;

    let view = panel.view();
    assert_eq!(view.status, "Incoming call accepted.");
    assert!(panel.pending().is_none());
    assert!(!view.incoming.can_accept);
    assert_eq!(panel.call_state(), CallState::Connected);
    assert!(view.call.can_hold && view.call.can_end && !view.call.can_start);
}

#[tokio::test]
async fn accept_while_call_active_is_refused() {
    let sdk = MockSdk::new();
    let mut panel = connected_panel(&sdk).await;

    sdk.ring(Some("user456"));
    panel.pump_notifications();
    panel.accept_incoming().await;

    assert_eq!(panel.view().status, "Unable to accept call: a call is already in progress");
    assert!(panel.pending().is_some());
    assert_eq!(panel.active_call().unwrap().remote_id, "user123");
}

#[tokio::test]
async fn failed_accept_keeps_call_ringing() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;
    sdk.ring(Some("user456"));
    panel.pump_notifications();
    sdk.fail(MockOp::Accept, "device busy");

    panel.accept_incoming().await;
    let view = panel.view();
    assert_eq!(view.status, "Unable to accept call: device busy");
    assert!(view.incoming.can_accept);
    assert_eq!(panel.call_state(), CallState::Idle);
}

#[tokio::test]
async fn rejecting_incoming_call_clears_it() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;
    sdk.ring(Some("user456"));
    panel.pump_notifications();

    panel.reject_incoming().await;
    let view = panel.view();
    assert_eq!(view.status, "Incoming call rejected.");
    assert!(panel.pending().is_none());
    assert_eq!(view.incoming.label, "No incoming call.");
}

#[tokio::test]
async fn caller_cancellation_clears_pending_call() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;
    let incoming_id = sdk.ring(Some("user456"));
    panel.pump_notifications();

    sdk.cancel_ring(&incoming_id);
    panel.pump_notifications();
    assert!(panel.pending().is_none());
    assert!(!panel.view().incoming.can_accept);
}

#[tokio::test]
async fn commands_without_a_call_report_nothing_to_do() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;

    panel.accept_incoming().await;
    assert_eq!(panel.view().status, "No incoming call to accept.");
    panel.reject_incoming().await;
    assert_eq!(panel.view().status, "No incoming call to reject.");
    panel.hold().await;
    assert_eq!(panel.view().status, "No active call to hold.");
    panel.resume().await;
    assert_eq!(panel.view().status, "No held call to resume.");
    panel.end_call().await;
    assert_eq!(panel.view().status, "No active call to hang up.");
}

#[tokio::test]
async fn hold_then_resume_returns_to_connected() {
    let sdk = MockSdk::new();
    let mut panel = connected_panel(&sdk).await;

    panel.hold().await;
    let view = panel.view();
    assert_eq!(panel.call_state(), CallState::OnHold);
    assert_eq!(view.status, "Call on hold.");
    assert!(view.call.can_resume);
    assert!(!view.call.can_hold);

    panel.resume().await;
    let view = panel.view();
    assert_eq!(panel.call_state(), CallState::Connected);
    assert_eq!(view.status, "Call resumed.");
    assert!(view.call.can_hold);
    assert!(!view.call.can_resume);
}

#[tokio::test]
async fn repeated_hold_resume_cycles_end_connected() {
    let sdk = MockSdk::new();
    let mut panel = connected_panel(&sdk).await;

    for _ in 0..5 {
        panel.hold().await;
        assert_eq!(panel.call_state(), CallState::OnHold);
        panel.resume().await;
        assert_eq!(panel.call_state(), CallState::Connected);
    }
}

#[tokio::test]
async fn hold_before_connect_is_reported_and_ignored() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;
    panel.start_call("user123");

    panel.hold().await;
    assert!(panel.view().status.starts_with("Unable to hold call: "));
    assert_eq!(panel.call_state(), CallState::Connecting);
}

#[tokio::test]
async fn remote_disconnect_while_on_hold_resets_to_idle() {
    let sdk = MockSdk::new();
    let mut panel = connected_panel(&sdk).await;
    panel.hold().await;

    sdk.set_call_state(&sdk.last_call_id().unwrap(), SdkCallState::Disconnected);
    panel.pump_notifications();

    let view = panel.view();
    assert_eq!(panel.call_state(), CallState::Idle);
    assert!(panel.active_call().is_none());
    assert_eq!(view.status, "Call ended.");
    assert!(view.call.can_start);
    assert!(!view.call.can_end);
}

#[tokio::test]
async fn ending_a_call_resets_controls() {
    let sdk = MockSdk::new();
    let mut panel = connected_panel(&sdk).await;

    panel.end_call().await;
    let view = panel.view();
    assert_eq!(view.status, "Call ended.");
    assert_eq!(panel.call_state(), CallState::Idle);
    assert!(view.call.can_start);
    assert!(sdk.commands().contains(&MockCommand::HangUp {
        call_id: "call-1".into(),
        for_everyone: false,
    }));
}

#[tokio::test]
async fn reinitializing_replaces_the_session() {
    let sdk = MockSdk::new();
    let mut panel = connected_panel(&sdk).await;
    sdk.ring(Some("user456"));
    panel.pump_notifications();

    panel.initialize(&token(), Some("Second")).await;

    assert_eq!(panel.session().unwrap().display_name(), Some("Second"));
    assert!(panel.pending().is_none());
    assert!(panel.active_call().is_none());
    assert!(panel.view().call.can_start);
    assert!(sdk.commands().contains(&MockCommand::DisposeAgent));
}

#[tokio::test]
async fn blank_token_keeps_existing_session() {
    let sdk = MockSdk::new();
    let mut panel = ready_panel(&sdk).await;

    panel.initialize("", None).await;
    assert!(panel.view().agent_ready);
    assert_eq!(
        panel.view().status,
        "Provide an ACS user access token before initializing the agent."
    );
}

#[tokio::test]
async fn status_changes_are_broadcast() {
    let sdk = MockSdk::new();
    let mut panel = panel(&sdk);
    let mut events = panel.subscribe_simple();

    panel.initialize(&token(), None).await;
    panel.start_call("user123");

    let mut statuses = Vec::new();
    let mut agent_ready = false;
    while let Ok(Some(event)) =
        tokio::time::timeout(std::time::Duration::from_millis(20), events.next()).await
    {
        match event {
            ClientEvent::StatusChanged { status } => statuses.push(status),
            ClientEvent::AgentReady { user_id, .. } => {
                agent_ready = true;
                assert_eq!(user_id.as_deref(), Some("8:acs:agent"));
            }
            _ => {}
        }
    }

    assert!(agent_ready);
    assert_eq!(
        statuses,
        vec![
            StatusMessage::AgentReady.to_string(),
            StatusMessage::Calling.to_string(),
        ]
    );
}

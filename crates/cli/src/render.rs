//! Terminal rendering of the panel view

use colored::Colorize;
use voicedesk_client_core::{CallState, PanelView};

fn control(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{}]", label).green().bold().to_string()
    } else {
        format!("[{}]", label).dimmed().to_string()
    }
}

fn state_label(state: CallState) -> String {
    let text = state.to_string();
    match state {
        CallState::Connected => text.green().to_string(),
        CallState::Connecting => text.yellow().to_string(),
        CallState::OnHold => text.cyan().to_string(),
        CallState::Disconnected => text.red().to_string(),
        CallState::Idle => text.normal().to_string(),
    }
}

/// Lines of the panel, one per control group
pub fn view_lines(view: &PanelView) -> Vec<String> {
    vec![
        format!(
            "{} {}",
            "agent   ".bold(),
            control("init", view.can_initialize)
        ),
        format!(
            "{} {} {}  {}",
            "incoming".bold(),
            control("accept", view.incoming.can_accept),
            control("reject", view.incoming.can_reject),
            view.incoming.label
        ),
        format!(
            "{} {} {} {} {}  {}",
            "call    ".bold(),
            control("call", view.call.can_start),
            control("hold", view.call.can_hold),
            control("resume", view.call.can_resume),
            control("end", view.call.can_end),
            state_label(view.call_state)
        ),
        format!("{} {}", "status  ".bold(), view.status),
    ]
}

pub fn print_view(view: &PanelView) {
    println!();
    for line in view_lines(view) {
        println!("{}", line);
    }
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), error);
}

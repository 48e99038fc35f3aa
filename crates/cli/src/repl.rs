//! Interactive panel: one line per button press
//!
//! The in-memory SDK stands in for the remote side, so the `ring`, `cancel`
//! and `state` commands let the operator play the other party.

use anyhow::{anyhow, bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use voicedesk_client_core::sdk::mock::MockSdk;
use voicedesk_client_core::sdk::SdkCallState;
use voicedesk_client_core::CallPanel;

use crate::render;

pub const HELP: &str = "\
Commands:
  init [token] [display name]   initialize the call agent
  call <callee id>              place a call
  accept | reject               answer or decline the ringing call
  hold | resume | end           control the active call
  ring [caller id]              simulate an incoming call
  cancel                        simulate the caller giving up
  state <state>                 simulate an SDK call state (e.g. Connected)
  token [user id]               print a demo access token
  view [--json]                 show the panel
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init { token: Option<String>, display_name: Option<String> },
    Call { callee_id: String },
    Accept,
    Reject,
    Hold,
    Resume,
    End,
    Ring { caller_id: Option<String> },
    Cancel,
    State(SdkCallState),
    Token { user_id: String },
    View { json: bool },
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let rest: Vec<&str> = words.collect();
        let joined = |from: usize| -> Option<String> {
            let text = rest.get(from..).map(|words| words.join(" ")).unwrap_or_default();
            (!text.is_empty()).then_some(text)
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "init" => Command::Init {
                token: rest.first().map(|t| t.to_string()),
                display_name: joined(1),
            },
            "call" | "start" => Command::Call {
                callee_id: joined(0).ok_or_else(|| anyhow!("usage: call <callee id>"))?,
            },
            "accept" => Command::Accept,
            "reject" => Command::Reject,
            "hold" => Command::Hold,
            "resume" => Command::Resume,
            "end" | "hangup" => Command::End,
            "ring" => Command::Ring { caller_id: joined(0) },
            "cancel" => Command::Cancel,
            "state" => {
                let state = rest.first().ok_or_else(|| anyhow!("usage: state <state>"))?;
                Command::State(state.parse()?)
            }
            "token" => Command::Token {
                user_id: joined(0).unwrap_or_else(|| "8:acs:demo-user".to_string()),
            },
            "view" => Command::View {
                json: rest.first() == Some(&"--json"),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(command)
    }
}

/// Runs the panel against the in-memory SDK until `quit` or end of input
pub struct Repl {
    panel: CallPanel,
    sdk: MockSdk,
    default_token: Option<String>,
}

impl Repl {
    pub fn new(panel: CallPanel, sdk: MockSdk, default_token: Option<String>) -> Self {
        Self {
            panel,
            sdk,
            default_token,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", HELP);
        render::print_view(&self.panel.view());

        loop {
            tokio::select! {
                Some(notification) = self.panel.next_notification() => {
                    self.panel.handle_notification(notification);
                    render::print_view(&self.panel.view());
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command).await?,
                        Err(e) => render::print_error(&e),
                    }
                }
            }
        }

        tracing::info!("Panel closed");
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Init { token, display_name } => {
                let token = token.or_else(|| self.default_token.clone()).unwrap_or_default();
                self.panel.initialize(&token, display_name.as_deref()).await;
            }
            Command::Call { callee_id } => self.panel.start_call(&callee_id),
            Command::Accept => self.panel.accept_incoming().await,
            Command::Reject => self.panel.reject_incoming().await,
            Command::Hold => self.panel.hold().await,
            Command::Resume => self.panel.resume().await,
            Command::End => self.panel.end_call().await,
            Command::Ring { caller_id } => {
                self.sdk.ring(caller_id.as_deref());
                return Ok(());
            }
            Command::Cancel => {
                match self.panel.pending() {
                    Some(pending) => self.sdk.cancel_ring(pending.id()),
                    None => render::print_error(&anyhow!("nothing is ringing")),
                }
                return Ok(());
            }
            Command::State(state) => {
                match self.panel.active_call() {
                    Some(call) => self.sdk.set_call_state(&call.sdk_call_id, state),
                    None => render::print_error(&anyhow!("no active call")),
                }
                return Ok(());
            }
            Command::Token { user_id } => {
                println!("{}", MockSdk::issue_token(&user_id, chrono::Duration::hours(24)));
                return Ok(());
            }
            Command::View { json } => {
                let view = self.panel.view();
                if json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                    return Ok(());
                }
            }
            Command::Help => {
                println!("{}", HELP);
                return Ok(());
            }
            Command::Quit => return Ok(()),
        }
        render::print_view(&self.panel.view());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_init_with_multi_word_display_name() {
        let command: Command = "init abc.def.ghi Front Desk".parse().unwrap();
        assert_eq!(
            command,
            Command::Init {
                token: Some("abc.def.ghi".into()),
                display_name: Some("Front Desk".into()),
            }
        );
        assert_eq!(
            "init".parse::<Command>().unwrap(),
            Command::Init { token: None, display_name: None }
        );
    }

    #[test]
    fn parses_call_controls() {
        assert_eq!("call user123".parse::<Command>().unwrap(), Command::Call { callee_id: "user123".into() });
        assert_eq!("HOLD".parse::<Command>().unwrap(), Command::Hold);
        assert_eq!("hangup".parse::<Command>().unwrap(), Command::End);
        assert_eq!("ring".parse::<Command>().unwrap(), Command::Ring { caller_id: None });
        assert_eq!(
            "state localhold".parse::<Command>().unwrap(),
            Command::State(SdkCallState::LocalHold)
        );
        assert_eq!("view --json".parse::<Command>().unwrap(), Command::View { json: true });
    }

    #[test]
    fn rejects_incomplete_commands() {
        assert!("call".parse::<Command>().is_err());
        assert!("state".parse::<Command>().is_err());
        assert!("state answered".parse::<Command>().is_err());
        assert!("dial 123".parse::<Command>().is_err());
    }
}

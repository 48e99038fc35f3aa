//! Session bootstrap: access token and display name in, calling agent out

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::credential::TokenCredential;
use crate::error::{ClientError, ClientResult};
use crate::sdk::{AgentOptions, CallAgent, CallingSdk, NotificationSender};

/// An authenticated calling session
pub struct Session {
    display_name: Option<String>,
    user_id: Option<String>,
    ready: bool,
    agent: Box<dyn CallAgent>,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Communication user id carried by the token
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn agent(&self) -> &dyn CallAgent {
        self.agent.as_ref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("display_name", &self.display_name)
            .field("user_id", &self.user_id)
            .field("ready", &self.ready)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Turns credentials into a [`Session`]
pub struct Bootstrapper {
    sdk: Arc<dyn CallingSdk>,
    require_audio_permission: bool,
}

impl Bootstrapper {
    pub fn new(sdk: Arc<dyn CallingSdk>, require_audio_permission: bool) -> Self {
        Self {
            sdk,
            require_audio_permission,
        }
    }

    /// Build a credential from a raw token.
    ///
    /// Fails with [`AuthError::MissingToken`](crate::error::AuthError::MissingToken) for empty input.
    pub fn credential(&self, token: &str) -> ClientResult<TokenCredential> {
        TokenCredential::parse(token)
    }

    /// Authenticate and create a calling agent.
    ///
    /// Inbound-call and call-state notifications for the new agent are
    /// delivered through `notifications` for as long as the agent lives.
    ///
    /// # Errors
    ///
    /// * `ClientError::Auth` - empty, malformed or expired token, or the SDK
    ///   refused to create an agent
    /// * `ClientError::Permission` - microphone access denied while
    ///   `require_audio_permission` is set
    pub async fn initialize(
        &self,
        token: &str,
        display_name: Option<&str>,
        notifications: NotificationSender,
    ) -> ClientResult<Session> {
        let credential = self.credential(token)?;
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let agent = self
            .sdk
            .create_agent(
                &credential,
                AgentOptions {
                    display_name: display_name.clone(),
                },
                notifications,
            )
            .await
            .map_err(|e| ClientError::auth(e.message))?;

        let denial = match self.sdk.request_audio_permission().await {
            Ok(true) => None,
            Ok(false) => Some("microphone access was denied".to_string()),
            Err(e) => Some(e.message),
        };

        if let Some(reason) = denial {
            if self.require_audio_permission {
                if let Err(e) = agent.dispose().await {
                    tracing::warn!("Failed to dispose agent after permission denial: {}", e);
                }
                return Err(ClientError::permission(reason));
            }
            tracing::warn!("Continuing without audio permission: {}", reason);
        }

        tracing::info!(
            "Call agent created for {} ({})",
            credential.user_id().unwrap_or("unknown user"),
            display_name.as_deref().unwrap_or("no display name")
        );

        Ok(Session {
            display_name,
            user_id: credential.user_id().map(str::to_string),
            ready: true,
            agent,
            created_at: Utc::now(),
        })
    }
}

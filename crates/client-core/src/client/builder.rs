//! Builder pattern for creating call panels
//!
//! ```rust
//! use voicedesk_client_core::CallPanelBuilder;
//! use voicedesk_client_core::sdk::mock::MockSdk;
//!
//! let panel = CallPanelBuilder::new()
//!     .sdk(MockSdk::new())
//!     .display_name("Reception")
//!     .require_audio_permission(true)
//!     .build()
//!     .unwrap();
//!
//! assert!(panel.config().require_audio_permission);
//! assert!(!panel.view().agent_ready);
//! ```

use std::sync::Arc;

use super::config::ClientConfig;
use super::manager::CallPanel;
use crate::error::{ClientError, ClientResult};
use crate::sdk::CallingSdk;

/// Builder for a [`CallPanel`]
#[derive(Default)]
pub struct CallPanelBuilder {
    sdk: Option<Arc<dyn CallingSdk>>,
    config: ClientConfig,
}

impl CallPanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calling SDK (required)
    pub fn sdk(mut self, sdk: impl CallingSdk + 'static) -> Self {
        self.sdk = Some(Arc::new(sdk));
        self
    }

    /// Set an already shared calling SDK (required)
    pub fn shared_sdk(mut self, sdk: Arc<dyn CallingSdk>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.config.display_name = Some(display_name.into());
        self
    }

    pub fn require_audio_permission(mut self, required: bool) -> Self {
        self.config.require_audio_permission = required;
        self
    }

    pub fn hang_up_for_everyone(mut self, for_everyone: bool) -> Self {
        self.config.hang_up_for_everyone = for_everyone;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn build(self) -> ClientResult<CallPanel> {
        let sdk = self
            .sdk
            .ok_or_else(|| ClientError::config("a calling SDK is required"))?;
        if self.config.event_capacity == 0 {
            return Err(ClientError::config("event_capacity must be greater than zero"));
        }
        Ok(CallPanel::new(sdk, self.config))
    }
}

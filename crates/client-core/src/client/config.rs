//! Client configuration
//!
//! ```rust
//! use voicedesk_client_core::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .with_display_name("Front desk")
//!     .with_audio_permission_required(true)
//!     .with_event_capacity(32);
//!
//! assert_eq!(config.display_name.as_deref(), Some("Front desk"));
//! assert!(config.require_audio_permission);
//! assert!(!config.hang_up_for_everyone);
//! ```

use serde::{Deserialize, Serialize};

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Behaviour switches for the call panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Display name used when `initialize` is called without one
    pub display_name: Option<String>,
    /// Treat a denied microphone prompt as a failed initialization.
    /// When false the denial is logged and the agent still becomes ready.
    pub require_audio_permission: bool,
    /// End the call for every participant instead of just leaving it
    pub hang_up_for_everyone: bool,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_audio_permission_required(mut self, required: bool) -> Self {
        self.require_audio_permission = required;
        self
    }

    pub fn with_hang_up_for_everyone(mut self, for_everyone: bool) -> Self {
        self.hang_up_for_everyone = for_everyone;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            require_audio_permission: false,
            hang_up_for_everyone: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"require_audio_permission": true}"#).unwrap();
        assert!(config.require_audio_permission);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.display_name, None);
    }
}

//! Call panel components
//!
//! - [`bootstrap`] - token to authenticated [`Session`]
//! - [`incoming`] - the single pending inbound call
//! - [`calls`] - the single active call and its lifecycle
//! - [`manager`] - [`CallPanel`], the handler boundary tying them together
//! - [`config`] / [`builder`] - configuration and construction

pub mod bootstrap;
pub mod builder;
pub mod calls;
pub mod config;
pub mod incoming;
pub mod manager;


pub use bootstrap::{Bootstrapper, Session};
pub use builder::CallPanelBuilder;
pub use calls::ActiveCallController;
pub use config::ClientConfig;
pub use incoming::{AcceptedCall, IncomingCallNotifier, PendingCall, UNKNOWN_CALLER};
pub use manager::CallPanel;

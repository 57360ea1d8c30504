//! Client-side runtime for Stream Deck plugins.
//!
//! The host spawns the plugin binary, hands it a WebSocket port and an
//! identity, and then drives it with lifecycle/UI events; the plugin
//! answers with commands that update keys and dials. This crate owns the
//! generic machinery (transport, registration, event dispatch, instance
//! tracking, the polling loop, the command surface) so a concrete plugin
//! only implements the [`Plugin`] hooks it cares about:
//!
//! ```no_run
//! use deck_runtime::{LaunchArgs, Plugin, PluginRuntime, RuntimeConfig};
//!
//! struct Volume;
//!
//! #[deck_runtime::async_trait]
//! impl Plugin for Volume {}
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = LaunchArgs::from_env()?;
//!     deck_runtime::logging::init("com.example.volume")?;
//!     let runtime = PluginRuntime::connect(&args, RuntimeConfig::default()).await?;
//!     runtime.run(Volume).await
//! }
//! ```
//!
//! One connection per process: when the host closes the socket the
//! runtime returns and the process is expected to exit.

pub mod commands;
pub mod config;
pub mod launch;
pub mod logging;
pub mod plugin;
mod poller;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod transport;

/// Attribute macro needed on every `impl Plugin` block.
pub use async_trait::async_trait;

pub use commands::{CommandError, CommandSender};
pub use config::RuntimeConfig;
pub use launch::{LaunchArgs, LaunchError};
pub use plugin::{Plugin, Session};
pub use registry::{ContextInfo, ContextRegistry, RegistryError};
pub use runtime::PluginRuntime;

/// Wire protocol re-export for payload types used in hooks.
pub use deck_proto as proto;

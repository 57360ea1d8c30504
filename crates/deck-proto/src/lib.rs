//! Wire protocol shared between the plugin runtime and the Stream Deck host.
//!
//! The host speaks newline-free JSON text frames over a local WebSocket.
//! Inbound frames are lifecycle/UI events ([`events::Event`]); outbound
//! frames are commands ([`commands::Command`]) plus the one-time
//! registration message sent right after connecting.

pub mod commands;
pub mod events;

pub use commands::Command;
pub use events::{Event, FrameError};

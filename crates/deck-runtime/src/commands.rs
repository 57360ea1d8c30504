//! Typed builders for every command the host accepts.
//!
//! Each method serialises one [`Command`] and enqueues it on the
//! transport. All of them are fire-and-forget: success means the frame was
//! handed to the writer task, nothing more. The host's reaction, if any,
//! arrives later as an ordinary inbound event with no correlation to the
//! call that triggered it.

use crate::transport::{FrameSender, TransportClosed};
use deck_proto::commands::{
    Command, FeedbackLayoutPayload, ImagePayload, LogMessagePayload, OpenUrlPayload,
    ProfilePayload, StatePayload, TitlePayload, TriggerDescriptionPayload,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CommandError {
    /// `setState` accepts only the two host-defined states.
    #[error("state must be 0 or 1, got {0}")]
    InvalidState(u8),
    /// The command exists in the protocol but this runtime does not
    /// implement it.
    #[error("`{0}` is not supported by this runtime")]
    Unsupported(&'static str),
    #[error("command could not be serialised: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportClosed),
}

/// Cheaply cloneable handle for issuing commands to the host.
#[derive(Debug, Clone)]
pub struct CommandSender {
    frames: FrameSender,
}

impl CommandSender {
    pub(crate) fn new(frames: FrameSender) -> Self {
        Self { frames }
    }

    async fn dispatch(&self, command: Command) -> Result<(), CommandError> {
        let frame = command.to_frame()?;
        debug!(frame = %frame, "sending command");
        self.frames.send(frame).await?;
        Ok(())
    }

    /// Ask the host to push this context's settings back as a
    /// `didReceiveSettings` event.
    pub async fn get_settings(&self, context: &str) -> Result<(), CommandError> {
        self.dispatch(Command::GetSettings {
            context: context.to_owned(),
        })
        .await
    }

    pub async fn get_global_settings(&self, context: &str) -> Result<(), CommandError> {
        self.dispatch(Command::GetGlobalSettings {
            context: context.to_owned(),
        })
        .await
    }

    pub async fn get_resources(&self, context: &str) -> Result<(), CommandError> {
        self.dispatch(Command::GetResources {
            context: context.to_owned(),
        })
        .await
    }

    pub async fn get_secrets(&self, context: &str) -> Result<(), CommandError> {
        self.dispatch(Command::GetSecrets {
            context: context.to_owned(),
        })
        .await
    }

    /// Write a line into the host's own log file.
    pub async fn log_message(&self, message: &str) -> Result<(), CommandError> {
        self.dispatch(Command::LogMessage {
            payload: LogMessagePayload {
                message: message.to_owned(),
            },
        })
        .await
    }

    /// Open a URL in the user's default browser.
    pub async fn open_url(&self, url: &str) -> Result<(), CommandError> {
        self.dispatch(Command::OpenUrl {
            payload: OpenUrlPayload { url: url.to_owned() },
        })
        .await
    }

    pub async fn send_to_property_inspector(
        &self,
        context: &str,
        payload: Value,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SendToPropertyInspector {
            context: context.to_owned(),
            payload,
        })
        .await
    }

    pub async fn set_global_settings(
        &self,
        context: &str,
        payload: Value,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SetGlobalSettings {
            context: context.to_owned(),
            payload,
        })
        .await
    }

    /// Persist settings for one context; the host echoes them back to the
    /// property inspector.
    pub async fn set_settings(&self, context: &str, payload: Value) -> Result<(), CommandError> {
        self.dispatch(Command::SetSettings {
            context: context.to_owned(),
            payload,
        })
        .await
    }

    pub async fn set_resources(&self, context: &str, payload: Value) -> Result<(), CommandError> {
        self.dispatch(Command::SetResources {
            context: context.to_owned(),
            payload,
        })
        .await
    }

    /// Declared by the protocol but intentionally unimplemented here;
    /// always fails without sending anything.
    pub async fn set_feedback(&self, _context: &str, _payload: Value) -> Result<(), CommandError> {
        Err(CommandError::Unsupported("setFeedback"))
    }

    pub async fn set_feedback_layout(
        &self,
        context: &str,
        layout: &str,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SetFeedbackLayout {
            context: context.to_owned(),
            payload: FeedbackLayoutPayload {
                layout: layout.to_owned(),
            },
        })
        .await
    }

    /// Show an image on a key; `None` clears back to the host-configured
    /// image. The blob is an opaque encoded image (data URI).
    pub async fn set_image(
        &self,
        context: &str,
        image: Option<String>,
        state: Option<u8>,
        target: Option<String>,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SetImage {
            context: context.to_owned(),
            payload: ImagePayload { image, state, target },
        })
        .await
    }

    /// Switch a two-state action to the given state. Values outside
    /// `{0, 1}` fail validation before any frame is built.
    pub async fn set_state(&self, context: &str, state: u8) -> Result<(), CommandError> {
        if state > 1 {
            return Err(CommandError::InvalidState(state));
        }
        self.dispatch(Command::SetState {
            context: context.to_owned(),
            payload: StatePayload { state },
        })
        .await
    }

    pub async fn set_title(
        &self,
        context: &str,
        title: Option<String>,
        state: Option<u8>,
        target: Option<String>,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SetTitle {
            context: context.to_owned(),
            payload: TitlePayload { title, state, target },
        })
        .await
    }

    pub async fn set_trigger_description(
        &self,
        context: &str,
        description: TriggerDescriptionPayload,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SetTriggerDescription {
            context: context.to_owned(),
            payload: description,
        })
        .await
    }

    /// Flash the warning triangle on a key.
    pub async fn show_alert(&self, context: &str) -> Result<(), CommandError> {
        self.dispatch(Command::ShowAlert {
            context: context.to_owned(),
        })
        .await
    }

    /// Flash the checkmark on a key.
    pub async fn show_ok(&self, context: &str) -> Result<(), CommandError> {
        self.dispatch(Command::ShowOk {
            context: context.to_owned(),
        })
        .await
    }

    pub async fn switch_to_profile(
        &self,
        context: &str,
        device: &str,
        page: Option<u32>,
        profile: Option<String>,
    ) -> Result<(), CommandError> {
        self.dispatch(Command::SwitchToProfile {
            context: context.to_owned(),
            device: device.to_owned(),
            payload: ProfilePayload { page, profile },
        })
        .await
    }
}

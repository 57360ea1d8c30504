//! Outbound commands accepted by the host.
//!
//! Same envelope convention as the inbound side: a JSON object tagged by
//! its `event` field, with `context`/`device` identifiers at the top level
//! and command arguments under `payload`. Optional arguments are omitted
//! from the frame rather than sent as null.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Build the one-time registration frame sent right after connecting.
///
/// The event name is assigned by the host at launch, so this cannot be a
/// [`Command`] variant with a static tag.
pub fn registration_frame(register_event: &str, plugin_uuid: &str) -> String {
    json!({ "event": register_event, "uuid": plugin_uuid }).to_string()
}

/// Every command the host accepts, tagged by its wire name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Command {
    GetSettings { context: String },
    GetGlobalSettings { context: String },
    GetResources { context: String },
    GetSecrets { context: String },
    LogMessage { payload: LogMessagePayload },
    OpenUrl { payload: OpenUrlPayload },
    SendToPropertyInspector { context: String, payload: Value },
    SetGlobalSettings { context: String, payload: Value },
    SetSettings { context: String, payload: Value },
    SetResources { context: String, payload: Value },
    SetFeedbackLayout { context: String, payload: FeedbackLayoutPayload },
    SetImage { context: String, payload: ImagePayload },
    SetState { context: String, payload: StatePayload },
    SetTitle { context: String, payload: TitlePayload },
    SetTriggerDescription { context: String, payload: TriggerDescriptionPayload },
    ShowAlert { context: String },
    ShowOk { context: String },
    SwitchToProfile { context: String, device: String, payload: ProfilePayload },
}

impl Command {
    /// Serialise to the text frame handed to the transport.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessagePayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenUrlPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLayoutPayload {
    pub layout: String,
}

/// Arguments of `setImage`; a `None` image clears the key back to the
/// image configured in the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    pub state: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitlePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Hint strings shown for the four encoder gestures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDescriptionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_touch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

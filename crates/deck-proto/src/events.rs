//! Inbound events pushed by the host.
//!
//! Every frame is a JSON object with a string `event` field naming the
//! event kind; the remaining fields depend on the kind. The full set is
//! modelled as one internally tagged enum so dispatch is a plain `match`
//! rather than anything name-driven. Event names the runtime does not
//! recognise decode to [`Event::Unknown`] instead of failing, so a newer
//! host can't wedge an older plugin.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why an inbound frame could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Syntax(serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame has no string `event` field")]
    MissingEvent,
    #[error("malformed `{event}` payload: {source}")]
    Payload {
        event: String,
        source: serde_json::Error,
    },
}

/// A decoded inbound frame: the raw event name plus the typed event.
///
/// The name is kept alongside the enum so [`Event::Unknown`] can still be
/// logged with the name the host actually sent.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub name: String,
    pub event: Event,
}

/// Decode one inbound text frame.
///
/// Distinguishes the failure modes the router treats differently: broken
/// JSON, a non-object top level, a missing event name, and a recognised
/// event whose payload doesn't match the contract. An *unrecognised*
/// event name is not an error here.
pub fn decode(frame: &str) -> Result<DecodedFrame, FrameError> {
    let value: Value = serde_json::from_str(frame).map_err(FrameError::Syntax)?;
    if !value.is_object() {
        return Err(FrameError::NotAnObject);
    }
    let name = value
        .get("event")
        .and_then(Value::as_str)
        .ok_or(FrameError::MissingEvent)?
        .to_owned();
    let event = serde_json::from_value(value).map_err(|source| FrameError::Payload {
        event: name.clone(),
        source,
    })?;
    Ok(DecodedFrame { name, event })
}

/// Every event the host can push, tagged by its wire name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    DidReceiveSettings(ActionEvent<VisibilityPayload>),
    DidReceiveGlobalSettings(GlobalSettingsEvent),
    WillAppear(ActionEvent<VisibilityPayload>),
    WillDisappear(ActionEvent<VisibilityPayload>),
    KeyDown(ActionEvent<KeyPayload>),
    KeyUp(ActionEvent<KeyPayload>),
    DialDown(ActionEvent<DialPayload>),
    DialUp(ActionEvent<DialPayload>),
    DialRotate(ActionEvent<DialRotatePayload>),
    TouchTap(ActionEvent<TouchTapPayload>),
    DeviceDidConnect(DeviceEvent),
    DeviceDidDisconnect(DeviceEvent),
    DeviceDidChange(DeviceEvent),
    ApplicationDidLaunch(ApplicationEvent),
    ApplicationDidTerminate(ApplicationEvent),
    DidReceiveDeepLink(DeepLinkEvent),
    DidReceiveResources(ResourcesEvent),
    DidReceiveSecrets(ResourcesEvent),
    DidReceivePropertyInspectorMessage(InspectorMessageEvent),
    PropertyInspectorDidAppear(InspectorEvent),
    PropertyInspectorDidDisappear(InspectorEvent),
    TitleParametersDidChange(ActionEvent<TitleParametersPayload>),
    SendToPlugin(InspectorMessageEvent),
    /// The one event that carries no payload at all.
    SystemDidWakeUp,
    /// Any event name this runtime does not recognise.
    #[serde(other)]
    Unknown,
}

/// Common envelope for events scoped to one action instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent<P> {
    /// Identifier of the action that created the instance.
    pub action: String,
    /// Opaque identifier of the instance itself.
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub payload: P,
}

/// Position of an instance on the device surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub column: u8,
    pub row: u8,
}

/// Which kind of hardware control hosts the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    #[default]
    Keypad,
    Encoder,
}

/// Payload of `willAppear`, `willDisappear` and `didReceiveSettings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityPayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub controller: Controller,
    #[serde(default)]
    pub state: u8,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub state: u8,
    /// Set when the press happens inside a multi-action with a forced state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_desired_state: Option<u8>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialPayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub controller: Controller,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialRotatePayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Coordinates,
    /// Signed rotation amount; negative is counter-clockwise.
    pub ticks: i32,
    /// True while the dial is held down during the rotation.
    #[serde(default)]
    pub pressed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchTapPayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Coordinates,
    /// Tap position in touch-strip pixels.
    #[serde(default)]
    pub tap_pos: [i32; 2],
    #[serde(default)]
    pub hold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvent {
    pub device: String,
    /// Absent on `deviceDidDisconnect`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub device_type: u32,
    #[serde(default)]
    pub size: DeviceSize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeviceSize {
    pub columns: u8,
    pub rows: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub payload: ApplicationPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationPayload {
    pub application: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettingsEvent {
    pub payload: GlobalSettingsPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettingsPayload {
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLinkEvent {
    pub payload: DeepLinkPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLinkPayload {
    pub url: String,
}

/// `didReceiveResources` / `didReceiveSecrets`; payload shape is up to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

/// A message relayed from a property inspector (`sendToPlugin` and friends).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorMessageEvent {
    #[serde(default)]
    pub action: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorEvent {
    #[serde(default)]
    pub action: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleParametersPayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub state: u8,
    #[serde(default)]
    pub title: String,
    /// Font/alignment details; kept loose, the runtime never inspects them.
    #[serde(default)]
    pub title_parameters: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn appear_frame(context: &str) -> String {
        json!({
            "event": "willAppear",
            "action": "com.example.volume.showvol",
            "context": context,
            "device": "dev1",
            "payload": {
                "settings": {"audioDevice": "Speakers"},
                "coordinates": {"column": 2, "row": 1},
                "controller": "Keypad",
                "state": 0,
                "isInMultiAction": false
            }
        })
        .to_string()
    }

    #[test]
    fn decodes_will_appear() {
        let decoded = decode(&appear_frame("ABC123")).unwrap();
        assert_eq!(decoded.name, "willAppear");
        match decoded.event {
            Event::WillAppear(ev) => {
                assert_eq!(ev.context, "ABC123");
                assert_eq!(ev.action, "com.example.volume.showvol");
                assert_eq!(ev.payload.coordinates, Coordinates { column: 2, row: 1 });
                assert_eq!(ev.payload.controller, Controller::Keypad);
                assert_eq!(ev.payload.settings["audioDevice"], "Speakers");
                assert!(!ev.payload.is_in_multi_action);
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn decodes_key_down_with_desired_state() {
        let frame = json!({
            "event": "keyDown",
            "action": "com.example.volume.mute",
            "context": "K1",
            "payload": {
                "settings": {},
                "coordinates": {"column": 0, "row": 0},
                "state": 1,
                "userDesiredState": 0,
                "isInMultiAction": true
            }
        })
        .to_string();
        match decode(&frame).unwrap().event {
            Event::KeyDown(ev) => {
                assert_eq!(ev.payload.state, 1);
                assert_eq!(ev.payload.user_desired_state, Some(0));
                assert!(ev.payload.is_in_multi_action);
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn decodes_dial_rotate_with_negative_ticks() {
        let frame = json!({
            "event": "dialRotate",
            "action": "com.example.volume.dial",
            "context": "D1",
            "payload": {
                "settings": {},
                "coordinates": {"column": 3, "row": 0},
                "ticks": -2,
                "pressed": true
            }
        })
        .to_string();
        match decode(&frame).unwrap().event {
            Event::DialRotate(ev) => {
                assert_eq!(ev.payload.ticks, -2);
                assert!(ev.payload.pressed);
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn decodes_device_connect_and_disconnect() {
        let connect = json!({
            "event": "deviceDidConnect",
            "device": "dev1",
            "deviceInfo": {"name": "Deck", "type": 0, "size": {"columns": 5, "rows": 3}}
        })
        .to_string();
        match decode(&connect).unwrap().event {
            Event::DeviceDidConnect(ev) => {
                let info = ev.device_info.unwrap();
                assert_eq!(info.size.columns, 5);
            }
            other => panic!("wrong event: {other:?}"),
        }

        let disconnect = json!({"event": "deviceDidDisconnect", "device": "dev1"}).to_string();
        match decode(&disconnect).unwrap().event {
            Event::DeviceDidDisconnect(ev) => assert!(ev.device_info.is_none()),
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn decodes_system_wake_up_without_payload() {
        let frame = json!({"event": "systemDidWakeUp"}).to_string();
        assert!(matches!(decode(&frame).unwrap().event, Event::SystemDidWakeUp));
    }

    #[test]
    fn unknown_event_name_is_not_an_error() {
        let frame = json!({"event": "somethingBrandNew", "payload": {"x": 1}}).to_string();
        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.name, "somethingBrandNew");
        assert!(matches!(decoded.event, Event::Unknown));
    }

    #[test]
    fn invalid_json_is_a_syntax_error() {
        assert!(matches!(decode("{"), Err(FrameError::Syntax(_))));
    }

    #[test]
    fn non_object_frame_is_rejected() {
        assert!(matches!(decode("[1, 2, 3]"), Err(FrameError::NotAnObject)));
        assert!(matches!(decode("\"hello\""), Err(FrameError::NotAnObject)));
    }

    #[test]
    fn missing_event_field_is_rejected() {
        let frame = json!({"context": "ABC123"}).to_string();
        assert!(matches!(decode(&frame), Err(FrameError::MissingEvent)));
        let frame = json!({"event": 7}).to_string();
        assert!(matches!(decode(&frame), Err(FrameError::MissingEvent)));
    }

    #[test]
    fn known_event_with_broken_payload_is_a_payload_error() {
        let frame = json!({"event": "keyDown", "context": "K1"}).to_string();
        match decode(&frame) {
            Err(FrameError::Payload { event, .. }) => assert_eq!(event, "keyDown"),
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    #[test]
    fn send_to_plugin_keeps_payload_opaque() {
        let frame = json!({
            "event": "sendToPlugin",
            "action": "com.example.volume.showvol",
            "context": "P1",
            "payload": {"anything": ["goes", 1, null]}
        })
        .to_string();
        match decode(&frame).unwrap().event {
            Event::SendToPlugin(ev) => assert_eq!(ev.payload["anything"][1], 1),
            other => panic!("wrong event: {other:?}"),
        }
    }
}

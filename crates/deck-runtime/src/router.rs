//! Inbound frame dispatch.
//!
//! One `match` over the decoded [`Event`] resolves every hook at compile
//! time. The store bookkeeping for appear/disappear/settings events runs
//! here, before the plugin hook, so a plugin override can never detach the
//! registry from what the host believes exists. Nothing in this module
//! terminates the connection: undecodable frames are dropped with a log
//! line and hook errors are caught and logged.

use crate::plugin::{Plugin, Session};
use anyhow::Result;
use deck_proto::events::{self, Event};
use tracing::{debug, error, warn};

/// Decode and dispatch one inbound text frame.
pub async fn dispatch<P: Plugin>(frame: &str, plugin: &P, session: &Session) {
    let decoded = match events::decode(frame) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "dropping undecodable frame");
            return;
        }
    };

    if let Err(e) = route(decoded.event, plugin, session, &decoded.name).await {
        // A single bad message must never take the connection down.
        error!(event = %decoded.name, error = %format!("{e:#}"), "handler failed");
    }
}

async fn route<P: Plugin>(
    event: Event,
    plugin: &P,
    session: &Session,
    name: &str,
) -> Result<()> {
    match event {
        Event::DidReceiveSettings(ev) => {
            session
                .registry()
                .upsert(&ev.context, &ev.action, &ev.payload)
                .await;
            plugin.on_did_receive_settings(session, ev).await
        }
        Event::DidReceiveGlobalSettings(ev) => {
            session
                .registry()
                .set_global_settings(ev.payload.settings.clone())
                .await;
            plugin.on_did_receive_global_settings(session, ev).await
        }
        Event::WillAppear(ev) => {
            session
                .registry()
                .upsert(&ev.context, &ev.action, &ev.payload)
                .await;
            plugin.on_will_appear(session, ev).await
        }
        Event::WillDisappear(ev) => {
            session.registry().remove(&ev.context).await?;
            plugin.on_will_disappear(session, ev).await
        }
        Event::KeyDown(ev) => plugin.on_key_down(session, ev).await,
        Event::KeyUp(ev) => plugin.on_key_up(session, ev).await,
        Event::DialDown(ev) => plugin.on_dial_down(session, ev).await,
        Event::DialUp(ev) => plugin.on_dial_up(session, ev).await,
        Event::DialRotate(ev) => plugin.on_dial_rotate(session, ev).await,
        Event::TouchTap(ev) => plugin.on_touch_tap(session, ev).await,
        Event::DeviceDidConnect(ev) => plugin.on_device_did_connect(session, ev).await,
        Event::DeviceDidDisconnect(ev) => plugin.on_device_did_disconnect(session, ev).await,
        Event::DeviceDidChange(ev) => plugin.on_device_did_change(session, ev).await,
        Event::ApplicationDidLaunch(ev) => plugin.on_application_did_launch(session, ev).await,
        Event::ApplicationDidTerminate(ev) => {
            plugin.on_application_did_terminate(session, ev).await
        }
        Event::DidReceiveDeepLink(ev) => plugin.on_did_receive_deep_link(session, ev).await,
        Event::DidReceiveResources(ev) => plugin.on_did_receive_resources(session, ev).await,
        Event::DidReceiveSecrets(ev) => plugin.on_did_receive_secrets(session, ev).await,
        Event::DidReceivePropertyInspectorMessage(ev) => {
            plugin.on_property_inspector_message(session, ev).await
        }
        Event::PropertyInspectorDidAppear(ev) => {
            plugin.on_property_inspector_did_appear(session, ev).await
        }
        Event::PropertyInspectorDidDisappear(ev) => {
            plugin.on_property_inspector_did_disappear(session, ev).await
        }
        Event::TitleParametersDidChange(ev) => {
            plugin.on_title_parameters_did_change(session, ev).await
        }
        Event::SendToPlugin(ev) => plugin.on_send_to_plugin(session, ev).await,
        Event::SystemDidWakeUp => plugin.on_system_did_wake_up(session).await,
        Event::Unknown => {
            // Not an error, merely a hook this runtime does not know about.
            debug!(event = %name, "no handler implemented");
            Ok(())
        }
    }
}

//! The hook surface a concrete plugin implements.
//!
//! Every hook has a default no-op body, so a plugin overrides only what it
//! needs. Hooks receive a [`Session`] (the command sender plus a view of
//! the instance store) and the decoded event. Returning `Err` is safe:
//! the router logs it and keeps the connection alive.

use crate::commands::CommandSender;
use crate::registry::ContextRegistry;
use anyhow::Result;
use async_trait::async_trait;
use deck_proto::events::{
    ActionEvent, ApplicationEvent, DeepLinkEvent, DeviceEvent, DialPayload, DialRotatePayload,
    GlobalSettingsEvent, InspectorEvent, InspectorMessageEvent, KeyPayload, ResourcesEvent,
    TitleParametersPayload, TouchTapPayload, VisibilityPayload,
};

/// Handle bundle passed to every hook.
#[derive(Debug, Clone)]
pub struct Session {
    commands: CommandSender,
    registry: ContextRegistry,
}

impl Session {
    pub(crate) fn new(commands: CommandSender, registry: ContextRegistry) -> Self {
        Self { commands, registry }
    }

    /// Outbound command API.
    pub fn commands(&self) -> &CommandSender {
        &self.commands
    }

    /// The shared store of active instances.
    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }
}

/// Event hooks plus the periodic refresh hook.
///
/// The runtime keeps the instance store itself (appear/disappear/settings
/// bookkeeping runs before these hooks and cannot be overridden away), so
/// implementations only deal with their own domain.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Periodic refresh, called once per polling tick for every active
    /// context. Repeated failures for one context trip the circuit
    /// breaker (see [`crate::config::MAX_POLL_FAILURES`]).
    async fn poll(&self, _session: &Session, _context: &str) -> Result<()> {
        Ok(())
    }

    async fn on_did_receive_settings(
        &self,
        _session: &Session,
        _event: ActionEvent<VisibilityPayload>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_did_receive_global_settings(
        &self,
        _session: &Session,
        _event: GlobalSettingsEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_will_appear(
        &self,
        _session: &Session,
        _event: ActionEvent<VisibilityPayload>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_will_disappear(
        &self,
        _session: &Session,
        _event: ActionEvent<VisibilityPayload>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_key_down(&self, _session: &Session, _event: ActionEvent<KeyPayload>) -> Result<()> {
        Ok(())
    }

    async fn on_key_up(&self, _session: &Session, _event: ActionEvent<KeyPayload>) -> Result<()> {
        Ok(())
    }

    async fn on_dial_down(&self, _session: &Session, _event: ActionEvent<DialPayload>) -> Result<()> {
        Ok(())
    }

    async fn on_dial_up(&self, _session: &Session, _event: ActionEvent<DialPayload>) -> Result<()> {
        Ok(())
    }

    async fn on_dial_rotate(
        &self,
        _session: &Session,
        _event: ActionEvent<DialRotatePayload>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_touch_tap(
        &self,
        _session: &Session,
        _event: ActionEvent<TouchTapPayload>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_device_did_connect(&self, _session: &Session, _event: DeviceEvent) -> Result<()> {
        Ok(())
    }

    async fn on_device_did_disconnect(
        &self,
        _session: &Session,
        _event: DeviceEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_device_did_change(&self, _session: &Session, _event: DeviceEvent) -> Result<()> {
        Ok(())
    }

    async fn on_application_did_launch(
        &self,
        _session: &Session,
        _event: ApplicationEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_application_did_terminate(
        &self,
        _session: &Session,
        _event: ApplicationEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_did_receive_deep_link(
        &self,
        _session: &Session,
        _event: DeepLinkEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_did_receive_resources(
        &self,
        _session: &Session,
        _event: ResourcesEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_did_receive_secrets(
        &self,
        _session: &Session,
        _event: ResourcesEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_property_inspector_message(
        &self,
        _session: &Session,
        _event: InspectorMessageEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_property_inspector_did_appear(
        &self,
        _session: &Session,
        _event: InspectorEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_property_inspector_did_disappear(
        &self,
        _session: &Session,
        _event: InspectorEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_title_parameters_did_change(
        &self,
        _session: &Session,
        _event: ActionEvent<TitleParametersPayload>,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_send_to_plugin(
        &self,
        _session: &Session,
        _event: InspectorMessageEvent,
    ) -> Result<()> {
        Ok(())
    }

    /// The only hook invoked without a payload.
    async fn on_system_did_wake_up(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}

//! Shared store of active action instances.
//!
//! One entry per context, owning that instance's settings, its descriptive
//! info and its consecutive poll-failure count. Keeping all three inside a
//! single entry under one lock makes the invariant structural: a context is
//! active exactly when settings and info exist for it, and the failure
//! count can never outlive the entry. Both the event router and the
//! polling loop hold clones of the registry handle.

use deck_proto::events::{Controller, Coordinates, VisibilityPayload};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A removal was requested for a context that is not active — the host
    /// must not announce a disappearance twice.
    #[error("unknown context: {0}")]
    UnknownContext(String),
}

/// Descriptive metadata for one active instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextInfo {
    pub coordinates: Coordinates,
    pub controller: Controller,
    pub state: u8,
    pub is_in_multi_action: bool,
    /// Identifier of the action that created the instance.
    pub action: String,
}

#[derive(Debug)]
struct ContextEntry {
    settings: Value,
    info: ContextInfo,
    poll_failures: u32,
}

#[derive(Debug, Default)]
struct RegistryInner {
    contexts: HashMap<String, ContextEntry>,
    global_settings: Value,
}

/// Cheaply cloneable handle to the instance store.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a context from an appear/settings payload.
    ///
    /// Settings and info are replaced wholesale. The poll-failure count of
    /// an existing entry is preserved — only removal clears it.
    pub async fn upsert(&self, context: &str, action: &str, payload: &VisibilityPayload) {
        let info = ContextInfo {
            coordinates: payload.coordinates,
            controller: payload.controller,
            state: payload.state,
            is_in_multi_action: payload.is_in_multi_action,
            action: action.to_owned(),
        };
        let mut inner = self.inner.write().await;
        match inner.contexts.get_mut(context) {
            Some(entry) => {
                entry.settings = payload.settings.clone();
                entry.info = info;
            }
            None => {
                inner.contexts.insert(
                    context.to_owned(),
                    ContextEntry {
                        settings: payload.settings.clone(),
                        info,
                        poll_failures: 0,
                    },
                );
            }
        }
    }

    /// Remove a context together with its settings, info and failure count.
    pub async fn remove(&self, context: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;
        inner
            .contexts
            .remove(context)
            .map(|_| ())
            .ok_or_else(|| RegistryError::UnknownContext(context.to_owned()))
    }

    pub async fn contains(&self, context: &str) -> bool {
        self.inner.read().await.contexts.contains_key(context)
    }

    /// Snapshot of the active context set, in no particular order.
    pub async fn active_contexts(&self) -> Vec<String> {
        self.inner.read().await.contexts.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.contexts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.contexts.is_empty()
    }

    /// The settings of one active context, if any.
    pub async fn settings(&self, context: &str) -> Option<Value> {
        let inner = self.inner.read().await;
        inner.contexts.get(context).map(|e| e.settings.clone())
    }

    /// The descriptive info of one active context, if any.
    pub async fn info(&self, context: &str) -> Option<ContextInfo> {
        let inner = self.inner.read().await;
        inner.contexts.get(context).map(|e| e.info.clone())
    }

    /// Plugin-wide settings, as last pushed by the host.
    pub async fn global_settings(&self) -> Value {
        self.inner.read().await.global_settings.clone()
    }

    pub async fn set_global_settings(&self, settings: Value) {
        self.inner.write().await.global_settings = settings;
    }

    /// Record one failed poll tick for a context and return the new count.
    ///
    /// Returns `None` when the context disappeared since the tick's
    /// snapshot was taken; the failure is then simply dropped.
    pub async fn record_poll_failure(&self, context: &str) -> Option<u32> {
        let mut inner = self.inner.write().await;
        let entry = inner.contexts.get_mut(context)?;
        entry.poll_failures += 1;
        Some(entry.poll_failures)
    }

    /// Current consecutive failure count for a context.
    pub async fn poll_failures(&self, context: &str) -> Option<u32> {
        let inner = self.inner.read().await;
        inner.contexts.get(context).map(|e| e.poll_failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(settings: Value) -> VisibilityPayload {
        VisibilityPayload {
            settings,
            coordinates: Coordinates { column: 1, row: 2 },
            controller: Controller::Keypad,
            state: 0,
            is_in_multi_action: false,
        }
    }

    #[tokio::test]
    async fn appear_then_disappear_lifecycle() {
        let registry = ContextRegistry::new();
        registry
            .upsert("ABC123", "com.example.volume.showvol", &payload(json!({"audioDevice": "Speakers"})))
            .await;

        assert_eq!(registry.active_contexts().await, vec!["ABC123".to_string()]);
        assert_eq!(
            registry.settings("ABC123").await.unwrap()["audioDevice"],
            "Speakers"
        );
        let info = registry.info("ABC123").await.unwrap();
        assert_eq!(info.action, "com.example.volume.showvol");
        assert_eq!(info.coordinates, Coordinates { column: 1, row: 2 });

        registry.remove("ABC123").await.unwrap();
        assert!(registry.is_empty().await);
        assert!(registry.settings("ABC123").await.is_none());
        assert!(registry.info("ABC123").await.is_none());

        // A second disappearance for the same context is invalid.
        assert!(matches!(
            registry.remove("ABC123").await,
            Err(RegistryError::UnknownContext(_))
        ));
    }

    #[tokio::test]
    async fn reappear_replaces_without_duplicating() {
        let registry = ContextRegistry::new();
        registry
            .upsert("C1", "com.example.volume.mute", &payload(json!({"v": 1})))
            .await;
        registry
            .upsert("C1", "com.example.volume.mute", &payload(json!({"v": 2})))
            .await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.settings("C1").await.unwrap()["v"], 2);
    }

    #[tokio::test]
    async fn failure_count_survives_upsert_but_not_removal() {
        let registry = ContextRegistry::new();
        registry
            .upsert("C1", "com.example.volume.showvol", &payload(json!({})))
            .await;

        assert_eq!(registry.record_poll_failure("C1").await, Some(1));
        assert_eq!(registry.record_poll_failure("C1").await, Some(2));

        // A settings refresh is not a removal; the count stays.
        registry
            .upsert("C1", "com.example.volume.showvol", &payload(json!({})))
            .await;
        assert_eq!(registry.poll_failures("C1").await, Some(2));

        registry.remove("C1").await.unwrap();
        registry
            .upsert("C1", "com.example.volume.showvol", &payload(json!({})))
            .await;
        assert_eq!(registry.poll_failures("C1").await, Some(0));
    }

    #[tokio::test]
    async fn failure_for_unknown_context_is_dropped() {
        let registry = ContextRegistry::new();
        assert_eq!(registry.record_poll_failure("ghost").await, None);
    }

    #[tokio::test]
    async fn global_settings_replaced_wholesale() {
        let registry = ContextRegistry::new();
        assert_eq!(registry.global_settings().await, Value::Null);
        registry.set_global_settings(json!({"theme": "dark"})).await;
        assert_eq!(registry.global_settings().await["theme"], "dark");
    }
}

//! Connection lifecycle orchestration.
//!
//! `connect` dials the host and performs the registration handshake;
//! `run` then drives the two long-lived activities: the inbound dispatch
//! loop (this task) and the polling loop (its own task). Connection
//! closure is terminal: the runtime winds down and `run` returns, there
//! is no reconnection.

use crate::commands::CommandSender;
use crate::config::RuntimeConfig;
use crate::launch::LaunchArgs;
use crate::plugin::{Plugin, Session};
use crate::registry::ContextRegistry;
use crate::transport::{self, TransportEvent};
use crate::{poller, router};
use anyhow::Context;
use deck_proto::commands::registration_frame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Inbound channel depth between the transport reader and the dispatch loop.
const INBOUND_QUEUE: usize = 256;

/// A connected, registered plugin runtime.
pub struct PluginRuntime {
    session: Session,
    inbound_rx: mpsc::Receiver<TransportEvent>,
    running: Arc<AtomicBool>,
    config: RuntimeConfig,
}

impl PluginRuntime {
    /// Connect to the host and register under the identity it assigned.
    ///
    /// The registration frame is the only message sent proactively; from
    /// here on everything is a reaction to an inbound event or a polling
    /// tick.
    pub async fn connect(args: &LaunchArgs, config: RuntimeConfig) -> anyhow::Result<Self> {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);
        let frames = transport::connect(args.port, inbound_tx).await?;

        frames
            .send(registration_frame(&args.register_event, &args.plugin_uuid))
            .await
            .context("failed to send registration")?;
        info!(uuid = %args.plugin_uuid, "registered with host");

        let session = Session::new(CommandSender::new(frames), ContextRegistry::new());
        Ok(Self {
            session,
            inbound_rx,
            running: Arc::new(AtomicBool::new(true)),
            config,
        })
    }

    /// Handle bundle for constructing the plugin before [`run`](Self::run).
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    /// Drive the runtime until the host closes the connection.
    pub async fn run<P: Plugin>(mut self, plugin: P) -> anyhow::Result<()> {
        let plugin = Arc::new(plugin);

        let poller = poller::spawn(
            Arc::clone(&plugin),
            self.session.clone(),
            self.config.poll_interval(),
            self.config.max_poll_failures,
            Arc::clone(&self.running),
        );

        while let Some(event) = self.inbound_rx.recv().await {
            match event {
                TransportEvent::Frame(frame) => {
                    router::dispatch(&frame, plugin.as_ref(), &self.session).await;
                }
                TransportEvent::Closed { code, reason } => {
                    info!(?code, reason = %reason, "connection closed by host");
                    break;
                }
            }
        }

        // Closure is terminal: stop polling and let the task notice the
        // flag at its next tick.
        self.running.store(false, Ordering::SeqCst);
        let _ = poller.await;
        Ok(())
    }
}

//! Timer-driven refresh loop.
//!
//! One dedicated task ticks at a fixed cadence and calls the plugin's
//! `poll` hook for every context active at the start of the tick. Failures
//! are isolated per context through the registry's failure counter; once a
//! single context has failed `max_failures` consecutive ticks, the loop
//! shows an alert on that key and stops for every context. The counter is
//! never reset on success. The cooperative `running` flag is the only
//! cancellation mechanism; an in-flight hook call is never interrupted.

use crate::plugin::{Plugin, Session};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub(crate) fn spawn<P: Plugin>(
    plugin: Arc<P>,
    session: Session,
    interval: Duration,
    max_failures: u32,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(run(plugin, session, interval, max_failures, running))
}

pub(crate) async fn run<P: Plugin>(
    plugin: Arc<P>,
    session: Session,
    interval: Duration,
    max_failures: u32,
    running: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(interval);
    // A slow hook must not cause a burst of catch-up ticks afterwards.
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        // The wait doubles as the cancellation point.
        if !running.load(Ordering::SeqCst) {
            break;
        }

        for context in session.registry().active_contexts().await {
            let Err(e) = plugin.poll(&session, &context).await else {
                continue;
            };

            // The context may have disappeared while its hook ran; then
            // the failure no longer counts against anything.
            let Some(failures) = session.registry().record_poll_failure(&context).await else {
                continue;
            };
            error!(
                context = %context,
                failures,
                error = %format!("{e:#}"),
                "poll hook failed"
            );

            if failures >= max_failures {
                // Circuit breaker: surface the failure on the key, then
                // stop polling for every context.
                if let Err(e) = session.commands().show_alert(&context).await {
                    warn!(context = %context, error = %e, "failed to send alert");
                }
                running.store(false, Ordering::SeqCst);
                break;
            }
        }

        if !running.load(Ordering::SeqCst) {
            break;
        }
    }
    debug!("polling loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandSender;
    use crate::registry::ContextRegistry;
    use crate::transport::{FrameSender, WireFrame};
    use async_trait::async_trait;
    use deck_proto::events::VisibilityPayload;
    use serde_json::Value;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    struct FlakyPlugin {
        /// Contexts whose poll hook always fails.
        failing: Vec<String>,
        ticks: AtomicUsize,
    }

    #[async_trait]
    impl Plugin for FlakyPlugin {
        async fn poll(&self, _session: &Session, context: &str) -> anyhow::Result<()> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|c| c == context) {
                anyhow::bail!("device went missing");
            }
            Ok(())
        }
    }

    async fn session_with(contexts: &[&str]) -> (Session, mpsc::Receiver<WireFrame>) {
        let (tx, rx) = mpsc::channel(32);
        let commands = CommandSender::new(FrameSender::from_channel(tx));
        let registry = ContextRegistry::new();
        for context in contexts {
            registry
                .upsert(context, "com.example.volume.showvol", &VisibilityPayload::default())
                .await;
        }
        (Session::new(commands, registry), rx)
    }

    fn drain_alerts(rx: &mut mpsc::Receiver<WireFrame>) -> Vec<Value> {
        let mut alerts = Vec::new();
        while let Ok(WireFrame::Text(text)) = rx.try_recv() {
            let value: Value = serde_json::from_str(&text).unwrap();
            if value["event"] == "showAlert" {
                alerts.push(value);
            }
        }
        alerts
    }

    #[tokio::test(start_paused = true)]
    async fn breaker_trips_after_threshold_and_stops_the_loop() {
        let (session, mut rx) = session_with(&["X1"]).await;
        let plugin = Arc::new(FlakyPlugin {
            failing: vec!["X1".into()],
            ticks: AtomicUsize::new(0),
        });
        let running = Arc::new(AtomicBool::new(true));

        // The loop stops itself once the breaker trips, so awaiting it
        // directly terminates under the paused clock.
        run(
            plugin.clone(),
            session.clone(),
            Duration::from_millis(200),
            5,
            running.clone(),
        )
        .await;

        assert!(!running.load(Ordering::SeqCst));
        assert_eq!(plugin.ticks.load(Ordering::SeqCst), 5);
        assert_eq!(session.registry().poll_failures("X1").await, Some(5));

        let alerts = drain_alerts(&mut rx);
        assert_eq!(alerts.len(), 1, "exactly one alert expected");
        assert_eq!(alerts[0]["context"], "X1");
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_context_stops_polling_for_all() {
        let (session, mut rx) = session_with(&["X1", "OK1"]).await;
        let plugin = Arc::new(FlakyPlugin {
            failing: vec!["X1".into()],
            ticks: AtomicUsize::new(0),
        });
        let running = Arc::new(AtomicBool::new(true));

        run(
            plugin.clone(),
            session.clone(),
            Duration::from_millis(200),
            5,
            running.clone(),
        )
        .await;

        // The loop itself has exited; no further ticks for any context.
        assert!(!running.load(Ordering::SeqCst));
        // The healthy context's counter never moved.
        assert_eq!(session.registry().poll_failures("OK1").await, Some(0));
        assert_eq!(drain_alerts(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_does_not_touch_the_counter() {
        let (session, mut rx) = session_with(&["OK1"]).await;
        let plugin = Arc::new(FlakyPlugin {
            failing: vec![],
            ticks: AtomicUsize::new(0),
        });
        let running = Arc::new(AtomicBool::new(true));

        let handle = spawn(
            plugin.clone(),
            session.clone(),
            Duration::from_millis(200),
            5,
            running.clone(),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        running.store(false, Ordering::SeqCst);
        handle.await.unwrap();

        assert!(plugin.ticks.load(Ordering::SeqCst) >= 4);
        assert_eq!(session.registry().poll_failures("OK1").await, Some(0));
        assert!(drain_alerts(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_flag_stops_the_loop_after_its_tick() {
        let (session, _rx) = session_with(&[]).await;
        let plugin = Arc::new(FlakyPlugin {
            failing: vec![],
            ticks: AtomicUsize::new(0),
        });
        let running = Arc::new(AtomicBool::new(true));

        let handle = spawn(
            plugin,
            session,
            Duration::from_millis(200),
            5,
            running.clone(),
        );
        running.store(false, Ordering::SeqCst);
        // The next tick observes the flag and exits; the task finishes.
        handle.await.unwrap();
    }
}

//! Recurring status display loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::platform::{bounded, ChatPlatform, MessageContent, PlatformError};
use crate::prober::{ServerStatus, StatusProber};
use crate::store::{StatusTarget, TenantSettings};
use crate::tenant::{ChannelId, MessageId, TenantId, TenantRegistry};

use super::render::render_status;

/// Where a tenant's display was posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayHandle {
    pub channel: ChannelId,
    pub message: MessageId,
}

/// What happened to one tenant's display in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertResult {
    Created,
    Edited,
    /// The edit failed and a replacement was posted.
    Recreated,
    Failed,
}

impl UpsertResult {
    fn label(&self) -> &'static str {
        match self {
            UpsertResult::Created => "created",
            UpsertResult::Edited => "edited",
            UpsertResult::Recreated => "recreated",
            UpsertResult::Failed => "failed",
        }
    }
}

/// Summary of one cycle over all tenants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub tenants: usize,
    pub created: usize,
    pub edited: usize,
    pub recreated: usize,
    pub failed: usize,
}

struct DisplayUpdater {
    settings: Arc<TenantSettings>,
    platform: Arc<dyn ChatPlatform>,
    prober: Arc<dyn StatusProber>,
    displays: TenantRegistry<Option<DisplayHandle>>,
    call_timeout: Duration,
    interval_secs: u64,
}

impl DisplayUpdater {
    async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let configs = self.settings.all();

        let targets: Vec<(TenantId, StatusTarget, ChannelId)> = configs
            .iter()
            .filter_map(|(tenant, config)| {
                let target = config.status.as_ref()?;
                let channel = target.channel_id.clone()?;
                Some((tenant.clone(), target.clone(), channel))
            })
            .collect();

        let updates: Vec<_> = targets
            .iter()
            .map(|(tenant, target, channel)| async move {
                self.update_tenant(tenant, target, channel).await
            })
            .collect();
        let results = futures::future::join_all(updates).await;

        let mut report = CycleReport {
            tenants: results.len(),
            ..Default::default()
        };
        for result in results {
            metrics::DISPLAY_UPSERTS
                .with_label_values(&[result.label()])
                .inc();
            match result {
                UpsertResult::Created => report.created += 1,
                UpsertResult::Edited => report.edited += 1,
                UpsertResult::Recreated => report.recreated += 1,
                UpsertResult::Failed => report.failed += 1,
            }
        }

        metrics::STATUS_CYCLES.inc();
        metrics::STATUS_CYCLE_DURATION
            .with_label_values(&[])
            .observe(started.elapsed().as_secs_f64());
        debug!(
            "Status cycle: {} tenants, {} created, {} edited, {} recreated, {} failed",
            report.tenants, report.created, report.edited, report.recreated, report.failed
        );
        report
    }

    async fn probe(&self, tenant: &TenantId, target: &StatusTarget) -> Option<ServerStatus> {
        let result =
            tokio::time::timeout(self.call_timeout, self.prober.probe(&target.address, target.port))
                .await;
        match result {
            Ok(Ok(status)) => {
                metrics::PROBES_TOTAL.with_label_values(&["online"]).inc();
                Some(status)
            }
            Ok(Err(e)) => {
                debug!(
                    "Tenant {}: probe of {}:{} failed: {}",
                    tenant, target.address, target.port, e
                );
                metrics::PROBES_TOTAL.with_label_values(&["offline"]).inc();
                None
            }
            Err(_) => {
                debug!(
                    "Tenant {}: probe of {}:{} timed out",
                    tenant, target.address, target.port
                );
                metrics::PROBES_TOTAL.with_label_values(&["offline"]).inc();
                None
            }
        }
    }

    async fn update_tenant(
        &self,
        tenant: &TenantId,
        target: &StatusTarget,
        channel: &ChannelId,
    ) -> UpsertResult {
        let status = self.probe(tenant, target).await;
        let content = MessageContent::embed(render_status(
            target,
            status.as_ref(),
            self.interval_secs,
            Utc::now(),
        ));

        let slot = self.displays.entry(tenant);
        let mut handle = slot.lock().await;
        let existing = handle.clone().filter(|h| &h.channel == channel);

        let Some(existing) = existing else {
            return match self.post(channel, &content).await {
                Ok(message) => {
                    info!("Tenant {}: status display created in {}", tenant, channel);
                    *handle = Some(DisplayHandle {
                        channel: channel.clone(),
                        message,
                    });
                    UpsertResult::Created
                }
                Err(e) => {
                    warn!("Tenant {}: failed to post status display: {}", tenant, e);
                    UpsertResult::Failed
                }
            };
        };

        let edit = bounded(
            self.call_timeout,
            self.platform
                .edit_message(&existing.channel, &existing.message, &content),
        )
        .await;
        let Err(e) = edit else {
            return UpsertResult::Edited;
        };

        warn!(
            "Tenant {}: failed to edit status display {}, posting a new one: {}",
            tenant, existing.message, e
        );
        match self.post(channel, &content).await {
            Ok(message) => {
                *handle = Some(DisplayHandle {
                    channel: channel.clone(),
                    message,
                });
                UpsertResult::Recreated
            }
            Err(e) => {
                warn!(
                    "Tenant {}: failed to post replacement status display: {}",
                    tenant, e
                );
                UpsertResult::Failed
            }
        }
    }

    async fn post(
        &self,
        channel: &ChannelId,
        content: &MessageContent,
    ) -> Result<MessageId, PlatformError> {
        bounded(self.call_timeout, self.platform.send_message(channel, content)).await
    }
}

/// Refreshes every configured tenant's status display on a fixed interval.
///
/// One display per tenant: posted on the first cycle, edited in place after
/// that, and replaced when an edit fails. A tenant's failure never affects
/// the others in the same cycle.
pub struct StatusDisplayLoop {
    updater: Arc<DisplayUpdater>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl StatusDisplayLoop {
    pub fn new(
        settings: Arc<TenantSettings>,
        platform: Arc<dyn ChatPlatform>,
        prober: Arc<dyn StatusProber>,
        interval: Duration,
        call_timeout: Duration,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            updater: Arc::new(DisplayUpdater {
                settings,
                platform,
                prober,
                displays: TenantRegistry::new(),
                call_timeout,
                interval_secs: interval.as_secs(),
            }),
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Run one cycle over all tenants now.
    pub async fn run_cycle(&self) -> CycleReport {
        self.updater.run_cycle().await
    }

    /// The display currently tracked for a tenant.
    pub async fn display(&self, tenant: &TenantId) -> Option<DisplayHandle> {
        let slot = self.updater.displays.get(tenant)?;
        let handle = slot.lock().await;
        handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Spawn the loop. The first cycle runs immediately.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Status display loop already running");
            return;
        }

        let updater = Arc::clone(&self.updater);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Status display loop started ({}s interval)", interval.as_secs());
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Status display loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        updater.run_cycle().await;
                    }
                }
            }
            info!("Status display loop stopped");
        });
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Status display loop not running");
            return;
        }
        let _ = self.shutdown_tx.send(());
    }
}

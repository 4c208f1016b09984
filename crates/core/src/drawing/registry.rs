//! Timed drawing registry and its processor loop.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::platform::{bounded, ChatPlatform, Color, Embed, MessageContent, Participant};
use crate::tenant::{MessageId, TenantId, TenantRegistry};

use super::types::{
    Drawing, DrawingError, DrawingOutcome, DrawingRequest, DrawingState, ENTRY_EMOJI,
    MIN_DURATION_MINUTES,
};

struct DrawingBook {
    platform: Arc<dyn ChatPlatform>,
    drawings: TenantRegistry<HashMap<MessageId, Drawing>>,
    call_timeout: Duration,
}

impl DrawingBook {
    async fn process_due(&self, now: DateTime<Utc>) -> Vec<DrawingOutcome> {
        let runs: Vec<_> = self
            .drawings
            .tenants()
            .into_iter()
            .map(|tenant| async move { self.process_tenant(&tenant, now).await })
            .collect();

        futures::future::join_all(runs)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn process_tenant(&self, tenant: &TenantId, now: DateTime<Utc>) -> Vec<DrawingOutcome> {
        let Some(slot) = self.drawings.get(tenant) else {
            return Vec::new();
        };

        // Claim due drawings under the tenant lock so no other run sees them as pending.
        let claimed: Vec<Drawing> = {
            let mut drawings = slot.lock().await;
            drawings
                .values_mut()
                .filter(|d| d.state == DrawingState::Pending && d.deadline <= now)
                .map(|d| {
                    d.state = DrawingState::Resolving;
                    d.clone()
                })
                .collect()
        };

        let mut outcomes = Vec::with_capacity(claimed.len());
        for drawing in claimed {
            let outcome = self.resolve(&drawing).await;
            slot.lock().await.remove(&drawing.id);

            metrics::DRAWINGS_RESOLVED
                .with_label_values(&[outcome.label()])
                .inc();
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn resolve(&self, drawing: &Drawing) -> DrawingOutcome {
        let failed = |reason: String| {
            error!(
                "Tenant {}: drawing {} for '{}' dropped: {}",
                drawing.tenant, drawing.id, drawing.prize, reason
            );
            DrawingOutcome::Failed {
                drawing: drawing.id.clone(),
                reason,
            }
        };

        let users = match bounded(
            self.call_timeout,
            self.platform
                .reaction_users(&drawing.channel, &drawing.id, ENTRY_EMOJI),
        )
        .await
        {
            Ok(users) => users,
            Err(e) => return failed(format!("could not collect participants: {}", e)),
        };

        let entrants = eligible(users);
        // ThreadRng is not Send; pick before the next await.
        let winner = entrants.choose(&mut rand::rng()).cloned();

        let (content, outcome) = match winner {
            Some(winner) => {
                info!(
                    "Tenant {}: drawing {} won by {} ({} entrants)",
                    drawing.tenant,
                    drawing.id,
                    winner.user_id,
                    entrants.len()
                );
                let embed = Embed::new("Drawing finished", Color::GOLD)
                    .with_description(format!(
                        "Congratulations {}! You won **{}**",
                        winner.user_id.mention(),
                        drawing.prize
                    ))
                    .with_timestamp(Utc::now());
                (
                    MessageContent::embed(embed),
                    DrawingOutcome::Winner {
                        drawing: drawing.id.clone(),
                        winner: winner.user_id,
                    },
                )
            }
            None => {
                info!(
                    "Tenant {}: drawing {} ended without entrants",
                    drawing.tenant, drawing.id
                );
                (
                    MessageContent::text(format!(
                        "Nobody entered the drawing for **{}**.",
                        drawing.prize
                    )),
                    DrawingOutcome::NoParticipants {
                        drawing: drawing.id.clone(),
                    },
                )
            }
        };

        match bounded(
            self.call_timeout,
            self.platform.send_message(&drawing.channel, &content),
        )
        .await
        {
            Ok(_) => outcome,
            Err(e) => failed(format!("could not announce the result: {}", e)),
        }
    }
}

/// Humans only, each counted once.
fn eligible(users: Vec<Participant>) -> Vec<Participant> {
    let mut seen = HashSet::new();
    users
        .into_iter()
        .filter(|p| !p.automated)
        .filter(|p| seen.insert(p.user_id.clone()))
        .collect()
}

/// Registry of pending drawings with a recurring resolver.
///
/// A drawing is resolved at most once and never before its deadline. Any
/// failure while resolving is logged and the drawing is still removed.
/// Drawings live in memory only.
pub struct DrawingRegistry {
    book: Arc<DrawingBook>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl DrawingRegistry {
    pub fn new(platform: Arc<dyn ChatPlatform>, interval: Duration, call_timeout: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            book: Arc::new(DrawingBook {
                platform,
                drawings: TenantRegistry::new(),
                call_timeout,
            }),
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Announce a drawing and register it.
    ///
    /// Durations under one minute are rejected before anything is posted.
    pub async fn create(
        &self,
        tenant: &TenantId,
        request: DrawingRequest,
    ) -> Result<Drawing, DrawingError> {
        let length = (request.duration_minutes >= MIN_DURATION_MINUTES)
            .then(|| chrono::Duration::try_minutes(request.duration_minutes))
            .flatten()
            .ok_or(DrawingError::InvalidDuration(request.duration_minutes))?;
        let now = Utc::now();
        let deadline = now
            .checked_add_signed(length)
            .ok_or(DrawingError::InvalidDuration(request.duration_minutes))?;

        let mut embed = Embed::new("Prize drawing", Color::PURPLE)
            .with_description(format!(
                "Prize: **{}**\nDuration: {} minute(s)\nReact with {} to enter!",
                request.prize, request.duration_minutes, ENTRY_EMOJI
            ))
            .with_timestamp(now);
        if let Some(by) = &request.started_by {
            embed = embed.with_footer(format!("Started by {}", by));
        }

        let book = &self.book;
        let message = bounded(
            book.call_timeout,
            book.platform
                .send_message(&request.channel, &MessageContent::embed(embed)),
        )
        .await?;
        if let Err(e) = bounded(
            book.call_timeout,
            book.platform
                .add_reaction(&request.channel, &message, ENTRY_EMOJI),
        )
        .await
        {
            warn!(
                "Tenant {}: could not add entry reaction to drawing {}: {}",
                tenant, message, e
            );
        }

        let drawing = Drawing {
            id: message.clone(),
            tenant: tenant.clone(),
            channel: request.channel,
            prize: request.prize,
            deadline,
            state: DrawingState::Pending,
            started_by: request.started_by,
        };
        book.drawings
            .entry(tenant)
            .lock()
            .await
            .insert(message, drawing.clone());

        metrics::DRAWINGS_CREATED.inc();
        info!(
            "Tenant {}: drawing {} for '{}' ends at {}",
            tenant, drawing.id, drawing.prize, drawing.deadline
        );
        Ok(drawing)
    }

    /// Resolve every pending drawing whose deadline is at or before `now`.
    pub async fn process_due(&self, now: DateTime<Utc>) -> Vec<DrawingOutcome> {
        self.book.process_due(now).await
    }

    /// A tenant's registered drawings, soonest deadline first.
    pub async fn pending(&self, tenant: &TenantId) -> Vec<Drawing> {
        let Some(slot) = self.book.drawings.get(tenant) else {
            return Vec::new();
        };
        let mut drawings: Vec<Drawing> = slot.lock().await.values().cloned().collect();
        drawings.sort_by(|a, b| a.deadline.cmp(&b.deadline));
        drawings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Spawn the processor loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Drawing processor already running");
            return;
        }

        let book = Arc::clone(&self.book);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Drawing processor started ({}s interval)", interval.as_secs());
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Drawing processor received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let outcomes = book.process_due(Utc::now()).await;
                        if !outcomes.is_empty() {
                            debug!("Resolved {} drawings", outcomes.len());
                        }
                    }
                }
            }
            info!("Drawing processor stopped");
        });
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Drawing processor not running");
            return;
        }
        let _ = self.shutdown_tx.send(());
    }
}

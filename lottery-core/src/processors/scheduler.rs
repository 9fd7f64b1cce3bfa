//! EventScheduler processor.
//!
//! The EventScheduler is responsible for:
//! - Keeping at most one DRAW and one ANNOUNCE timer per published event
//! - Re-deriving both timers from the stored event on every `update_schedule`
//! - Running draws and openings when their timers fire, then re-arming
//!   repeating events
//! - Rebuilding every timer from the store on `reconcile_all` (startup and
//!   reload)
//!
//! Timers track the wall clock: they sleep in bounded slices and re-check the
//! current time, so a timer whose instant already passed fires right away and
//! no timer fires before its instant.
//!
//! Every path that touches an event's timers or its stored document holds
//! that event's lock from [`EventLocks`]. A timer that wakes up after being
//! replaced notices its generation is stale and exits without side effects.

use crate::entities::Event;
use crate::framework::EventLocks;
use crate::notifier::Notifier;
use crate::store::{EventStore, StoreError};
use crate::utils::winner_selection::select_winners;
use lottery_sdk::objects::{ScheduledJobKind, ScheduledJobResponse};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Longest single sleep of a timer before it re-reads the clock.
const MAX_SLEEP_SLICE: std::time::Duration = std::time::Duration::from_secs(60);

/// Errors that can occur while (re)arming timers.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The two timers an event can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKind {
    Draw,
    Announce,
}

/// A pending timer, as reported by [`EventScheduler::armed_jobs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledJob {
    pub event_id: Uuid,
    pub kind: JobKind,
    pub fire_at: OffsetDateTime,
}

impl From<ScheduledJob> for ScheduledJobResponse {
    fn from(job: ScheduledJob) -> Self {
        ScheduledJobResponse {
            event_id: job.event_id,
            kind: match job.kind {
                JobKind::Draw => ScheduledJobKind::Draw,
                JobKind::Announce => ScheduledJobKind::Announce,
            },
            fire_at: job.fire_at,
        }
    }
}

/// What `update_schedule` left behind for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A DRAW timer is armed. `announce_at` is set when an ANNOUNCE timer is
    /// armed as well.
    Armed {
        draw_at: OffsetDateTime,
        announce_at: Option<OffsetDateTime>,
    },
    /// The event no longer exists.
    NotFound,
    /// The event is a draft.
    NotPublished,
    /// One-shot event whose draw instant has passed.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct JobKey {
    event_id: Uuid,
    kind: JobKind,
}

struct ArmedJob {
    generation: u64,
    fire_at: OffsetDateTime,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct JobRegistry {
    jobs: HashMap<JobKey, ArmedJob>,
    next_generation: u64,
}

impl JobRegistry {
    fn cancel(&mut self, key: JobKey) {
        if let Some(job) = self.jobs.remove(&key) {
            job.handle.abort();
        }
    }

    /// Take ownership of a fired slot if it still belongs to `generation`.
    fn claim(&mut self, key: JobKey, generation: u64) -> bool {
        match self.jobs.get(&key) {
            Some(job) if job.generation == generation => {
                self.jobs.remove(&key);
                true
            }
            _ => false,
        }
    }

    fn cancel_all(&mut self) -> usize {
        let count = self.jobs.len();
        for (_, job) in self.jobs.drain() {
            job.handle.abort();
        }
        count
    }
}

struct SchedulerInner {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    locks: EventLocks,
    registry: Mutex<JobRegistry>,
    /// Serializes whole-registry rebuilds.
    reconcile: AsyncMutex<()>,
}

/// Timer registry for all published events.
///
/// Cheap to clone; clones share the same timers.
#[derive(Clone)]
pub struct EventScheduler {
    inner: Arc<SchedulerInner>,
}

impl EventScheduler {
    pub fn new(
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        locks: EventLocks,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                notifier,
                locks,
                registry: Mutex::new(JobRegistry::default()),
                reconcile: AsyncMutex::new(()),
            }),
        }
    }

    /// Re-derive the timers of one event from its stored state.
    ///
    /// Existing timers are always cancelled first, so calling this any number
    /// of times leaves at most one DRAW and one ANNOUNCE timer behind. An
    /// opening whose instant already passed is announced inline, unless it
    /// was announced before.
    pub async fn update_schedule(&self, event_id: Uuid) -> Result<ScheduleOutcome, SchedulerError> {
        let _guard = self.inner.locks.lock(event_id).await;
        self.inner
            .reschedule_locked(event_id, OffsetDateTime::now_utc())
            .await
    }

    /// Drop every timer and rebuild them from the published events in the store.
    ///
    /// Returns how many events ended up with a DRAW timer. Failures on
    /// individual events are logged and skipped.
    pub async fn reconcile_all(&self) -> Result<usize, SchedulerError> {
        let _rebuild = self.inner.reconcile.lock().await;

        let cancelled = self.inner.registry().cancel_all();
        debug!(cancelled, "Cleared timer registry");

        let events = self.inner.store.list_published().await?;
        let mut armed = 0;
        for event in &events {
            match self.update_schedule(event.id).await {
                Ok(ScheduleOutcome::Armed { .. }) => armed += 1,
                Ok(outcome) => {
                    debug!(event_id = %event.id, outcome = ?outcome, "Event left unscheduled")
                }
                Err(e) => {
                    error!(event_id = %event.id, error = %e, "Failed to schedule event during reconcile")
                }
            }
        }
        self.inner.locks.prune();

        info!(published = events.len(), armed, "Reconciled schedule");
        Ok(armed)
    }

    /// Snapshot of every pending timer, ordered by fire instant.
    pub fn armed_jobs(&self) -> Vec<ScheduledJob> {
        let registry = self.inner.registry();
        let mut jobs: Vec<ScheduledJob> = registry
            .jobs
            .iter()
            .map(|(key, job)| ScheduledJob {
                event_id: key.event_id,
                kind: key.kind,
                fire_at: job.fire_at,
            })
            .collect();
        jobs.sort_by_key(|job| (job.fire_at, job.event_id, job.kind));
        jobs
    }

    /// Abort every pending timer. Draws already running finish on their own.
    pub fn shutdown(&self) {
        let cancelled = self.inner.registry().cancel_all();
        info!(cancelled, "EventScheduler shut down");
    }
}

impl SchedulerInner {
    fn registry(&self) -> std::sync::MutexGuard<'_, JobRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller must hold the event lock.
    async fn reschedule_locked(
        self: &Arc<Self>,
        event_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<ScheduleOutcome, SchedulerError> {
        {
            let mut registry = self.registry();
            registry.cancel(JobKey { event_id, kind: JobKind::Draw });
            registry.cancel(JobKey { event_id, kind: JobKind::Announce });
        }

        let Some(mut event) = self.store.get(event_id).await? else {
            debug!(%event_id, "Event not found, timers cleared");
            return Ok(ScheduleOutcome::NotFound);
        };
        if !event.is_published() {
            debug!(%event_id, "Event is a draft, timers cleared");
            return Ok(ScheduleOutcome::NotPublished);
        }
        let Some(draw_at) = event.next_draw_at(now) else {
            info!(%event_id, "Event expired, no further draws");
            return Ok(ScheduleOutcome::Expired);
        };

        self.arm(JobKey { event_id, kind: JobKind::Draw }, draw_at);

        let open_at = draw_at - event.duration();
        let announce_at = if event.is_announced_for(open_at) {
            None
        } else if open_at <= now {
            self.announce_open(&mut event, open_at).await?;
            None
        } else {
            self.arm(JobKey { event_id, kind: JobKind::Announce }, open_at);
            Some(open_at)
        };

        debug!(%event_id, %draw_at, announce_at = ?announce_at, "Event scheduled");
        Ok(ScheduleOutcome::Armed {
            draw_at,
            announce_at,
        })
    }

    fn arm(self: &Arc<Self>, key: JobKey, fire_at: OffsetDateTime) {
        let mut registry = self.registry();
        registry.cancel(key);
        let generation = registry.next_generation;
        registry.next_generation += 1;
        let handle = tokio::spawn(timer_task(
            Arc::downgrade(self),
            key,
            generation,
            fire_at,
        ));
        registry.jobs.insert(
            key,
            ArmedJob {
                generation,
                fire_at,
                handle,
            },
        );
    }

    fn claim(&self, key: JobKey, generation: u64) -> bool {
        self.registry().claim(key, generation)
    }

    /// Tell the notifier about an opening and remember it was announced.
    ///
    /// The marker is stored even if the notifier fails.
    async fn announce_open(&self, event: &mut Event, open_at: OffsetDateTime) -> Result<(), StoreError> {
        match self.notifier.announce_open(event.id).await {
            Ok(()) => info!(event_id = %event.id, %open_at, "Occurrence opened"),
            Err(e) => warn!(event_id = %event.id, error = %e, "Failed to announce opening"),
        }
        event.announced_through = Some(open_at);
        self.store.upsert(event.clone()).await
    }

    async fn run_announce(&self, event_id: Uuid, open_at: OffsetDateTime) {
        let mut event = match self.store.get(event_id).await {
            Ok(Some(event)) if event.is_published() => event,
            Ok(_) => {
                debug!(%event_id, "Announce fired for unpublished or missing event");
                return;
            }
            Err(e) => {
                error!(%event_id, error = %e, "Failed to load event for announcement");
                return;
            }
        };
        if event.is_announced_for(open_at) {
            return;
        }
        if let Err(e) = self.announce_open(&mut event, open_at).await {
            error!(%event_id, error = %e, "Failed to record announcement");
        }
    }

    async fn run_draw(self: &Arc<Self>, event_id: Uuid, fired_for: OffsetDateTime) {
        let event = match self.store.get(event_id).await {
            Ok(Some(event)) if event.is_published() => event,
            Ok(_) => {
                debug!(%event_id, "Draw fired for unpublished or missing event");
                return;
            }
            Err(e) => {
                error!(%event_id, error = %e, "Failed to load event for draw");
                return;
            }
        };

        let selection = {
            let mut rng = rand::rng();
            select_winners(event.selection_rule, &event.bids, event.winner_count, &mut rng)
        };
        match selection {
            Ok(result) => {
                info!(
                    %event_id,
                    rule = ?event.selection_rule,
                    bids = event.bids.len(),
                    winning_value = ?result.winning_value,
                    winners = result.winners.len(),
                    "Draw completed"
                );
                if let Err(e) = self.notifier.announce_result(event_id, &result).await {
                    warn!(%event_id, error = %e, "Failed to announce draw result");
                }
            }
            Err(e) => error!(%event_id, error = %e, "Draw aborted"),
        }

        if event.repeats() {
            // Never resolve back to the occurrence that just fired.
            let Some(floor) = fired_for.checked_add(Duration::NANOSECOND) else {
                info!(%event_id, "No representable occurrence after this draw");
                return;
            };
            let now = OffsetDateTime::now_utc().max(floor);
            if let Err(e) = self.reschedule_locked(event_id, now).await {
                error!(%event_id, error = %e, "Failed to re-arm repeating event");
            }
        }
    }
}

async fn timer_task(
    inner: Weak<SchedulerInner>,
    key: JobKey,
    generation: u64,
    fire_at: OffsetDateTime,
) {
    wait_until(fire_at).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let _guard = inner.locks.lock(key.event_id).await;
    if !inner.claim(key, generation) {
        debug!(event_id = %key.event_id, kind = ?key.kind, "Timer superseded");
        return;
    }

    match key.kind {
        JobKind::Draw => inner.run_draw(key.event_id, fire_at).await,
        JobKind::Announce => inner.run_announce(key.event_id, fire_at).await,
    }
}

/// Sleep until the wall clock reaches `target`.
async fn wait_until(target: OffsetDateTime) {
    loop {
        let remaining = target - OffsetDateTime::now_utc();
        if !remaining.is_positive() {
            return;
        }
        tokio::time::sleep(remaining.unsigned_abs().min(MAX_SLEEP_SLICE)).await;
    }
}

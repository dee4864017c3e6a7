// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler registry
//!
//! Owns one [`ResourceScheduler`] per resource and executes the effects its
//! transitions produce. Each resource has its own lock; the table lock is only
//! held to look up, insert, or evict entries, so activity on one resource
//! never waits on another.
//!
//! Lock order is table then entry. Nothing holding an entry lock takes the
//! table lock, and no lock is held across an await.
//!
//! Timers and runs are spawned on the runtime captured at construction, so
//! every method may be called from plain threads as well as from tasks.

use crate::error::RegistryError;
use crate::flight::{self, RunHandle};
use crate::timer::TimerHandle;
use regen_adapters::{RegenerationJob, StalenessProbe};
use regen_core::{
    Clock, Effect, Phase, ResourceId, ResourceScheduler, SchedulerConfig, SchedulerEvent,
    SchedulerInput, StalenessSnapshot, Status,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

type Slot = Arc<Mutex<Entry>>;

/// Live state for one resource
struct Entry {
    scheduler: ResourceScheduler,
    /// Task backing the armed timer; `Some` exactly while `Pending`
    timer: Option<TimerHandle>,
    /// Shared handle to the in-flight run; `Some` exactly while `Running`
    flight: Option<RunHandle>,
    touched: Instant,
    /// Set when removed from the table; holders must look the id up again
    evicted: bool,
}

impl Entry {
    fn new(scheduler: ResourceScheduler, now: Instant) -> Self {
        Self {
            scheduler,
            timer: None,
            flight: None,
            touched: now,
            evicted: false,
        }
    }
}

struct Inner<P, J, C> {
    config: SchedulerConfig,
    probe: P,
    job: J,
    clock: C,
    runtime: Handle,
    entries: Mutex<HashMap<ResourceId, Slot>>,
    events: broadcast::Sender<SchedulerEvent>,
}

/// Debounced, single-flight regeneration for many resources
///
/// Cheap to clone; clones share the same resources.
pub struct SchedulerRegistry<P, J, C> {
    inner: Arc<Inner<P, J, C>>,
}

impl<P, J, C> Clone for SchedulerRegistry<P, J, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, J, C> SchedulerRegistry<P, J, C>
where
    P: StalenessProbe,
    J: RegenerationJob,
    C: Clock,
{
    /// Build a registry spawning onto the current tokio runtime
    pub fn new(
        config: SchedulerConfig,
        probe: P,
        job: J,
        clock: C,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        let runtime = Handle::try_current()?;
        Self::with_runtime(config, probe, job, clock, runtime)
    }

    /// Build a registry spawning onto `runtime`; usable outside any runtime
    pub fn with_runtime(
        config: SchedulerConfig,
        probe: P,
        job: J,
        clock: C,
        runtime: Handle,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                probe,
                job,
                clock,
                runtime,
                entries: Mutex::new(HashMap::new()),
                events,
            }),
        })
    }

    /// Report fresh staleness for `id`
    ///
    /// Never blocks on a running job. Re-reporting the same edit does not
    /// push the deadline back.
    pub fn notify(&self, id: &ResourceId, snapshot: StalenessSnapshot) -> Status {
        self.with_entry(id, |registry, entry| {
            registry.step(entry, SchedulerInput::Observe(snapshot))
        })
    }

    /// Fetch staleness from the probe and report it
    ///
    /// A probe failure is recorded as the resource's last error and the
    /// phase is left alone.
    pub async fn observe(&self, id: &ResourceId) -> Result<Status, RegistryError> {
        match self.inner.probe.fetch(id).await {
            Ok(snapshot) => Ok(self.notify(id, snapshot)),
            Err(source) => {
                let reason = source.to_string();
                self.with_entry(id, |registry, entry| {
                    registry.step(entry, SchedulerInput::ProbeFailed { reason })
                });
                Err(RegistryError::Probe {
                    id: id.clone(),
                    source,
                })
            }
        }
    }

    /// Start a regeneration immediately, or join the one in flight
    ///
    /// Cancels any pending timer. The returned handle resolves when the run
    /// finishes; dropping it does not cancel the run.
    pub fn run_now(&self, id: &ResourceId) -> RunHandle {
        self.with_entry(id, |registry, entry| {
            registry.step(entry, SchedulerInput::RunNow);
            entry
                .flight
                .clone()
                .unwrap_or_else(|| flight::settled(Ok(())))
        })
    }

    /// Disarm a pending timer for `id`
    ///
    /// A running job is not interrupted.
    pub fn cancel_pending(&self, id: &ResourceId) -> Status {
        match self.existing(id) {
            Some(_) => self.with_entry(id, |registry, entry| {
                registry.step(entry, SchedulerInput::CancelPending)
            }),
            None => Status::unobserved(),
        }
    }

    /// Disarm every pending timer, returning how many were cancelled
    pub fn cancel_all(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.inner.entries).values().cloned().collect();

        let mut cancelled = 0;
        for slot in slots {
            let mut entry = lock(&slot);
            if entry.evicted || entry.scheduler.phase != Phase::Pending {
                continue;
            }
            self.step(&mut entry, SchedulerInput::CancelPending);
            cancelled += 1;
        }
        cancelled
    }

    /// Current status of `id`; unknown resources report `Outdated`
    pub fn status(&self, id: &ResourceId) -> Status {
        match self.existing(id) {
            Some(slot) => status_of(&slot),
            None => Status::unobserved(),
        }
    }

    /// Receive every scheduler event from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.inner.events.subscribe()
    }

    /// Number of resources currently tracked
    pub fn len(&self) -> usize {
        lock(&self.inner.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with `id`'s entry locked, creating it if needed
    fn with_entry<T>(&self, id: &ResourceId, f: impl FnOnce(&Self, &mut Entry) -> T) -> T {
        loop {
            let slot = self.slot(id);
            let mut entry = lock(&slot);
            if !entry.evicted {
                return f(self, &mut entry);
            }
        }
    }

    fn existing(&self, id: &ResourceId) -> Option<Slot> {
        lock(&self.inner.entries).get(id).cloned()
    }

    fn slot(&self, id: &ResourceId) -> Slot {
        let mut entries = lock(&self.inner.entries);
        if let Some(slot) = entries.get(id) {
            return Arc::clone(slot);
        }

        if entries.len() >= self.inner.config.max_resources {
            self.evict_idle(&mut entries);
        }

        let scheduler = ResourceScheduler::new(id.clone(), &self.inner.config);
        let slot = Arc::new(Mutex::new(Entry::new(scheduler, self.inner.clock.now())));
        entries.insert(id.clone(), Arc::clone(&slot));
        slot
    }

    /// Drop the least recently touched idle entry, if there is one
    ///
    /// Busy entries (locked right now, pending, or running) are never
    /// evicted, so the table can briefly exceed `max_resources`.
    fn evict_idle(&self, entries: &mut HashMap<ResourceId, Slot>) {
        let victim = entries
            .iter()
            .filter_map(|(id, slot)| {
                let entry = slot.try_lock().ok()?;
                let idle = entry.scheduler.is_idle();
                idle.then_some((entry.touched, id.clone()))
            })
            .min_by_key(|(touched, _)| *touched)
            .map(|(_, id)| id);

        let Some(id) = victim else {
            tracing::debug!(tracked = entries.len(), "no idle resource to evict");
            return;
        };

        let Some(slot) = entries.get(&id) else {
            return;
        };
        let Ok(mut entry) = slot.try_lock() else {
            return;
        };
        if !entry.scheduler.is_idle() {
            return;
        }
        entry.evicted = true;
        drop(entry);

        entries.remove(&id);
        self.emit(SchedulerEvent::Evicted { id });
    }

    /// Apply one input to a locked entry and execute the resulting effects
    fn step(&self, entry: &mut Entry, input: SchedulerInput) -> Status {
        let (next, effects) = entry.scheduler.transition(input, &self.inner.clock);
        entry.scheduler = next;
        entry.touched = self.inner.clock.now();

        for effect in effects {
            self.execute(entry, effect);
        }

        if entry.scheduler.armed_timer().is_none() {
            entry.timer = None;
        }
        if entry.scheduler.phase != Phase::Running {
            entry.flight = None;
        }
        entry.scheduler.status()
    }

    fn execute(&self, entry: &mut Entry, effect: Effect) {
        let id = entry.scheduler.id.clone();
        match effect {
            Effect::ArmTimer { delay, generation } => {
                let registry = Arc::downgrade(&self.inner);
                // Replacing the slot aborts the previous timer task
                entry.timer = Some(TimerHandle::arm(
                    &self.inner.runtime,
                    delay,
                    generation,
                    move || fire(registry, &id, generation),
                ));
            }
            Effect::CancelTimer => entry.timer = None,
            Effect::StartJob => entry.flight = Some(self.launch(id)),
            Effect::Emit(event) => self.emit(event),
        }
    }

    /// Run the job on its own task, then re-check staleness and settle
    fn launch(&self, id: ResourceId) -> RunHandle {
        let registry = self.clone();

        flight::launch(&self.inner.runtime, async move {
            let result = registry.inner.job.run(&id).await;

            let input = match &result {
                Ok(()) => match registry.inner.probe.fetch(&id).await {
                    Ok(snapshot) => SchedulerInput::JobSucceeded { snapshot },
                    Err(e) => SchedulerInput::RecheckFailed {
                        reason: e.to_string(),
                    },
                },
                Err(e) => SchedulerInput::JobFailed {
                    reason: e.to_string(),
                },
            };
            registry.with_entry(&id, |registry, entry| registry.step(entry, input));

            result
        })
    }

    fn emit(&self, event: SchedulerEvent) {
        let name = event.name();
        let id = event.resource();
        match &event {
            SchedulerEvent::RegenerationScheduled { delay, .. } => {
                tracing::info!(event = name, %id, delay_ms = delay.as_millis() as u64, "scheduled")
            }
            SchedulerEvent::RegenerationFailed { reason, .. } => {
                tracing::warn!(event = name, %id, reason = %reason, "failed")
            }
            SchedulerEvent::UpToDate { .. } | SchedulerEvent::Evicted { .. } => {
                tracing::debug!(event = name, %id)
            }
            _ => tracing::info!(event = name, %id),
        }

        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

/// Timer callback; the registry may already be gone
fn fire<P, J, C>(registry: Weak<Inner<P, J, C>>, id: &ResourceId, generation: u64)
where
    P: StalenessProbe,
    J: RegenerationJob,
    C: Clock,
{
    let Some(inner) = registry.upgrade() else {
        return;
    };
    let registry = SchedulerRegistry { inner };

    registry.with_entry(id, |registry, entry| {
        let current = entry.timer.as_ref().map(TimerHandle::generation);
        if current != Some(generation) {
            tracing::trace!(%id, generation, ?current, "stale timer fired");
        }
        registry.step(entry, SchedulerInput::TimerFired { generation })
    });
}

fn status_of(slot: &Slot) -> Status {
    lock(slot).scheduler.status()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

//! Deferred effects keyed by the tick they fire on.
//!
//! Entries hold entity ids, never references. Removing an entity cancels
//! everything that mentions it, and the world re-checks existence when an
//! entry is drained.

use lander_shared::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityRef {
    Vehicle(VehicleId),
    Cloud(CloudId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deferred {
    /// The strike delay of a charging cloud has elapsed.
    ResolveStrike { target: VehicleId },
    /// Scatter debris around a wreck.
    SpawnDebris,
    /// Reset a thrust power-up.
    ExpireThrustBoost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub fire_at_tick: u32,
    pub entity: EntityRef,
    pub payload: Deferred,
}

impl ScheduledEvent {
    /// Whether this entry depends on the given entity still existing.
    pub fn references(&self, entity: EntityRef) -> bool {
        if self.entity == entity {
            return true;
        }
        match (self.payload, entity) {
            (Deferred::ResolveStrike { target }, EntityRef::Vehicle(v)) => target == v,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    // (tick, sequence) keeps same-tick entries in scheduling order
    queue: BTreeMap<(u32, u64), ScheduledEvent>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at_tick: u32, entity: EntityRef, payload: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert(
            (fire_at_tick, seq),
            ScheduledEvent {
                fire_at_tick,
                entity,
                payload,
            },
        );
    }

    /// Drop every entry that references `entity`. Returns how many were dropped.
    pub fn cancel_entity(&mut self, entity: EntityRef) -> usize {
        self.cancel_where(|e| e.references(entity))
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(&ScheduledEvent) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, e| !pred(e));
        before - self.queue.len()
    }

    /// Remove and return every entry due at or before `tick`, in order.
    pub fn drain_due(&mut self, tick: u32) -> Vec<ScheduledEvent> {
        let Some(next) = tick.checked_add(1) else {
            return std::mem::take(&mut self.queue).into_values().collect();
        };
        let later = self.queue.split_off(&(next, 0));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 The slotbook-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Slot store: the registry of provider time windows and their claim flag.
//!
//! Each provider's published slots live behind a single per-provider mutex.
//! That one lock covers both exclusivity guarantees:
//!
//! - **Publish time**: a new window must not overlap any existing slot of
//!   the same provider, claimed or not.
//! - **Booking time**: [`SlotStore::try_claim`] is an atomic compare-and-set
//!   of the `claimed` flag. Two racing claims serialize on the schedule
//!   mutex and exactly one observes `claimed == false`.
//!
//! # Thread Safety
//!
//! The store uses [`DashMap`] to route to per-provider schedules, so
//! unrelated providers never contend on the same lock.

use crate::base::{ProviderId, ProviderKind, SlotId};
use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A published, bookable time window.
///
/// `claimed` flips to true exactly once, when a booking reserves the slot.
/// `released` is audit state written by cancellation bookkeeping; a released
/// slot stays claimed and never re-enters availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub provider_id: ProviderId,
    pub provider_kind: ProviderKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub claimed: bool,
    pub released: bool,
}

impl Slot {
    /// Half-open interval intersection test.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && self.start < end
    }

    /// Whether this slot starts on the given UTC calendar day.
    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start.date_naive() == date
    }
}

/// One provider's schedule: slots indexed by id, plus a version counter.
#[derive(Debug)]
struct ScheduleData {
    slots: HashMap<SlotId, Slot>,
    /// Bumped on every successful mutation; read by the availability cache.
    version: u64,
}

impl ScheduleData {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            version: 0,
        }
    }
}

#[derive(Debug)]
struct Schedule {
    inner: Mutex<ScheduleData>,
}

impl Schedule {
    fn new() -> Self {
        Self {
            inner: Mutex::new(ScheduleData::new()),
        }
    }
}

/// Durable registry of provider time windows.
///
/// # Invariants
///
/// - For a given provider, no two slots overlap in time.
/// - A slot is either unclaimed or holds at most one active booking; the
///   flag never flips back to false.
/// - Only unclaimed slots may be withdrawn.
#[derive(Debug)]
pub struct SlotStore {
    /// Per-provider schedules; each one carries its own mutex.
    schedules: DashMap<ProviderId, Arc<Schedule>>,
    /// Routes a slot id to its owning provider.
    directory: DashMap<SlotId, ProviderId>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self {
            schedules: DashMap::new(),
            directory: DashMap::new(),
        }
    }

    fn schedule_for(&self, provider_id: &ProviderId) -> Option<Arc<Schedule>> {
        self.schedules.get(provider_id).map(|s| Arc::clone(&s))
    }

    fn schedule_or_create(&self, provider_id: &ProviderId) -> Arc<Schedule> {
        Arc::clone(
            &self
                .schedules
                .entry(provider_id.clone())
                .or_insert_with(|| Arc::new(Schedule::new())),
        )
    }

    /// Publishes a new slot for the provider.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidWindow`] - `start >= end`.
    /// - [`BookingError::SlotOverlap`] - the window intersects an existing
    ///   slot of the same provider, claimed or not.
    pub fn publish(
        &self,
        provider_id: ProviderId,
        provider_kind: ProviderKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Slot, BookingError> {
        if start >= end {
            return Err(BookingError::InvalidWindow);
        }

        let schedule = self.schedule_or_create(&provider_id);
        let mut data = schedule.inner.lock();

        // Overlap check and insert happen under the same lock, so two racing
        // publishes cannot both slip an overlapping window in.
        if data.slots.values().any(|slot| slot.overlaps(start, end)) {
            return Err(BookingError::SlotOverlap);
        }

        let slot = Slot {
            id: SlotId::generate(),
            provider_id: provider_id.clone(),
            provider_kind,
            start,
            end,
            claimed: false,
            released: false,
        };
        data.slots.insert(slot.id, slot.clone());
        data.version += 1;
        drop(data);

        self.directory.insert(slot.id, provider_id);
        log::debug!("published slot {} [{} .. {})", slot.id, slot.start, slot.end);
        Ok(slot)
    }

    /// Atomically flips `claimed` from false to true.
    ///
    /// This is the single arbiter of slot exclusivity: of N concurrent
    /// claims on the same slot, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// - [`BookingError::SlotNotFound`] - no such slot.
    /// - [`BookingError::SlotUnavailable`] - the slot is already claimed.
    pub fn try_claim(&self, slot_id: &SlotId) -> Result<Slot, BookingError> {
        let provider_id = self
            .directory
            .get(slot_id)
            .map(|p| p.clone())
            .ok_or(BookingError::SlotNotFound)?;
        let schedule = self
            .schedule_for(&provider_id)
            .ok_or(BookingError::SlotNotFound)?;

        let mut data = schedule.inner.lock();
        let slot = data
            .slots
            .get_mut(slot_id)
            .ok_or(BookingError::SlotNotFound)?;
        if slot.claimed {
            return Err(BookingError::SlotUnavailable);
        }
        slot.claimed = true;
        let claimed = slot.clone();
        data.version += 1;
        drop(data);

        log::debug!("claimed slot {}", slot_id);
        Ok(claimed)
    }

    /// Records that the booking holding this slot was cancelled.
    ///
    /// Audit bookkeeping only: the slot stays claimed and never re-enters
    /// availability. Cancellation ends the slot's bookability.
    pub fn release(&self, slot_id: &SlotId) -> Result<Slot, BookingError> {
        let provider_id = self
            .directory
            .get(slot_id)
            .map(|p| p.clone())
            .ok_or(BookingError::SlotNotFound)?;
        let schedule = self
            .schedule_for(&provider_id)
            .ok_or(BookingError::SlotNotFound)?;

        let mut data = schedule.inner.lock();
        let slot = data
            .slots
            .get_mut(slot_id)
            .ok_or(BookingError::SlotNotFound)?;
        slot.released = true;
        let released = slot.clone();
        data.version += 1;
        Ok(released)
    }

    /// Removes an unclaimed slot from the provider's schedule.
    ///
    /// # Errors
    ///
    /// - [`BookingError::SlotNotFound`] - no such slot.
    /// - [`BookingError::Forbidden`] - caller is not the owning provider.
    /// - [`BookingError::SlotUnavailable`] - the slot is claimed; slots
    ///   referenced by a booking can never be withdrawn.
    pub fn withdraw(
        &self,
        provider_id: &ProviderId,
        slot_id: &SlotId,
    ) -> Result<Slot, BookingError> {
        let owner = self
            .directory
            .get(slot_id)
            .map(|p| p.clone())
            .ok_or(BookingError::SlotNotFound)?;
        if &owner != provider_id {
            return Err(BookingError::Forbidden);
        }
        let schedule = self
            .schedule_for(&owner)
            .ok_or(BookingError::SlotNotFound)?;

        let mut data = schedule.inner.lock();
        let claimed = data
            .slots
            .get(slot_id)
            .ok_or(BookingError::SlotNotFound)?
            .claimed;
        if claimed {
            return Err(BookingError::SlotUnavailable);
        }
        let slot = data.slots.remove(slot_id).ok_or(BookingError::SlotNotFound)?;
        data.version += 1;
        drop(data);

        self.directory.remove(slot_id);
        log::debug!("withdrew slot {}", slot_id);
        Ok(slot)
    }

    /// Retrieves a slot by id.
    pub fn get(&self, slot_id: &SlotId) -> Result<Slot, BookingError> {
        let provider_id = self
            .directory
            .get(slot_id)
            .map(|p| p.clone())
            .ok_or(BookingError::SlotNotFound)?;
        let schedule = self
            .schedule_for(&provider_id)
            .ok_or(BookingError::SlotNotFound)?;
        let data = schedule.inner.lock();
        data.slots
            .get(slot_id)
            .cloned()
            .ok_or(BookingError::SlotNotFound)
    }

    /// All slots of a provider, ordered by start instant.
    pub fn list_by_provider(&self, provider_id: &ProviderId) -> Vec<Slot> {
        self.snapshot(provider_id).1
    }

    /// Consistent view of a provider's schedule: version plus sorted slots.
    ///
    /// Both values are read under the schedule lock, so the version always
    /// matches the slot set it is paired with.
    pub fn snapshot(&self, provider_id: &ProviderId) -> (u64, Vec<Slot>) {
        let Some(schedule) = self.schedule_for(provider_id) else {
            return (0, Vec::new());
        };
        let data = schedule.inner.lock();
        let mut slots: Vec<Slot> = data.slots.values().cloned().collect();
        slots.sort_by_key(|slot| slot.start);
        (data.version, slots)
    }

    /// Current schedule version for a provider (0 if none exists).
    pub fn version(&self, provider_id: &ProviderId) -> u64 {
        self.schedule_for(provider_id)
            .map(|schedule| schedule.inner.lock().version)
            .unwrap_or(0)
    }
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

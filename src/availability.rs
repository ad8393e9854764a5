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

//! Availability index: a read-optimized projection of the slot store.
//!
//! Answers "what is free on date X" for calendar rendering without scanning
//! every slot on every request. The projection is cached per provider and
//! keyed to the store's schedule version; a stale cache is rebuilt on read.
//!
//! The index is advisory only. It never arbitrates a claim: a slot that
//! looks free here can still lose the race at
//! [`SlotStore::try_claim`](crate::slot::SlotStore::try_claim), which
//! remains the single source of truth.

use crate::base::ProviderId;
use crate::slot::{Slot, SlotStore};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cached per-provider projection: free slots grouped by UTC calendar day.
#[derive(Debug, Clone)]
struct Projection {
    /// Store version this projection was computed from.
    version: u64,
    /// Unclaimed slots per day, each vector ordered by start instant.
    days: BTreeMap<NaiveDate, Vec<Slot>>,
}

/// Read-optimized view of free slots, grouped by provider and day.
#[derive(Debug)]
pub struct AvailabilityIndex {
    store: Arc<SlotStore>,
    cache: DashMap<ProviderId, Projection>,
}

impl AvailabilityIndex {
    pub fn new(store: Arc<SlotStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Returns the current projection for a provider, rebuilding it when
    /// the store moved since it was cached.
    fn projection(&self, provider_id: &ProviderId) -> Projection {
        let current = self.store.version(provider_id);
        if let Some(cached) = self.cache.get(provider_id) {
            if cached.version == current {
                return cached.clone();
            }
        }

        // snapshot() pairs the version with the slot set it describes, so a
        // claim landing between the version probe above and this rebuild
        // only makes the projection fresher than requested, never staler.
        let (version, slots) = self.store.snapshot(provider_id);
        let mut days: BTreeMap<NaiveDate, Vec<Slot>> = BTreeMap::new();
        for slot in slots.into_iter().filter(|slot| !slot.claimed) {
            days.entry(slot.start.date_naive()).or_default().push(slot);
        }

        log::debug!(
            "rebuilt availability for {} at version {} ({} free days)",
            provider_id,
            version,
            days.len()
        );
        let projection = Projection { version, days };
        self.cache.insert(provider_id.clone(), projection.clone());
        projection
    }

    /// Unclaimed slots of a provider starting on the given UTC day,
    /// ordered by start instant.
    pub fn free_slots_for_day(&self, provider_id: &ProviderId, date: NaiveDate) -> Vec<Slot> {
        self.projection(provider_id)
            .days
            .get(&date)
            .cloned()
            .unwrap_or_default()
    }

    /// Sorted dates on which the provider has at least one free slot.
    /// Feeds a calendar widget's "has availability" markers.
    pub fn free_dates_for_provider(&self, provider_id: &ProviderId) -> Vec<NaiveDate> {
        self.projection(provider_id).days.keys().copied().collect()
    }
}

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

//! Query facade: the single entry point external collaborators call.
//!
//! [`BookingEngine`] composes the slot store, the booking ledger, the
//! availability index, and the event queue. It holds no independent state;
//! it is constructed explicitly at service start and dropped at shutdown,
//! with no ambient singletons.
//!
//! Identity is the caller's problem: `student_id` and `acting_provider_id`
//! arrive pre-authenticated from the identity collaborator. The engine only
//! enforces the ownership guard on status changes.

use crate::availability::AvailabilityIndex;
use crate::base::{BookingId, ProviderId, ProviderKind, SlotId, StudentId};
use crate::booking::{BookingRecord, BookingStatus};
use crate::error::BookingError;
use crate::events::{BookingEvent, EventQueue};
use crate::ledger::BookingLedger;
use crate::slot::{Slot, SlotStore};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Meeting booking engine.
///
/// # Invariants
///
/// - A slot holds at most one active booking, ever.
/// - Booking statuses move forward only: `Booked` to `Acknowledged` or
///   `Cancelled`, both terminal.
/// - Cancellation does not re-open the slot for booking.
#[derive(Debug)]
pub struct BookingEngine {
    store: Arc<SlotStore>,
    events: Arc<EventQueue>,
    ledger: BookingLedger,
    availability: AvailabilityIndex,
}

impl BookingEngine {
    /// Creates an engine with empty stores.
    pub fn new() -> Self {
        let store = Arc::new(SlotStore::new());
        let events = Arc::new(EventQueue::new());
        let ledger = BookingLedger::new(Arc::clone(&store), Arc::clone(&events));
        let availability = AvailabilityIndex::new(Arc::clone(&store));
        Self {
            store,
            events,
            ledger,
            availability,
        }
    }

    // === Provider surface ===

    /// Publishes a bookable time window for a provider.
    pub fn publish_slot(
        &self,
        provider_id: ProviderId,
        provider_kind: ProviderKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Slot, BookingError> {
        self.store.publish(provider_id, provider_kind, start, end)
    }

    /// Withdraws an unclaimed slot from a provider's schedule.
    pub fn withdraw_slot(
        &self,
        provider_id: &ProviderId,
        slot_id: &SlotId,
    ) -> Result<Slot, BookingError> {
        self.store.withdraw(provider_id, slot_id)
    }

    /// Applies the provider's accept/reject decision to a pending booking.
    pub fn change_booking_status(
        &self,
        booking_id: &BookingId,
        acting_provider_id: &ProviderId,
        new_status: BookingStatus,
    ) -> Result<BookingRecord, BookingError> {
        self.ledger
            .change_status(booking_id, acting_provider_id, new_status)
    }

    /// A provider's bookings, optionally filtered by status.
    pub fn list_provider_bookings(
        &self,
        provider_id: &ProviderId,
        status_filter: Option<BookingStatus>,
    ) -> Vec<BookingRecord> {
        self.ledger.list_by_provider(provider_id, status_filter)
    }

    /// All slots a provider has published, ordered by start instant.
    pub fn list_provider_slots(&self, provider_id: &ProviderId) -> Vec<Slot> {
        self.store.list_by_provider(provider_id)
    }

    // === Student surface ===

    /// Free slots of a provider on a UTC calendar day, ordered by start.
    pub fn list_free_slots(&self, provider_id: &ProviderId, date: NaiveDate) -> Vec<Slot> {
        self.availability.free_slots_for_day(provider_id, date)
    }

    /// Dates on which a provider has at least one free slot.
    pub fn list_free_dates(&self, provider_id: &ProviderId) -> Vec<NaiveDate> {
        self.availability.free_dates_for_provider(provider_id)
    }

    /// Reserves a slot for a student. Exactly one of N concurrent calls on
    /// the same slot succeeds; the rest get
    /// [`BookingError::SlotUnavailable`].
    pub fn create_booking(
        &self,
        slot_id: SlotId,
        student_id: StudentId,
        current_occupation: String,
        discussion_topic: String,
        additional_info: Option<String>,
    ) -> Result<BookingRecord, BookingError> {
        self.ledger.create_booking(
            slot_id,
            student_id,
            current_occupation,
            discussion_topic,
            additional_info,
        )
    }

    // === Shared surface ===

    /// Records that the meeting took place.
    pub fn mark_attended(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingError> {
        self.ledger.mark_attended(booking_id)
    }

    /// Retrieves a slot by id.
    pub fn get_slot(&self, slot_id: &SlotId) -> Result<Slot, BookingError> {
        self.store.get(slot_id)
    }

    /// Retrieves a booking by id.
    pub fn get_booking(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingError> {
        self.ledger.get(booking_id)
    }

    /// The booking referencing a slot, if one exists.
    pub fn booking_for_slot(&self, slot_id: &SlotId) -> Option<BookingRecord> {
        self.ledger.booking_for_slot(slot_id)
    }

    /// Removes and returns pending status-change events for the external
    /// notification channel, oldest first.
    pub fn drain_events(&self) -> Vec<BookingEvent> {
        self.events.drain()
    }
}

impl Default for BookingEngine {
    fn default() -> Self {
        Self::new()
    }
}

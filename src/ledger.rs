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

//! Booking ledger: the only component that creates bookings and invokes
//! slot claim/release.
//!
//! Booking creation and slot claiming stand or fall together. The claim is
//! the last fallible step of [`BookingLedger::create_booking`]; once it
//! succeeds, inserting the booking record cannot fail, so a claimed slot
//! without a booking (or a booking on an unclaimed slot) is structurally
//! impossible rather than merely unlikely.
//!
//! Bookings are never deleted; cancelled ones are retained as history.

use crate::base::{BookingId, ProviderId, SlotId, StudentId};
use crate::booking::{Booking, BookingRecord, BookingStatus};
use crate::error::BookingError;
use crate::events::{BookingEvent, EventKind, EventQueue};
use crate::slot::SlotStore;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

/// Owns booking records and their status-transition history.
#[derive(Debug)]
pub struct BookingLedger {
    store: Arc<SlotStore>,
    events: Arc<EventQueue>,
    /// Bookings indexed by id.
    bookings: DashMap<BookingId, Arc<Booking>>,
    /// Exclusive slot-to-booking reference.
    by_slot: DashMap<SlotId, BookingId>,
}

impl BookingLedger {
    pub fn new(store: Arc<SlotStore>, events: Arc<EventQueue>) -> Self {
        Self {
            store,
            events,
            bookings: DashMap::new(),
            by_slot: DashMap::new(),
        }
    }

    fn emit(&self, kind: EventKind, record: &BookingRecord) {
        self.events.push(BookingEvent {
            kind,
            booking_id: record.id,
            slot_id: record.slot_id,
            provider_id: record.provider_id.clone(),
            student_id: record.student_id.clone(),
            at: Utc::now(),
        });
    }

    /// Reserves a slot for a student and writes the `Booked` record.
    ///
    /// # Errors
    ///
    /// - [`BookingError::MissingField`] - a required free-text field is
    ///   empty.
    /// - [`BookingError::SlotUnavailable`] - the claim lost a race, the slot
    ///   is already claimed, or it does not exist. The caller should
    ///   re-fetch availability, not retry the same slot.
    pub fn create_booking(
        &self,
        slot_id: SlotId,
        student_id: StudentId,
        current_occupation: String,
        discussion_topic: String,
        additional_info: Option<String>,
    ) -> Result<BookingRecord, BookingError> {
        if student_id.0.trim().is_empty() {
            return Err(BookingError::MissingField("student_id"));
        }
        if current_occupation.trim().is_empty() {
            return Err(BookingError::MissingField("current_occupation"));
        }
        if discussion_topic.trim().is_empty() {
            return Err(BookingError::MissingField("discussion_topic"));
        }

        // The claim is the arbiter. A missing slot reads the same as a lost
        // race from the student's side: the time is not available.
        let slot = self.store.try_claim(&slot_id).map_err(|err| match err {
            BookingError::SlotNotFound => BookingError::SlotUnavailable,
            other => other,
        })?;

        let booking = Arc::new(Booking::new(
            slot.id,
            slot.provider_id,
            student_id,
            current_occupation,
            discussion_topic,
            additional_info,
        ));
        let record = booking.snapshot();
        self.bookings.insert(record.id, booking);
        self.by_slot.insert(slot.id, record.id);

        log::info!("booking {} created for slot {}", record.id, record.slot_id);
        self.emit(EventKind::Created, &record);
        Ok(record)
    }

    /// Applies a provider's accept/reject decision.
    ///
    /// Idempotent-observable: retrying a decision that already landed
    /// returns [`BookingError::InvalidTransition`], never a duplicate side
    /// effect.
    ///
    /// # Errors
    ///
    /// - [`BookingError::BookingNotFound`] - no such booking.
    /// - [`BookingError::Forbidden`] - caller does not own the slot's
    ///   provider identity.
    /// - [`BookingError::InvalidTransition`] - the booking already left
    ///   `Booked`, or the target status is `Booked`.
    pub fn change_status(
        &self,
        booking_id: &BookingId,
        acting_provider: &ProviderId,
        new_status: BookingStatus,
    ) -> Result<BookingRecord, BookingError> {
        let booking = self
            .bookings
            .get(booking_id)
            .map(|b| Arc::clone(&b))
            .ok_or(BookingError::BookingNotFound)?;

        let record = booking.transition(acting_provider, new_status)?;

        match record.status {
            BookingStatus::Acknowledged => {
                log::info!("booking {} acknowledged", record.id);
                self.emit(EventKind::Acknowledged, &record);
            }
            BookingStatus::Cancelled => {
                // Audit bookkeeping on the slot; it stays claimed and is
                // never offered again.
                self.store.release(&record.slot_id)?;
                log::info!("booking {} cancelled", record.id);
                self.emit(EventKind::Cancelled, &record);
            }
            BookingStatus::Booked => unreachable!("transition never lands on Booked"),
        }

        Ok(record)
    }

    /// Records that the meeting took place. Settable once; see
    /// [`Booking::mark_attended`] for the explicit double-call behavior.
    pub fn mark_attended(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingError> {
        let booking = self
            .bookings
            .get(booking_id)
            .map(|b| Arc::clone(&b))
            .ok_or(BookingError::BookingNotFound)?;

        let record = booking.mark_attended()?;
        self.emit(EventKind::Attended, &record);
        Ok(record)
    }

    /// Retrieves a booking snapshot by id.
    pub fn get(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingError> {
        self.bookings
            .get(booking_id)
            .map(|b| b.snapshot())
            .ok_or(BookingError::BookingNotFound)
    }

    /// The booking currently referencing a slot, if any.
    pub fn booking_for_slot(&self, slot_id: &SlotId) -> Option<BookingRecord> {
        let booking_id = *self.by_slot.get(slot_id)?;
        self.bookings.get(&booking_id).map(|b| b.snapshot())
    }

    /// A provider's bookings, optionally filtered by status, ordered by
    /// creation time. Renders the "pending" vs "acknowledged" queues.
    pub fn list_by_provider(
        &self,
        provider_id: &ProviderId,
        status_filter: Option<BookingStatus>,
    ) -> Vec<BookingRecord> {
        let mut records: Vec<BookingRecord> = self
            .bookings
            .iter()
            .map(|entry| entry.value().snapshot())
            .filter(|record| &record.provider_id == provider_id)
            .filter(|record| status_filter.is_none_or(|status| record.status == status))
            .collect();
        records.sort_by_key(|record| record.created_at);
        records
    }

    /// Number of bookings ever created (cancelled ones included).
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

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

//! Booking records and their status state machine.
//!
//! Bookings follow a forward-only state machine:
//!
//! ```text
//! (new) ──student books slot──► Booked ──provider accepts──► Acknowledged
//!                                  │
//!                                  └────provider rejects───► Cancelled
//! ```
//!
//! `Acknowledged` and `Cancelled` are terminal; there is no path back to
//! `Booked`. The ledger stays append-only and auditable instead of allowing
//! re-negotiation. `attended` is an orthogonal flag, settable exactly once
//! after the status has left `Booked`.

use crate::base::{BookingId, ProviderId, SlotId, StudentId};
use crate::error::BookingError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Initial state: the slot is claimed, awaiting the provider's decision.
    Booked,
    /// Terminal: the provider accepted the request.
    Acknowledged,
    /// Terminal: the provider rejected the request.
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Acknowledged | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Booked => write!(f, "booked"),
            BookingStatus::Acknowledged => write!(f, "acknowledged"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "booked" => Ok(BookingStatus::Booked),
            "acknowledged" => Ok(BookingStatus::Acknowledged),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(BookingError::InvalidTransition),
        }
    }
}

/// Owned snapshot of a booking, safe to hand across the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    pub slot_id: SlotId,
    pub provider_id: ProviderId,
    pub student_id: StudentId,
    pub current_occupation: String,
    pub discussion_topic: String,
    pub additional_info: Option<String>,
    pub status: BookingStatus,
    pub attended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct BookingData {
    id: BookingId,
    slot_id: SlotId,
    /// Denormalized from the slot at creation; used for the ownership guard.
    provider_id: ProviderId,
    student_id: StudentId,
    current_occupation: String,
    discussion_topic: String,
    additional_info: Option<String>,
    status: BookingStatus,
    attended: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingData {
    fn snapshot(&self) -> BookingRecord {
        BookingRecord {
            id: self.id,
            slot_id: self.slot_id,
            provider_id: self.provider_id.clone(),
            student_id: self.student_id.clone(),
            current_occupation: self.current_occupation.clone(),
            discussion_topic: self.discussion_topic.clone(),
            additional_info: self.additional_info.clone(),
            status: self.status,
            attended: self.attended,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A student's reservation against a claimed slot.
///
/// Interior state sits behind a mutex so that concurrent accept/reject calls
/// serialize: the first one wins, every later one observes a terminal status
/// and gets [`BookingError::InvalidTransition`]. Never a lost update, never
/// a silent duplicate side effect.
#[derive(Debug)]
pub struct Booking {
    inner: Mutex<BookingData>,
}

impl Booking {
    pub fn new(
        slot_id: SlotId,
        provider_id: ProviderId,
        student_id: StudentId,
        current_occupation: String,
        discussion_topic: String,
        additional_info: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            inner: Mutex::new(BookingData {
                id: BookingId::generate(),
                slot_id,
                provider_id,
                student_id,
                current_occupation,
                discussion_topic,
                additional_info,
                status: BookingStatus::Booked,
                attended: false,
                created_at: now,
                updated_at: now,
            }),
        }
    }

    pub fn id(&self) -> BookingId {
        self.inner.lock().id
    }

    pub fn slot_id(&self) -> SlotId {
        self.inner.lock().slot_id
    }

    pub fn provider_id(&self) -> ProviderId {
        self.inner.lock().provider_id.clone()
    }

    pub fn status(&self) -> BookingStatus {
        self.inner.lock().status
    }

    pub fn attended(&self) -> bool {
        self.inner.lock().attended
    }

    pub fn snapshot(&self) -> BookingRecord {
        self.inner.lock().snapshot()
    }

    /// Applies a provider decision to a pending booking.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] - caller is not the slot's provider.
    /// - [`BookingError::InvalidTransition`] - target status is `Booked`
    ///   (no path back), or the booking already left `Booked` (retries of a
    ///   decision that already landed surface here).
    pub fn transition(
        &self,
        acting_provider: &ProviderId,
        new_status: BookingStatus,
    ) -> Result<BookingRecord, BookingError> {
        let mut data = self.inner.lock();
        if &data.provider_id != acting_provider {
            return Err(BookingError::Forbidden);
        }
        if new_status == BookingStatus::Booked {
            return Err(BookingError::InvalidTransition);
        }
        if data.status != BookingStatus::Booked {
            return Err(BookingError::InvalidTransition);
        }
        data.status = new_status;
        data.updated_at = Utc::now();
        Ok(data.snapshot())
    }

    /// Records that the meeting took place.
    ///
    /// # Errors
    ///
    /// - [`BookingError::BookingStillPending`] - status is still `Booked`.
    /// - [`BookingError::AttendanceAlreadyRecorded`] - already set; the
    ///   second call is an explicit error rather than a silent no-op.
    pub fn mark_attended(&self) -> Result<BookingRecord, BookingError> {
        let mut data = self.inner.lock();
        if data.status == BookingStatus::Booked {
            return Err(BookingError::BookingStillPending);
        }
        if data.attended {
            return Err(BookingError::AttendanceAlreadyRecorded);
        }
        data.attended = true;
        data.updated_at = Utc::now();
        Ok(data.snapshot())
    }
}

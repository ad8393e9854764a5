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

//! Status-change events for the external notification channel.
//!
//! The engine only emits; delivery (email, in-app banner) is the consumer's
//! concern. Events are queued lock-free in emission order and drained by
//! whatever delivery loop the embedding service runs.

use crate::base::{BookingId, ProviderId, SlotId, StudentId};
use chrono::{DateTime, Utc};
use crossbeam::queue::SegQueue;
use serde::Serialize;

/// What happened to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A student reserved a slot.
    Created,
    /// The provider accepted the request.
    Acknowledged,
    /// The provider rejected the request.
    Cancelled,
    /// The meeting was recorded as having taken place.
    Attended,
}

/// A single status-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingEvent {
    pub kind: EventKind,
    pub booking_id: BookingId,
    pub slot_id: SlotId,
    pub provider_id: ProviderId,
    pub student_id: StudentId,
    pub at: DateTime<Utc>,
}

/// Lock-free FIFO of booking events awaiting delivery.
#[derive(Debug)]
pub struct EventQueue {
    events: SegQueue<BookingEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: SegQueue::new(),
        }
    }

    /// Enqueues an event in emission order.
    pub fn push(&self, event: BookingEvent) {
        self.events.push(event);
    }

    /// Removes and returns all queued events, oldest first.
    pub fn drain(&self) -> Vec<BookingEvent> {
        let mut drained = Vec::with_capacity(self.events.len());
        while let Some(event) = self.events.pop() {
            drained.push(event);
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(kind: EventKind) -> BookingEvent {
        BookingEvent {
            kind,
            booking_id: BookingId::generate(),
            slot_id: SlotId::generate(),
            provider_id: ProviderId::new("mentor-1"),
            student_id: StudentId::new("student-1"),
            at: Utc::now(),
        }
    }

    #[test]
    fn drain_preserves_emission_order() {
        let queue = EventQueue::new();
        queue.push(make_event(EventKind::Created));
        queue.push(make_event(EventKind::Acknowledged));
        queue.push(make_event(EventKind::Attended));

        let drained = queue.drain();
        let kinds: Vec<_> = drained.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Created, EventKind::Acknowledged, EventKind::Attended]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_on_empty_queue() {
        let queue = EventQueue::new();
        assert!(queue.drain().is_empty());
        assert_eq!(queue.len(), 0);
    }
}

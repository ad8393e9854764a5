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

//! Booking ledger tests: claim/record coupling and the no-orphan invariant.

use chrono::{DateTime, TimeZone, Utc};
use slotbook_rs::{
    BookingError, BookingLedger, BookingStatus, EventQueue, ProviderId, ProviderKind, Slot,
    SlotStore, StudentId,
};
use std::sync::Arc;

fn setup() -> (Arc<SlotStore>, BookingLedger) {
    let store = Arc::new(SlotStore::new());
    let events = Arc::new(EventQueue::new());
    let ledger = BookingLedger::new(Arc::clone(&store), events);
    (store, ledger)
}

fn mentor() -> ProviderId {
    ProviderId::new("mentor-1")
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
}

fn publish(store: &SlotStore, hour: u32) -> Slot {
    store
        .publish(mentor(), ProviderKind::Mentor, at(hour), at(hour + 1))
        .unwrap()
}

/// Claimed slot implies exactly one booking referencing it, and vice versa.
fn assert_no_orphans(store: &SlotStore, ledger: &BookingLedger) {
    for slot in store.list_by_provider(&mentor()) {
        let booking = ledger.booking_for_slot(&slot.id);
        if slot.claimed {
            let booking = booking.expect("claimed slot must have a booking");
            assert_eq!(booking.slot_id, slot.id);
        } else {
            assert!(booking.is_none(), "unclaimed slot must have no booking");
        }
    }
}

#[test]
fn create_booking_claims_and_records_together() {
    let (store, ledger) = setup();
    let slot = publish(&store, 9);

    let record = ledger
        .create_booking(
            slot.id,
            StudentId::new("student-7"),
            "Undergraduate".to_string(),
            "career advice".to_string(),
            Some("CV review".to_string()),
        )
        .unwrap();

    assert_eq!(record.slot_id, slot.id);
    assert_eq!(record.provider_id, mentor());
    assert_eq!(record.student_id, StudentId::new("student-7"));
    assert_eq!(record.current_occupation, "Undergraduate");
    assert_eq!(record.discussion_topic, "career advice");
    assert_eq!(record.additional_info.as_deref(), Some("CV review"));
    assert_eq!(record.status, BookingStatus::Booked);
    assert!(!record.attended);

    assert!(store.get(&slot.id).unwrap().claimed);
    assert_no_orphans(&store, &ledger);
}

#[test]
fn failed_validation_leaves_no_claim() {
    let (store, ledger) = setup();
    let slot = publish(&store, 9);

    let result = ledger.create_booking(
        slot.id,
        StudentId::new(""),
        "Undergraduate".to_string(),
        "career advice".to_string(),
        None,
    );
    assert_eq!(result, Err(BookingError::MissingField("student_id")));

    assert!(!store.get(&slot.id).unwrap().claimed);
    assert!(ledger.is_empty());
    assert_no_orphans(&store, &ledger);
}

#[test]
fn lost_claim_leaves_no_record() {
    let (store, ledger) = setup();
    let slot = publish(&store, 9);

    ledger
        .create_booking(
            slot.id,
            StudentId::new("student-7"),
            "Undergraduate".to_string(),
            "career advice".to_string(),
            None,
        )
        .unwrap();

    let result = ledger.create_booking(
        slot.id,
        StudentId::new("student-8"),
        "Postgraduate".to_string(),
        "scholarships".to_string(),
        None,
    );
    assert_eq!(result, Err(BookingError::SlotUnavailable));

    assert_eq!(ledger.len(), 1);
    assert_no_orphans(&store, &ledger);
}

#[test]
fn cancellation_keeps_booking_and_slot_paired() {
    let (store, ledger) = setup();
    let slot = publish(&store, 9);

    let record = ledger
        .create_booking(
            slot.id,
            StudentId::new("student-7"),
            "Undergraduate".to_string(),
            "career advice".to_string(),
            None,
        )
        .unwrap();

    ledger
        .change_status(&record.id, &mentor(), BookingStatus::Cancelled)
        .unwrap();

    // Cancelled bookings are retained as history, and the slot stays
    // claimed; the pairing survives for audit.
    let slot = store.get(&slot.id).unwrap();
    assert!(slot.claimed);
    assert!(slot.released);
    assert_eq!(
        ledger.get(&record.id).unwrap().status,
        BookingStatus::Cancelled
    );
    assert_no_orphans(&store, &ledger);
}

#[test]
fn mark_attended_twice_is_an_explicit_error() {
    let (store, ledger) = setup();
    let slot = publish(&store, 9);

    let record = ledger
        .create_booking(
            slot.id,
            StudentId::new("student-7"),
            "Undergraduate".to_string(),
            "career advice".to_string(),
            None,
        )
        .unwrap();

    // Attendance needs a decision first.
    assert_eq!(
        ledger.mark_attended(&record.id),
        Err(BookingError::BookingStillPending)
    );

    ledger
        .change_status(&record.id, &mentor(), BookingStatus::Acknowledged)
        .unwrap();
    assert!(ledger.mark_attended(&record.id).unwrap().attended);
    assert_eq!(
        ledger.mark_attended(&record.id),
        Err(BookingError::AttendanceAlreadyRecorded)
    );
}

#[test]
fn list_by_provider_orders_by_creation() {
    let (store, ledger) = setup();
    let first = publish(&store, 9);
    let second = publish(&store, 11);

    let b1 = ledger
        .create_booking(
            first.id,
            StudentId::new("student-1"),
            "Undergraduate".to_string(),
            "career advice".to_string(),
            None,
        )
        .unwrap();
    let b2 = ledger
        .create_booking(
            second.id,
            StudentId::new("student-2"),
            "Undergraduate".to_string(),
            "internships".to_string(),
            None,
        )
        .unwrap();

    let all = ledger.list_by_provider(&mentor(), None);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, b1.id);
    assert_eq!(all[1].id, b2.id);

    let cancelled = ledger.list_by_provider(&mentor(), Some(BookingStatus::Cancelled));
    assert!(cancelled.is_empty());
}

#[test]
fn bookings_survive_status_changes_as_history() {
    let (store, ledger) = setup();
    let slot = publish(&store, 9);

    let record = ledger
        .create_booking(
            slot.id,
            StudentId::new("student-7"),
            "Undergraduate".to_string(),
            "career advice".to_string(),
            None,
        )
        .unwrap();
    ledger
        .change_status(&record.id, &mentor(), BookingStatus::Cancelled)
        .unwrap();

    // Nothing is ever deleted.
    assert_eq!(ledger.len(), 1);
    let stored = ledger.get(&record.id).unwrap();
    assert_eq!(stored.id, record.id);
    assert_eq!(stored.discussion_topic, "career advice");
}

#[test]
fn change_status_on_unknown_booking() {
    let (_store, ledger) = setup();
    let result = ledger.change_status(
        &slotbook_rs::BookingId::generate(),
        &mentor(),
        BookingStatus::Acknowledged,
    );
    assert_eq!(result, Err(BookingError::BookingNotFound));
}

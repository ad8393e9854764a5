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

//! # Slotbook
//!
//! This library provides a meeting booking engine for a mentoring portal:
//! providers (mentors and student ambassadors) publish time slots, students
//! reserve them, and providers accept or reject the requests. Two students
//! can never secure the same slot, and a provider's decision lands exactly
//! once.
//!
//! ## Core Components
//!
//! - [`BookingEngine`]: Query facade composing all components
//! - [`SlotStore`]: Published time windows and the claim flag
//! - [`BookingLedger`]: Booking records and status transitions
//! - [`AvailabilityIndex`]: "What is free on date X" projection
//! - [`BookingError`]: Typed, caller-facing failure outcomes
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use slotbook_rs::{BookingEngine, BookingStatus, ProviderId, ProviderKind, StudentId};
//!
//! let engine = BookingEngine::new();
//! let mentor = ProviderId::new("mentor-1");
//!
//! // Provider publishes a slot.
//! let slot = engine
//!     .publish_slot(
//!         mentor.clone(),
//!         ProviderKind::Mentor,
//!         Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap(),
//!     )
//!     .unwrap();
//!
//! // Student reserves it.
//! let booking = engine
//!     .create_booking(
//!         slot.id,
//!         StudentId::new("student-7"),
//!         "Undergraduate".to_string(),
//!         "career advice".to_string(),
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(booking.status, BookingStatus::Booked);
//!
//! // Provider accepts.
//! let accepted = engine
//!     .change_booking_status(&booking.id, &mentor, BookingStatus::Acknowledged)
//!     .unwrap();
//! assert_eq!(accepted.status, BookingStatus::Acknowledged);
//! ```
//!
//! ## Thread Safety
//!
//! The engine handles concurrent access throughout: slot claims are atomic
//! compare-and-set operations under a per-provider lock, and booking status
//! changes serialize per booking, so races resolve to exactly one winner.

pub mod availability;
mod base;
pub mod booking;
mod engine;
pub mod error;
pub mod events;
mod ledger;
pub mod slot;

pub use availability::AvailabilityIndex;
pub use base::{BookingId, ProviderId, ProviderKind, SlotId, StudentId};
pub use booking::{Booking, BookingRecord, BookingStatus};
pub use engine::BookingEngine;
pub use error::BookingError;
pub use events::{BookingEvent, EventKind, EventQueue};
pub use ledger::BookingLedger;
pub use slot::{Slot, SlotStore};

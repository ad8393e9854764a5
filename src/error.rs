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

//! Error types for slot publishing and booking operations.
//!
//! Every failure is a terminal, caller-facing outcome. The engine never
//! retries internally: a lost claim race stays lost, and the caller is
//! expected to re-fetch availability rather than re-submit the same slot.

use thiserror::Error;

/// Booking engine errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Slot window is malformed (start must precede end)
    #[error("invalid time window (start must be before end)")]
    InvalidWindow,

    /// A required free-text field was left empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// New slot collides with an existing slot of the same provider
    #[error("slot overlaps an existing slot for this provider")]
    SlotOverlap,

    /// Claim attempt lost the race, or the target slot cannot be claimed
    #[error("this time is no longer available")]
    SlotUnavailable,

    /// Status change attempted on a booking that is no longer pending
    #[error("this request was already handled")]
    InvalidTransition,

    /// Attendance can only be recorded once the provider has acted
    #[error("attendance cannot be recorded for a pending booking")]
    BookingStillPending,

    /// Attendance was already recorded for this booking
    #[error("attendance already recorded")]
    AttendanceAlreadyRecorded,

    /// Caller is not the provider who owns the slot
    #[error("caller is not the provider for this booking")]
    Forbidden,

    /// Referenced slot does not exist
    #[error("slot not found")]
    SlotNotFound,

    /// Referenced booking does not exist
    #[error("booking not found")]
    BookingNotFound,
}

#[cfg(test)]
mod tests {
    use super::BookingError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            BookingError::InvalidWindow.to_string(),
            "invalid time window (start must be before end)"
        );
        assert_eq!(
            BookingError::MissingField("discussion_topic").to_string(),
            "missing required field: discussion_topic"
        );
        assert_eq!(
            BookingError::SlotOverlap.to_string(),
            "slot overlaps an existing slot for this provider"
        );
        assert_eq!(
            BookingError::SlotUnavailable.to_string(),
            "this time is no longer available"
        );
        assert_eq!(
            BookingError::InvalidTransition.to_string(),
            "this request was already handled"
        );
        assert_eq!(
            BookingError::BookingStillPending.to_string(),
            "attendance cannot be recorded for a pending booking"
        );
        assert_eq!(
            BookingError::AttendanceAlreadyRecorded.to_string(),
            "attendance already recorded"
        );
        assert_eq!(
            BookingError::Forbidden.to_string(),
            "caller is not the provider for this booking"
        );
        assert_eq!(BookingError::SlotNotFound.to_string(), "slot not found");
        assert_eq!(BookingError::BookingNotFound.to_string(), "booking not found");
    }

    #[test]
    fn errors_are_cloneable() {
        let error = BookingError::SlotUnavailable;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}

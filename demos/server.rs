//! Simple REST API server example for the booking engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /slots` - Publish a slot
//! - `GET /providers/{id}/free-dates` - Dates with availability
//! - `GET /providers/{id}/free-slots?date=YYYY-MM-DD` - Free slots on a day
//! - `GET /providers/{id}/bookings?status=...` - A provider's bookings
//! - `POST /bookings` - Book a slot
//! - `POST /bookings/{id}/status` - Accept or reject a booking
//! - `POST /bookings/{id}/attended` - Record attendance
//!
//! ## Example Usage
//!
//! ```bash
//! # Publish a slot
//! curl -X POST http://localhost:3000/slots \
//!   -H "Content-Type: application/json" \
//!   -d '{"provider_id": "mentor-1", "provider_kind": "mentor", "start": "2025-03-10T09:00:00Z", "end": "2025-03-10T09:30:00Z"}'
//!
//! # Book it
//! curl -X POST http://localhost:3000/bookings \
//!   -H "Content-Type: application/json" \
//!   -d '{"slot_id": "<uuid>", "student_id": "student-7", "current_occupation": "Undergraduate", "discussion_topic": "career advice"}'
//!
//! # Accept the booking
//! curl -X POST http://localhost:3000/bookings/<uuid>/status \
//!   -H "Content-Type: application/json" \
//!   -d '{"acting_provider_id": "mentor-1", "status": "acknowledged"}'
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotbook_rs::{
    BookingEngine, BookingError, BookingId, BookingRecord, BookingStatus, ProviderId,
    ProviderKind, Slot, SlotId, StudentId,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

// === Request/Response DTOs ===

/// Request body for publishing a slot.
#[derive(Debug, Deserialize)]
pub struct PublishSlotRequest {
    pub provider_id: String,
    pub provider_kind: ProviderKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Request body for booking a slot.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub slot_id: Uuid,
    pub student_id: String,
    pub current_occupation: String,
    pub discussion_topic: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Request body for the provider's accept/reject decision.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub acting_provider_id: String,
    pub status: BookingStatus,
}

/// Query string for the free-slot listing.
#[derive(Debug, Deserialize)]
pub struct FreeSlotsQuery {
    pub date: NaiveDate,
}

/// Query string for the booking listing.
#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub status: Option<BookingStatus>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the booking engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
}

// === Error Handling ===

/// Wrapper for converting `BookingError` into HTTP responses.
pub struct AppError(BookingError);

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            BookingError::InvalidWindow => (StatusCode::BAD_REQUEST, "INVALID_WINDOW"),
            BookingError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            BookingError::SlotOverlap => (StatusCode::CONFLICT, "SLOT_OVERLAP"),
            BookingError::SlotUnavailable => (StatusCode::CONFLICT, "SLOT_UNAVAILABLE"),
            BookingError::InvalidTransition => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            BookingError::BookingStillPending => (StatusCode::CONFLICT, "BOOKING_STILL_PENDING"),
            BookingError::AttendanceAlreadyRecorded => {
                (StatusCode::CONFLICT, "ATTENDANCE_ALREADY_RECORDED")
            }
            BookingError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            BookingError::SlotNotFound => (StatusCode::NOT_FOUND, "SLOT_NOT_FOUND"),
            BookingError::BookingNotFound => (StatusCode::NOT_FOUND, "BOOKING_NOT_FOUND"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /slots - Publish a new slot.
async fn publish_slot(
    State(state): State<AppState>,
    Json(request): Json<PublishSlotRequest>,
) -> Result<(StatusCode, Json<Slot>), AppError> {
    let slot = state.engine.publish_slot(
        ProviderId::new(request.provider_id),
        request.provider_kind,
        request.start,
        request.end,
    )?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// GET /providers/{id}/free-dates - Dates with at least one free slot.
async fn list_free_dates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<NaiveDate>> {
    Json(state.engine.list_free_dates(&ProviderId::new(id)))
}

/// GET /providers/{id}/free-slots?date=YYYY-MM-DD - Free slots on a day.
async fn list_free_slots(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FreeSlotsQuery>,
) -> Json<Vec<Slot>> {
    Json(state.engine.list_free_slots(&ProviderId::new(id), query.date))
}

/// GET /providers/{id}/bookings?status=... - A provider's booking queue.
async fn list_provider_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<BookingsQuery>,
) -> Json<Vec<BookingRecord>> {
    Json(
        state
            .engine
            .list_provider_bookings(&ProviderId::new(id), query.status),
    )
}

/// POST /bookings - Book a slot for a student.
async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingRecord>), AppError> {
    let record = state.engine.create_booking(
        SlotId(request.slot_id),
        StudentId::new(request.student_id),
        request.current_occupation,
        request.discussion_topic,
        request.additional_info,
    )?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /bookings/{id}/status - Apply the provider's decision.
async fn change_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<BookingRecord>, AppError> {
    let record = state.engine.change_booking_status(
        &BookingId(id),
        &ProviderId::new(request.acting_provider_id),
        request.status,
    )?;
    Ok(Json(record))
}

/// POST /bookings/{id}/attended - Record that the meeting happened.
async fn mark_attended(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingRecord>, AppError> {
    let record = state.engine.mark_attended(&BookingId(id))?;
    Ok(Json(record))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/slots", post(publish_slot))
        .route("/providers/{id}/free-dates", get(list_free_dates))
        .route("/providers/{id}/free-slots", get(list_free_slots))
        .route("/providers/{id}/bookings", get(list_provider_bookings))
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}/status", post(change_booking_status))
        .route("/bookings/{id}/attended", post(mark_attended))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    let state = AppState {
        engine: Arc::new(BookingEngine::new()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Booking API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /slots                          - Publish a slot");
    println!("  GET  /providers/:id/free-dates       - Dates with availability");
    println!("  GET  /providers/:id/free-slots?date= - Free slots on a day");
    println!("  GET  /providers/:id/bookings         - Provider booking queue");
    println!("  POST /bookings                       - Book a slot");
    println!("  POST /bookings/:id/status            - Accept/reject a booking");
    println!("  POST /bookings/:id/attended          - Record attendance");

    axum::serve(listener, app).await.unwrap();
}

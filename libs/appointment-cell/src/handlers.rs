// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State, Extension},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::DoctorRegistry;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{require_role, require_self_or_admin, ApiJson};

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingResponse, CompleteAppointmentRequest,
    LifecycleResponse,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::ledger::AppointmentLedger;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::visibility::VisibilityGateway;
use crate::state::AppointmentState;

/// Booking failures are all client errors; a taken slot is a conflict.
fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound(e.to_string()),
        AppointmentError::SlotUnavailable { .. }
        | AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(e.to_string()),
        AppointmentError::ProfileNotFound(_)
        | AppointmentError::DoctorNotFound(_)
        | AppointmentError::DoctorNotVerified(_)
        | AppointmentError::InvalidDate(_)
        | AppointmentError::InvalidTime(_) => AppError::BadRequest(e.to_string()),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Doctors may only act on their own schedule; admins on any.
async fn require_doctor_owns(state: &AppointmentState, user: &User, doctor_id: Uuid) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }

    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;

    let own = state.doctors
        .find_by_user(user_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    match own {
        Some(doctor) if doctor.id == doctor_id => Ok(()),
        _ => Err(AppError::Forbidden("Not authorized to manage another doctor's appointments".to_string())),
    }
}

async fn authorize_lifecycle(state: &AppointmentState, user: &User, appointment_id: Uuid) -> Result<(), AppError> {
    require_role(user, &[Role::Doctor, Role::Admin])?;

    if user.is_admin() {
        return Ok(());
    }

    let appointment = state.ledger
        .get(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    require_doctor_owns(state, user, appointment.doctor_id).await
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<BookAppointmentRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    // Patients book for themselves; admins may book on anyone's behalf
    require_self_or_admin(&user, &request.patient_id.to_string())?;

    let appointment = AppointmentBookingService::new(&state)
        .book(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(BookingResponse {
        success: true,
        message: "Appointment booked successfully!".to_string(),
        appointment_id: appointment.id,
        status: appointment.status,
    }))
}

// ==============================================================================
// ROLE-SCOPED LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppointmentState>>,
    Path(user_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_self_or_admin(&user, &user_id.to_string())?;

    let views = VisibilityGateway::new(&state)
        .for_patient_account(user_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(views)))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppointmentState>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Doctor, Role::Admin])?;
    require_doctor_owns(&state, &user, doctor_id).await?;

    let views = VisibilityGateway::new(&state)
        .for_doctor(doctor_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(views)))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments_by_user(
    State(state): State<Arc<AppointmentState>>,
    Path(user_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_self_or_admin(&user, &user_id.to_string())?;

    let views = VisibilityGateway::new(&state)
        .for_doctor_account(user_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(views)))
}

#[axum::debug_handler]
pub async fn get_all_appointments(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let appointments = VisibilityGateway::new(&state)
        .all()
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment_stats(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let stats = VisibilityGateway::new(&state)
        .stats()
        .await
        .map_err(map_appointment_error)?;

    let mut body = json!(stats);
    body["notifications"] = json!(state.notifications.stats().snapshot());

    Ok(Json(body))
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<LifecycleResponse>, AppError> {
    authorize_lifecycle(&state, &user, appointment_id).await?;

    let appointment = AppointmentLifecycleService::new(&state)
        .confirm(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(LifecycleResponse {
        message: "Appointment confirmed!".to_string(),
        status: appointment.status,
    }))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<LifecycleResponse>, AppError> {
    authorize_lifecycle(&state, &user, appointment_id).await?;

    let appointment = AppointmentLifecycleService::new(&state)
        .cancel(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(LifecycleResponse {
        message: "Appointment cancelled!".to_string(),
        status: appointment.status,
    }))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<CompleteAppointmentRequest>,
) -> Result<Json<LifecycleResponse>, AppError> {
    authorize_lifecycle(&state, &user, appointment_id).await?;

    let appointment = AppointmentLifecycleService::new(&state)
        .complete(appointment_id, request.prescription)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(LifecycleResponse {
        message: "Appointment completed!".to_string(),
        status: appointment.status,
    }))
}

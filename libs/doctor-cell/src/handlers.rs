use std::sync::Arc;

use axum::{
    extract::{Path, State, Extension},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{require_role, require_self_or_admin};

use crate::models::DoctorError;
use crate::services::verification::DoctorVerificationService;
use crate::state::DoctorState;

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::AlreadyExists(_) => AppError::Conflict(e.to_string()),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn service(state: &DoctorState) -> DoctorVerificationService {
    DoctorVerificationService::new(Arc::clone(&state.doctors))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn verify_doctor(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let doctor = service(&state).verify(doctor_id).await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "message": "Doctor verified successfully!",
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn get_pending_doctors(
    State(state): State<Arc<DoctorState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let doctors = service(&state).pending().await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor_stats(
    State(state): State<Arc<DoctorState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let stats = service(&state).stats().await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(stats)))
}

// ==============================================================================
// DIRECTORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_all_doctors(
    State(state): State<Arc<DoctorState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = service(&state).directory().await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctors_by_specialization(
    State(state): State<Arc<DoctorState>>,
    Path(specialization): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctors = service(&state).by_specialization(&specialization).await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_verified_doctors(
    State(state): State<Arc<DoctorState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = service(&state).verified().await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = service(&state).get(doctor_id).await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor_by_user(
    State(state): State<Arc<DoctorState>>,
    Path(user_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_self_or_admin(&user, &user_id.to_string())?;

    let doctor = service(&state).get_by_user(user_id).await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

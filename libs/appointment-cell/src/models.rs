// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate, NaiveTime};
use std::fmt;

use doctor_cell::DoctorError;
use patient_cell::PatientError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Stored appointment record. `patient_id` and `doctor_id` are profile ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub notes: String,
    pub prescription: Option<String>,
    pub fee: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Date and time are both known, so the appointment occupies a doctor slot.
    pub fn slot(&self) -> Option<(NaiveDate, NaiveTime)> {
        Some((self.appointment_date?, self.appointment_time?))
    }

    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// Fields supplied by the booking engine; the ledger assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: String,
    pub fee: Option<f64>,
}

impl NewAppointment {
    pub fn into_appointment(self, id: Uuid, created_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            status: self.status,
            reason: self.reason,
            notes: self.notes,
            prescription: None,
            fee: self.fee,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }

    /// Target status of `op` applied to `self`, or why it is not allowed.
    pub fn transition(self, op: LifecycleOp, rules: &LifecycleRules) -> Result<AppointmentStatus, AppointmentError> {
        use AppointmentStatus::*;

        let next = match (self, op) {
            (Pending, LifecycleOp::Confirm) => Some(Confirmed),
            (Pending | Confirmed, LifecycleOp::Cancel) => Some(Cancelled),
            (Confirmed, LifecycleOp::Complete) => Some(Completed),
            (Pending, LifecycleOp::Complete) if !rules.require_confirmation_before_completion => Some(Completed),
            _ => None,
        };

        next.ok_or(AppointmentError::InvalidStatusTransition { from: self, op })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleOp {
    Confirm,
    Cancel,
    Complete,
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleOp::Confirm => write!(f, "confirm"),
            LifecycleOp::Cancel => write!(f, "cancel"),
            LifecycleOp::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleRules {
    pub require_confirmation_before_completion: bool,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// `patient_id` is the patient's account id, not the profile id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    #[serde(default)]
    pub prescription: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifecycleResponse {
    pub message: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    pub total_appointments: usize,
    pub pending_appointments: usize,
    pub confirmed_appointments: usize,
    pub cancelled_appointments: usize,
    pub completed_appointments: usize,
}

impl AppointmentStats {
    pub fn record(&mut self, status: AppointmentStatus, count: usize) {
        match status {
            AppointmentStatus::Pending => self.pending_appointments = count,
            AppointmentStatus::Confirmed => self.confirmed_appointments = count,
            AppointmentStatus::Cancelled => self.cancelled_appointments = count,
            AppointmentStatus::Completed => self.completed_appointments = count,
        }
        self.total_appointments = self.pending_appointments
            + self.confirmed_appointments
            + self.cancelled_appointments
            + self.completed_appointments;
    }
}

// ==============================================================================
// ROLE-SCOPED PROJECTIONS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ContactSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Counterpart shown to the viewer. Serializes as `{}` when the profile is missing.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CounterpartSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ContactSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: Uuid,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: String,
    pub fee: Option<f64>,
    pub prescription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<CounterpartSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<CounterpartSummary>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient profile not found for user ID: {0}")]
    ProfileNotFound(Uuid),

    #[error("Doctor not found: {0}")]
    DoctorNotFound(Uuid),

    #[error("Doctor {0} is not verified")]
    DoctorNotVerified(Uuid),

    #[error("Invalid appointment date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid appointment time '{0}', expected HH:MM or HH:MM:SS")]
    InvalidTime(String),

    #[error("Doctor already has an appointment on {date} at {time}")]
    SlotUnavailable { date: NaiveDate, time: NaiveTime },

    #[error("Cannot {op} an appointment that is {from}")]
    InvalidStatusTransition { from: AppointmentStatus, op: LifecycleOp },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PatientError> for AppointmentError {
    fn from(e: PatientError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(e: DoctorError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::DoctorRegistry;
use notification_cell::{Notification, NotificationDispatcher, NotificationKind};
use patient_cell::PatientRegistry;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, NewAppointment,
};
use crate::services::ledger::AppointmentLedger;
use crate::services::locks::KeyedLocks;
use crate::state::AppointmentState;

pub struct AppointmentBookingService {
    ledger: Arc<dyn AppointmentLedger>,
    patients: Arc<dyn PatientRegistry>,
    doctors: Arc<dyn DoctorRegistry>,
    notifications: NotificationDispatcher,
    slot_locks: Arc<KeyedLocks>,
    require_verified_doctor: bool,
}

impl AppointmentBookingService {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            ledger: Arc::clone(&state.ledger),
            patients: Arc::clone(&state.patients),
            doctors: Arc::clone(&state.doctors),
            notifications: state.notifications.clone(),
            slot_locks: Arc::clone(&state.slot_locks),
            require_verified_doctor: state.config.booking_require_verified_doctor,
        }
    }

    /// Books a PENDING appointment for the patient account in `request.patient_id`.
    pub async fn book(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment for user {} with doctor {}", request.patient_id, request.doctor_id);

        let patient = self.patients
            .find_by_user(request.patient_id)
            .await?
            .ok_or(AppointmentError::ProfileNotFound(request.patient_id))?;

        let doctor = self.doctors
            .get(request.doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound(request.doctor_id))?;

        if self.require_verified_doctor && !doctor.verified {
            warn!("Rejected booking with unverified doctor {}", doctor.id);
            return Err(AppointmentError::DoctorNotVerified(doctor.id));
        }

        let date = parse_date(request.appointment_date.as_deref())?;
        let time = parse_time(request.appointment_time.as_deref())?;

        let new_appointment = NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            appointment_date: date,
            appointment_time: time,
            status: AppointmentStatus::Pending,
            reason: request.reason.unwrap_or_default(),
            notes: request.notes.unwrap_or_default(),
            fee: doctor.consultation_fee,
        };

        let appointment = match (date, time) {
            (Some(date), Some(time)) => {
                let _guard = self.slot_locks.acquire(doctor.id).await;
                self.ensure_slot_free(doctor.id, date, time).await?;
                self.ledger.create(new_appointment).await?
            }
            _ => {
                debug!("Booking without a full slot, skipping collision check");
                self.ledger.create(new_appointment).await?
            }
        };

        self.notifications.dispatch(Notification::new(
            &patient.email,
            &patient.name,
            &doctor.name,
            NotificationKind::Booked {
                date: appointment.appointment_date,
                time: appointment.appointment_time,
            },
        ));

        info!("Appointment {} booked successfully with doctor {}", appointment.id, doctor.id);
        Ok(appointment)
    }

    async fn ensure_slot_free(&self, doctor_id: Uuid, date: NaiveDate, time: NaiveTime) -> Result<(), AppointmentError> {
        let taken = self.ledger
            .list_active_for_doctor_on(doctor_id, date)
            .await?
            .iter()
            .any(|a| a.appointment_time == Some(time));

        if taken {
            warn!("Appointment conflict detected for doctor {} at {} {}", doctor_id, date, time);
            return Err(AppointmentError::SlotUnavailable { date, time });
        }

        Ok(())
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// ISO calendar date. Blank input means no date.
pub fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppointmentError> {
    non_blank(raw)
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| AppointmentError::InvalidDate(s.to_string()))
        })
        .transpose()
}

/// 24-hour `HH:MM:SS`, `HH:MM` or a bare hour `HH`; all yield the same time of day.
pub fn parse_time(raw: Option<&str>) -> Result<Option<NaiveTime>, AppointmentError> {
    non_blank(raw)
        .map(|s| {
            NaiveTime::parse_from_str(s, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                .or_else(|e| match s.parse::<u32>() {
                    Ok(hour) => NaiveTime::from_hms_opt(hour, 0, 0).ok_or(e),
                    Err(_) => Err(e),
                })
                .map_err(|_| AppointmentError::InvalidTime(s.to_string()))
        })
        .transpose()
}

// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::DoctorRegistry;
use notification_cell::{Notification, NotificationDispatcher, NotificationKind};
use patient_cell::PatientRegistry;

use crate::models::{Appointment, AppointmentError, LifecycleOp, LifecycleRules};
use crate::services::ledger::AppointmentLedger;
use crate::services::locks::KeyedLocks;
use crate::state::AppointmentState;

/// Applies confirm / cancel / complete and notifies the patient afterwards.
pub struct AppointmentLifecycleService {
    ledger: Arc<dyn AppointmentLedger>,
    patients: Arc<dyn PatientRegistry>,
    doctors: Arc<dyn DoctorRegistry>,
    notifications: NotificationDispatcher,
    record_locks: Arc<KeyedLocks>,
    rules: LifecycleRules,
}

impl AppointmentLifecycleService {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            ledger: Arc::clone(&state.ledger),
            patients: Arc::clone(&state.patients),
            doctors: Arc::clone(&state.doctors),
            notifications: state.notifications.clone(),
            record_locks: Arc::clone(&state.record_locks),
            rules: state.lifecycle_rules(),
        }
    }

    pub async fn confirm(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.apply(appointment_id, LifecycleOp::Confirm, None).await
    }

    pub async fn cancel(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.apply(appointment_id, LifecycleOp::Cancel, None).await
    }

    /// `prescription` is stored only when given; an absent one leaves the field empty.
    pub async fn complete(&self, appointment_id: Uuid, prescription: Option<String>) -> Result<Appointment, AppointmentError> {
        self.apply(appointment_id, LifecycleOp::Complete, prescription).await
    }

    async fn apply(
        &self,
        appointment_id: Uuid,
        op: LifecycleOp,
        prescription: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let guard = self.record_locks.acquire(appointment_id).await;

        let mut appointment = self.ledger.get(appointment_id).await?;
        let previous = appointment.status;

        appointment.status = previous.transition(op, &self.rules).map_err(|e| {
            warn!("Invalid status transition attempted on {}: {}", appointment_id, e);
            e
        })?;

        if op == LifecycleOp::Complete {
            if let Some(prescription) = prescription {
                appointment.prescription = Some(prescription);
            }
        }

        // Another process may have moved the record since it was read
        let saved = match self.ledger.save(&appointment, previous).await? {
            Some(saved) => saved,
            None => {
                let current = self.ledger.get(appointment_id).await?;
                warn!("Appointment {} became {} before {} was applied", appointment_id, current.status, op);
                return Err(AppointmentError::InvalidStatusTransition { from: current.status, op });
            }
        };
        drop(guard);

        info!("Appointment {} moved {} -> {}", saved.id, previous, saved.status);

        self.notify_patient(&saved, op).await;
        Ok(saved)
    }

    /// Best effort: missing profiles or lookup faults only skip the message.
    async fn notify_patient(&self, appointment: &Appointment, op: LifecycleOp) {
        let patient = match self.patients.get(appointment.patient_id).await {
            Ok(Some(patient)) => patient,
            Ok(None) => {
                warn!("No patient profile {} to notify for appointment {}", appointment.patient_id, appointment.id);
                return;
            }
            Err(e) => {
                warn!("Patient lookup failed for appointment {}: {}", appointment.id, e);
                return;
            }
        };

        let doctor_name = match self.doctors.get(appointment.doctor_id).await {
            Ok(Some(doctor)) => doctor.name,
            Ok(None) | Err(_) => {
                debug!("Doctor {} unavailable for notification, using blank name", appointment.doctor_id);
                String::new()
            }
        };

        let kind = match op {
            LifecycleOp::Confirm => NotificationKind::Confirmed {
                date: appointment.appointment_date,
                time: appointment.appointment_time,
            },
            LifecycleOp::Cancel => NotificationKind::Cancelled {
                date: appointment.appointment_date,
            },
            LifecycleOp::Complete => NotificationKind::Completed {
                prescription: appointment.prescription.clone(),
            },
        };

        self.notifications.dispatch(Notification::new(&patient.email, &patient.name, &doctor_name, kind));
    }
}

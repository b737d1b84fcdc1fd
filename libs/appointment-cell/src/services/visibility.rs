// libs/appointment-cell/src/services/visibility.rs
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use doctor_cell::DoctorRegistry;
use patient_cell::PatientRegistry;

use crate::models::{
    Appointment, AppointmentError, AppointmentStats, AppointmentStatus, AppointmentView,
    ContactSummary, CounterpartSummary,
};
use crate::services::ledger::AppointmentLedger;
use crate::state::AppointmentState;

/// Whose side of the appointment a projection is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Patient,
    Doctor,
}

impl AppointmentView {
    /// Attaches the counterpart for `viewer`; the viewer's own side is never included.
    pub fn project(appointment: Appointment, viewer: Viewer, counterpart: CounterpartSummary) -> Self {
        let (doctor, patient) = match viewer {
            Viewer::Patient => (Some(counterpart), None),
            Viewer::Doctor => (None, Some(counterpart)),
        };

        Self {
            id: appointment.id,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            status: appointment.status,
            reason: appointment.reason,
            notes: appointment.notes,
            fee: appointment.fee,
            prescription: appointment.prescription,
            doctor,
            patient,
        }
    }
}

pub struct VisibilityGateway {
    ledger: Arc<dyn AppointmentLedger>,
    patients: Arc<dyn PatientRegistry>,
    doctors: Arc<dyn DoctorRegistry>,
}

impl VisibilityGateway {
    pub fn new(state: &AppointmentState) -> Self {
        Self {
            ledger: Arc::clone(&state.ledger),
            patients: Arc::clone(&state.patients),
            doctors: Arc::clone(&state.doctors),
        }
    }

    /// Appointments of the patient linked to `user_id`; empty when no profile is linked yet.
    pub async fn for_patient_account(&self, user_id: Uuid) -> Result<Vec<AppointmentView>, AppointmentError> {
        let Some(patient) = self.patients.find_by_user(user_id).await? else {
            debug!("No patient profile found for user {}", user_id);
            return Ok(Vec::new());
        };

        let appointments = self.ledger.list_by_patient(patient.id).await?;
        self.project(appointments, Viewer::Patient).await
    }

    pub async fn for_doctor(&self, doctor_id: Uuid) -> Result<Vec<AppointmentView>, AppointmentError> {
        let appointments = self.ledger.list_by_doctor(doctor_id).await?;
        self.project(appointments, Viewer::Doctor).await
    }

    pub async fn for_doctor_account(&self, user_id: Uuid) -> Result<Vec<AppointmentView>, AppointmentError> {
        let Some(doctor) = self.doctors.find_by_user(user_id).await? else {
            debug!("No doctor profile found for user {}", user_id);
            return Ok(Vec::new());
        };

        self.for_doctor(doctor.id).await
    }

    /// Admin view, unprojected.
    pub async fn all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.ledger.list_all().await
    }

    pub async fn stats(&self) -> Result<AppointmentStats, AppointmentError> {
        let mut stats = AppointmentStats::default();
        for status in AppointmentStatus::ALL {
            stats.record(status, self.ledger.count_by_status(status).await?);
        }
        Ok(stats)
    }

    async fn project(&self, appointments: Vec<Appointment>, viewer: Viewer) -> Result<Vec<AppointmentView>, AppointmentError> {
        let mut counterparts: HashMap<Uuid, CounterpartSummary> = HashMap::new();
        let mut views = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            let counterpart_id = match viewer {
                Viewer::Patient => appointment.doctor_id,
                Viewer::Doctor => appointment.patient_id,
            };

            let summary = match counterparts.get(&counterpart_id) {
                Some(summary) => summary.clone(),
                None => {
                    let summary = self.summarize(viewer, counterpart_id).await?;
                    counterparts.insert(counterpart_id, summary.clone());
                    summary
                }
            };

            views.push(AppointmentView::project(appointment, viewer, summary));
        }

        Ok(views)
    }

    async fn summarize(&self, viewer: Viewer, counterpart_id: Uuid) -> Result<CounterpartSummary, AppointmentError> {
        let summary = match viewer {
            Viewer::Patient => self.doctors.get(counterpart_id).await?.map(|doctor| CounterpartSummary {
                id: Some(doctor.id),
                specialization: doctor.specialization,
                user: Some(ContactSummary {
                    name: Some(doctor.name),
                    email: Some(doctor.email),
                    phone: None,
                }),
            }),
            Viewer::Doctor => self.patients.get(counterpart_id).await?.map(|patient| CounterpartSummary {
                id: Some(patient.id),
                specialization: None,
                user: Some(ContactSummary {
                    name: Some(patient.name),
                    email: Some(patient.email),
                    phone: patient.phone,
                }),
            }),
        };

        Ok(summary.unwrap_or_default())
    }
}

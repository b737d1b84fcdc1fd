// libs/appointment-cell/src/services/ledger.rs
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, NewAppointment};

const TABLE: &str = "appointments";

/// Durable store of appointment records. Records are never deleted.
#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError>;

    async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError>;

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError>;

    /// Writes the mutable fields only while the stored status is still `expected`.
    /// `Ok(None)` means another writer changed the status first.
    async fn save(&self, appointment: &Appointment, expected: AppointmentStatus) -> Result<Option<Appointment>, AppointmentError>;

    /// The doctor's non-cancelled appointments on `date`.
    async fn list_active_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError>;

    async fn count_by_status(&self, status: AppointmentStatus) -> Result<usize, AppointmentError>;
}

// ==============================================================================
// IN-MEMORY LEDGER
// ==============================================================================

/// Insertion-ordered ledger used when no record store is configured.
#[derive(Default)]
pub struct InMemoryAppointmentLedger {
    records: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Appointment>
    where F: Fn(&Appointment) -> bool {
        self.records.read().await
            .iter()
            .filter(|a| predicate(a))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AppointmentLedger for InMemoryAppointmentLedger {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let record = appointment.into_appointment(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());

        info!("Appointment {} stored", record.id);
        Ok(record)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.records.read().await
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned()
            .ok_or(AppointmentError::NotFound)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.filtered(|a| a.patient_id == patient_id).await)
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.filtered(|a| a.doctor_id == doctor_id).await)
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, appointment: &Appointment, expected: AppointmentStatus) -> Result<Option<Appointment>, AppointmentError> {
        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|a| a.id == appointment.id)
            .ok_or(AppointmentError::NotFound)?;

        if stored.status != expected {
            debug!("Appointment {} is {}, expected {}", stored.id, stored.status, expected);
            return Ok(None);
        }

        *stored = appointment.clone();
        Ok(Some(stored.clone()))
    }

    async fn list_active_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .filtered(|a| a.doctor_id == doctor_id && a.appointment_date == Some(date) && a.is_active())
            .await)
    }

    async fn count_by_status(&self, status: AppointmentStatus) -> Result<usize, AppointmentError> {
        Ok(self.records.read().await
            .iter()
            .filter(|a| a.status == status)
            .count())
    }
}

// ==============================================================================
// SUPABASE LEDGER
// ==============================================================================

pub struct SupabaseAppointmentLedger {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn select(&self, query: &str) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Querying appointments: {}", query);

        self.supabase
            .select(TABLE, query)
            .await
            .map_err(|e| {
                error!("Appointment query failed: {}", e);
                AppointmentError::DatabaseError(e.to_string())
            })
    }
}

#[async_trait]
impl AppointmentLedger for SupabaseAppointmentLedger {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let record = appointment.into_appointment(Uuid::new_v4(), Utc::now());
        let row = serde_json::to_value(&record)
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let stored: Appointment = self.supabase
            .insert(TABLE, row)
            .await
            .map_err(|e| {
                error!("Failed to store appointment: {}", e);
                AppointmentError::DatabaseError(e.to_string())
            })?;

        info!("Appointment {} stored", stored.id);
        Ok(stored)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.select(&format!("id=eq.{}&limit=1", appointment_id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.select(&format!("patient_id=eq.{}&order=created_at.asc", patient_id)).await
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.select(&format!("doctor_id=eq.{}&order=created_at.asc", doctor_id)).await
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.select("order=created_at.asc").await
    }

    async fn save(&self, appointment: &Appointment, expected: AppointmentStatus) -> Result<Option<Appointment>, AppointmentError> {
        // Identity, parties, fee and creation time are immutable
        let patch = json!({
            "status": appointment.status,
            "appointment_date": appointment.appointment_date,
            "appointment_time": appointment.appointment_time,
            "reason": appointment.reason,
            "notes": appointment.notes,
            "prescription": appointment.prescription,
        });

        let rows: Vec<Appointment> = self.supabase
            .update(TABLE, &format!("id=eq.{}&status=eq.{}", appointment.id, expected), patch)
            .await
            .map_err(|e| {
                error!("Failed to update appointment {}: {}", appointment.id, e);
                AppointmentError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().next())
    }

    async fn list_active_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        self.select(&format!(
            "doctor_id=eq.{}&appointment_date=eq.{}&status=neq.{}&order=created_at.asc",
            doctor_id,
            date.format("%Y-%m-%d"),
            AppointmentStatus::Cancelled
        ))
        .await
    }

    async fn count_by_status(&self, status: AppointmentStatus) -> Result<usize, AppointmentError> {
        let query = format!("select=id&status=eq.{}", status);
        debug!("Counting appointments: {}", query);

        let ids: Vec<serde_json::Value> = self.supabase
            .select(TABLE, &query)
            .await
            .map_err(|e| {
                error!("Appointment count failed: {}", e);
                AppointmentError::DatabaseError(e.to_string())
            })?;

        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveTime;

    fn new_appointment(doctor_id: Uuid, date: Option<NaiveDate>) -> NewAppointment {
        NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id,
            appointment_date: date,
            appointment_time: NaiveTime::from_hms_opt(10, 0, 0),
            status: AppointmentStatus::Pending,
            reason: String::new(),
            notes: String::new(),
            fee: Some(50.0),
        }
    }

    #[tokio::test]
    async fn lists_keep_insertion_order() {
        let ledger = InMemoryAppointmentLedger::new();
        let doctor_id = Uuid::new_v4();

        let first = ledger.create(new_appointment(doctor_id, None)).await.unwrap();
        let second = ledger.create(new_appointment(doctor_id, None)).await.unwrap();

        let ids: Vec<Uuid> = ledger.list_by_doctor(doctor_id).await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(ledger.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_unknown_record_is_not_found() {
        let ledger = InMemoryAppointmentLedger::new();
        let ghost = new_appointment(Uuid::new_v4(), None).into_appointment(Uuid::new_v4(), Utc::now());

        assert_matches!(ledger.save(&ghost, AppointmentStatus::Pending).await, Err(AppointmentError::NotFound));
        assert_matches!(ledger.get(ghost.id).await, Err(AppointmentError::NotFound));
    }

    #[tokio::test]
    async fn active_listing_skips_cancelled_and_other_dates() {
        let ledger = InMemoryAppointmentLedger::new();
        let doctor_id = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let kept = ledger.create(new_appointment(doctor_id, Some(day))).await.unwrap();
        let mut cancelled = ledger.create(new_appointment(doctor_id, Some(day))).await.unwrap();
        ledger.create(new_appointment(doctor_id, Some(next_day))).await.unwrap();

        cancelled.status = AppointmentStatus::Cancelled;
        ledger.save(&cancelled, AppointmentStatus::Pending).await.unwrap();

        let active = ledger.list_active_for_doctor_on(doctor_id, day).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);
        assert_eq!(ledger.count_by_status(AppointmentStatus::Cancelled).await.unwrap(), 1);
        assert_eq!(ledger.count_by_status(AppointmentStatus::Pending).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn save_with_stale_status_leaves_record_alone() {
        let ledger = InMemoryAppointmentLedger::new();
        let mut stored = ledger.create(new_appointment(Uuid::new_v4(), None)).await.unwrap();

        stored.status = AppointmentStatus::Cancelled;
        assert!(ledger.save(&stored, AppointmentStatus::Pending).await.unwrap().is_some());

        let mut late = stored.clone();
        late.status = AppointmentStatus::Completed;
        late.prescription = Some("Rx".to_string());
        assert_eq!(ledger.save(&late, AppointmentStatus::Pending).await.unwrap(), None);

        let current = ledger.get(stored.id).await.unwrap();
        assert_eq!(current.status, AppointmentStatus::Cancelled);
        assert_eq!(current.prescription, None);
    }
}

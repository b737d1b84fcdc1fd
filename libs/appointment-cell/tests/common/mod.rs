#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentError, AppointmentLedger, AppointmentState, AppointmentStatus,
    BookAppointmentRequest, InMemoryAppointmentLedger, NewAppointment,
};
use doctor_cell::{DoctorProfile, InMemoryDoctorRegistry};
use notification_cell::{Notification, NotificationDispatcher, NotificationError, Notifier};
use patient_cell::{InMemoryPatientRegistry, PatientProfile};
use shared_config::AppConfig;
use shared_utils::test_utils::TestConfig;

/// Hands every delivered notification back to the test.
pub struct RecordingNotifier {
    pub delivered: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError> {
        let _ = self.delivered.send(notification.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _notification: &Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected { status: 503, body: "mail relay down".to_string() })
    }
}

/// In-memory ledger whose reads can be slowed down, or followed by a write from
/// "another process" before the caller gets the (now stale) record.
pub struct ScriptedLedger {
    inner: Arc<InMemoryAppointmentLedger>,
    read_delay: Duration,
    overwrite_after_read: Mutex<Option<AppointmentStatus>>,
}

impl ScriptedLedger {
    pub fn slow_reads(inner: Arc<InMemoryAppointmentLedger>, read_delay: Duration) -> Self {
        Self { inner, read_delay, overwrite_after_read: Mutex::new(None) }
    }

    /// The first read is followed by an outside write moving the record to `status`.
    pub fn overwriting(inner: Arc<InMemoryAppointmentLedger>, status: AppointmentStatus) -> Self {
        Self { inner, read_delay: Duration::ZERO, overwrite_after_read: Mutex::new(Some(status)) }
    }
}

#[async_trait]
impl AppointmentLedger for ScriptedLedger {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        self.inner.create(appointment).await
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let read = self.inner.get(appointment_id).await?;

        if let Some(status) = self.overwrite_after_read.lock().await.take() {
            let mut moved = read.clone();
            moved.status = status;
            self.inner.save(&moved, read.status).await?;
        }

        tokio::time::sleep(self.read_delay).await;
        Ok(read)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.inner.list_by_patient(patient_id).await
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.inner.list_by_doctor(doctor_id).await
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.inner.list_all().await
    }

    async fn save(&self, appointment: &Appointment, expected: AppointmentStatus) -> Result<Option<Appointment>, AppointmentError> {
        self.inner.save(appointment, expected).await
    }

    async fn list_active_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        self.inner.list_active_for_doctor_on(doctor_id, date).await
    }

    async fn count_by_status(&self, status: AppointmentStatus) -> Result<usize, AppointmentError> {
        self.inner.count_by_status(status).await
    }
}

pub struct Fixture {
    pub state: Arc<AppointmentState>,
    pub ledger: Arc<InMemoryAppointmentLedger>,
    pub patients: Arc<InMemoryPatientRegistry>,
    pub doctors: Arc<InMemoryDoctorRegistry>,
    pub patient: PatientProfile,
    pub doctor: DoctorProfile,
    pub delivered: mpsc::UnboundedReceiver<Notification>,
}

pub fn test_config() -> AppConfig {
    TestConfig::default().to_app_config()
}

pub async fn fixture() -> Fixture {
    fixture_with(test_config()).await
}

pub async fn fixture_with(config: AppConfig) -> Fixture {
    let (tx, delivered) = mpsc::unbounded_channel();
    let (dispatcher, _handle) = NotificationDispatcher::spawn(
        Arc::new(RecordingNotifier { delivered: tx }),
        Duration::from_secs(1),
    );
    build(config, dispatcher, delivered, |ledger| ledger as Arc<dyn AppointmentLedger>).await
}

/// Fixture whose appointment store is `wrap` applied to the in-memory ledger.
/// `Fixture::ledger` still reads the underlying records directly.
pub async fn fixture_with_ledger<F>(wrap: F) -> Fixture
where F: FnOnce(Arc<InMemoryAppointmentLedger>) -> Arc<dyn AppointmentLedger> {
    let (tx, delivered) = mpsc::unbounded_channel();
    let (dispatcher, _handle) = NotificationDispatcher::spawn(
        Arc::new(RecordingNotifier { delivered: tx }),
        Duration::from_secs(1),
    );
    build(test_config(), dispatcher, delivered, wrap).await
}

/// Fixture whose notifier always fails.
pub async fn failing_fixture() -> Fixture {
    let (dispatcher, _handle) = NotificationDispatcher::spawn(Arc::new(FailingNotifier), Duration::from_secs(1));
    let (_tx, delivered) = mpsc::unbounded_channel();
    build(test_config(), dispatcher, delivered, |ledger| ledger as Arc<dyn AppointmentLedger>).await
}

async fn build<F>(
    config: AppConfig,
    dispatcher: NotificationDispatcher,
    delivered: mpsc::UnboundedReceiver<Notification>,
    wrap: F,
) -> Fixture
where F: FnOnce(Arc<InMemoryAppointmentLedger>) -> Arc<dyn AppointmentLedger> {
    let ledger = Arc::new(InMemoryAppointmentLedger::new());
    let patients = Arc::new(InMemoryPatientRegistry::new());
    let doctors = Arc::new(InMemoryDoctorRegistry::new());

    let patient = patients
        .insert(PatientProfile::new(Uuid::new_v4(), "Ada Byrne", "ada@example.com").with_phone("+353 1 555 0100"))
        .await
        .unwrap();
    let doctor = doctors
        .insert(
            DoctorProfile::new(Uuid::new_v4(), "Grace Hopper", "grace@example.com", Some(75.0))
                .with_specialization("Cardiology"),
        )
        .await
        .unwrap();

    let state = Arc::new(AppointmentState::new(
        Arc::new(config),
        wrap(ledger.clone()),
        patients.clone(),
        doctors.clone(),
        dispatcher,
    ));

    Fixture { state, ledger, patients, doctors, patient, doctor, delivered }
}

impl Fixture {
    pub fn request(&self, date: Option<&str>, time: Option<&str>) -> BookAppointmentRequest {
        BookAppointmentRequest {
            patient_id: self.patient.user_id,
            doctor_id: self.doctor.id,
            appointment_date: date.map(str::to_string),
            appointment_time: time.map(str::to_string),
            reason: Some("Chest pain".to_string()),
            notes: None,
        }
    }

    pub async fn next_notification(&mut self) -> Notification {
        tokio::time::timeout(Duration::from_secs(2), self.delivered.recv())
            .await
            .expect("notification within timeout")
            .expect("notifier channel open")
    }

    pub async fn add_doctor(&self, name: &str, fee: Option<f64>) -> DoctorProfile {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        self.doctors
            .insert(DoctorProfile::new(Uuid::new_v4(), name, &email, fee))
            .await
            .unwrap()
    }
}

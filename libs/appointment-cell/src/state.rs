use std::sync::Arc;

use doctor_cell::DoctorRegistry;
use notification_cell::NotificationDispatcher;
use patient_cell::PatientRegistry;
use shared_config::AppConfig;

use crate::models::LifecycleRules;
use crate::services::ledger::AppointmentLedger;
use crate::services::locks::KeyedLocks;

pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<dyn AppointmentLedger>,
    pub patients: Arc<dyn PatientRegistry>,
    pub doctors: Arc<dyn DoctorRegistry>,
    pub notifications: NotificationDispatcher,
    /// Keyed by doctor id.
    pub slot_locks: Arc<KeyedLocks>,
    /// Keyed by appointment id.
    pub record_locks: Arc<KeyedLocks>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        ledger: Arc<dyn AppointmentLedger>,
        patients: Arc<dyn PatientRegistry>,
        doctors: Arc<dyn DoctorRegistry>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            config,
            ledger,
            patients,
            doctors,
            notifications,
            slot_locks: Arc::new(KeyedLocks::new()),
            record_locks: Arc::new(KeyedLocks::new()),
        }
    }

    pub fn lifecycle_rules(&self) -> LifecycleRules {
        LifecycleRules {
            require_confirmation_before_completion: self.config.lifecycle_require_confirmation,
        }
    }
}

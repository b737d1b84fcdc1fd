use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{PatientProfile, PatientError};

/// Read access to patient profiles. Provisioning happens at registration, outside this service.
#[async_trait]
pub trait PatientRegistry: Send + Sync {
    async fn get(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, PatientError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<PatientProfile>, PatientError>;
}

#[derive(Default)]
pub struct InMemoryPatientRegistry {
    profiles: RwLock<HashMap<Uuid, PatientProfile>>,
}

impl InMemoryPatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: PatientProfile) -> Result<PatientProfile, PatientError> {
        let mut profiles = self.profiles.write().await;

        if profiles.values().any(|p| p.user_id == profile.user_id) {
            return Err(PatientError::AlreadyExists(profile.user_id));
        }

        profiles.insert(profile.id, profile.clone());
        debug!("Provisioned patient profile {} for user {}", profile.id, profile.user_id);
        Ok(profile)
    }
}

#[async_trait]
impl PatientRegistry for InMemoryPatientRegistry {
    async fn get(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, PatientError> {
        Ok(self.profiles.read().await.get(&patient_id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<PatientProfile>, PatientError> {
        Ok(self.profiles.read().await
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }
}

pub struct SupabasePatientRegistry {
    supabase: SupabaseClient,
}

impl SupabasePatientRegistry {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn first_where(&self, filter: &str) -> Result<Option<PatientProfile>, PatientError> {
        debug!("Fetching patient profile where {}", filter);

        let rows: Vec<PatientProfile> = self.supabase
            .select("patients", &format!("{}&limit=1", filter))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl PatientRegistry for SupabasePatientRegistry {
    async fn get(&self, patient_id: Uuid) -> Result<Option<PatientProfile>, PatientError> {
        self.first_where(&format!("id=eq.{}", patient_id)).await
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<PatientProfile>, PatientError> {
        self.first_where(&format!("user_id=eq.{}", user_id)).await
    }
}

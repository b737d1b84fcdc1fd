use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorProfile, DoctorError};

#[async_trait]
pub trait DoctorRegistry: Send + Sync {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, DoctorError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DoctorProfile>, DoctorError>;

    async fn list_by_verified(&self, verified: bool) -> Result<Vec<DoctorProfile>, DoctorError>;

    async fn list_all(&self) -> Result<Vec<DoctorProfile>, DoctorError>;

    /// Exact, case-sensitive match on the specialization label.
    async fn list_by_specialization(&self, specialization: &str) -> Result<Vec<DoctorProfile>, DoctorError>;

    /// Sets `verified` and stamps `verified_at` unless the doctor is already verified.
    async fn mark_verified(&self, doctor_id: Uuid, at: DateTime<Utc>) -> Result<DoctorProfile, DoctorError>;
}

#[derive(Default)]
pub struct InMemoryDoctorRegistry {
    profiles: RwLock<HashMap<Uuid, DoctorProfile>>,
}

impl InMemoryDoctorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<DoctorProfile>
    where F: Fn(&DoctorProfile) -> bool {
        let mut doctors: Vec<DoctorProfile> = self.profiles.read().await
            .values()
            .filter(|d| predicate(d))
            .cloned()
            .collect();
        doctors.sort_by_key(|d| d.created_at);
        doctors
    }

    pub async fn insert(&self, profile: DoctorProfile) -> Result<DoctorProfile, DoctorError> {
        let mut profiles = self.profiles.write().await;

        if profiles.values().any(|d| d.user_id == profile.user_id) {
            return Err(DoctorError::AlreadyExists(profile.user_id));
        }

        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    /// Changes the doctor's current fee; booked appointments keep their snapshot.
    pub async fn set_consultation_fee(&self, doctor_id: Uuid, fee: Option<f64>) -> Result<(), DoctorError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&doctor_id).ok_or(DoctorError::NotFound)?;
        profile.consultation_fee = fee;
        Ok(())
    }
}

#[async_trait]
impl DoctorRegistry for InMemoryDoctorRegistry {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, DoctorError> {
        Ok(self.profiles.read().await.get(&doctor_id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DoctorProfile>, DoctorError> {
        Ok(self.profiles.read().await
            .values()
            .find(|d| d.user_id == user_id)
            .cloned())
    }

    async fn list_by_verified(&self, verified: bool) -> Result<Vec<DoctorProfile>, DoctorError> {
        Ok(self.filtered(|d| d.verified == verified).await)
    }

    async fn list_all(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn list_by_specialization(&self, specialization: &str) -> Result<Vec<DoctorProfile>, DoctorError> {
        Ok(self.filtered(|d| d.specialization.as_deref() == Some(specialization)).await)
    }

    async fn mark_verified(&self, doctor_id: Uuid, at: DateTime<Utc>) -> Result<DoctorProfile, DoctorError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&doctor_id).ok_or(DoctorError::NotFound)?;

        if !profile.verified {
            profile.verified = true;
            profile.verified_at = Some(at);
        }

        Ok(profile.clone())
    }
}

pub struct SupabaseDoctorRegistry {
    supabase: SupabaseClient,
}

impl SupabaseDoctorRegistry {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn select(&self, query: &str) -> Result<Vec<DoctorProfile>, DoctorError> {
        debug!("Fetching doctors where {}", query);

        self.supabase
            .select("doctors", query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl DoctorRegistry for SupabaseDoctorRegistry {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, DoctorError> {
        Ok(self.select(&format!("id=eq.{}&limit=1", doctor_id)).await?.into_iter().next())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DoctorProfile>, DoctorError> {
        Ok(self.select(&format!("user_id=eq.{}&limit=1", user_id)).await?.into_iter().next())
    }

    async fn list_by_verified(&self, verified: bool) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.select(&format!("verified=eq.{}&order=created_at.asc", verified)).await
    }

    async fn list_all(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.select("order=created_at.asc").await
    }

    async fn list_by_specialization(&self, specialization: &str) -> Result<Vec<DoctorProfile>, DoctorError> {
        let encoded = urlencoding::encode(specialization);
        self.select(&format!("specialization=eq.{}&order=created_at.asc", encoded)).await
    }

    async fn mark_verified(&self, doctor_id: Uuid, at: DateTime<Utc>) -> Result<DoctorProfile, DoctorError> {
        // Filtering on verified=false keeps the first verification timestamp
        let updated: Vec<DoctorProfile> = self.supabase
            .update(
                "doctors",
                &format!("id=eq.{}&verified=eq.false", doctor_id),
                json!({
                    "verified": true,
                    "verified_at": at.to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        match updated.into_iter().next() {
            Some(profile) => Ok(profile),
            None => self.get(doctor_id).await?.ok_or(DoctorError::NotFound),
        }
    }
}

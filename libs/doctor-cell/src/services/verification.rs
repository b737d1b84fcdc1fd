use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{DoctorProfile, DoctorStats, DoctorError};
use crate::services::registry::DoctorRegistry;

/// Admin gate for doctor onboarding. Verification is informational and does not
/// by itself control whether a doctor can be booked.
pub struct DoctorVerificationService {
    registry: Arc<dyn DoctorRegistry>,
}

impl DoctorVerificationService {
    pub fn new(registry: Arc<dyn DoctorRegistry>) -> Self {
        Self { registry }
    }

    pub async fn verify(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        let doctor = self.registry.mark_verified(doctor_id, Utc::now()).await?;
        info!("Doctor {} verified at {:?}", doctor.id, doctor.verified_at);
        Ok(doctor)
    }

    pub async fn pending(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.registry.list_by_verified(false).await
    }

    pub async fn verified(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.registry.list_by_verified(true).await
    }

    pub async fn stats(&self) -> Result<DoctorStats, DoctorError> {
        let verified_doctors = self.registry.list_by_verified(true).await?.len();
        let pending_doctors = self.registry.list_by_verified(false).await?.len();

        debug!("Doctor stats: {} verified, {} pending", verified_doctors, pending_doctors);

        Ok(DoctorStats {
            total_doctors: verified_doctors + pending_doctors,
            verified_doctors,
            pending_doctors,
        })
    }

    /// Every doctor, verified or not, oldest first.
    pub async fn directory(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.registry.list_all().await
    }

    pub async fn by_specialization(&self, specialization: &str) -> Result<Vec<DoctorProfile>, DoctorError> {
        debug!("Listing doctors with specialization {}", specialization);
        self.registry.list_by_specialization(specialization).await
    }

    pub async fn get(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        self.registry.get(doctor_id).await?.ok_or(DoctorError::NotFound)
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        self.registry.find_by_user(user_id).await?.ok_or(DoctorError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::registry::InMemoryDoctorRegistry;
    use assert_matches::assert_matches;

    async fn seeded() -> (Arc<InMemoryDoctorRegistry>, DoctorProfile, DoctorProfile) {
        let registry = Arc::new(InMemoryDoctorRegistry::new());
        let a = registry
            .insert(DoctorProfile::new(Uuid::new_v4(), "Grace Hopper", "grace@example.com", Some(60.0)))
            .await
            .unwrap();
        let b = registry
            .insert(DoctorProfile::new(Uuid::new_v4(), "Alan Turing", "alan@example.com", None))
            .await
            .unwrap();
        (registry, a, b)
    }

    #[tokio::test]
    async fn verify_stamps_time_once() {
        let (registry, doctor, _) = seeded().await;
        let service = DoctorVerificationService::new(registry);

        let first = service.verify(doctor.id).await.unwrap();
        assert!(first.verified);
        let stamped = first.verified_at.expect("verified_at set");

        let second = service.verify(doctor.id).await.unwrap();
        assert_eq!(second.verified_at, Some(stamped));
    }

    #[tokio::test]
    async fn verify_unknown_doctor_is_not_found() {
        let (registry, _, _) = seeded().await;
        let service = DoctorVerificationService::new(registry);

        assert_matches!(service.verify(Uuid::new_v4()).await, Err(DoctorError::NotFound));
    }

    #[tokio::test]
    async fn stats_partition_doctors() {
        let (registry, doctor, _) = seeded().await;
        let service = DoctorVerificationService::new(registry);

        assert_eq!(
            service.stats().await.unwrap(),
            DoctorStats { total_doctors: 2, verified_doctors: 0, pending_doctors: 2 }
        );

        service.verify(doctor.id).await.unwrap();

        assert_eq!(
            service.stats().await.unwrap(),
            DoctorStats { total_doctors: 2, verified_doctors: 1, pending_doctors: 1 }
        );
        assert_eq!(service.verified().await.unwrap()[0].id, doctor.id);
        assert_eq!(service.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn directory_lists_everyone_and_filters_by_exact_specialization() {
        let (registry, grace, alan) = seeded().await;
        let cardiologist = registry
            .insert(
                DoctorProfile::new(Uuid::new_v4(), "Hedy Lamarr", "hedy@example.com", Some(90.0))
                    .with_specialization("Cardiology"),
            )
            .await
            .unwrap();
        let service = DoctorVerificationService::new(registry);
        service.verify(grace.id).await.unwrap();

        let mut everyone: Vec<Uuid> = service.directory().await.unwrap().iter().map(|d| d.id).collect();
        everyone.sort();
        let mut expected = vec![grace.id, alan.id, cardiologist.id];
        expected.sort();
        assert_eq!(everyone, expected);

        let cardiology = service.by_specialization("Cardiology").await.unwrap();
        assert_eq!(cardiology.len(), 1);
        assert_eq!(cardiology[0].id, cardiologist.id);

        assert!(service.by_specialization("cardiology").await.unwrap().is_empty());
        assert!(service.by_specialization("Neurology").await.unwrap().is_empty());
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<i32>,
    pub consultation_fee: Option<f64>,
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DoctorProfile {
    /// New, unverified profile as created at doctor registration.
    pub fn new(user_id: Uuid, name: &str, email: &str, consultation_fee: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            specialization: None,
            qualification: None,
            experience: None,
            consultation_fee,
            hospital_name: None,
            verified: false,
            verified_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_specialization(mut self, specialization: &str) -> Self {
        self.specialization = Some(specialization.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorStats {
    pub total_doctors: usize,
    pub verified_doctors: usize,
    pub pending_doctors: usize,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor profile already exists for user {0}")]
    AlreadyExists(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveDate;

/// Patient profile linked one-to-one with a patient account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
}

impl PatientProfile {
    pub fn new(user_id: Uuid, name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            date_of_birth: None,
            gender: None,
            blood_group: None,
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Patient profile already exists for user {0}")]
    AlreadyExists(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

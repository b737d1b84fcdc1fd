use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::registry::DoctorRegistry;

pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorRegistry>,
}

impl DoctorState {
    pub fn new(config: Arc<AppConfig>, doctors: Arc<dyn DoctorRegistry>) -> Self {
        Self { config, doctors }
    }
}

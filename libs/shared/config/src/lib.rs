use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub notify_timeout_secs: u64,
    pub booking_require_verified_doctor: bool,
    pub lifecycle_require_confirmation: bool,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            mail_api_url: String::new(),
            mail_api_key: String::new(),
            mail_from: "noreply@medibookpro.com".to_string(),
            notify_timeout_secs: 10,
            booking_require_verified_doctor: false,
            lifecycle_require_confirmation: false,
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            mail_api_url: env::var("MAIL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_API_URL not set, notifications will only be logged");
                    String::new()
                }),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or(defaults.mail_from),
            notify_timeout_secs: parse_or("NOTIFY_TIMEOUT_SECS", defaults.notify_timeout_secs),
            booking_require_verified_doctor: parse_or(
                "BOOKING_REQUIRE_VERIFIED_DOCTOR",
                defaults.booking_require_verified_doctor,
            ),
            lifecycle_require_confirmation: parse_or(
                "LIFECYCLE_REQUIRE_CONFIRMATION",
                defaults.lifecycle_require_confirmation,
            ),
            server_port: parse_or("SERVER_PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.is_storage_configured() && !self.supabase_jwt_secret.is_empty()
    }

    /// Supabase URL and key are both required before the REST-backed stores are used.
    pub fn is_storage_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_api_url.is_empty()
    }
}

fn parse_or<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {:?}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

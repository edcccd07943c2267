use crate::error::{BookingError, Result};
use crate::time_format::parse_utc_offset;
use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub anon_key: String,
    pub display_offset: FixedOffset,
    pub request_timeout_secs: u64,
    pub login_email_domain: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let backend_url = dotenvy::var("BACKEND_URL")
            .map_err(|_| BookingError::Config("BACKEND_URL is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        if backend_url.is_empty() {
            return Err(BookingError::Config("BACKEND_URL is empty".to_string()));
        }

        let anon_key = dotenvy::var("BACKEND_ANON_KEY")
            .map_err(|_| BookingError::Config("BACKEND_ANON_KEY is required".to_string()))?;

        let display_offset = parse_utc_offset(
            &dotenvy::var("DISPLAY_UTC_OFFSET").unwrap_or_else(|_| "+08:00".to_string()),
        )?;

        let request_timeout_secs = dotenvy::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| BookingError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?;

        let login_email_domain = dotenvy::var("LOGIN_EMAIL_DOMAIN")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "miaoda.com".to_string());

        Ok(Config {
            backend_url,
            anon_key,
            display_offset,
            request_timeout_secs,
            login_email_domain,
        })
    }
}

use std::{env, sync::Arc};

use async_trait::async_trait;
use service::{
    config::{Config, ConfigService},
    ServiceError,
};

pub struct ConfigServiceImpl;

#[async_trait]
impl ConfigService for ConfigServiceImpl {
    async fn get_config(&self) -> Result<Config, ServiceError> {
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let holiday_region = env::var("HOLIDAY_REGION").unwrap_or_else(|_| "BW".to_string());
        let access_token_expire_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let refresh_token_expire_days = env::var("REFRESH_TOKEN_EXPIRE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let allowed_origins: Arc<[Arc<str>]> = env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Arc::from)
            .collect();

        Ok(Config {
            timezone: Arc::from(timezone),
            holiday_region: Arc::from(holiday_region),
            access_token_expire_minutes,
            refresh_token_expire_days,
            allowed_origins,
            smtp_configured: env::var("SMTP_HOST").is_ok(),
            telegram_configured: env::var("TELEGRAM_BOT_TOKEN").is_ok(),
            vapid_configured: env::var("VAPID_PUBLIC_KEY").is_ok(),
        })
    }
}

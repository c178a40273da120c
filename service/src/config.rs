use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Read-only after startup; see SPEC_FULL.md's "Global mutable state" note.
#[derive(Clone, Debug)]
pub struct Config {
    pub timezone: Arc<str>,
    pub holiday_region: Arc<str>,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub allowed_origins: Arc<[Arc<str>]>,
    pub smtp_configured: bool,
    pub telegram_configured: bool,
    pub vapid_configured: bool,
}

#[automock]
#[async_trait]
pub trait ConfigService {
    async fn get_config(&self) -> Result<Config, ServiceError>;
}

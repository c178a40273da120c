use std::sync::Arc;

use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};

use service::config::{Config, ConfigService};

use crate::{error_handler, json_response, session::Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new().route("/", get(get_config::<RestState>))
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTO {
    pub timezone: Arc<str>,
    pub holiday_region: Arc<str>,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub allowed_origins: Vec<Arc<str>>,
    pub smtp_configured: bool,
    pub telegram_configured: bool,
    pub vapid_configured: bool,
}

impl From<&Config> for ConfigTO {
    fn from(c: &Config) -> Self {
        Self {
            timezone: c.timezone.clone(),
            holiday_region: c.holiday_region.clone(),
            access_token_expire_minutes: c.access_token_expire_minutes,
            refresh_token_expire_days: c.refresh_token_expire_days,
            allowed_origins: c.allowed_origins.to_vec(),
            smtp_configured: c.smtp_configured,
            telegram_configured: c.telegram_configured,
            vapid_configured: c.vapid_configured,
        }
    }
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Config"], responses((status = 200, body = ConfigTO)))]
pub async fn get_config<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
) -> Response {
    error_handler(
        (async {
            let config = rest_state.config_service().get_config().await?;
            Ok(json_response(200, serde_json::to_string(&ConfigTO::from(&config)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(paths(get_config), components(schemas(ConfigTO)))]
pub struct ConfigApiDoc;

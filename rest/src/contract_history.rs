use std::sync::Arc;

use axum::extract::Path;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use service::contract_history::{ContractHistoryEntry, ContractHistoryService};
use service::employee::ContractType;

use crate::employee::ContractTypeTO;
use crate::{error_handler, into_auth, json_response, session::Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", post(add_entry::<RestState>))
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractHistoryEntryTO {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub employee_id: Uuid,
    pub valid_from: Date,
    pub valid_to: Option<Date>,
    pub contract_type: ContractTypeTO,
    pub hourly_rate: f64,
    pub weekly_hours: Option<f64>,
    pub full_time_percentage: Option<f64>,
    pub monthly_hours_limit: Option<f64>,
    pub annual_salary_limit: Option<f64>,
    pub note: Option<Arc<str>>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&ContractHistoryEntry> for ContractHistoryEntryTO {
    fn from(e: &ContractHistoryEntry) -> Self {
        Self {
            id: e.id,
            employee_id: e.employee_id,
            valid_from: e.valid_from,
            valid_to: e.valid_to,
            contract_type: e.contract_type.into(),
            hourly_rate: e.hourly_rate,
            weekly_hours: e.weekly_hours,
            full_time_percentage: e.full_time_percentage,
            monthly_hours_limit: e.monthly_hours_limit,
            annual_salary_limit: e.annual_salary_limit,
            note: e.note.clone(),
            created_at: e.created_at,
        }
    }
}
impl From<&ContractHistoryEntryTO> for ContractHistoryEntry {
    fn from(to: &ContractHistoryEntryTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            employee_id: to.employee_id,
            valid_from: to.valid_from,
            valid_to: to.valid_to,
            contract_type: ContractType::from(to.contract_type),
            hourly_rate: to.hourly_rate,
            weekly_hours: to.weekly_hours,
            full_time_percentage: to.full_time_percentage,
            monthly_hours_limit: to.monthly_hours_limit,
            annual_salary_limit: to.annual_salary_limit,
            note: to.note.clone(),
            created_at: None,
            created_by_user_id: None,
        }
    }
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get, path = "", tags = ["Contract History"],
    params(("employee_id" = Uuid, Path)),
    responses((status = 200, body = [ContractHistoryEntryTO])),
)]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(employee_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let entries: Arc<[ContractHistoryEntryTO]> = rest_state
                .contract_history_service()
                .get_all_for_employee(employee_id, into_auth(context), None)
                .await?
                .iter()
                .map(ContractHistoryEntryTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&entries).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "", tags = ["Contract History"],
    params(("employee_id" = Uuid, Path)), request_body = ContractHistoryEntryTO,
    responses((status = 201, body = ContractHistoryEntryTO)),
)]
pub async fn add_entry<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(employee_id): Path<Uuid>,
    Json(mut entry): Json<ContractHistoryEntryTO>,
) -> Response {
    error_handler(
        (async {
            entry.employee_id = employee_id;
            let entry = rest_state
                .contract_history_service()
                .add_entry(&(&entry).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&ContractHistoryEntryTO::from(&entry)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(paths(get_all, add_entry), components(schemas(ContractHistoryEntryTO)))]
pub struct ContractHistoryApiDoc;

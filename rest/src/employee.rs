use std::sync::Arc;

use axum::extract::Path;
use axum::response::Response;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::Time;
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use service::employee::{ContractType, Employee, EmployeeService};

use crate::{error_handler, into_auth, json_response, session::Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", axum::routing::post(create::<RestState>))
        .route("/me", get(get_me::<RestState>))
        .route("/me", put(update_me::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}", put(update::<RestState>))
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ContractTypeTO {
    Minijob,
    PartTime,
    FullTime,
}

impl From<ContractType> for ContractTypeTO {
    fn from(c: ContractType) -> Self {
        match c {
            ContractType::Minijob => Self::Minijob,
            ContractType::PartTime => Self::PartTime,
            ContractType::FullTime => Self::FullTime,
        }
    }
}
impl From<ContractTypeTO> for ContractType {
    fn from(c: ContractTypeTO) -> Self {
        match c {
            ContractTypeTO::Minijob => Self::Minijob,
            ContractTypeTO::PartTime => Self::PartTime,
            ContractTypeTO::FullTime => Self::FullTime,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTO {
    #[serde(default)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: Arc<str>,
    pub last_name: Arc<str>,
    pub email: Option<Arc<str>>,
    pub phone: Option<Arc<str>>,
    pub contract_type: ContractTypeTO,
    pub hourly_rate: f64,
    pub weekly_hours: Option<f64>,
    pub full_time_percentage: Option<f64>,
    pub monthly_hours_limit: Option<f64>,
    #[serde(default)]
    pub annual_salary_limit: f64,
    #[serde(default)]
    pub vacation_days: i32,
    #[serde(default)]
    pub qualifications: Vec<Arc<str>>,
    #[serde(default)]
    pub ical_token: Arc<str>,
    pub telegram_chat_id: Option<Arc<str>>,
    #[serde(default = "default_quiet_start")]
    pub quiet_hours_start: Time,
    #[serde(default = "default_quiet_end")]
    pub quiet_hours_end: Time,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_quiet_start() -> Time {
    time::macros::time!(22:00)
}
fn default_quiet_end() -> Time {
    time::macros::time!(07:00)
}
fn default_true() -> bool {
    true
}

impl From<&Employee> for EmployeeTO {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: e.email.clone(),
            phone: e.phone.clone(),
            contract_type: e.contract_type.into(),
            hourly_rate: e.hourly_rate,
            weekly_hours: e.weekly_hours,
            full_time_percentage: e.full_time_percentage,
            monthly_hours_limit: e.monthly_hours_limit,
            annual_salary_limit: e.annual_salary_limit,
            vacation_days: e.vacation_days,
            qualifications: e.qualifications.to_vec(),
            ical_token: e.ical_token.clone(),
            telegram_chat_id: e.telegram_chat_id.clone(),
            quiet_hours_start: e.quiet_hours_start,
            quiet_hours_end: e.quiet_hours_end,
            active: e.active,
        }
    }
}
impl From<&EmployeeTO> for Employee {
    fn from(to: &EmployeeTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            user_id: to.user_id,
            first_name: to.first_name.clone(),
            last_name: to.last_name.clone(),
            email: to.email.clone(),
            phone: to.phone.clone(),
            contract_type: to.contract_type.into(),
            hourly_rate: to.hourly_rate,
            weekly_hours: to.weekly_hours,
            full_time_percentage: to.full_time_percentage,
            monthly_hours_limit: to.monthly_hours_limit,
            annual_salary_limit: to.annual_salary_limit,
            vacation_days: to.vacation_days,
            qualifications: to.qualifications.clone().into(),
            ical_token: to.ical_token.clone(),
            telegram_chat_id: to.telegram_chat_id.clone(),
            quiet_hours_start: to.quiet_hours_start,
            quiet_hours_end: to.quiet_hours_end,
            active: to.active,
        }
    }
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Employees"], responses((status = 200, body = [EmployeeTO])))]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let employees: Arc<[EmployeeTO]> = rest_state
                .employee_service()
                .get_all(into_auth(context), None)
                .await?
                .iter()
                .map(EmployeeTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&employees).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/me", tags = ["Employees"], responses((status = 200, body = EmployeeTO)))]
pub async fn get_me<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let employee = rest_state.employee_service().get_me(into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&EmployeeTO::from(&employee)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(put, path = "/me", tags = ["Employees"], request_body = EmployeeTO, responses((status = 200, body = EmployeeTO)))]
pub async fn update_me<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(employee): Json<EmployeeTO>,
) -> Response {
    error_handler(
        (async {
            let current = rest_state
                .employee_service()
                .get_me(into_auth(context.clone()), None)
                .await?;
            let mut updated: Employee = (&employee).into();
            updated.id = current.id;
            let employee = rest_state
                .employee_service()
                .update(&updated, into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&EmployeeTO::from(&employee)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/{id}", tags = ["Employees"], params(("id" = Uuid, Path)), responses((status = 200, body = EmployeeTO)))]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let employee = rest_state.employee_service().get(id, into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&EmployeeTO::from(&employee)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "", tags = ["Employees"], request_body = EmployeeTO, responses((status = 201, body = EmployeeTO)))]
pub async fn create<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(employee): Json<EmployeeTO>,
) -> Response {
    error_handler(
        (async {
            let employee = rest_state
                .employee_service()
                .create(&(&employee).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&EmployeeTO::from(&employee)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(put, path = "/{id}", tags = ["Employees"], params(("id" = Uuid, Path)), request_body = EmployeeTO, responses((status = 200, body = EmployeeTO)))]
pub async fn update<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(mut employee): Json<EmployeeTO>,
) -> Response {
    error_handler(
        (async {
            if employee.id != Uuid::nil() && employee.id != id {
                return Err(RestError::InconsistentId(id, employee.id));
            }
            employee.id = id;
            let employee = rest_state
                .employee_service()
                .update(&(&employee).into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&EmployeeTO::from(&employee)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(get_all, get_me, update_me, get_one, create, update),
    components(schemas(EmployeeTO, ContractTypeTO))
)]
pub struct EmployeeApiDoc;

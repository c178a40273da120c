use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};
use tracing::instrument;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use service::payroll::{PayrollCalculation, PayrollEntry, PayrollService, PayrollStatus, SurchargeBreakdown};

use crate::{error_handler, into_auth, json_response, session::Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}/status", put(set_status::<RestState>))
        .route("/calculate", post(calculate_one::<RestState>))
        .route("/calculate-all", post(calculate_all::<RestState>))
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PayrollStatusTO {
    Draft,
    Approved,
    Paid,
}

impl From<PayrollStatus> for PayrollStatusTO {
    fn from(s: PayrollStatus) -> Self {
        match s {
            PayrollStatus::Draft => Self::Draft,
            PayrollStatus::Approved => Self::Approved,
            PayrollStatus::Paid => Self::Paid,
        }
    }
}
impl From<PayrollStatusTO> for PayrollStatus {
    fn from(s: PayrollStatusTO) -> Self {
        match s {
            PayrollStatusTO::Draft => Self::Draft,
            PayrollStatusTO::Approved => Self::Approved,
            PayrollStatusTO::Paid => Self::Paid,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurchargeBreakdownTO {
    pub early_hours: f64,
    pub late_hours: f64,
    pub night_hours: f64,
    pub weekend_hours: f64,
    pub sunday_hours: f64,
    pub holiday_hours: f64,
    pub early_surcharge: f64,
    pub late_surcharge: f64,
    pub night_surcharge: f64,
    pub weekend_surcharge: f64,
    pub sunday_surcharge: f64,
    pub holiday_surcharge: f64,
    pub total_surcharge: f64,
}

impl From<&SurchargeBreakdown> for SurchargeBreakdownTO {
    fn from(b: &SurchargeBreakdown) -> Self {
        Self {
            early_hours: b.early_hours,
            late_hours: b.late_hours,
            night_hours: b.night_hours,
            weekend_hours: b.weekend_hours,
            sunday_hours: b.sunday_hours,
            holiday_hours: b.holiday_hours,
            early_surcharge: b.early_surcharge,
            late_surcharge: b.late_surcharge,
            night_surcharge: b.night_surcharge,
            weekend_surcharge: b.weekend_surcharge,
            sunday_surcharge: b.sunday_surcharge,
            holiday_surcharge: b.holiday_surcharge,
            total_surcharge: b.total_surcharge(),
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntryTO {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month: Date,
    pub planned_hours: Option<f64>,
    pub actual_hours: f64,
    pub carryover_hours: f64,
    pub paid_hours: f64,
    pub surcharges: SurchargeBreakdownTO,
    pub base_wage: f64,
    pub total_gross: f64,
    pub ytd_gross: f64,
    pub annual_limit_remaining: f64,
    pub status: PayrollStatusTO,
    pub notes: Option<Arc<str>>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&PayrollEntry> for PayrollEntryTO {
    fn from(e: &PayrollEntry) -> Self {
        Self {
            id: e.id,
            employee_id: e.employee_id,
            month: e.month,
            planned_hours: e.planned_hours,
            actual_hours: e.actual_hours,
            carryover_hours: e.carryover_hours,
            paid_hours: e.paid_hours,
            surcharges: SurchargeBreakdownTO::from(&e.surcharges),
            base_wage: e.base_wage,
            total_gross: e.total_gross,
            ytd_gross: e.ytd_gross,
            annual_limit_remaining: e.annual_limit_remaining,
            status: e.status.into(),
            notes: e.notes.clone(),
            created_at: e.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollCalculationTO {
    pub entry: PayrollEntryTO,
    pub new_carryover: f64,
}

impl From<&PayrollCalculation> for PayrollCalculationTO {
    fn from(c: &PayrollCalculation) -> Self {
        Self {
            entry: PayrollEntryTO::from(&c.entry),
            new_carryover: c.new_carryover,
        }
    }
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayrollQueryParams {
    pub month: Option<Date>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateOneRequest {
    pub employee_id: Uuid,
    pub month: Date,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateAllRequest {
    pub month: Date,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPayrollStatusRequest {
    pub status: PayrollStatusTO,
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Payroll"], params(PayrollQueryParams), responses((status = 200, body = [PayrollEntryTO])))]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Query(params): Query<PayrollQueryParams>,
) -> Response {
    error_handler(
        (async {
            let entries: Arc<[PayrollEntryTO]> = rest_state
                .payroll_service()
                .get_all(params.month, into_auth(context), None)
                .await?
                .iter()
                .map(PayrollEntryTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&entries).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/{id}", tags = ["Payroll"], params(("id" = Uuid, Path)), responses((status = 200, body = PayrollEntryTO)))]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let entry = rest_state.payroll_service().get(id, into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&PayrollEntryTO::from(&entry)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/calculate", tags = ["Payroll"], request_body = CalculateOneRequest,
    responses((status = 201, body = PayrollCalculationTO), (status = 409, description = "Locked entry already exists")),
)]
pub async fn calculate_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(req): Json<CalculateOneRequest>,
) -> Response {
    error_handler(
        (async {
            let calc = rest_state
                .payroll_service()
                .calculate_one(req.employee_id, req.month, into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&PayrollCalculationTO::from(&calc)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/calculate-all", tags = ["Payroll"], request_body = CalculateAllRequest,
    responses((status = 201, body = [PayrollCalculationTO])),
)]
pub async fn calculate_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(req): Json<CalculateAllRequest>,
) -> Response {
    error_handler(
        (async {
            let calcs: Arc<[PayrollCalculationTO]> = rest_state
                .payroll_service()
                .calculate_all(req.month, into_auth(context), None)
                .await?
                .iter()
                .map(PayrollCalculationTO::from)
                .collect();
            Ok(json_response(201, serde_json::to_string(&calcs).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    put, path = "/{id}/status", tags = ["Payroll"],
    params(("id" = Uuid, Path)), request_body = SetPayrollStatusRequest,
    responses((status = 200, body = PayrollEntryTO)),
)]
pub async fn set_status<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetPayrollStatusRequest>,
) -> Response {
    error_handler(
        (async {
            let entry = rest_state
                .payroll_service()
                .set_status(id, req.status.into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&PayrollEntryTO::from(&entry)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(get_all, get_one, calculate_one, calculate_all, set_status),
    components(schemas(
        PayrollEntryTO, PayrollCalculationTO, SurchargeBreakdownTO, PayrollStatusTO,
        CalculateOneRequest, CalculateAllRequest, SetPayrollStatusRequest
    ))
)]
pub struct PayrollApiDoc;

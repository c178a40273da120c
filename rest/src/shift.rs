use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime, Time};
use tracing::instrument;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use service::shift::{Shift, ShiftListFilter, ShiftService, ShiftStatus};

use crate::{empty_response, error_handler, into_auth, json_response, session::Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", post(create::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}", put(update::<RestState>))
        .route("/{id}", axum::routing::delete(delete::<RestState>))
        .route("/{id}/confirm", post(confirm::<RestState>))
        .route("/{id}/claim", post(claim::<RestState>))
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ShiftStatusTO {
    Planned,
    Confirmed,
    Completed,
    Cancelled,
    CancelledAbsence,
}

impl From<ShiftStatus> for ShiftStatusTO {
    fn from(status: ShiftStatus) -> Self {
        match status {
            ShiftStatus::Planned => Self::Planned,
            ShiftStatus::Confirmed => Self::Confirmed,
            ShiftStatus::Completed => Self::Completed,
            ShiftStatus::Cancelled => Self::Cancelled,
            ShiftStatus::CancelledAbsence => Self::CancelledAbsence,
        }
    }
}
impl From<ShiftStatusTO> for ShiftStatus {
    fn from(status: ShiftStatusTO) -> Self {
        match status {
            ShiftStatusTO::Planned => Self::Planned,
            ShiftStatusTO::Confirmed => Self::Confirmed,
            ShiftStatusTO::Completed => Self::Completed,
            ShiftStatusTO::Cancelled => Self::Cancelled,
            ShiftStatusTO::CancelledAbsence => Self::CancelledAbsence,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTO {
    #[serde(default)]
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub recurring_shift_id: Option<Uuid>,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    #[serde(default)]
    pub break_minutes: i32,
    pub location: Option<Arc<str>>,
    pub notes: Option<Arc<str>>,
    #[serde(default = "default_status")]
    pub status: ShiftStatusTO,
    pub cancellation_reason: Option<Arc<str>>,
    pub actual_start: Option<Time>,
    pub actual_end: Option<Time>,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<PrimitiveDateTime>,
    pub confirmation_note: Option<Arc<str>>,
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub is_weekend: bool,
    #[serde(default)]
    pub is_sunday: bool,
    #[serde(default = "default_true")]
    pub rest_period_ok: bool,
    #[serde(default = "default_true")]
    pub break_ok: bool,
    #[serde(default = "default_true")]
    pub minijob_limit_ok: bool,
    #[serde(default)]
    pub hours_carried_over: bool,
    #[serde(default)]
    pub is_override: bool,
}

fn default_status() -> ShiftStatusTO {
    ShiftStatusTO::Planned
}
fn default_true() -> bool {
    true
}

impl From<&Shift> for ShiftTO {
    fn from(shift: &Shift) -> Self {
        Self {
            id: shift.id,
            employee_id: shift.employee_id,
            template_id: shift.template_id,
            recurring_shift_id: shift.recurring_shift_id,
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            break_minutes: shift.break_minutes,
            location: shift.location.clone(),
            notes: shift.notes.clone(),
            status: shift.status.into(),
            cancellation_reason: shift.cancellation_reason.clone(),
            actual_start: shift.actual_start,
            actual_end: shift.actual_end,
            confirmed_by: shift.confirmed_by,
            confirmed_at: shift.confirmed_at,
            confirmation_note: shift.confirmation_note.clone(),
            is_holiday: shift.is_holiday,
            is_weekend: shift.is_weekend,
            is_sunday: shift.is_sunday,
            rest_period_ok: shift.rest_period_ok,
            break_ok: shift.break_ok,
            minijob_limit_ok: shift.minijob_limit_ok,
            hours_carried_over: shift.hours_carried_over,
            is_override: shift.is_override,
        }
    }
}
impl From<&ShiftTO> for Shift {
    fn from(to: &ShiftTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            employee_id: to.employee_id,
            template_id: to.template_id,
            recurring_shift_id: to.recurring_shift_id,
            date: to.date,
            start_time: to.start_time,
            end_time: to.end_time,
            break_minutes: to.break_minutes,
            location: to.location.clone(),
            notes: to.notes.clone(),
            status: to.status.into(),
            cancellation_reason: to.cancellation_reason.clone(),
            actual_start: to.actual_start,
            actual_end: to.actual_end,
            confirmed_by: to.confirmed_by,
            confirmed_at: to.confirmed_at,
            confirmation_note: to.confirmation_note.clone(),
            is_holiday: to.is_holiday,
            is_weekend: to.is_weekend,
            is_sunday: to.is_sunday,
            rest_period_ok: to.rest_period_ok,
            break_ok: to.break_ok,
            minijob_limit_ok: to.minijob_limit_ok,
            hours_carried_over: to.hours_carried_over,
            is_override: to.is_override,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShiftQueryParams {
    pub employee_id: Option<Uuid>,
    pub from_date: Option<Date>,
    pub to_date: Option<Date>,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get, path = "", tags = ["Shifts"],
    params(ShiftQueryParams),
    responses((status = 200, description = "Shifts matching the filter", body = [ShiftTO])),
)]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Query(params): Query<ShiftQueryParams>,
) -> axum::response::Response {
    error_handler(
        (async {
            let shifts: Arc<[ShiftTO]> = rest_state
                .shift_service()
                .get_all(
                    ShiftListFilter {
                        employee_id: params.employee_id,
                        from_date: params.from_date,
                        to_date: params.to_date,
                    },
                    into_auth(context),
                    None,
                )
                .await
                .map_err(RestError::from)?
                .iter()
                .map(ShiftTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&shifts).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get, path = "/{id}", tags = ["Shifts"],
    params(("id" = Uuid, Path, description = "Shift id")),
    responses((status = 200, body = ShiftTO), (status = 404, description = "Not found")),
)]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    error_handler(
        (async {
            let shift = rest_state.shift_service().get(id, into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&ShiftTO::from(&shift)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "", tags = ["Shifts"], request_body = ShiftTO,
    responses((status = 201, body = ShiftTO), (status = 400, description = "Invalid input")),
)]
pub async fn create<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(shift): Json<ShiftTO>,
) -> axum::response::Response {
    error_handler(
        (async {
            let shift = rest_state
                .shift_service()
                .create(&(&shift).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&ShiftTO::from(&shift)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    put, path = "/{id}", tags = ["Shifts"],
    params(("id" = Uuid, Path, description = "Shift id")), request_body = ShiftTO,
    responses((status = 200, body = ShiftTO), (status = 400, description = "Path/body id mismatch")),
)]
pub async fn update<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(mut shift): Json<ShiftTO>,
) -> axum::response::Response {
    error_handler(
        (async {
            if shift.id != Uuid::nil() && shift.id != id {
                return Err(RestError::InconsistentId(id, shift.id));
            }
            shift.id = id;
            let shift = rest_state
                .shift_service()
                .update(&(&shift).into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&ShiftTO::from(&shift)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    delete, path = "/{id}", tags = ["Shifts"],
    params(("id" = Uuid, Path, description = "Shift id")),
    responses((status = 204, description = "Deleted")),
)]
pub async fn delete<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    error_handler(
        (async {
            rest_state.shift_service().delete(id, into_auth(context), None).await?;
            Ok(empty_response(204))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/{id}/confirm", tags = ["Shifts"],
    params(("id" = Uuid, Path, description = "Shift id")),
    responses((status = 200, body = ShiftTO), (status = 409, description = "Shift is not planned")),
)]
pub async fn confirm<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    error_handler(
        (async {
            let shift = rest_state.shift_service().confirm(id, into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&ShiftTO::from(&shift)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/{id}/claim", tags = ["Shifts"],
    params(("id" = Uuid, Path, description = "Shift id")),
    responses((status = 200, body = ShiftTO), (status = 409, description = "Shift already claimed")),
)]
pub async fn claim<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> axum::response::Response {
    error_handler(
        (async {
            let shift = rest_state.shift_service().claim(id, into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&ShiftTO::from(&shift)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(get_all, get_one, create, update, delete, confirm, claim),
    components(schemas(ShiftTO, ShiftStatusTO))
)]
pub struct ShiftApiDoc;

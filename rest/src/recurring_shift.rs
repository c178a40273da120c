use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::instrument;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use service::recurring_shift::{ExpansionPreview, ExpansionResult, RecurringShift, RecurringShiftService};
use vera_utils::DayOfWeek;

use crate::shift::ShiftTO;
use crate::{empty_response, error_handler, into_auth, json_response, session::Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", post(create::<RestState>))
        .route("/preview", post(preview::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}", put(update::<RestState>))
        .route("/{id}", axum::routing::delete(delete::<RestState>))
        .route("/{id}/update-from", post(update_from::<RestState>))
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringShiftTO {
    #[serde(default)]
    pub id: Uuid,
    pub weekday: u8,
    pub start_time: time::Time,
    pub end_time: time::Time,
    #[serde(default)]
    pub break_minutes: i32,
    pub employee_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub valid_from: Date,
    pub valid_until: Date,
    pub holiday_profile_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub skip_public_holidays: bool,
    pub label: Option<Arc<str>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl From<&RecurringShift> for RecurringShiftTO {
    fn from(r: &RecurringShift) -> Self {
        Self {
            id: r.id,
            weekday: r.weekday.to_index0(),
            start_time: r.start_time,
            end_time: r.end_time,
            break_minutes: r.break_minutes,
            employee_id: r.employee_id,
            template_id: r.template_id,
            valid_from: r.valid_from,
            valid_until: r.valid_until,
            holiday_profile_id: r.holiday_profile_id,
            skip_public_holidays: r.skip_public_holidays,
            label: r.label.clone(),
            active: r.active,
        }
    }
}
impl From<&RecurringShiftTO> for RecurringShift {
    fn from(to: &RecurringShiftTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            weekday: DayOfWeek::from_index0(to.weekday).unwrap_or(DayOfWeek::Monday),
            start_time: to.start_time,
            end_time: to.end_time,
            break_minutes: to.break_minutes,
            employee_id: to.employee_id,
            template_id: to.template_id,
            valid_from: to.valid_from,
            valid_until: to.valid_until,
            holiday_profile_id: to.holiday_profile_id,
            skip_public_holidays: to.skip_public_holidays,
            label: to.label.clone(),
            active: to.active,
            created_by: None,
            created_at: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionPreviewTO {
    pub generated_count: u32,
    pub skipped_count: u32,
    pub skipped_dates: Arc<[Date]>,
}

impl From<ExpansionPreview> for ExpansionPreviewTO {
    fn from(p: ExpansionPreview) -> Self {
        Self {
            generated_count: p.generated_count,
            skipped_count: p.skipped_count,
            skipped_dates: p.skipped_dates,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionResultTO {
    pub new_shifts: Vec<ShiftTO>,
    pub skipped_count: u32,
}

impl From<ExpansionResult> for ExpansionResultTO {
    fn from(r: ExpansionResult) -> Self {
        Self {
            new_shifts: r.new_shifts.iter().map(ShiftTO::from).collect(),
            skipped_count: r.skipped_count,
        }
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub weekday: u8,
    pub from_date: Date,
    pub until_date: Date,
    pub holiday_profile_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub skip_public_holidays: bool,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateFromRequest {
    pub from_date: Date,
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecurringShiftQueryParams {}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Recurring Shifts"], responses((status = 200, body = [RecurringShiftTO])))]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let rules: Arc<[RecurringShiftTO]> = rest_state
                .recurring_shift_service()
                .get_all(into_auth(context), None)
                .await?
                .iter()
                .map(RecurringShiftTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&rules).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/{id}", tags = ["Recurring Shifts"], params(("id" = Uuid, Path)), responses((status = 200, body = RecurringShiftTO)))]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let rule = rest_state
                .recurring_shift_service()
                .get(id, into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&RecurringShiftTO::from(&rule)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/preview", tags = ["Recurring Shifts"], request_body = PreviewRequest,
    responses((status = 200, body = ExpansionPreviewTO)),
)]
pub async fn preview<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(req): Json<PreviewRequest>,
) -> Response {
    error_handler(
        (async {
            let weekday = DayOfWeek::from_index0(req.weekday).unwrap_or(DayOfWeek::Monday);
            let result = rest_state
                .recurring_shift_service()
                .preview(
                    weekday,
                    req.from_date,
                    req.until_date,
                    req.holiday_profile_id,
                    req.skip_public_holidays,
                    into_auth(context),
                    None,
                )
                .await?;
            Ok(json_response(200, serde_json::to_string(&ExpansionPreviewTO::from(result)).unwrap()))
        })
        .await,
    )
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringShiftResponseTO {
    pub rule: RecurringShiftTO,
    pub expansion: ExpansionResultTO,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "", tags = ["Recurring Shifts"], request_body = RecurringShiftTO,
    responses((status = 201, body = CreateRecurringShiftResponseTO)),
)]
pub async fn create<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(rule): Json<RecurringShiftTO>,
) -> Response {
    error_handler(
        (async {
            let (rule, expansion) = rest_state
                .recurring_shift_service()
                .create(&(&rule).into(), into_auth(context), None)
                .await?;
            let body = CreateRecurringShiftResponseTO {
                rule: RecurringShiftTO::from(&rule),
                expansion: ExpansionResultTO::from(expansion),
            };
            Ok(json_response(201, serde_json::to_string(&body).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    put, path = "/{id}", tags = ["Recurring Shifts"],
    params(("id" = Uuid, Path)), request_body = RecurringShiftTO,
    responses((status = 200, body = RecurringShiftTO)),
)]
pub async fn update<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(mut rule): Json<RecurringShiftTO>,
) -> Response {
    error_handler(
        (async {
            if rule.id != Uuid::nil() && rule.id != id {
                return Err(RestError::InconsistentId(id, rule.id));
            }
            rule.id = id;
            let rule = rest_state
                .recurring_shift_service()
                .update(&(&rule).into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&RecurringShiftTO::from(&rule)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/{id}/update-from", tags = ["Recurring Shifts"],
    params(("id" = Uuid, Path)), request_body = RegenerateFromRequest,
    responses((status = 200, body = ExpansionResultTO)),
)]
pub async fn update_from<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(req): Json<RegenerateFromRequest>,
) -> Response {
    error_handler(
        (async {
            let result = rest_state
                .recurring_shift_service()
                .regenerate_from(id, req.from_date, into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&ExpansionResultTO::from(result)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    delete, path = "/{id}", tags = ["Recurring Shifts"],
    params(("id" = Uuid, Path)),
    responses((status = 204)),
)]
pub async fn delete<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            rest_state
                .recurring_shift_service()
                .soft_delete(id, into_auth(context), None)
                .await?;
            Ok(empty_response(204))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(get_all, get_one, preview, create, update, update_from, delete),
    components(schemas(
        RecurringShiftTO,
        ExpansionPreviewTO,
        ExpansionResultTO,
        PreviewRequest,
        RegenerateFromRequest,
        CreateRecurringShiftResponseTO
    ))
)]
pub struct RecurringShiftApiDoc;

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use serde::Deserialize;
use time::Date;
use tracing::instrument;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use service::holiday_profile::HolidayProfileService;
use service::ical::{IcalService, IcalShiftView};
use service::permission::{Authentication, Role, UserContext};
use service::shift::{ShiftListFilter, ShiftService};
use service::shift_template::ShiftTemplateService;
use service::skip_set::build_skip_set;

use crate::{error_handler, into_auth, json_response, session::Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/skip-dates", get(skip_dates::<RestState>))
        .route("/{token}.ics", get(ics_feed::<RestState>))
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SkipDatesQueryParams {
    pub from: Date,
    pub to: Date,
    pub holiday_profile_id: Option<Uuid>,
    #[serde(default)]
    pub skip_public_holidays: bool,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get, path = "/skip-dates", tags = ["Calendar"], params(SkipDatesQueryParams),
    responses((status = 200, description = "Dates a recurring rule would skip", body = [Date])),
)]
pub async fn skip_dates<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Query(params): Query<SkipDatesQueryParams>,
) -> Response {
    error_handler(
        (async {
            let detail = match params.holiday_profile_id {
                Some(id) => Some(
                    rest_state
                        .holiday_profile_service()
                        .get_detail(id, into_auth(context), None)
                        .await?,
                ),
                None => None,
            };
            let years: Vec<i32> = (params.from.year()..=params.to.year()).collect();
            let skip: BTreeSet<Date> = build_skip_set(
                detail.as_ref().map(|d| &d.profile),
                detail.as_ref().map(|d| d.vacation_periods.as_ref()).unwrap_or(&[]),
                detail.as_ref().map(|d| d.custom_holidays.as_ref()).unwrap_or(&[]),
                params.skip_public_holidays,
                years,
            );
            let dates: Vec<Date> = skip
                .into_iter()
                .filter(|d| *d >= params.from && *d <= params.to)
                .collect();
            Ok(json_response(200, serde_json::to_string(&dates).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get, path = "/{token}.ics", tags = ["Calendar"],
    params(("token" = String, Path, description = "Employee ical feed token")),
    responses((status = 200, description = "VCALENDAR document", content_type = "text/calendar"), (status = 404)),
)]
pub async fn ics_feed<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Path(token): Path<String>,
) -> Response {
    match render_feed(&rest_state, &token).await {
        Ok(body) => Response::builder()
            .status(200)
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(axum::body::Body::new(body.to_string()))
            .unwrap(),
        Err(err) => error_handler(Err(err)),
    }
}

async fn render_feed<RestState: RestStateDef<Context = Context>>(
    rest_state: &axum::extract::State<RestState>,
    token: &str,
) -> Result<Arc<str>, RestError> {
    let employee = rest_state
        .employee_service()
        .find_by_ical_token(token, None)
        .await?
        .ok_or(RestError::Service(service::ServiceError::EntityNotFoundGeneric))?;

    let context: Authentication<Context> = into_auth(UserContext {
        tenant_id: employee.tenant_id,
        user_id: employee.user_id.unwrap_or(Uuid::nil()),
        role: Role::Employee,
        employee_id: Some(employee.id),
    });

    let shifts = rest_state
        .shift_service()
        .get_all(
            ShiftListFilter {
                employee_id: Some(employee.id),
                from_date: None,
                to_date: None,
            },
            context.clone(),
            None,
        )
        .await?;
    let templates = rest_state.shift_template_service().get_all(context.clone(), None).await?;

    let views: Arc<[IcalShiftView]> = shifts
        .iter()
        .map(|shift| {
            let template_name = shift
                .template_id
                .and_then(|tid| templates.iter().find(|t| t.id == tid))
                .map(|t| t.name.clone());
            IcalShiftView {
                shift: shift.clone(),
                template_name,
                employee_name: Some(Arc::from(format!("{} {}", employee.first_name, employee.last_name))),
            }
        })
        .collect();

    let now = rest_state.ical_service().render(views, current_time_stamp())?;
    Ok(now)
}

fn current_time_stamp() -> time::PrimitiveDateTime {
    time::PrimitiveDateTime::new(
        time::OffsetDateTime::now_utc().date(),
        time::OffsetDateTime::now_utc().time(),
    )
}

#[derive(OpenApi)]
#[openapi(paths(skip_dates, ics_feed))]
pub struct CalendarApiDoc;

use std::sync::Arc;

use axum::extract::Path;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use service::holiday_profile::{CustomHoliday, HolidayProfile, HolidayProfileDetail, HolidayProfileService, VacationPeriod};

use crate::{empty_response, error_handler, into_auth, json_response, session::Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", post(create::<RestState>))
        .route("/active", get(get_active::<RestState>))
        .route("/school-vacations", post(create_with_school_vacations::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}", put(update::<RestState>))
        .route("/{id}", axum::routing::delete(delete::<RestState>))
        .route("/{id}/activate", post(activate::<RestState>))
        .route("/{id}/periods", post(add_period::<RestState>))
        .route("/{id}/periods/{pid}", axum::routing::delete(delete_period::<RestState>))
        .route("/{id}/custom-days", post(add_custom_day::<RestState>))
        .route("/{id}/custom-days/{did}", axum::routing::delete(delete_custom_day::<RestState>))
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayProfileTO {
    #[serde(default)]
    pub id: Uuid,
    pub name: Arc<str>,
    pub region_code: Arc<str>,
    #[serde(default)]
    pub active: bool,
}

impl From<&HolidayProfile> for HolidayProfileTO {
    fn from(p: &HolidayProfile) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            region_code: p.region_code.clone(),
            active: p.active,
        }
    }
}
impl From<&HolidayProfileTO> for HolidayProfile {
    fn from(to: &HolidayProfileTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            name: to.name.clone(),
            region_code: to.region_code.clone(),
            active: to.active,
            created_at: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VacationPeriodTO {
    #[serde(default)]
    pub id: Uuid,
    pub name: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default = "default_color")]
    pub color: Arc<str>,
}

impl From<&VacationPeriod> for VacationPeriodTO {
    fn from(v: &VacationPeriod) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            start_date: v.start_date,
            end_date: v.end_date,
            color: v.color.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomHolidayTO {
    #[serde(default)]
    pub id: Uuid,
    pub date: Date,
    pub name: Arc<str>,
    #[serde(default = "default_color")]
    pub color: Arc<str>,
}

impl From<&CustomHoliday> for CustomHolidayTO {
    fn from(h: &CustomHoliday) -> Self {
        Self {
            id: h.id,
            date: h.date,
            name: h.name.clone(),
            color: h.color.clone(),
        }
    }
}

fn default_color() -> Arc<str> {
    Arc::from("#4a90d9")
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayProfileDetailTO {
    pub profile: HolidayProfileTO,
    pub vacation_periods: Vec<VacationPeriodTO>,
    pub custom_holidays: Vec<CustomHolidayTO>,
}

impl From<&HolidayProfileDetail> for HolidayProfileDetailTO {
    fn from(d: &HolidayProfileDetail) -> Self {
        Self {
            profile: HolidayProfileTO::from(&d.profile),
            vacation_periods: d.vacation_periods.iter().map(VacationPeriodTO::from).collect(),
            custom_holidays: d.custom_holidays.iter().map(CustomHolidayTO::from).collect(),
        }
    }
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Holiday Profiles"], responses((status = 200, body = [HolidayProfileTO])))]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let profiles: Arc<[HolidayProfileTO]> = rest_state
                .holiday_profile_service()
                .get_all(into_auth(context), None)
                .await?
                .iter()
                .map(HolidayProfileTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&profiles).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/active", tags = ["Holiday Profiles"], responses((status = 200, body = Option<HolidayProfileTO>)))]
pub async fn get_active<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let profile = rest_state
                .holiday_profile_service()
                .get_active(into_auth(context), None)
                .await?;
            Ok(json_response(
                200,
                serde_json::to_string(&profile.as_ref().map(HolidayProfileTO::from)).unwrap(),
            ))
        })
        .await,
    )
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithSchoolVacationsRequest {
    pub name: Arc<str>,
    pub region_code: Arc<str>,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/school-vacations", tags = ["Holiday Profiles"], request_body = CreateWithSchoolVacationsRequest,
    responses((status = 201, body = HolidayProfileDetailTO)),
)]
pub async fn create_with_school_vacations<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(req): Json<CreateWithSchoolVacationsRequest>,
) -> Response {
    error_handler(
        (async {
            let detail = rest_state
                .holiday_profile_service()
                .create_with_school_vacations(&req.name, &req.region_code, into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&HolidayProfileDetailTO::from(&detail)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/{id}", tags = ["Holiday Profiles"], params(("id" = Uuid, Path)), responses((status = 200, body = HolidayProfileDetailTO)))]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let detail = rest_state
                .holiday_profile_service()
                .get_detail(id, into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&HolidayProfileDetailTO::from(&detail)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "", tags = ["Holiday Profiles"], request_body = HolidayProfileTO, responses((status = 201, body = HolidayProfileTO)))]
pub async fn create<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(profile): Json<HolidayProfileTO>,
) -> Response {
    error_handler(
        (async {
            let profile = rest_state
                .holiday_profile_service()
                .create(&(&profile).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&HolidayProfileTO::from(&profile)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(put, path = "/{id}", tags = ["Holiday Profiles"], params(("id" = Uuid, Path)), request_body = HolidayProfileTO, responses((status = 200, body = HolidayProfileTO)))]
pub async fn update<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(mut profile): Json<HolidayProfileTO>,
) -> Response {
    error_handler(
        (async {
            if profile.id != Uuid::nil() && profile.id != id {
                return Err(RestError::InconsistentId(id, profile.id));
            }
            profile.id = id;
            let profile = rest_state
                .holiday_profile_service()
                .update(&(&profile).into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&HolidayProfileTO::from(&profile)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "/{id}/activate", tags = ["Holiday Profiles"], params(("id" = Uuid, Path)), responses((status = 200, body = HolidayProfileTO)))]
pub async fn activate<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let profile = rest_state
                .holiday_profile_service()
                .activate(id, into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&HolidayProfileTO::from(&profile)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(delete, path = "/{id}", tags = ["Holiday Profiles"], params(("id" = Uuid, Path)), responses((status = 204), (status = 409, description = "Active recurring shift references the profile")))]
pub async fn delete<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            rest_state.holiday_profile_service().delete(id, into_auth(context), None).await?;
            Ok(empty_response(204))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "/{id}/periods", tags = ["Holiday Profiles"], params(("id" = Uuid, Path)), request_body = VacationPeriodTO, responses((status = 201, body = VacationPeriodTO)))]
pub async fn add_period<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(period): Json<VacationPeriodTO>,
) -> Response {
    error_handler(
        (async {
            let period = service::holiday_profile::VacationPeriod {
                id: period.id,
                profile_id: id,
                tenant_id: Uuid::nil(),
                name: period.name,
                start_date: period.start_date,
                end_date: period.end_date,
                color: period.color,
            };
            let period = rest_state
                .holiday_profile_service()
                .add_vacation_period(&period, into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&VacationPeriodTO::from(&period)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(delete, path = "/{id}/periods/{pid}", tags = ["Holiday Profiles"], params(("id" = Uuid, Path), ("pid" = Uuid, Path)), responses((status = 204)))]
pub async fn delete_period<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path((id, pid)): Path<(Uuid, Uuid)>,
) -> Response {
    error_handler(
        (async {
            rest_state
                .holiday_profile_service()
                .delete_vacation_period(id, pid, into_auth(context), None)
                .await?;
            Ok(empty_response(204))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "/{id}/custom-days", tags = ["Holiday Profiles"], params(("id" = Uuid, Path)), request_body = CustomHolidayTO, responses((status = 201, body = CustomHolidayTO)))]
pub async fn add_custom_day<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(holiday): Json<CustomHolidayTO>,
) -> Response {
    error_handler(
        (async {
            let holiday = service::holiday_profile::CustomHoliday {
                id: holiday.id,
                profile_id: id,
                tenant_id: Uuid::nil(),
                date: holiday.date,
                name: holiday.name,
                color: holiday.color,
            };
            let holiday = rest_state
                .holiday_profile_service()
                .add_custom_holiday(&holiday, into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&CustomHolidayTO::from(&holiday)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(delete, path = "/{id}/custom-days/{did}", tags = ["Holiday Profiles"], params(("id" = Uuid, Path), ("did" = Uuid, Path)), responses((status = 204)))]
pub async fn delete_custom_day<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path((id, did)): Path<(Uuid, Uuid)>,
) -> Response {
    error_handler(
        (async {
            rest_state
                .holiday_profile_service()
                .delete_custom_holiday(id, did, into_auth(context), None)
                .await?;
            Ok(empty_response(204))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all, get_one, get_active, create, create_with_school_vacations, update, activate, delete,
        add_period, delete_period, add_custom_day, delete_custom_day
    ),
    components(schemas(
        HolidayProfileTO, HolidayProfileDetailTO, VacationPeriodTO, CustomHolidayTO, CreateWithSchoolVacationsRequest
    ))
)]
pub struct HolidayProfileApiDoc;

use std::sync::Arc;

use axum::extract::Path;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use service::absence::{AbsenceService, AbsenceStatus, AbsenceType, CareRecipientAbsence, EmployeeAbsence};

use crate::{error_handler, into_auth, json_response, session::Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", post(create::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}/status", put(set_status::<RestState>))
        .route("/care-recipients", get(get_all_care_recipient::<RestState>))
        .route("/care-recipients", post(create_care_recipient::<RestState>))
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AbsenceTypeTO {
    Vacation,
    Sick,
    SchoolHoliday,
    Other,
}

impl From<AbsenceType> for AbsenceTypeTO {
    fn from(t: AbsenceType) -> Self {
        match t {
            AbsenceType::Vacation => Self::Vacation,
            AbsenceType::Sick => Self::Sick,
            AbsenceType::SchoolHoliday => Self::SchoolHoliday,
            AbsenceType::Other => Self::Other,
        }
    }
}
impl From<AbsenceTypeTO> for AbsenceType {
    fn from(t: AbsenceTypeTO) -> Self {
        match t {
            AbsenceTypeTO::Vacation => Self::Vacation,
            AbsenceTypeTO::Sick => Self::Sick,
            AbsenceTypeTO::SchoolHoliday => Self::SchoolHoliday,
            AbsenceTypeTO::Other => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AbsenceStatusTO {
    Pending,
    Approved,
    Rejected,
}

impl From<AbsenceStatus> for AbsenceStatusTO {
    fn from(s: AbsenceStatus) -> Self {
        match s {
            AbsenceStatus::Pending => Self::Pending,
            AbsenceStatus::Approved => Self::Approved,
            AbsenceStatus::Rejected => Self::Rejected,
        }
    }
}
impl From<AbsenceStatusTO> for AbsenceStatus {
    fn from(s: AbsenceStatusTO) -> Self {
        match s {
            AbsenceStatusTO::Pending => Self::Pending,
            AbsenceStatusTO::Approved => Self::Approved,
            AbsenceStatusTO::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAbsenceTO {
    #[serde(default)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub absence_type: AbsenceTypeTO,
    pub start_date: Date,
    pub end_date: Date,
    pub days_count: Option<i32>,
    #[serde(default = "default_status")]
    pub status: AbsenceStatusTO,
    pub notes: Option<Arc<str>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<PrimitiveDateTime>,
}

fn default_status() -> AbsenceStatusTO {
    AbsenceStatusTO::Pending
}

impl From<&EmployeeAbsence> for EmployeeAbsenceTO {
    fn from(a: &EmployeeAbsence) -> Self {
        Self {
            id: a.id,
            employee_id: a.employee_id,
            absence_type: a.absence_type.into(),
            start_date: a.start_date,
            end_date: a.end_date,
            days_count: a.days_count,
            status: a.status.into(),
            notes: a.notes.clone(),
            approved_by: a.approved_by,
            approved_at: a.approved_at,
        }
    }
}
impl From<&EmployeeAbsenceTO> for EmployeeAbsence {
    fn from(to: &EmployeeAbsenceTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            employee_id: to.employee_id,
            absence_type: to.absence_type.into(),
            start_date: to.start_date,
            end_date: to.end_date,
            days_count: to.days_count,
            status: to.status.into(),
            notes: to.notes.clone(),
            approved_by: to.approved_by,
            approved_at: to.approved_at,
            created_at: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareRecipientAbsenceTO {
    #[serde(default)]
    pub id: Uuid,
    pub care_recipient_name: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub notes: Option<Arc<str>>,
}

impl From<&CareRecipientAbsence> for CareRecipientAbsenceTO {
    fn from(a: &CareRecipientAbsence) -> Self {
        Self {
            id: a.id,
            care_recipient_name: a.care_recipient_name.clone(),
            start_date: a.start_date,
            end_date: a.end_date,
            notes: a.notes.clone(),
        }
    }
}
impl From<&CareRecipientAbsenceTO> for CareRecipientAbsence {
    fn from(to: &CareRecipientAbsenceTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            care_recipient_name: to.care_recipient_name.clone(),
            start_date: to.start_date,
            end_date: to.end_date,
            notes: to.notes.clone(),
            created_at: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAbsenceStatusRequest {
    pub status: AbsenceStatusTO,
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Absences"], responses((status = 200, body = [EmployeeAbsenceTO])))]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let absences: Arc<[EmployeeAbsenceTO]> = rest_state
                .absence_service()
                .get_all(into_auth(context), None)
                .await?
                .iter()
                .map(EmployeeAbsenceTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&absences).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/{id}", tags = ["Absences"], params(("id" = Uuid, Path)), responses((status = 200, body = EmployeeAbsenceTO)))]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let absence = rest_state.absence_service().get(id, into_auth(context), None).await?;
            Ok(json_response(200, serde_json::to_string(&EmployeeAbsenceTO::from(&absence)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "", tags = ["Absences"], request_body = EmployeeAbsenceTO, responses((status = 201, body = EmployeeAbsenceTO)))]
pub async fn create<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(absence): Json<EmployeeAbsenceTO>,
) -> Response {
    error_handler(
        (async {
            let absence = rest_state
                .absence_service()
                .create(&(&absence).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&EmployeeAbsenceTO::from(&absence)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    put, path = "/{id}/status", tags = ["Absences"],
    params(("id" = Uuid, Path)), request_body = SetAbsenceStatusRequest,
    responses((status = 200, body = EmployeeAbsenceTO), (status = 409, description = "Overlapping shift conflict")),
)]
pub async fn set_status<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetAbsenceStatusRequest>,
) -> Response {
    error_handler(
        (async {
            let absence = rest_state
                .absence_service()
                .set_status(id, req.status.into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&EmployeeAbsenceTO::from(&absence)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/care-recipients", tags = ["Absences"], responses((status = 200, body = [CareRecipientAbsenceTO])))]
pub async fn get_all_care_recipient<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let absences: Arc<[CareRecipientAbsenceTO]> = rest_state
                .absence_service()
                .get_all_care_recipient(into_auth(context), None)
                .await?
                .iter()
                .map(CareRecipientAbsenceTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&absences).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/care-recipients", tags = ["Absences"], request_body = CareRecipientAbsenceTO,
    responses((status = 201, body = CareRecipientAbsenceTO)),
)]
pub async fn create_care_recipient<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(absence): Json<CareRecipientAbsenceTO>,
) -> Response {
    error_handler(
        (async {
            let absence = rest_state
                .absence_service()
                .create_care_recipient(&(&absence).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&CareRecipientAbsenceTO::from(&absence)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(get_all, get_one, create, set_status, get_all_care_recipient, create_care_recipient),
    components(schemas(EmployeeAbsenceTO, CareRecipientAbsenceTO, AbsenceTypeTO, AbsenceStatusTO, SetAbsenceStatusRequest))
)]
pub struct AbsenceApiDoc;

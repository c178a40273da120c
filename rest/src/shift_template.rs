use std::sync::Arc;

use axum::extract::Path;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use time::{Date, Time};
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use service::shift_template::{ShiftTemplate, ShiftTemplateService};
use vera_utils::DayOfWeek;

use crate::{error_handler, into_auth, json_response, session::Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new()
        .route("/", get(get_all::<RestState>))
        .route("/", post(create::<RestState>))
        .route("/{id}", get(get_one::<RestState>))
        .route("/{id}", put(update::<RestState>))
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTemplateTO {
    #[serde(default)]
    pub id: Uuid,
    pub name: Arc<str>,
    pub weekdays: Vec<u8>,
    pub start_time: Time,
    pub end_time: Time,
    #[serde(default)]
    pub break_minutes: i32,
    pub location: Option<Arc<str>>,
    #[serde(default)]
    pub required_skills: Vec<Arc<str>>,
    #[serde(default = "default_color")]
    pub color: Arc<str>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub valid_from: Option<Date>,
    pub valid_until: Option<Date>,
}

fn default_color() -> Arc<str> {
    Arc::from("#4a90d9")
}
fn default_true() -> bool {
    true
}

impl From<&ShiftTemplate> for ShiftTemplateTO {
    fn from(t: &ShiftTemplate) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            weekdays: t.weekdays.iter().map(|d| d.to_index0()).collect(),
            start_time: t.start_time,
            end_time: t.end_time,
            break_minutes: t.break_minutes,
            location: t.location.clone(),
            required_skills: t.required_skills.to_vec(),
            color: t.color.clone(),
            active: t.active,
            valid_from: t.valid_from,
            valid_until: t.valid_until,
        }
    }
}
impl From<&ShiftTemplateTO> for ShiftTemplate {
    fn from(to: &ShiftTemplateTO) -> Self {
        Self {
            id: to.id,
            tenant_id: Uuid::nil(),
            name: to.name.clone(),
            weekdays: to.weekdays.iter().filter_map(|d| DayOfWeek::from_index0(*d)).collect(),
            start_time: to.start_time,
            end_time: to.end_time,
            break_minutes: to.break_minutes,
            location: to.location.clone(),
            required_skills: to.required_skills.clone().into(),
            color: to.color.clone(),
            active: to.active,
            valid_from: to.valid_from,
            valid_until: to.valid_until,
        }
    }
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "", tags = ["Shift Templates"], responses((status = 200, body = [ShiftTemplateTO])))]
pub async fn get_all<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let templates: Arc<[ShiftTemplateTO]> = rest_state
                .shift_template_service()
                .get_all(into_auth(context), None)
                .await?
                .iter()
                .map(ShiftTemplateTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&templates).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(get, path = "/{id}", tags = ["Shift Templates"], params(("id" = Uuid, Path)), responses((status = 200, body = ShiftTemplateTO)))]
pub async fn get_one<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let template = rest_state
                .shift_template_service()
                .get(id, into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&ShiftTemplateTO::from(&template)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(post, path = "", tags = ["Shift Templates"], request_body = ShiftTemplateTO, responses((status = 201, body = ShiftTemplateTO)))]
pub async fn create<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Json(template): Json<ShiftTemplateTO>,
) -> Response {
    error_handler(
        (async {
            let template = rest_state
                .shift_template_service()
                .create(&(&template).into(), into_auth(context), None)
                .await?;
            Ok(json_response(201, serde_json::to_string(&ShiftTemplateTO::from(&template)).unwrap()))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(put, path = "/{id}", tags = ["Shift Templates"], params(("id" = Uuid, Path)), request_body = ShiftTemplateTO, responses((status = 200, body = ShiftTemplateTO)))]
pub async fn update<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(mut template): Json<ShiftTemplateTO>,
) -> Response {
    error_handler(
        (async {
            if template.id != Uuid::nil() && template.id != id {
                return Err(RestError::InconsistentId(id, template.id));
            }
            template.id = id;
            let template = rest_state
                .shift_template_service()
                .update(&(&template).into(), into_auth(context), None)
                .await?;
            Ok(json_response(200, serde_json::to_string(&ShiftTemplateTO::from(&template)).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(paths(get_all, get_one, create, update), components(schemas(ShiftTemplateTO)))]
pub struct ShiftTemplateApiDoc;

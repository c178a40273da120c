use std::sync::Arc;

use axum::extract::Query;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use tracing::instrument;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use service::audit_log::{AuditLogRecord, AuditLogService};

use crate::{error_handler, into_auth, json_response, session::Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new().route("/", get(find_for_entity::<RestState>))
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogRecordTO {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub entity_type: Arc<str>,
    pub entity_id: Option<Uuid>,
    pub action: Arc<str>,
    pub old_values: Option<Arc<str>>,
    pub new_values: Option<Arc<str>>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&AuditLogRecord> for AuditLogRecordTO {
    fn from(r: &AuditLogRecord) -> Self {
        Self {
            id: r.id,
            tenant_id: r.tenant_id,
            user_id: r.user_id,
            entity_type: r.entity_type.clone(),
            entity_id: r.entity_id,
            action: r.action.clone(),
            old_values: r.old_values.clone(),
            new_values: r.new_values.clone(),
            created_at: r.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditLogQueryParams {
    pub entity_type: Arc<str>,
    pub entity_id: Uuid,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get, path = "", tags = ["Audit Log"], params(AuditLogQueryParams),
    responses((status = 200, body = [AuditLogRecordTO])),
)]
pub async fn find_for_entity<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
    Query(params): Query<AuditLogQueryParams>,
) -> Response {
    error_handler(
        (async {
            let records: Arc<[AuditLogRecordTO]> = rest_state
                .audit_log_service()
                .find_for_entity(&params.entity_type, params.entity_id, into_auth(context), None)
                .await?
                .iter()
                .map(AuditLogRecordTO::from)
                .collect();
            Ok(json_response(200, serde_json::to_string(&records).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(paths(find_for_entity), components(schemas(AuditLogRecordTO)))]
pub struct AuditLogApiDoc;

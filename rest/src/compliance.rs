use std::sync::Arc;

use axum::response::Response;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Serialize;
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};

use service::compliance::{ComplianceEvaluation, ComplianceMessage, ComplianceService};

use crate::shift::ShiftTO;
use crate::{error_handler, into_auth, json_response, session::Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef<Context = Context>>() -> Router<RestState> {
    Router::new().route("/violations", post(list_violations::<RestState>))
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComplianceMessageTO {
    RestPeriodTooShort { gap_hours: f64 },
    BreakTooShort { worked_hours: f64, break_minutes: i32 },
    MinijobMonthlyLimitExceeded { total: f64 },
    MinijobAnnualLimitWarning { ytd: f64, limit: f64 },
    MinijobAnnualLimitExceeded { ytd: f64, limit: f64 },
    PublicHoliday,
}

impl From<&ComplianceMessage> for ComplianceMessageTO {
    fn from(m: &ComplianceMessage) -> Self {
        match *m {
            ComplianceMessage::RestPeriodTooShort { gap_hours } => Self::RestPeriodTooShort { gap_hours },
            ComplianceMessage::BreakTooShort { worked_hours, break_minutes } => {
                Self::BreakTooShort { worked_hours, break_minutes }
            }
            ComplianceMessage::MinijobMonthlyLimitExceeded { total } => Self::MinijobMonthlyLimitExceeded { total },
            ComplianceMessage::MinijobAnnualLimitWarning { ytd, limit } => {
                Self::MinijobAnnualLimitWarning { ytd, limit }
            }
            ComplianceMessage::MinijobAnnualLimitExceeded { ytd, limit } => {
                Self::MinijobAnnualLimitExceeded { ytd, limit }
            }
            ComplianceMessage::PublicHoliday => Self::PublicHoliday,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceEvaluationTO {
    pub violations: Vec<ComplianceMessageTO>,
    pub warnings: Vec<ComplianceMessageTO>,
}

impl From<&ComplianceEvaluation> for ComplianceEvaluationTO {
    fn from(e: &ComplianceEvaluation) -> Self {
        Self {
            violations: e.violations.iter().map(ComplianceMessageTO::from).collect(),
            warnings: e.warnings.iter().map(ComplianceMessageTO::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftComplianceTO {
    pub shift: ShiftTO,
    pub evaluation: ComplianceEvaluationTO,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post, path = "/violations", tags = ["Compliance"],
    responses((status = 200, body = [ShiftComplianceTO])),
)]
pub async fn list_violations<RestState: RestStateDef<Context = Context>>(
    rest_state: axum::extract::State<RestState>,
    Extension(context): Extension<Context>,
) -> Response {
    error_handler(
        (async {
            let entries: Arc<[ShiftComplianceTO]> = rest_state
                .compliance_service()
                .list_violations(into_auth(context), None)
                .await?
                .iter()
                .map(|(shift, evaluation)| ShiftComplianceTO {
                    shift: ShiftTO::from(shift),
                    evaluation: ComplianceEvaluationTO::from(evaluation),
                })
                .collect();
            Ok(json_response(200, serde_json::to_string(&entries).unwrap()))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(list_violations),
    components(schemas(ComplianceMessageTO, ComplianceEvaluationTO, ShiftComplianceTO))
)]
pub struct ComplianceApiDoc;

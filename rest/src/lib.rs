use std::fmt::Debug;
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use dao::Transaction;
use service::absence::AbsenceService;
use service::audit_log::AuditLogService;
use service::compliance::ComplianceService;
use service::config::ConfigService;
use service::contract_history::ContractHistoryService;
use service::employee::EmployeeService;
use service::holiday_profile::HolidayProfileService;
use service::ical::IcalService;
use service::payroll::PayrollService;
use service::permission::{Authentication, PermissionService};
use service::recurring_shift::RecurringShiftService;
use service::shift::ShiftService;
use service::shift_template::ShiftTemplateService;
use thiserror::Error;
use tower_cookies::CookieManagerLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod absence;
pub mod audit_log;
pub mod calendar;
pub mod compliance;
pub mod config;
pub mod contract_history;
pub mod employee;
pub mod holiday_profile;
pub mod payroll;
pub mod recurring_shift;
pub mod session;
pub mod shift;
pub mod shift_template;

pub use session::Context;

/// Everything a handler needs from the composition root, kept generic over
/// `Context` the same way the service layer is. One associated type and
/// accessor method per domain service, mirroring how services accumulate
/// dependencies via `gen_service_impl!`.
pub trait RestStateDef: Clone + Send + Sync + 'static {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;
    type Transaction: Transaction + Send + Sync + Clone + Debug + 'static;

    type PermissionService: PermissionService<Context = Self::Context> + Send + Sync + 'static;
    type ShiftService: ShiftService<Context = Self::Context, Transaction = Self::Transaction> + Send + Sync + 'static;
    type ShiftTemplateService: ShiftTemplateService<Context = Self::Context, Transaction = Self::Transaction>
        + Send
        + Sync
        + 'static;
    type RecurringShiftService: RecurringShiftService<Context = Self::Context, Transaction = Self::Transaction>
        + Send
        + Sync
        + 'static;
    type HolidayProfileService: HolidayProfileService<Context = Self::Context, Transaction = Self::Transaction>
        + Send
        + Sync
        + 'static;
    type AbsenceService: AbsenceService<Context = Self::Context, Transaction = Self::Transaction> + Send + Sync + 'static;
    type ComplianceService: ComplianceService<Context = Self::Context, Transaction = Self::Transaction>
        + Send
        + Sync
        + 'static;
    type PayrollService: PayrollService<Context = Self::Context, Transaction = Self::Transaction> + Send + Sync + 'static;
    type EmployeeService: EmployeeService<Context = Self::Context, Transaction = Self::Transaction> + Send + Sync + 'static;
    type ContractHistoryService: ContractHistoryService<Context = Self::Context, Transaction = Self::Transaction>
        + Send
        + Sync
        + 'static;
    type AuditLogService: AuditLogService<Context = Self::Context, Transaction = Self::Transaction> + Send + Sync + 'static;
    type ConfigService: ConfigService + Send + Sync + 'static;
    type IcalService: IcalService + Send + Sync + 'static;

    fn backend_version(&self) -> Arc<str>;

    fn permission_service(&self) -> Arc<Self::PermissionService>;
    fn shift_service(&self) -> Arc<Self::ShiftService>;
    fn shift_template_service(&self) -> Arc<Self::ShiftTemplateService>;
    fn recurring_shift_service(&self) -> Arc<Self::RecurringShiftService>;
    fn holiday_profile_service(&self) -> Arc<Self::HolidayProfileService>;
    fn absence_service(&self) -> Arc<Self::AbsenceService>;
    fn compliance_service(&self) -> Arc<Self::ComplianceService>;
    fn payroll_service(&self) -> Arc<Self::PayrollService>;
    fn employee_service(&self) -> Arc<Self::EmployeeService>;
    fn contract_history_service(&self) -> Arc<Self::ContractHistoryService>;
    fn audit_log_service(&self) -> Arc<Self::AuditLogService>;
    fn config_service(&self) -> Arc<Self::ConfigService>;
    fn ical_service(&self) -> Arc<Self::IcalService>;
}

#[derive(Debug, Error)]
pub enum RestError {
    #[error("service error: {0}")]
    Service(#[from] service::ServiceError),
    #[error("path id {0} does not match body id {1}")]
    InconsistentId(uuid::Uuid, uuid::Uuid),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<std::num::ParseIntError> for RestError {
    fn from(err: std::num::ParseIntError) -> Self {
        RestError::BadRequest(err.to_string())
    }
}

pub(crate) fn error_handler(result: Result<Response, RestError>) -> Response {
    match result {
        Ok(response) => response,
        Err(RestError::Service(service::ServiceError::Forbidden)) => {
            Response::builder().status(403).body(Body::empty()).unwrap()
        }
        Err(RestError::Service(service::ServiceError::Unauthenticated)) => {
            Response::builder().status(401).body(Body::empty()).unwrap()
        }
        Err(RestError::Service(service::ServiceError::EntityNotFound(_)))
        | Err(RestError::Service(service::ServiceError::EntityNotFoundGeneric)) => {
            Response::builder().status(404).body(Body::empty()).unwrap()
        }
        Err(RestError::Service(service::ServiceError::EntityAlreadyExists))
        | Err(RestError::Service(service::ServiceError::EntityConflicts(_))) => {
            Response::builder().status(409).body(Body::empty()).unwrap()
        }
        Err(err @ RestError::Service(service::ServiceError::ValidationError(_)))
        | Err(err @ RestError::Service(service::ServiceError::DateOrderWrong))
        | Err(err @ RestError::Service(service::ServiceError::TimeOrderWrong))
        | Err(err @ RestError::Service(service::ServiceError::OverlappingTimeRange))
        | Err(err @ RestError::Service(service::ServiceError::IdSetOnCreate))
        | Err(err @ RestError::Service(service::ServiceError::VersionSetOnCreate))
        | Err(err @ RestError::Service(service::ServiceError::CreatedSetOnCreate))
        | Err(err @ RestError::Service(service::ServiceError::DeletedSetOnCreate))
        | Err(err @ RestError::BadRequest(_))
        | Err(err @ RestError::InconsistentId(_, _)) => Response::builder()
            .status(400)
            .body(Body::new(err.to_string()))
            .unwrap(),
        Err(RestError::Service(service::ServiceError::DatabaseQueryError(e))) => {
            tracing::error!(error = %e, "database query error");
            Response::builder().status(500).body(Body::empty()).unwrap()
        }
        Err(RestError::Service(service::ServiceError::InternalError)) => {
            Response::builder().status(500).body(Body::empty()).unwrap()
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "VERA scheduling core", description = "Multi-tenant workforce scheduling and compliance API"),
    nest(
        (path = "/api/shifts", api = shift::ShiftApiDoc),
        (path = "/api/shift-templates", api = shift_template::ShiftTemplateApiDoc),
        (path = "/api/recurring-shifts", api = recurring_shift::RecurringShiftApiDoc),
        (path = "/api/holiday-profiles", api = holiday_profile::HolidayProfileApiDoc),
        (path = "/api/absences", api = absence::AbsenceApiDoc),
        (path = "/api/compliance", api = compliance::ComplianceApiDoc),
        (path = "/api/payroll", api = payroll::PayrollApiDoc),
        (path = "/api/employees", api = employee::EmployeeApiDoc),
        (path = "/api/audit-log", api = audit_log::AuditLogApiDoc),
        (path = "/api/config", api = config::ConfigApiDoc),
        (path = "/api/employees/{employee_id}/contracts", api = contract_history::ContractHistoryApiDoc),
        (path = "/calendar", api = calendar::CalendarApiDoc),
    )
)]
struct ApiDoc;

pub async fn start_server<RestState>(rest_state: RestState)
where
    RestState: RestStateDef<Context = session::Context>,
{
    let app = Router::new()
        .nest("/api/shifts", shift::generate_route::<RestState>())
        .nest("/api/shift-templates", shift_template::generate_route::<RestState>())
        .nest("/api/recurring-shifts", recurring_shift::generate_route::<RestState>())
        .nest("/api/holiday-profiles", holiday_profile::generate_route::<RestState>())
        .nest("/api/absences", absence::generate_route::<RestState>())
        .nest("/api/compliance", compliance::generate_route::<RestState>())
        .nest("/api/payroll", payroll::generate_route::<RestState>())
        .nest("/api/employees", employee::generate_route::<RestState>())
        .nest(
            "/api/employees/{employee_id}/contracts",
            contract_history::generate_route::<RestState>(),
        )
        .nest("/api/audit-log", audit_log::generate_route::<RestState>())
        .nest("/api/config", config::generate_route::<RestState>())
        .nest("/calendar", calendar::generate_route::<RestState>())
        .layer(axum::middleware::from_fn(session::forbid_unauthenticated::<RestState>))
        .layer(axum::middleware::from_fn(session::context_extractor::<RestState>))
        .layer(CookieManagerLayer::new())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(rest_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("could not bind server");
    axum::serve(listener, app).await.expect("could not start server");
}

pub(crate) fn json_response(status: u16, body: String) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::new(body))
        .unwrap()
}

pub(crate) fn empty_response(status: u16) -> Response {
    Response::builder().status(status).body(Body::empty()).unwrap()
}

pub(crate) fn into_auth<Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static>(
    context: Context,
) -> Authentication<Context> {
    Authentication::Context(context)
}

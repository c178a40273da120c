use std::sync::Arc;

use dao_impl_sqlite::{
    absence::{CareRecipientAbsenceDaoImpl, EmployeeAbsenceDaoImpl},
    audit_log::AuditLogDaoImpl,
    contract_history::ContractHistoryDaoImpl,
    employee::EmployeeDaoImpl,
    holiday_profile::{CustomHolidayDaoImpl, HolidayProfileDaoImpl, VacationPeriodDaoImpl},
    notification_log::NotificationLogDaoImpl,
    payroll::{HoursCarryoverDaoImpl, PayrollEntryDaoImpl},
    recurring_shift::RecurringShiftDaoImpl,
    shift::ShiftDaoImpl,
    shift_template::ShiftTemplateDaoImpl,
    TransactionDaoImpl, TransactionImpl,
};
use service::permission::{Role, UserContext};
#[cfg(feature = "json_logging")]
use tracing_subscriber::fmt::format::FmtSpan;

type Context = UserContext;
type Transaction = TransactionImpl;
type TransactionDao = TransactionDaoImpl;
type ShiftDao = ShiftDaoImpl;
type ShiftTemplateDao = ShiftTemplateDaoImpl;
type RecurringShiftDao = RecurringShiftDaoImpl;
type HolidayProfileDao = HolidayProfileDaoImpl;
type VacationPeriodDao = VacationPeriodDaoImpl;
type CustomHolidayDao = CustomHolidayDaoImpl;
type EmployeeAbsenceDao = EmployeeAbsenceDaoImpl;
type CareRecipientAbsenceDao = CareRecipientAbsenceDaoImpl;
type PayrollEntryDao = PayrollEntryDaoImpl;
type HoursCarryoverDao = HoursCarryoverDaoImpl;
type EmployeeDao = EmployeeDaoImpl;
type ContractHistoryDao = ContractHistoryDaoImpl;
type AuditLogDao = AuditLogDaoImpl;
type NotificationLogDao = NotificationLogDaoImpl;

type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;
type ConfigService = service_impl::config::ConfigServiceImpl;
type IcalService = service_impl::ical::IcalServiceImpl;
type PermissionService = service_impl::permission::PermissionServiceImpl;

pub struct EmployeeServiceDependencies;
impl service_impl::employee::EmployeeServiceDeps for EmployeeServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type EmployeeDao = EmployeeDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type EmployeeService = service_impl::employee::EmployeeServiceImpl<EmployeeServiceDependencies>;

pub struct ContractHistoryServiceDependencies;
impl service_impl::contract_history::ContractHistoryServiceDeps for ContractHistoryServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type ContractHistoryDao = ContractHistoryDao;
    type EmployeeDao = EmployeeDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type ContractHistoryService =
    service_impl::contract_history::ContractHistoryServiceImpl<ContractHistoryServiceDependencies>;

pub struct ShiftTemplateServiceDependencies;
impl service_impl::shift_template::ShiftTemplateServiceDeps for ShiftTemplateServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type ShiftTemplateDao = ShiftTemplateDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type ShiftTemplateService =
    service_impl::shift_template::ShiftTemplateServiceImpl<ShiftTemplateServiceDependencies>;

pub struct AuditLogServiceDependencies;
impl service_impl::audit_log::AuditLogServiceDeps for AuditLogServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type AuditLogDao = AuditLogDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type AuditLogService = service_impl::audit_log::AuditLogServiceImpl<AuditLogServiceDependencies>;

pub struct ComplianceServiceDependencies;
impl service_impl::compliance::ComplianceServiceDeps for ComplianceServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type ShiftDao = ShiftDao;
    type EmployeeDao = EmployeeDao;
    type PayrollEntryDao = PayrollEntryDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ConfigService = ConfigService;
}
type ComplianceService = service_impl::compliance::ComplianceServiceImpl<ComplianceServiceDependencies>;

pub struct NotificationDispatcherDependencies;
impl service_impl::notification::NotificationDispatcherDeps for NotificationDispatcherDependencies {
    type Transaction = Transaction;
    type EmployeeDao = EmployeeDao;
    type NotificationLogDao = NotificationLogDao;
    type TransactionDao = TransactionDao;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type NotificationDispatcher =
    service_impl::notification::NotificationDispatcherImpl<NotificationDispatcherDependencies>;

pub struct ShiftServiceDependencies;
impl service_impl::shift::ShiftServiceDeps for ShiftServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type ShiftDao = ShiftDao;
    type AuditLogDao = AuditLogDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type ComplianceService = ComplianceService;
    type NotificationDispatcher = NotificationDispatcher;
}
type ShiftService = service_impl::shift::ShiftServiceImpl<ShiftServiceDependencies>;

pub struct RecurringShiftServiceDependencies;
impl service_impl::recurring_shift::RecurringShiftServiceDeps for RecurringShiftServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type RecurringShiftDao = RecurringShiftDao;
    type ShiftDao = ShiftDao;
    type HolidayProfileDao = HolidayProfileDao;
    type VacationPeriodDao = VacationPeriodDao;
    type CustomHolidayDao = CustomHolidayDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type RecurringShiftService =
    service_impl::recurring_shift::RecurringShiftServiceImpl<RecurringShiftServiceDependencies>;

pub struct HolidayProfileServiceDependencies;
impl service_impl::holiday_profile::HolidayProfileServiceDeps for HolidayProfileServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type HolidayProfileDao = HolidayProfileDao;
    type VacationPeriodDao = VacationPeriodDao;
    type CustomHolidayDao = CustomHolidayDao;
    type RecurringShiftDao = RecurringShiftDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
}
type HolidayProfileService =
    service_impl::holiday_profile::HolidayProfileServiceImpl<HolidayProfileServiceDependencies>;

pub struct AbsenceServiceDependencies;
impl service_impl::absence::AbsenceServiceDeps for AbsenceServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type EmployeeAbsenceDao = EmployeeAbsenceDao;
    type CareRecipientAbsenceDao = CareRecipientAbsenceDao;
    type ShiftDao = ShiftDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type NotificationDispatcher = NotificationDispatcher;
}
type AbsenceService = service_impl::absence::AbsenceServiceImpl<AbsenceServiceDependencies>;

pub struct PayrollServiceDependencies;
impl service_impl::payroll::PayrollServiceDeps for PayrollServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type PayrollEntryDao = PayrollEntryDao;
    type HoursCarryoverDao = HoursCarryoverDao;
    type ShiftDao = ShiftDao;
    type TransactionDao = TransactionDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type ConfigService = ConfigService;
    type EmployeeService = EmployeeService;
    type ContractHistoryService = ContractHistoryService;
}
type PayrollService = service_impl::payroll::PayrollServiceImpl<PayrollServiceDependencies>;

pub struct SchedulerServiceDependencies;
impl service_impl::scheduler::SchedulerServiceDeps for SchedulerServiceDependencies {
    type Transaction = Transaction;
    type PayrollContext = Context;
    type EmployeeDao = EmployeeDao;
    type ShiftDao = ShiftDao;
    type TransactionDao = TransactionDao;
    type NotificationDispatcher = NotificationDispatcher;
    type PayrollService = PayrollService;

    fn payroll_context_for_tenant(tenant_id: uuid::Uuid) -> Self::PayrollContext {
        UserContext {
            tenant_id,
            user_id: uuid::Uuid::nil(),
            role: Role::Admin,
            employee_id: None,
        }
    }
}
type SchedulerServiceImpl = service_impl::scheduler::SchedulerServiceImpl<SchedulerServiceDependencies>;

#[derive(Clone)]
pub struct RestStateImpl {
    permission_service: Arc<PermissionService>,
    shift_service: Arc<ShiftService>,
    shift_template_service: Arc<ShiftTemplateService>,
    recurring_shift_service: Arc<RecurringShiftService>,
    holiday_profile_service: Arc<HolidayProfileService>,
    absence_service: Arc<AbsenceService>,
    compliance_service: Arc<ComplianceService>,
    payroll_service: Arc<PayrollService>,
    employee_service: Arc<EmployeeService>,
    contract_history_service: Arc<ContractHistoryService>,
    audit_log_service: Arc<AuditLogService>,
    config_service: Arc<ConfigService>,
    ical_service: Arc<IcalService>,
}
impl rest::RestStateDef for RestStateImpl {
    type Context = Context;
    type Transaction = Transaction;

    type PermissionService = PermissionService;
    type ShiftService = ShiftService;
    type ShiftTemplateService = ShiftTemplateService;
    type RecurringShiftService = RecurringShiftService;
    type HolidayProfileService = HolidayProfileService;
    type AbsenceService = AbsenceService;
    type ComplianceService = ComplianceService;
    type PayrollService = PayrollService;
    type EmployeeService = EmployeeService;
    type ContractHistoryService = ContractHistoryService;
    type AuditLogService = AuditLogService;
    type ConfigService = ConfigService;
    type IcalService = IcalService;

    fn backend_version(&self) -> Arc<str> {
        Arc::from(env!("CARGO_PKG_VERSION"))
    }

    fn permission_service(&self) -> Arc<Self::PermissionService> {
        self.permission_service.clone()
    }
    fn shift_service(&self) -> Arc<Self::ShiftService> {
        self.shift_service.clone()
    }
    fn shift_template_service(&self) -> Arc<Self::ShiftTemplateService> {
        self.shift_template_service.clone()
    }
    fn recurring_shift_service(&self) -> Arc<Self::RecurringShiftService> {
        self.recurring_shift_service.clone()
    }
    fn holiday_profile_service(&self) -> Arc<Self::HolidayProfileService> {
        self.holiday_profile_service.clone()
    }
    fn absence_service(&self) -> Arc<Self::AbsenceService> {
        self.absence_service.clone()
    }
    fn compliance_service(&self) -> Arc<Self::ComplianceService> {
        self.compliance_service.clone()
    }
    fn payroll_service(&self) -> Arc<Self::PayrollService> {
        self.payroll_service.clone()
    }
    fn employee_service(&self) -> Arc<Self::EmployeeService> {
        self.employee_service.clone()
    }
    fn contract_history_service(&self) -> Arc<Self::ContractHistoryService> {
        self.contract_history_service.clone()
    }
    fn audit_log_service(&self) -> Arc<Self::AuditLogService> {
        self.audit_log_service.clone()
    }
    fn config_service(&self) -> Arc<Self::ConfigService> {
        self.config_service.clone()
    }
    fn ical_service(&self) -> Arc<Self::IcalService> {
        self.ical_service.clone()
    }
}

impl RestStateImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> (Self, Arc<SchedulerServiceImpl>) {
        let transaction_dao = Arc::new(TransactionDao::new(pool.clone()));

        let shift_dao = Arc::new(ShiftDao::new(pool.clone()));
        let shift_template_dao = Arc::new(ShiftTemplateDao::new(pool.clone()));
        let recurring_shift_dao = Arc::new(RecurringShiftDao::new(pool.clone()));
        let holiday_profile_dao = Arc::new(HolidayProfileDao::new(pool.clone()));
        let vacation_period_dao = Arc::new(VacationPeriodDao::new(pool.clone()));
        let custom_holiday_dao = Arc::new(CustomHolidayDao::new(pool.clone()));
        let employee_absence_dao = Arc::new(EmployeeAbsenceDao::new(pool.clone()));
        let care_recipient_absence_dao = Arc::new(CareRecipientAbsenceDao::new(pool.clone()));
        let payroll_entry_dao = Arc::new(PayrollEntryDao::new(pool.clone()));
        let hours_carryover_dao = Arc::new(HoursCarryoverDao::new(pool.clone()));
        let employee_dao = Arc::new(EmployeeDao::new(pool.clone()));
        let contract_history_dao = Arc::new(ContractHistoryDao::new(pool.clone()));
        let audit_log_dao = Arc::new(AuditLogDao::new(pool.clone()));
        let notification_log_dao = Arc::new(NotificationLogDao::new(pool.clone()));

        let permission_service = Arc::new(PermissionService);
        let clock_service = Arc::new(ClockService);
        let uuid_service = Arc::new(UuidService);
        let config_service = Arc::new(ConfigService);
        let ical_service = Arc::new(IcalService);

        let notification_dispatcher = Arc::new(NotificationDispatcher::new(
            employee_dao.clone(),
            notification_log_dao.clone(),
            transaction_dao.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let employee_service = Arc::new(EmployeeService::new(
            employee_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let contract_history_service = Arc::new(ContractHistoryService::new(
            contract_history_dao.clone(),
            employee_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let shift_template_service = Arc::new(ShiftTemplateService::new(
            shift_template_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let audit_log_service = Arc::new(AuditLogService::new(
            audit_log_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let compliance_service = Arc::new(ComplianceService::new(
            shift_dao.clone(),
            employee_dao.clone(),
            payroll_entry_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            config_service.clone(),
        ));

        let shift_service = Arc::new(ShiftService::new(
            shift_dao.clone(),
            audit_log_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            compliance_service.clone(),
            notification_dispatcher.clone(),
        ));

        let recurring_shift_service = Arc::new(RecurringShiftService::new(
            recurring_shift_dao.clone(),
            shift_dao.clone(),
            holiday_profile_dao.clone(),
            vacation_period_dao.clone(),
            custom_holiday_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let holiday_profile_service = Arc::new(HolidayProfileService::new(
            holiday_profile_dao.clone(),
            vacation_period_dao.clone(),
            custom_holiday_dao.clone(),
            recurring_shift_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
        ));

        let absence_service = Arc::new(AbsenceService::new(
            employee_absence_dao.clone(),
            care_recipient_absence_dao.clone(),
            shift_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            notification_dispatcher.clone(),
        ));

        let payroll_service = Arc::new(PayrollService::new(
            payroll_entry_dao.clone(),
            hours_carryover_dao.clone(),
            shift_dao.clone(),
            transaction_dao.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            config_service.clone(),
            employee_service.clone(),
            contract_history_service.clone(),
        ));

        let scheduler_service = Arc::new(SchedulerServiceImpl::new(
            employee_dao.clone(),
            shift_dao.clone(),
            transaction_dao.clone(),
            notification_dispatcher.clone(),
            payroll_service.clone(),
        ));

        (
            Self {
                permission_service,
                shift_service,
                shift_template_service,
                recurring_shift_service,
                holiday_profile_service,
                absence_service,
                compliance_service,
                payroll_service,
                employee_service,
                contract_history_service,
                audit_log_service,
                config_service,
                ical_service,
            },
            scheduler_service,
        )
    }
}

#[tokio::main]
async fn main() {
    let version = env!("CARGO_PKG_VERSION");

    #[cfg(feature = "local_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .pretty()
        .with_file(true)
        .finish();

    #[cfg(feature = "json_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    tracing::info!("vera scheduling core version: {}", version);
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./vera.sqlite3".to_string());
    let pool = Arc::new(
        sqlx::SqlitePool::connect(&database_url)
            .await
            .expect("could not connect to database"),
    );

    sqlx::migrate!("../migrations/sqlite")
        .run(pool.as_ref())
        .await
        .expect("failed to run migrations");

    let (rest_state, scheduler_service) = RestStateImpl::new(pool.clone());

    scheduler_service.start().await;

    rest::start_server(rest_state).await
}

use std::sync::Arc;

use dao::employee::{ContractType as DaoContractType, MockEmployeeDao};
use dao::payroll::MockPayrollEntryDao;
use dao::shift::MockShiftDao;
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::always;
use service::compliance::ComplianceService;
use service::config::{Config, MockConfigService};
use service::permission::{Authentication, MockPermissionService};
use service::shift::Shift;
use time::{Date, Month, Time};
use uuid::{uuid, Uuid};

use crate::compliance::{ComplianceServiceDeps, ComplianceServiceImpl};

fn default_tenant_id() -> Uuid {
    uuid!("11111111-1111-1111-1111-111111111111")
}

fn default_employee_id() -> Uuid {
    uuid!("22222222-2222-2222-2222-222222222222")
}

fn default_shift() -> Shift {
    Shift {
        id: Uuid::new_v4(),
        tenant_id: default_tenant_id(),
        employee_id: Some(default_employee_id()),
        template_id: None,
        recurring_shift_id: None,
        date: Date::from_calendar_date(2025, Month::September, 8).unwrap(),
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        location: None,
        notes: None,
        status: service::shift::ShiftStatus::Planned,
        cancellation_reason: None,
        actual_start: None,
        actual_end: None,
        confirmed_by: None,
        confirmed_at: None,
        confirmation_note: None,
        is_holiday: false,
        is_weekend: false,
        is_sunday: false,
        rest_period_ok: true,
        break_ok: true,
        minijob_limit_ok: true,
        hours_carried_over: false,
        is_override: false,
        created_at: None,
        updated_at: None,
    }
}

fn default_employee_entity() -> dao::employee::EmployeeEntity {
    dao::employee::EmployeeEntity {
        id: default_employee_id(),
        tenant_id: default_tenant_id(),
        user_id: None,
        first_name: Arc::from("Erika"),
        last_name: Arc::from("Musterfrau"),
        email: None,
        phone: None,
        contract_type: DaoContractType::PartTime,
        hourly_rate: 18.0,
        weekly_hours: Some(20.0),
        full_time_percentage: None,
        monthly_hours_limit: None,
        annual_salary_limit: service::employee::MINIJOB_ANNUAL_LIMIT,
        vacation_days: 24,
        qualifications: Arc::from("[]"),
        ical_token: Arc::from("token"),
        telegram_chat_id: None,
        quiet_hours_start: Time::from_hms(22, 0, 0).unwrap(),
        quiet_hours_end: Time::from_hms(7, 0, 0).unwrap(),
        notification_prefs: Arc::from("{}"),
        active: true,
        created_at: Date::from_calendar_date(2024, Month::January, 1)
            .unwrap()
            .with_hms(0, 0, 0)
            .unwrap(),
    }
}

pub struct ComplianceServiceDependencies {
    pub shift_dao: MockShiftDao,
    pub employee_dao: MockEmployeeDao,
    pub payroll_entry_dao: MockPayrollEntryDao,
    pub permission_service: MockPermissionService,
    pub config_service: MockConfigService,
}

impl ComplianceServiceDeps for ComplianceServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type ShiftDao = MockShiftDao;
    type EmployeeDao = MockEmployeeDao;
    type PayrollEntryDao = MockPayrollEntryDao;
    type TransactionDao = MockTransactionDao;
    type PermissionService = MockPermissionService;
    type ConfigService = MockConfigService;
}

impl ComplianceServiceDependencies {
    pub fn build_service(self) -> ComplianceServiceImpl<ComplianceServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        ComplianceServiceImpl {
            shift_dao: Arc::new(self.shift_dao),
            employee_dao: Arc::new(self.employee_dao),
            payroll_entry_dao: Arc::new(self.payroll_entry_dao),
            transaction_dao: Arc::new(transaction_dao),
            permission_service: Arc::new(self.permission_service),
            config_service: Arc::new(self.config_service),
        }
    }
}

fn default_config() -> Config {
    Config {
        timezone: Arc::from("UTC"),
        holiday_region: Arc::from("BW"),
        access_token_expire_minutes: 30,
        refresh_token_expire_days: 30,
        allowed_origins: Arc::from([]),
        smtp_configured: false,
        telegram_configured: false,
        vapid_configured: false,
    }
}

fn build_dependencies() -> ComplianceServiceDependencies {
    let mut config_service = MockConfigService::new();
    config_service.expect_get_config().returning(|| Ok(default_config()));
    ComplianceServiceDependencies {
        shift_dao: MockShiftDao::new(),
        employee_dao: MockEmployeeDao::new(),
        payroll_entry_dao: MockPayrollEntryDao::new(),
        permission_service: MockPermissionService::new(),
        config_service,
    }
}

trait NoneTypeExt {
    fn auth(&self) -> Authentication<()>;
}
impl NoneTypeExt for () {
    fn auth(&self) -> Authentication<()> {
        Authentication::Context(())
    }
}

#[tokio::test]
async fn test_rest_period_violation_below_eleven_hours() {
    let mut deps = build_dependencies();
    let shift = default_shift();
    let mut previous = default_shift();
    previous.date = shift.date.previous_day().unwrap();
    previous.start_time = Time::from_hms(12, 0, 0).unwrap();
    // Shift starts 08:00; ending the previous one at 22:00 leaves a 10h gap.
    previous.end_time = Time::from_hms(22, 0, 0).unwrap();
    let previous_entity = dao::shift::ShiftEntity {
        id: previous.id,
        tenant_id: previous.tenant_id,
        employee_id: previous.employee_id,
        template_id: None,
        recurring_shift_id: None,
        date: previous.date,
        start_time: previous.start_time,
        end_time: previous.end_time,
        break_minutes: previous.break_minutes,
        location: None,
        notes: None,
        status: dao::shift::ShiftStatus::Completed,
        cancellation_reason: None,
        actual_start: None,
        actual_end: None,
        confirmed_by: None,
        confirmed_at: None,
        confirmation_note: None,
        is_holiday: false,
        is_weekend: false,
        is_sunday: false,
        rest_period_ok: true,
        break_ok: true,
        minijob_limit_ok: true,
        hours_carried_over: false,
        is_override: false,
        created_at: default_employee_entity().created_at,
        updated_at: default_employee_entity().created_at,
    };

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao
        .expect_find_last_before()
        .with(eq_employee(), always(), always(), always())
        .returning(move |_, _, _, _| Ok(Some(previous_entity.clone())));
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(default_employee_entity())));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(!evaluation.rest_period_ok());
}

fn eq_employee() -> mockall::predicate::EqPredicate<Uuid> {
    mockall::predicate::eq(default_employee_id())
}

#[tokio::test]
async fn test_rest_period_ok_at_eleven_hours() {
    let mut deps = build_dependencies();
    let shift = default_shift();
    let mut previous = default_shift();
    previous.date = shift.date.previous_day().unwrap();
    previous.start_time = Time::from_hms(12, 0, 0).unwrap();
    previous.end_time = Time::from_hms(21, 0, 0).unwrap();
    let previous_entity = dao::shift::ShiftEntity {
        id: previous.id,
        tenant_id: previous.tenant_id,
        employee_id: previous.employee_id,
        template_id: None,
        recurring_shift_id: None,
        date: previous.date,
        start_time: previous.start_time,
        end_time: previous.end_time,
        break_minutes: previous.break_minutes,
        location: None,
        notes: None,
        status: dao::shift::ShiftStatus::Completed,
        cancellation_reason: None,
        actual_start: None,
        actual_end: None,
        confirmed_by: None,
        confirmed_at: None,
        confirmation_note: None,
        is_holiday: false,
        is_weekend: false,
        is_sunday: false,
        rest_period_ok: true,
        break_ok: true,
        minijob_limit_ok: true,
        hours_carried_over: false,
        is_override: false,
        created_at: default_employee_entity().created_at,
        updated_at: default_employee_entity().created_at,
    };

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao
        .expect_find_last_before()
        .with(eq_employee(), always(), always(), always())
        .returning(move |_, _, _, _| Ok(Some(previous_entity.clone())));
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(default_employee_entity())));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(evaluation.rest_period_ok());
}

#[tokio::test]
async fn test_break_violation_for_long_shift_with_short_break() {
    let mut deps = build_dependencies();
    let mut shift = default_shift();
    shift.start_time = Time::from_hms(7, 0, 0).unwrap();
    shift.end_time = Time::from_hms(17, 0, 0).unwrap();
    shift.break_minutes = 20;

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao.expect_find_last_before().returning(|_, _, _, _| Ok(None));
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(default_employee_entity())));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(!evaluation.break_ok());
}

#[tokio::test]
async fn test_break_ok_for_long_shift_with_sufficient_break() {
    let mut deps = build_dependencies();
    let mut shift = default_shift();
    shift.start_time = Time::from_hms(7, 0, 0).unwrap();
    shift.end_time = Time::from_hms(17, 0, 0).unwrap();
    shift.break_minutes = 45;

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao.expect_find_last_before().returning(|_, _, _, _| Ok(None));
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(default_employee_entity())));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(evaluation.break_ok());
}

#[tokio::test]
async fn test_minijob_monthly_limit_exceeded_warns() {
    let mut deps = build_dependencies();
    let shift = default_shift();
    let mut minijob_employee = default_employee_entity();
    minijob_employee.contract_type = DaoContractType::Minijob;

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao.expect_find_last_before().returning(|_, _, _, _| Ok(None));
    let minijob_employee_clone = minijob_employee.clone();
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(minijob_employee_clone.clone())));
    deps.payroll_entry_dao.expect_find_by_employee_and_month().returning(|_, _, _, _| {
        Ok(Some(dao::payroll::PayrollEntryEntity {
            id: Uuid::new_v4(),
            tenant_id: default_tenant_id(),
            employee_id: default_employee_id(),
            month: Date::from_calendar_date(2025, Month::September, 1).unwrap(),
            planned_hours: None,
            actual_hours: 0.0,
            carryover_hours: 0.0,
            paid_hours: 0.0,
            early_hours: 0.0,
            late_hours: 0.0,
            night_hours: 0.0,
            weekend_hours: 0.0,
            sunday_hours: 0.0,
            holiday_hours: 0.0,
            base_wage: 0.0,
            early_surcharge: 0.0,
            late_surcharge: 0.0,
            night_surcharge: 0.0,
            weekend_surcharge: 0.0,
            sunday_surcharge: 0.0,
            holiday_surcharge: 0.0,
            total_gross: 600.0,
            ytd_gross: 600.0,
            annual_limit_remaining: service::employee::MINIJOB_ANNUAL_LIMIT - 600.0,
            status: dao::payroll::PayrollStatus::Approved,
            notes: None,
            created_at: default_employee_entity().created_at,
        }))
    });
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(evaluation
        .warnings
        .iter()
        .any(|m| matches!(m, service::compliance::ComplianceMessage::MinijobMonthlyLimitExceeded { .. })));
}

#[tokio::test]
async fn test_public_holiday_warning_computed_live_from_date() {
    let mut deps = build_dependencies();
    let mut shift = default_shift();
    // All Saints' Day 2025 is a statutory BW holiday; `shift.is_holiday`
    // itself is left false, since nothing in the write path ever sets it.
    shift.date = Date::from_calendar_date(2025, Month::November, 1).unwrap();
    shift.is_holiday = false;

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao.expect_find_last_before().returning(|_, _, _, _| Ok(None));
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(default_employee_entity())));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(evaluation
        .warnings
        .iter()
        .any(|m| matches!(m, service::compliance::ComplianceMessage::PublicHoliday)));
}

#[tokio::test]
async fn test_no_public_holiday_warning_on_ordinary_weekday() {
    let mut deps = build_dependencies();
    let shift = default_shift();

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.shift_dao.expect_find_last_before().returning(|_, _, _, _| Ok(None));
    deps.employee_dao
        .expect_find_by_id()
        .returning(move |_, _, _| Ok(Some(default_employee_entity())));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));

    let service = deps.build_service();
    let evaluation = service.evaluate(&shift, ().auth(), None).await.expect("evaluation should succeed");
    assert!(!evaluation
        .warnings
        .iter()
        .any(|m| matches!(m, service::compliance::ComplianceMessage::PublicHoliday)));
}

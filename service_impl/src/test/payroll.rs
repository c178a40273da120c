use std::sync::Arc;

use dao::payroll::{HoursCarryoverEntity, MockHoursCarryoverDao, MockPayrollEntryDao, PayrollEntryEntity, PayrollStatus as DaoPayrollStatus};
use dao::shift::{MockShiftDao, ShiftEntity, ShiftStatus as DaoShiftStatus};
use dao::MockTransaction;
use dao::MockTransactionDao;
use mockall::predicate::{always, eq};
use service::clock::MockClockService;
use service::config::{Config, MockConfigService};
use service::contract_history::{ContractSnapshot, MockContractHistoryService};
use service::employee::{ContractType, Employee, MockEmployeeService};
use service::permission::{Authentication, MockPermissionService, Role};
use service::uuid_service::MockUuidService;
use service::ServiceError;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::{uuid, Uuid};

use crate::payroll::{PayrollServiceDeps, PayrollServiceImpl};

fn default_tenant_id() -> Uuid {
    uuid!("11111111-1111-1111-1111-111111111111")
}

fn default_employee_id() -> Uuid {
    uuid!("22222222-2222-2222-2222-222222222222")
}

fn default_entry_id() -> Uuid {
    uuid!("66666666-6666-6666-6666-666666666666")
}

fn generate_default_datetime() -> PrimitiveDateTime {
    PrimitiveDateTime::new(
        Date::from_calendar_date(2025, Month::February, 1).unwrap(),
        Time::from_hms(9, 0, 0).unwrap(),
    )
}

fn default_config() -> Config {
    Config {
        timezone: Arc::from("Europe/Berlin"),
        holiday_region: Arc::from("BW"),
        access_token_expire_minutes: 30,
        refresh_token_expire_days: 14,
        allowed_origins: Arc::from([]),
        smtp_configured: false,
        telegram_configured: false,
        vapid_configured: false,
    }
}

pub struct PayrollServiceDependencies {
    pub payroll_entry_dao: MockPayrollEntryDao,
    pub hours_carryover_dao: MockHoursCarryoverDao,
    pub shift_dao: MockShiftDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub config_service: MockConfigService,
    pub employee_service: MockEmployeeService,
    pub contract_history_service: MockContractHistoryService,
}

impl PayrollServiceDeps for PayrollServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type PayrollEntryDao = MockPayrollEntryDao;
    type HoursCarryoverDao = MockHoursCarryoverDao;
    type ShiftDao = MockShiftDao;
    type TransactionDao = MockTransactionDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type ConfigService = MockConfigService;
    type EmployeeService = MockEmployeeService;
    type ContractHistoryService = MockContractHistoryService;
}

impl PayrollServiceDependencies {
    pub fn build_service(self) -> PayrollServiceImpl<PayrollServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        PayrollServiceImpl {
            payroll_entry_dao: Arc::new(self.payroll_entry_dao),
            hours_carryover_dao: Arc::new(self.hours_carryover_dao),
            shift_dao: Arc::new(self.shift_dao),
            transaction_dao: Arc::new(transaction_dao),
            permission_service: Arc::new(self.permission_service),
            clock_service: Arc::new(self.clock_service),
            uuid_service: Arc::new(self.uuid_service),
            config_service: Arc::new(self.config_service),
            employee_service: Arc::new(self.employee_service),
            contract_history_service: Arc::new(self.contract_history_service),
        }
    }
}

fn build_dependencies() -> PayrollServiceDependencies {
    PayrollServiceDependencies {
        payroll_entry_dao: MockPayrollEntryDao::new(),
        hours_carryover_dao: MockHoursCarryoverDao::new(),
        shift_dao: MockShiftDao::new(),
        permission_service: MockPermissionService::new(),
        clock_service: MockClockService::new(),
        uuid_service: MockUuidService::new(),
        config_service: MockConfigService::new(),
        employee_service: MockEmployeeService::new(),
        contract_history_service: MockContractHistoryService::new(),
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

fn base_shift_entity(date: Date, start: Time, end: Time, break_minutes: i32) -> ShiftEntity {
    ShiftEntity {
        id: Uuid::new_v4(),
        tenant_id: default_tenant_id(),
        employee_id: Some(default_employee_id()),
        template_id: None,
        recurring_shift_id: None,
        date,
        start_time: start,
        end_time: end,
        break_minutes,
        location: None,
        notes: None,
        status: DaoShiftStatus::Completed,
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
        created_at: generate_default_datetime(),
        updated_at: generate_default_datetime(),
    }
}

// Confirms that surcharge buckets stack: a holiday overnight shift earns its
// holiday rate on every hour plus the early/late/night time-of-day rates on
// top, since those buckets are independent of the day-category one.
#[tokio::test]
async fn test_calculate_one_stacks_holiday_and_night_surcharges() {
    let mut deps = build_dependencies();
    let month = Date::from_calendar_date(2025, Month::January, 1).unwrap();
    let shift = base_shift_entity(
        Date::from_calendar_date(2025, Month::January, 1).unwrap(),
        Time::from_hms(22, 0, 0).unwrap(),
        Time::from_hms(6, 0, 0).unwrap(),
        0,
    );

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.contract_history_service.expect_resolve_for_month().returning(|_, _, _, _| {
        Ok(ContractSnapshot {
            contract_type: ContractType::FullTime,
            hourly_rate: 20.0,
            monthly_hours_limit: None,
            annual_salary_limit: 50_000.0,
        })
    });
    deps.config_service.expect_get_config().returning(|| Ok(default_config()));
    deps.shift_dao
        .expect_find()
        .with(eq(default_tenant_id()), always(), always())
        .returning(move |_, _, _| Ok(Arc::from([shift.clone()])));
    deps.hours_carryover_dao
        .expect_find_latest_into_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("payroll-entry-id"))
        .returning(move |_| default_entry_id());
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.payroll_entry_dao.expect_upsert().returning(|_, _| Ok(()));

    let service = deps.build_service();
    let calculation = service
        .calculate_one(default_employee_id(), month, ().auth(), None)
        .await
        .expect("expected calculation to succeed");

    let entry = calculation.entry;
    assert_eq!(entry.actual_hours, 8.0);
    assert_eq!(entry.surcharges.holiday_hours, 8.0);
    assert_eq!(entry.surcharges.early_hours, 6.0);
    assert_eq!(entry.surcharges.late_hours, 2.0);
    assert_eq!(entry.surcharges.night_hours, 7.0);
    assert_eq!(entry.surcharges.early_surcharge, 15.0);
    assert_eq!(entry.surcharges.late_surcharge, 5.0);
    assert_eq!(entry.surcharges.night_surcharge, 35.0);
    assert_eq!(entry.surcharges.holiday_surcharge, 200.0);
    assert_eq!(entry.surcharges.weekend_surcharge, 0.0);
    assert_eq!(entry.surcharges.sunday_surcharge, 0.0);
    assert_eq!(entry.base_wage, 160.0);
    assert_eq!(entry.total_gross, 415.0);
    assert_eq!(calculation.new_carryover, 0.0);
}

// Confirms overflow past the contract's monthly hours cap is paid out at the
// cap and the remainder is carried into the following month.
#[tokio::test]
async fn test_calculate_one_caps_hours_and_carries_over_overflow() {
    let mut deps = build_dependencies();
    let month = Date::from_calendar_date(2025, Month::February, 1).unwrap();
    let shift = base_shift_entity(
        Date::from_calendar_date(2025, Month::February, 3).unwrap(),
        Time::from_hms(8, 0, 0).unwrap(),
        Time::from_hms(18, 0, 0).unwrap(),
        0,
    );

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service
        .expect_current_user_id()
        .returning(|_| Ok(Uuid::new_v4()));
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .returning(|_, _, _, _| Ok(None));
    deps.contract_history_service.expect_resolve_for_month().returning(|_, _, _, _| {
        Ok(ContractSnapshot {
            contract_type: ContractType::PartTime,
            hourly_rate: 15.0,
            monthly_hours_limit: Some(10.0),
            annual_salary_limit: 50_000.0,
        })
    });
    deps.config_service.expect_get_config().returning(|| Ok(default_config()));
    deps.shift_dao
        .expect_find()
        .with(eq(default_tenant_id()), always(), always())
        .returning(move |_, _, _| Ok(Arc::from([shift.clone()])));
    deps.hours_carryover_dao
        .expect_find_latest_into_month()
        .returning(|_, _, _, _| {
            Ok(Some(HoursCarryoverEntity {
                id: Uuid::new_v4(),
                tenant_id: default_tenant_id(),
                employee_id: default_employee_id(),
                from_month: Date::from_calendar_date(2025, Month::January, 1).unwrap(),
                to_month: Date::from_calendar_date(2025, Month::February, 1).unwrap(),
                hours: 5.0,
                reason: None,
                created_by: None,
                created_at: generate_default_datetime(),
            }))
        });
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("payroll-entry-id"))
        .returning(move |_| default_entry_id());
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("hours-carryover-id"))
        .returning(|_| Uuid::new_v4());
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.payroll_entry_dao.expect_upsert().returning(|_, _| Ok(()));
    deps.hours_carryover_dao.expect_create().returning(|_, _| Ok(()));

    let service = deps.build_service();
    let calculation = service
        .calculate_one(default_employee_id(), month, ().auth(), None)
        .await
        .expect("expected calculation to succeed");

    assert_eq!(calculation.entry.actual_hours, 10.0);
    assert_eq!(calculation.entry.carryover_hours, 5.0);
    assert_eq!(calculation.entry.paid_hours, 10.0);
    assert_eq!(calculation.entry.base_wage, 150.0);
    assert_eq!(calculation.entry.total_gross, 150.0);
    assert_eq!(calculation.new_carryover, 5.0);
}

#[tokio::test]
async fn test_calculate_one_rejects_locked_entry() {
    let mut deps = build_dependencies();
    let month = Date::from_calendar_date(2025, Month::February, 1).unwrap();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.payroll_entry_dao.expect_find_by_employee_and_month().returning(move |_, _, _, _| {
        Ok(Some(PayrollEntryEntity {
            id: default_entry_id(),
            tenant_id: default_tenant_id(),
            employee_id: default_employee_id(),
            month,
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
            total_gross: 0.0,
            ytd_gross: 0.0,
            annual_limit_remaining: 0.0,
            status: DaoPayrollStatus::Approved,
            notes: None,
            created_at: generate_default_datetime(),
        }))
    });

    let service = deps.build_service();
    let result = service.calculate_one(default_employee_id(), month, ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::EntityConflicts(_))));
}

// calculate_all must keep going past employees whose entry is locked rather
// than aborting the whole batch.
#[tokio::test]
async fn test_calculate_all_skips_locked_entries() {
    let mut deps = build_dependencies();
    let month = Date::from_calendar_date(2025, Month::February, 1).unwrap();
    let locked_employee_id = Uuid::new_v4();
    let open_employee_id = default_employee_id();
    let shift = base_shift_entity(
        Date::from_calendar_date(2025, Month::February, 3).unwrap(),
        Time::from_hms(8, 0, 0).unwrap(),
        Time::from_hms(12, 0, 0).unwrap(),
        0,
    );

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.employee_service.expect_get_all_active().returning(move |_, _| {
        Ok(Arc::from([
            Employee {
                id: locked_employee_id,
                tenant_id: default_tenant_id(),
                user_id: None,
                first_name: Arc::from("Locked"),
                last_name: Arc::from("Employee"),
                email: None,
                phone: None,
                contract_type: ContractType::PartTime,
                hourly_rate: 15.0,
                weekly_hours: None,
                full_time_percentage: None,
                monthly_hours_limit: None,
                annual_salary_limit: 50_000.0,
                vacation_days: 24,
                qualifications: Arc::from([]),
                ical_token: Arc::from("token-locked"),
                telegram_chat_id: None,
                quiet_hours_start: Time::from_hms(22, 0, 0).unwrap(),
                quiet_hours_end: Time::from_hms(6, 0, 0).unwrap(),
                active: true,
            },
            Employee {
                id: open_employee_id,
                tenant_id: default_tenant_id(),
                user_id: None,
                first_name: Arc::from("Open"),
                last_name: Arc::from("Employee"),
                email: None,
                phone: None,
                contract_type: ContractType::PartTime,
                hourly_rate: 15.0,
                weekly_hours: None,
                full_time_percentage: None,
                monthly_hours_limit: None,
                annual_salary_limit: 50_000.0,
                vacation_days: 24,
                qualifications: Arc::from([]),
                ical_token: Arc::from("token-open"),
                telegram_chat_id: None,
                quiet_hours_start: Time::from_hms(22, 0, 0).unwrap(),
                quiet_hours_end: Time::from_hms(6, 0, 0).unwrap(),
                active: true,
            },
        ]))
    });
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .withf(move |id, _, _, _| *id == locked_employee_id)
        .returning(move |_, _, month, _| {
            Ok(Some(PayrollEntryEntity {
                id: Uuid::new_v4(),
                tenant_id: default_tenant_id(),
                employee_id: locked_employee_id,
                month,
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
                total_gross: 0.0,
                ytd_gross: 0.0,
                annual_limit_remaining: 0.0,
                status: DaoPayrollStatus::Paid,
                notes: None,
                created_at: generate_default_datetime(),
            }))
        });
    deps.payroll_entry_dao
        .expect_find_by_employee_and_month()
        .withf(move |id, _, _, _| *id == open_employee_id)
        .returning(|_, _, _, _| Ok(None));
    deps.contract_history_service.expect_resolve_for_month().returning(|_, _, _, _| {
        Ok(ContractSnapshot {
            contract_type: ContractType::PartTime,
            hourly_rate: 15.0,
            monthly_hours_limit: None,
            annual_salary_limit: 50_000.0,
        })
    });
    deps.config_service.expect_get_config().returning(|| Ok(default_config()));
    deps.shift_dao
        .expect_find()
        .with(eq(default_tenant_id()), always(), always())
        .returning(move |_, _, _| Ok(Arc::from([shift.clone()])));
    deps.hours_carryover_dao
        .expect_find_latest_into_month()
        .returning(|_, _, _, _| Ok(None));
    deps.payroll_entry_dao
        .expect_find_committed_in_range()
        .returning(|_, _, _, _, _| Ok(Arc::from([])));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("payroll-entry-id"))
        .returning(|_| Uuid::new_v4());
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.payroll_entry_dao.expect_upsert().returning(|_, _| Ok(()));

    let service = deps.build_service();
    let results = service
        .calculate_all(month, ().auth(), None)
        .await
        .expect("locked entries should be skipped, not fail the batch");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entry.employee_id, open_employee_id);
}

use std::sync::Arc;

use dao::holiday_profile::{MockCustomHolidayDao, MockHolidayProfileDao, MockVacationPeriodDao};
use dao::recurring_shift::{MockRecurringShiftDao, RecurringShiftEntity};
use dao::shift::MockShiftDao;
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use service::clock::MockClockService;
use service::permission::{Authentication, MockPermissionService, Role};
use service::recurring_shift::{RecurringShift, RecurringShiftService};
use service::uuid_service::MockUuidService;
use service::ServiceError;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::{uuid, Uuid};
use vera_utils::DayOfWeek;

use crate::recurring_shift::{RecurringShiftServiceDeps, RecurringShiftServiceImpl};

fn default_tenant_id() -> Uuid {
    uuid!("11111111-1111-1111-1111-111111111111")
}

fn default_rule_id() -> Uuid {
    uuid!("55555555-5555-5555-5555-555555555555")
}

fn generate_default_datetime() -> PrimitiveDateTime {
    PrimitiveDateTime::new(
        Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        Time::from_hms(0, 0, 0).unwrap(),
    )
}

fn default_rule_entity() -> RecurringShiftEntity {
    RecurringShiftEntity {
        id: default_rule_id(),
        tenant_id: default_tenant_id(),
        weekday: DayOfWeek::Monday.to_index0(),
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        employee_id: None,
        template_id: None,
        valid_from: Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        valid_until: Date::from_calendar_date(2025, Month::September, 30).unwrap(),
        holiday_profile_id: None,
        skip_public_holidays: false,
        label: None,
        active: true,
        created_by: None,
        created_at: generate_default_datetime(),
    }
}

pub struct RecurringShiftServiceDependencies {
    pub recurring_shift_dao: MockRecurringShiftDao,
    pub shift_dao: MockShiftDao,
    pub holiday_profile_dao: MockHolidayProfileDao,
    pub vacation_period_dao: MockVacationPeriodDao,
    pub custom_holiday_dao: MockCustomHolidayDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
}

impl RecurringShiftServiceDeps for RecurringShiftServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type RecurringShiftDao = MockRecurringShiftDao;
    type ShiftDao = MockShiftDao;
    type HolidayProfileDao = MockHolidayProfileDao;
    type VacationPeriodDao = MockVacationPeriodDao;
    type CustomHolidayDao = MockCustomHolidayDao;
    type TransactionDao = MockTransactionDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
}

impl RecurringShiftServiceDependencies {
    pub fn build_service(self) -> RecurringShiftServiceImpl<RecurringShiftServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        RecurringShiftServiceImpl {
            recurring_shift_dao: Arc::new(self.recurring_shift_dao),
            shift_dao: Arc::new(self.shift_dao),
            holiday_profile_dao: Arc::new(self.holiday_profile_dao),
            vacation_period_dao: Arc::new(self.vacation_period_dao),
            custom_holiday_dao: Arc::new(self.custom_holiday_dao),
            transaction_dao: Arc::new(transaction_dao),
            permission_service: Arc::new(self.permission_service),
            clock_service: Arc::new(self.clock_service),
            uuid_service: Arc::new(self.uuid_service),
        }
    }
}

fn build_dependencies() -> RecurringShiftServiceDependencies {
    RecurringShiftServiceDependencies {
        recurring_shift_dao: MockRecurringShiftDao::new(),
        shift_dao: MockShiftDao::new(),
        holiday_profile_dao: MockHolidayProfileDao::new(),
        vacation_period_dao: MockVacationPeriodDao::new(),
        custom_holiday_dao: MockCustomHolidayDao::new(),
        permission_service: MockPermissionService::new(),
        clock_service: MockClockService::new(),
        uuid_service: MockUuidService::new(),
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
async fn test_create_expands_every_monday_in_september_2025() {
    let mut deps = build_dependencies();
    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service.expect_current_user_id().returning(|_| Ok(Uuid::new_v4()));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("recurring-shift-id"))
        .returning(move |_| default_rule_id());
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("shift-id"))
        .returning(|_| Uuid::new_v4());
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.recurring_shift_dao.expect_create().with(always(), always()).returning(|_, _| Ok(()));
    deps.shift_dao.expect_create().with(always(), always()).returning(|_, _| Ok(()));

    let service = deps.build_service();
    let rule = RecurringShift {
        id: Uuid::nil(),
        tenant_id: default_tenant_id(),
        weekday: DayOfWeek::Monday,
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        employee_id: None,
        template_id: None,
        valid_from: Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        valid_until: Date::from_calendar_date(2025, Month::September, 30).unwrap(),
        holiday_profile_id: None,
        skip_public_holidays: false,
        label: None,
        active: true,
        created_by: None,
        created_at: None,
    };

    let (_, result) = service.create(&rule, ().auth(), None).await.expect("expected creation to succeed");
    assert_eq!(result.new_shifts.len(), 5);
    assert_eq!(result.skipped_count, 0);
    for shift in result.new_shifts.iter() {
        assert_eq!(DayOfWeek::from(shift.date.weekday()), DayOfWeek::Monday);
    }
}

#[tokio::test]
async fn test_create_rejects_inverted_date_range() {
    let mut deps = build_dependencies();
    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));

    let service = deps.build_service();
    let rule = RecurringShift {
        id: Uuid::nil(),
        tenant_id: default_tenant_id(),
        weekday: DayOfWeek::Monday,
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        employee_id: None,
        template_id: None,
        valid_from: Date::from_calendar_date(2025, Month::September, 30).unwrap(),
        valid_until: Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        holiday_profile_id: None,
        skip_public_holidays: false,
        label: None,
        active: true,
        created_by: None,
        created_at: None,
    };

    let result = service.create(&rule, ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::DateOrderWrong)));
}

#[tokio::test]
async fn test_regenerate_from_preserves_confirmed_shifts() {
    // regenerate_from only purges planned, non-override shifts; a confirmed
    // shift untouched by delete_planned_non_override_by_rule_from survives.
    let mut deps = build_dependencies();
    let rule_entity = default_rule_entity();
    let from_date = Date::from_calendar_date(2025, Month::September, 15).unwrap();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    let rule_for_find = rule_entity.clone();
    deps.recurring_shift_dao
        .expect_find_by_id()
        .with(eq(default_rule_id()), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(rule_for_find.clone())));
    deps.shift_dao
        .expect_delete_planned_non_override_by_rule_from()
        .with(eq(default_rule_id()), eq(from_date), always())
        .returning(|_, _, _| Ok(2));
    deps.uuid_service.expect_new_uuid().with(eq("shift-id")).returning(|_| Uuid::new_v4());
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.shift_dao.expect_create().with(always(), always()).returning(|_, _| Ok(()));

    let service = deps.build_service();
    let result = service
        .regenerate_from(default_rule_id(), from_date, ().auth(), None)
        .await
        .expect("expected regeneration to succeed");
    // Three remaining Mondays from 2025-09-15 through 2025-09-29 inclusive.
    assert_eq!(result.new_shifts.len(), 3);
    for shift in result.new_shifts.iter() {
        assert!(shift.date >= from_date);
        assert_eq!(shift.status, service::shift::ShiftStatus::Planned);
    }
}

#[tokio::test]
async fn test_soft_delete_deactivates_rule_and_purges_planned_shifts() {
    let mut deps = build_dependencies();
    let rule_entity = default_rule_entity();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    let rule_for_find = rule_entity.clone();
    deps.recurring_shift_dao
        .expect_find_by_id()
        .with(eq(default_rule_id()), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(rule_for_find.clone())));
    deps.recurring_shift_dao
        .expect_set_active()
        .with(eq(default_rule_id()), eq(default_tenant_id()), eq(false), always())
        .returning(|_, _, _, _| Ok(()));
    deps.shift_dao
        .expect_delete_planned_non_override_by_rule()
        .with(eq(default_rule_id()), always())
        .returning(|_, _| Ok(3));

    let service = deps.build_service();
    let result = service.soft_delete(default_rule_id(), ().auth(), None).await;
    assert!(result.is_ok());
}

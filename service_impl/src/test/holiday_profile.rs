use std::sync::Arc;

use dao::holiday_profile::{HolidayProfileEntity, MockCustomHolidayDao, MockHolidayProfileDao, MockVacationPeriodDao};
use dao::recurring_shift::{MockRecurringShiftDao, RecurringShiftEntity};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use service::clock::MockClockService;
use service::permission::{Authentication, MockPermissionService, Role};
use service::uuid_service::MockUuidService;
use service::holiday_profile::HolidayProfileService;
use service::ServiceError;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::{uuid, Uuid};
use vera_utils::DayOfWeek;

use crate::holiday_profile::{HolidayProfileServiceDeps, HolidayProfileServiceImpl};

fn default_tenant_id() -> Uuid {
    uuid!("11111111-1111-1111-1111-111111111111")
}

fn default_profile_id() -> Uuid {
    uuid!("88888888-8888-8888-8888-888888888888")
}

fn generate_default_datetime() -> PrimitiveDateTime {
    PrimitiveDateTime::new(
        Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        Time::from_hms(9, 0, 0).unwrap(),
    )
}

fn default_profile_entity() -> HolidayProfileEntity {
    HolidayProfileEntity {
        id: default_profile_id(),
        tenant_id: default_tenant_id(),
        name: Arc::from("Baden-Württemberg"),
        region_code: Arc::from("BW"),
        active: false,
        created_at: generate_default_datetime(),
    }
}

fn recurring_shift_referencing(profile_id: Option<Uuid>, active: bool) -> RecurringShiftEntity {
    RecurringShiftEntity {
        id: Uuid::new_v4(),
        tenant_id: default_tenant_id(),
        weekday: DayOfWeek::Monday.to_index0(),
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        employee_id: None,
        template_id: None,
        valid_from: Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        valid_until: Date::from_calendar_date(2025, Month::December, 31).unwrap(),
        holiday_profile_id: profile_id,
        skip_public_holidays: false,
        label: None,
        active,
        created_by: None,
        created_at: generate_default_datetime(),
    }
}

pub struct HolidayProfileServiceDependencies {
    pub holiday_profile_dao: MockHolidayProfileDao,
    pub vacation_period_dao: MockVacationPeriodDao,
    pub custom_holiday_dao: MockCustomHolidayDao,
    pub recurring_shift_dao: MockRecurringShiftDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
}

impl HolidayProfileServiceDeps for HolidayProfileServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type HolidayProfileDao = MockHolidayProfileDao;
    type VacationPeriodDao = MockVacationPeriodDao;
    type CustomHolidayDao = MockCustomHolidayDao;
    type RecurringShiftDao = MockRecurringShiftDao;
    type TransactionDao = MockTransactionDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
}

impl HolidayProfileServiceDependencies {
    pub fn build_service(self) -> HolidayProfileServiceImpl<HolidayProfileServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        HolidayProfileServiceImpl {
            holiday_profile_dao: Arc::new(self.holiday_profile_dao),
            vacation_period_dao: Arc::new(self.vacation_period_dao),
            custom_holiday_dao: Arc::new(self.custom_holiday_dao),
            recurring_shift_dao: Arc::new(self.recurring_shift_dao),
            transaction_dao: Arc::new(transaction_dao),
            permission_service: Arc::new(self.permission_service),
            clock_service: Arc::new(self.clock_service),
            uuid_service: Arc::new(self.uuid_service),
        }
    }
}

fn build_dependencies() -> HolidayProfileServiceDependencies {
    HolidayProfileServiceDependencies {
        holiday_profile_dao: MockHolidayProfileDao::new(),
        vacation_period_dao: MockVacationPeriodDao::new(),
        custom_holiday_dao: MockCustomHolidayDao::new(),
        recurring_shift_dao: MockRecurringShiftDao::new(),
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

// activate must deactivate every sibling profile before flipping the target
// to active, preserving the at-most-one-active invariant.
#[tokio::test]
async fn test_activate_deactivates_siblings_before_activating_target() {
    let mut deps = build_dependencies();
    let entity = default_profile_entity();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    let entity_for_find = entity.clone();
    deps.holiday_profile_dao
        .expect_find_by_id()
        .with(eq(default_profile_id()), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));
    deps.holiday_profile_dao
        .expect_deactivate_all_except()
        .with(eq(default_tenant_id()), eq(Some(default_profile_id())), always())
        .returning(|_, _, _| Ok(()));
    deps.holiday_profile_dao
        .expect_update()
        .withf(|updated, _| updated.active)
        .returning(|_, _| Ok(()));

    let service = deps.build_service();
    let activated = service
        .activate(default_profile_id(), ().auth(), None)
        .await
        .expect("expected activation to succeed");
    assert!(activated.active);
}

#[tokio::test]
async fn test_delete_conflicts_when_referenced_by_active_recurring_shift() {
    let mut deps = build_dependencies();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    let referencing = recurring_shift_referencing(Some(default_profile_id()), true);
    deps.recurring_shift_dao
        .expect_all()
        .with(eq(default_tenant_id()), always())
        .returning(move |_, _| Ok(Arc::from([referencing.clone()])));

    let service = deps.build_service();
    let result = service.delete(default_profile_id(), ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::EntityConflicts(_))));
}

#[tokio::test]
async fn test_delete_succeeds_when_unreferenced() {
    let mut deps = build_dependencies();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    let inactive_reference = recurring_shift_referencing(Some(default_profile_id()), false);
    let other_profile_reference = recurring_shift_referencing(Some(Uuid::new_v4()), true);
    deps.recurring_shift_dao
        .expect_all()
        .with(eq(default_tenant_id()), always())
        .returning(move |_, _| Ok(Arc::from([inactive_reference.clone(), other_profile_reference.clone()])));
    deps.vacation_period_dao
        .expect_delete_by_profile()
        .with(eq(default_profile_id()), always())
        .returning(|_, _| Ok(()));
    deps.custom_holiday_dao
        .expect_delete_by_profile()
        .with(eq(default_profile_id()), always())
        .returning(|_, _| Ok(()));
    deps.holiday_profile_dao
        .expect_delete()
        .with(eq(default_profile_id()), eq(default_tenant_id()), always())
        .returning(|_, _, _| Ok(()));

    let service = deps.build_service();
    let result = service.delete(default_profile_id(), ().auth(), None).await;
    assert!(result.is_ok());
}

// The convenience constructor must populate all five tabulated BW
// school-vacation periods onto the newly created profile.
#[tokio::test]
async fn test_create_with_school_vacations_populates_five_periods() {
    let mut deps = build_dependencies();

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("holiday-profile-id"))
        .returning(move |_| default_profile_id());
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("vacation-period-id"))
        .returning(|_| Uuid::new_v4());
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.holiday_profile_dao.expect_create().with(always(), always()).returning(|_, _| Ok(()));
    deps.vacation_period_dao.expect_create().with(always(), always()).returning(|_, _| Ok(()));

    let service = deps.build_service();
    let detail = service
        .create_with_school_vacations("Baden-Württemberg", "BW", ().auth(), None)
        .await
        .expect("expected creation to succeed");
    assert_eq!(detail.vacation_periods.len(), 5);
    assert_eq!(detail.custom_holidays.len(), 0);
    let names: Vec<&str> = detail.vacation_periods.iter().map(|p| p.name.as_ref()).collect();
    assert_eq!(
        names,
        vec!["Herbstferien", "Weihnachtsferien", "Osterferien", "Pfingstferien", "Sommerferien"]
    );
}

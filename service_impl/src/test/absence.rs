use std::sync::Arc;

use dao::absence::{AbsenceStatus as DaoAbsenceStatus, AbsenceType as DaoAbsenceType, EmployeeAbsenceEntity, MockCareRecipientAbsenceDao, MockEmployeeAbsenceDao};
use dao::shift::{MockShiftDao, ShiftEntity, ShiftStatus as DaoShiftStatus};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use service::absence::{AbsenceService, AbsenceStatus, AbsenceType, EmployeeAbsence};
use service::clock::MockClockService;
use service::notification::MockNotificationDispatcher;
use service::permission::{Authentication, MockPermissionService, Role};
use service::uuid_service::MockUuidService;
use service::ServiceError;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::{uuid, Uuid};

use crate::absence::{AbsenceServiceDeps, AbsenceServiceImpl};

fn default_tenant_id() -> Uuid {
    uuid!("11111111-1111-1111-1111-111111111111")
}

fn default_employee_id() -> Uuid {
    uuid!("22222222-2222-2222-2222-222222222222")
}

fn default_absence_id() -> Uuid {
    uuid!("77777777-7777-7777-7777-777777777777")
}

fn generate_default_datetime() -> PrimitiveDateTime {
    PrimitiveDateTime::new(
        Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        Time::from_hms(9, 0, 0).unwrap(),
    )
}

fn default_absence_entity(status: DaoAbsenceStatus) -> EmployeeAbsenceEntity {
    EmployeeAbsenceEntity {
        id: default_absence_id(),
        tenant_id: default_tenant_id(),
        employee_id: default_employee_id(),
        absence_type: DaoAbsenceType::Vacation,
        start_date: Date::from_calendar_date(2025, Month::September, 8).unwrap(),
        end_date: Date::from_calendar_date(2025, Month::September, 12).unwrap(),
        days_count: Some(5),
        status,
        notes: None,
        approved_by: None,
        approved_at: None,
        created_at: generate_default_datetime(),
    }
}

fn shift_entity_with_status(date: Date, status: DaoShiftStatus) -> ShiftEntity {
    ShiftEntity {
        id: Uuid::new_v4(),
        tenant_id: default_tenant_id(),
        employee_id: Some(default_employee_id()),
        template_id: None,
        recurring_shift_id: None,
        date,
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        location: None,
        notes: None,
        status,
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

pub struct AbsenceServiceDependencies {
    pub employee_absence_dao: MockEmployeeAbsenceDao,
    pub care_recipient_absence_dao: MockCareRecipientAbsenceDao,
    pub shift_dao: MockShiftDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub notification_dispatcher: MockNotificationDispatcher,
}

impl AbsenceServiceDeps for AbsenceServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type EmployeeAbsenceDao = MockEmployeeAbsenceDao;
    type CareRecipientAbsenceDao = MockCareRecipientAbsenceDao;
    type ShiftDao = MockShiftDao;
    type TransactionDao = MockTransactionDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type NotificationDispatcher = MockNotificationDispatcher;
}

impl AbsenceServiceDependencies {
    pub fn build_service(self) -> AbsenceServiceImpl<AbsenceServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        AbsenceServiceImpl {
            employee_absence_dao: Arc::new(self.employee_absence_dao),
            care_recipient_absence_dao: Arc::new(self.care_recipient_absence_dao),
            shift_dao: Arc::new(self.shift_dao),
            transaction_dao: Arc::new(transaction_dao),
            permission_service: Arc::new(self.permission_service),
            clock_service: Arc::new(self.clock_service),
            uuid_service: Arc::new(self.uuid_service),
            notification_dispatcher: Arc::new(self.notification_dispatcher),
        }
    }
}

fn build_dependencies() -> AbsenceServiceDependencies {
    AbsenceServiceDependencies {
        employee_absence_dao: MockEmployeeAbsenceDao::new(),
        care_recipient_absence_dao: MockCareRecipientAbsenceDao::new(),
        shift_dao: MockShiftDao::new(),
        permission_service: MockPermissionService::new(),
        clock_service: MockClockService::new(),
        uuid_service: MockUuidService::new(),
        notification_dispatcher: MockNotificationDispatcher::new(),
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
async fn test_create_forbidden_for_another_employees_absence() {
    let mut deps = build_dependencies();
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service.expect_role().returning(|_| Ok(Role::Employee));
    deps.permission_service
        .expect_current_employee_id()
        .returning(|_| Ok(Some(Uuid::new_v4())));

    let service = deps.build_service();
    let absence = EmployeeAbsence {
        id: Uuid::nil(),
        tenant_id: default_tenant_id(),
        employee_id: default_employee_id(),
        absence_type: AbsenceType::Vacation,
        start_date: Date::from_calendar_date(2025, Month::September, 8).unwrap(),
        end_date: Date::from_calendar_date(2025, Month::September, 12).unwrap(),
        days_count: Some(5),
        status: AbsenceStatus::Pending,
        notes: None,
        approved_by: None,
        approved_at: None,
        created_at: None,
    };
    let result = service.create(&absence, ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));
}

// §4.I: approving an absence cancels every overlapping, non-terminal shift.
#[tokio::test]
async fn test_approval_cancels_overlapping_shifts() {
    let mut deps = build_dependencies();
    let entity = default_absence_entity(DaoAbsenceStatus::Pending);
    let overlapping = shift_entity_with_status(
        Date::from_calendar_date(2025, Month::September, 9).unwrap(),
        DaoShiftStatus::Planned,
    );
    let already_cancelled = shift_entity_with_status(
        Date::from_calendar_date(2025, Month::September, 10).unwrap(),
        DaoShiftStatus::Cancelled,
    );

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service.expect_current_user_id().returning(|_| Ok(Uuid::new_v4()));
    let entity_for_find = entity.clone();
    deps.employee_absence_dao
        .expect_find_by_id()
        .with(eq(default_absence_id()), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));
    deps.employee_absence_dao.expect_update().returning(|_, _| Ok(()));
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.shift_dao
        .expect_find()
        .with(eq(default_tenant_id()), always(), always())
        .returning(move |_, _, _| Ok(Arc::from([overlapping.clone(), already_cancelled.clone()])));
    deps.shift_dao
        .expect_update()
        .withf(|updated, _| updated.status == DaoShiftStatus::CancelledAbsence)
        .returning(|_, _| Ok(()));
    deps.notification_dispatcher.expect_dispatch().returning(|_, _| ());

    let service = deps.build_service();
    let result = service
        .set_status(default_absence_id(), AbsenceStatus::Approved, ().auth(), None)
        .await;
    assert!(result.is_ok());
}

// Rejecting a previously-approved absence must restore shifts it cancelled.
#[tokio::test]
async fn test_rejection_restores_previously_cancelled_shifts() {
    let mut deps = build_dependencies();
    let entity = default_absence_entity(DaoAbsenceStatus::Approved);
    let cancelled_by_absence = shift_entity_with_status(
        Date::from_calendar_date(2025, Month::September, 9).unwrap(),
        DaoShiftStatus::CancelledAbsence,
    );

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service.expect_current_user_id().returning(|_| Ok(Uuid::new_v4()));
    let entity_for_find = entity.clone();
    deps.employee_absence_dao
        .expect_find_by_id()
        .with(eq(default_absence_id()), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));
    deps.employee_absence_dao.expect_update().returning(|_, _| Ok(()));
    deps.clock_service.expect_date_time_now().returning(generate_default_datetime);
    deps.shift_dao
        .expect_find()
        .with(eq(default_tenant_id()), always(), always())
        .returning(move |_, _, _| Ok(Arc::from([cancelled_by_absence.clone()])));
    deps.shift_dao
        .expect_update()
        .withf(|updated, _| updated.status == DaoShiftStatus::Planned)
        .returning(|_, _| Ok(()));
    deps.notification_dispatcher.expect_dispatch().returning(|_, _| ());

    let service = deps.build_service();
    let updated = service
        .set_status(default_absence_id(), AbsenceStatus::Rejected, ().auth(), None)
        .await
        .expect("expected rejection to succeed");
    assert_eq!(updated.status, AbsenceStatus::Rejected);
}

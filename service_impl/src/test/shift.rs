use std::sync::Arc;

use dao::audit_log::MockAuditLogDao;
use dao::shift::{MockShiftDao, ShiftEntity, ShiftStatus as DaoShiftStatus};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::{always, eq};
use service::clock::MockClockService;
use service::compliance::{ComplianceEvaluation, MockComplianceService};
use service::notification::MockNotificationDispatcher;
use service::permission::{Authentication, MockPermissionService, Role};
use service::shift::ShiftService;
use service::uuid_service::MockUuidService;
use service::ServiceError;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::{uuid, Uuid};

use crate::shift::{ShiftServiceDeps, ShiftServiceImpl};

fn default_tenant_id() -> Uuid {
    uuid!("11111111-1111-1111-1111-111111111111")
}

fn default_employee_id() -> Uuid {
    uuid!("22222222-2222-2222-2222-222222222222")
}

fn default_shift_id() -> Uuid {
    uuid!("33333333-3333-3333-3333-333333333333")
}

fn default_user_id() -> Uuid {
    uuid!("44444444-4444-4444-4444-444444444444")
}

fn generate_default_datetime() -> PrimitiveDateTime {
    PrimitiveDateTime::new(
        Date::from_calendar_date(2025, Month::September, 1).unwrap(),
        Time::from_hms(8, 0, 0).unwrap(),
    )
}

fn default_shift_entity() -> ShiftEntity {
    ShiftEntity {
        id: default_shift_id(),
        tenant_id: default_tenant_id(),
        employee_id: None,
        template_id: None,
        recurring_shift_id: None,
        date: Date::from_calendar_date(2025, Month::September, 7).unwrap(),
        start_time: Time::from_hms(8, 0, 0).unwrap(),
        end_time: Time::from_hms(16, 0, 0).unwrap(),
        break_minutes: 30,
        location: None,
        notes: None,
        status: DaoShiftStatus::Planned,
        cancellation_reason: None,
        actual_start: None,
        actual_end: None,
        confirmed_by: None,
        confirmed_at: None,
        confirmation_note: None,
        is_holiday: false,
        is_weekend: true,
        is_sunday: true,
        rest_period_ok: true,
        break_ok: true,
        minijob_limit_ok: true,
        hours_carried_over: false,
        is_override: false,
        created_at: generate_default_datetime(),
        updated_at: generate_default_datetime(),
    }
}

pub struct ShiftServiceDependencies {
    pub shift_dao: MockShiftDao,
    pub audit_log_dao: MockAuditLogDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub compliance_service: MockComplianceService,
    pub notification_dispatcher: MockNotificationDispatcher,
}

impl ShiftServiceDeps for ShiftServiceDependencies {
    type Context = ();
    type Transaction = MockTransaction;

    type ShiftDao = MockShiftDao;
    type AuditLogDao = MockAuditLogDao;
    type TransactionDao = MockTransactionDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type ComplianceService = MockComplianceService;
    type NotificationDispatcher = MockNotificationDispatcher;
}

impl ShiftServiceDependencies {
    pub fn build_service(self) -> ShiftServiceImpl<ShiftServiceDependencies> {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        ShiftServiceImpl {
            shift_dao: Arc::new(self.shift_dao),
            audit_log_dao: Arc::new(self.audit_log_dao),
            transaction_dao: Arc::new(transaction_dao),
            permission_service: Arc::new(self.permission_service),
            clock_service: Arc::new(self.clock_service),
            uuid_service: Arc::new(self.uuid_service),
            compliance_service: Arc::new(self.compliance_service),
            notification_dispatcher: Arc::new(self.notification_dispatcher),
        }
    }
}

fn build_dependencies() -> ShiftServiceDependencies {
    ShiftServiceDependencies {
        shift_dao: MockShiftDao::new(),
        audit_log_dao: MockAuditLogDao::new(),
        permission_service: MockPermissionService::new(),
        clock_service: MockClockService::new(),
        uuid_service: MockUuidService::new(),
        compliance_service: MockComplianceService::new(),
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
async fn test_create_derives_weekend_and_sunday_flags() {
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
        .with(eq("shift-id"))
        .returning(move |_| default_shift_id());
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("audit-log-id"))
        .returning(move |_| Uuid::new_v4());
    deps.clock_service
        .expect_date_time_now()
        .returning(generate_default_datetime);
    deps.shift_dao.expect_create().with(always(), always()).returning(|_, _| Ok(()));
    deps.audit_log_dao.expect_append().with(always(), always()).returning(|_, _| Ok(()));
    deps.compliance_service
        .expect_evaluate()
        .returning(|_, _, _| Ok(ComplianceEvaluation::default()));

    let service = deps.build_service();
    let mut new_shift = service::shift::Shift::from(&default_shift_entity());
    new_shift.id = Uuid::nil();

    let result = service.create(&new_shift, ().auth(), None).await;
    let created = result.expect("expected a created shift");
    assert!(created.is_weekend);
    assert!(created.is_sunday);
}

#[tokio::test]
async fn test_update_forbidden_when_employee_does_not_own_shift() {
    let mut deps = build_dependencies();
    let mut entity = default_shift_entity();
    entity.employee_id = Some(default_employee_id());

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service.expect_role().returning(|_| Ok(Role::Employee));
    deps.permission_service
        .expect_current_employee_id()
        .returning(|_| Ok(Some(Uuid::new_v4())));
    let entity_for_find = entity.clone();
    deps.shift_dao
        .expect_find_by_id()
        .with(eq(entity.id), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));

    let service = deps.build_service();
    let shift = service::shift::Shift::from(&entity);
    let result = service.update(&shift, ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));
}

#[tokio::test]
async fn test_confirm_conflicts_when_not_planned() {
    let mut deps = build_dependencies();
    let mut entity = default_shift_entity();
    entity.status = DaoShiftStatus::Confirmed;

    deps.permission_service
        .expect_check_role_at_least()
        .with(eq(Role::Manager), always())
        .returning(|_, _| Ok(()));
    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service
        .expect_current_user_id()
        .returning(move |_| Ok(default_user_id()));
    let entity_for_find = entity.clone();
    deps.shift_dao
        .expect_find_by_id()
        .with(eq(entity.id), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));

    let service = deps.build_service();
    let result = service.confirm(entity.id, ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::EntityConflicts(_))));
}

#[tokio::test]
async fn test_claim_assigns_caller_employee() {
    let mut deps = build_dependencies();
    let entity = default_shift_entity();

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service
        .expect_current_employee_id()
        .returning(move |_| Ok(Some(default_employee_id())));
    let entity_for_find = entity.clone();
    deps.shift_dao
        .expect_find_by_id()
        .with(eq(entity.id), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));
    deps.shift_dao
        .expect_update()
        .withf(|updated, _| updated.employee_id == Some(default_employee_id()))
        .returning(|_, _| Ok(()));
    deps.uuid_service
        .expect_new_uuid()
        .with(eq("audit-log-id"))
        .returning(move |_| Uuid::new_v4());
    deps.clock_service
        .expect_date_time_now()
        .returning(generate_default_datetime);
    deps.audit_log_dao.expect_append().with(always(), always()).returning(|_, _| Ok(()));
    deps.notification_dispatcher.expect_dispatch().returning(|_, _| ());

    let service = deps.build_service();
    let result = service.claim(entity.id, ().auth(), None).await;
    let claimed = result.expect("expected claim to succeed");
    assert_eq!(claimed.employee_id, Some(default_employee_id()));
}

#[tokio::test]
async fn test_claim_conflicts_when_already_assigned() {
    let mut deps = build_dependencies();
    let mut entity = default_shift_entity();
    entity.employee_id = Some(Uuid::new_v4());

    deps.permission_service
        .expect_tenant_id()
        .returning(move |_| Ok(default_tenant_id()));
    deps.permission_service
        .expect_current_employee_id()
        .returning(move |_| Ok(Some(default_employee_id())));
    let entity_for_find = entity.clone();
    deps.shift_dao
        .expect_find_by_id()
        .with(eq(entity.id), eq(default_tenant_id()), always())
        .returning(move |_, _, _| Ok(Some(entity_for_find.clone())));

    let service = deps.build_service();
    let result = service.claim(entity.id, ().auth(), None).await;
    assert!(matches!(result, Err(ServiceError::EntityConflicts(_))));
}

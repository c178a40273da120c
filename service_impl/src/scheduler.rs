use std::sync::Arc;

use chrono::Local;
use dao::employee::EmployeeDao;
use dao::shift::{ShiftDao, ShiftFilter, ShiftStatus as DaoShiftStatus};
use dao::TransactionDao;
use service::notification::{DomainEvent, NotificationDispatcher};
use service::payroll::PayrollService;
use service::permission::Authentication;
use time::Duration;
use tokio::sync::Mutex;
use tokio_cron::{Job, Scheduler};
use tracing::{error, info};
use uuid::Uuid;

/// Drives the two background jobs named in spec.md §5: hourly shift
/// reminders and the month-end payroll rollover. Unlike the other
/// `*ServiceImpl` types in this crate this isn't generic over `Context` —
/// background jobs run with `Authentication::Full` and loop over tenants
/// explicitly, so there is no caller context to thread through.
pub struct SchedulerServiceImpl<Deps: SchedulerServiceDeps> {
    scheduler: Arc<Mutex<Scheduler<Local>>>,
    employee_dao: Arc<Deps::EmployeeDao>,
    shift_dao: Arc<Deps::ShiftDao>,
    transaction_dao: Arc<Deps::TransactionDao>,
    notification_dispatcher: Arc<Deps::NotificationDispatcher>,
    payroll_service: Arc<Deps::PayrollService>,
}

pub trait SchedulerServiceDeps {
    type Transaction: dao::Transaction + Send + Sync + Clone + std::fmt::Debug + 'static;
    type PayrollContext: Clone + PartialEq + Eq + std::fmt::Debug + Send + Sync + 'static;
    type EmployeeDao: dao::employee::EmployeeDao<Transaction = Self::Transaction> + Sync + Send + 'static;
    type ShiftDao: dao::shift::ShiftDao<Transaction = Self::Transaction> + Sync + Send + 'static;
    type TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> + Sync + Send + 'static;
    type NotificationDispatcher: service::notification::NotificationDispatcher + Sync + Send + 'static;
    type PayrollService: service::payroll::PayrollService<Context = Self::PayrollContext, Transaction = Self::Transaction>
        + Sync
        + Send
        + 'static;

    /// Builds the admin-privileged, tenant-scoped context the rollover job
    /// uses to call `calculate_all` for one tenant; background jobs loop
    /// over tenants explicitly rather than use `Authentication::Full`, which
    /// `PermissionService::tenant_id` rejects by design.
    fn payroll_context_for_tenant(tenant_id: Uuid) -> Self::PayrollContext;
}

impl<Deps: SchedulerServiceDeps> SchedulerServiceImpl<Deps> {
    pub fn new(
        employee_dao: Arc<Deps::EmployeeDao>,
        shift_dao: Arc<Deps::ShiftDao>,
        transaction_dao: Arc<Deps::TransactionDao>,
        notification_dispatcher: Arc<Deps::NotificationDispatcher>,
        payroll_service: Arc<Deps::PayrollService>,
    ) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(Scheduler::local())),
            employee_dao,
            shift_dao,
            transaction_dao,
            notification_dispatcher,
            payroll_service,
        }
    }

    /// Registers both cron jobs and starts the scheduler's own drive loop
    /// as a detached background task.
    pub async fn start(&self) {
        self.schedule_shift_reminders("0 0 * * * *").await;
        self.schedule_payroll_rollover("0 0 1 * * *").await;

        let scheduler = self.scheduler.clone();
        tokio::spawn(async move {
            info!("starting scheduler background loop");
            let mut sched = scheduler.lock().await;
            sched.start().await;
        });
    }

    async fn schedule_shift_reminders(&self, cron: &'static str) {
        let employee_dao = self.employee_dao.clone();
        let shift_dao = self.shift_dao.clone();
        let transaction_dao = self.transaction_dao.clone();
        let notification_dispatcher = self.notification_dispatcher.clone();

        let mut sched = self.scheduler.lock().await;
        sched.add(Job::new(cron, move || {
            let employee_dao = employee_dao.clone();
            let shift_dao = shift_dao.clone();
            let transaction_dao = transaction_dao.clone();
            let notification_dispatcher = notification_dispatcher.clone();
            async move {
                if let Err(err) =
                    run_shift_reminders(employee_dao, shift_dao, transaction_dao, notification_dispatcher).await
                {
                    error!(%err, "shift reminder job failed");
                } else {
                    info!("shift reminder job completed");
                }
            }
        }));
        info!(cron, "scheduled shift reminder job");
    }

    async fn schedule_payroll_rollover(&self, cron: &'static str) {
        let employee_dao = self.employee_dao.clone();
        let transaction_dao = self.transaction_dao.clone();
        let payroll_service = self.payroll_service.clone();

        let mut sched = self.scheduler.lock().await;
        sched.add(Job::new(cron, move || {
            let employee_dao = employee_dao.clone();
            let transaction_dao = transaction_dao.clone();
            let payroll_service = payroll_service.clone();
            async move {
                if let Err(err) =
                    run_payroll_rollover::<Deps>(employee_dao, transaction_dao, payroll_service).await
                {
                    error!(%err, "payroll rollover job failed");
                } else {
                    info!("payroll rollover job completed");
                }
            }
        }));
        info!(cron, "scheduled payroll rollover job");
    }
}

/// Shifts starting within the next hour, for employees who have not yet
/// been reminded by an earlier fire. No de-duplication ledger is kept; a
/// shift may receive more than one reminder if the job is delayed across
/// fires, which the adapter's at-most-one-attempt-per-channel guarantee
/// does not cover since each fire is a fresh dispatch.
async fn run_shift_reminders<ED, SD, TD, ND>(
    employee_dao: Arc<ED>,
    shift_dao: Arc<SD>,
    transaction_dao: Arc<TD>,
    notification_dispatcher: Arc<ND>,
) -> Result<(), dao::DaoError>
where
    ED: dao::employee::EmployeeDao<Transaction = TD::Transaction>,
    SD: dao::shift::ShiftDao<Transaction = TD::Transaction>,
    TD: dao::TransactionDao,
    ND: service::notification::NotificationDispatcher,
{
    let tx = transaction_dao.new_transaction().await?;
    let tenant_ids = employee_dao.all_tenant_ids(tx.clone()).await?;
    transaction_dao.commit(tx).await?;

    let now = time::OffsetDateTime::now_utc();
    let window_start = now.date();
    let window_end = (now + Duration::hours(1)).date();

    for tenant_id in tenant_ids.iter().copied() {
        let tx = transaction_dao.new_transaction().await?;
        let shifts = shift_dao
            .find(
                tenant_id,
                ShiftFilter {
                    employee_id: None,
                    from_date: Some(window_start),
                    to_date: Some(window_end),
                    recurring_shift_id: None,
                },
                tx.clone(),
            )
            .await?;
        transaction_dao.commit(tx).await?;

        for shift in shifts.iter() {
            if !matches!(shift.status, DaoShiftStatus::Planned | DaoShiftStatus::Confirmed) {
                continue;
            }
            let Some(employee_id) = shift.employee_id else { continue };
            let starts_at = time::PrimitiveDateTime::new(shift.date, shift.start_time).assume_utc();
            let minutes_until_start = (starts_at - now).whole_minutes();
            if (0..60).contains(&minutes_until_start) {
                notification_dispatcher
                    .dispatch(
                        tenant_id,
                        DomainEvent::ShiftReminder { shift_id: shift.id, employee_id },
                    )
                    .await;
            }
        }
    }
    Ok(())
}

/// Recomputes payroll for every active employee of every tenant, for the
/// month that just ended, skipping any entry a manager has already locked.
/// Loops over tenants explicitly rather than passing `Authentication::Full`
/// to `calculate_all`, since `PermissionService::tenant_id` rejects `Full`
/// by design (only tenant-scoped contexts resolve a tenant id).
async fn run_payroll_rollover<Deps: SchedulerServiceDeps>(
    employee_dao: Arc<Deps::EmployeeDao>,
    transaction_dao: Arc<Deps::TransactionDao>,
    payroll_service: Arc<Deps::PayrollService>,
) -> Result<(), dao::DaoError> {
    let today = time::OffsetDateTime::now_utc().date();
    let first_of_this_month = time::Date::from_calendar_date(today.year(), today.month(), 1).unwrap_or(today);
    let previous_month = first_of_this_month
        .previous_day()
        .and_then(|last_day_of_prev_month| {
            time::Date::from_calendar_date(last_day_of_prev_month.year(), last_day_of_prev_month.month(), 1).ok()
        })
        .unwrap_or(first_of_this_month);

    let tx = transaction_dao.new_transaction().await?;
    let tenant_ids = employee_dao.all_tenant_ids(tx.clone()).await?;
    transaction_dao.commit(tx).await?;

    for tenant_id in tenant_ids.iter().copied() {
        let context = Authentication::Context(Deps::payroll_context_for_tenant(tenant_id));
        if let Err(err) = payroll_service.calculate_all(previous_month, context, None).await {
            error!(%tenant_id, %err, "scheduled payroll rollover failed for previous month");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use dao::employee::MockEmployeeDao;
    use dao::shift::MockShiftDao;
    use dao::{MockTransaction, MockTransactionDao};
    use service::notification::MockNotificationDispatcher;
    use service::payroll::MockPayrollService;
    use uuid::uuid;

    use super::*;

    struct TestSchedulerDeps;

    impl SchedulerServiceDeps for TestSchedulerDeps {
        type Transaction = MockTransaction;
        type PayrollContext = ();
        type EmployeeDao = MockEmployeeDao;
        type ShiftDao = MockShiftDao;
        type TransactionDao = MockTransactionDao;
        type NotificationDispatcher = MockNotificationDispatcher;
        type PayrollService = MockPayrollService;

        fn payroll_context_for_tenant(_tenant_id: Uuid) -> Self::PayrollContext {}
    }

    fn tenant_a() -> Uuid {
        uuid!("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa")
    }

    fn tenant_b() -> Uuid {
        uuid!("bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb")
    }

    /// `calculate_all` must be invoked once per tenant with a tenant-scoped
    /// context, never with `Authentication::Full` (which `tenant_id()`
    /// rejects for every real `PermissionService` in this workspace).
    #[tokio::test]
    async fn rollover_loops_over_every_tenant_with_a_scoped_context() {
        let mut employee_dao = MockEmployeeDao::new();
        employee_dao
            .expect_all_tenant_ids()
            .returning(|_| Ok(Arc::from([tenant_a(), tenant_b()])));

        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_new_transaction().returning(|| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        let seen_tenants = Arc::new(StdMutex::new(Vec::new()));
        let seen_tenants_cb = seen_tenants.clone();
        let mut payroll_service = MockPayrollService::new();
        payroll_service.expect_calculate_all().returning(move |_, context, _| {
            let Authentication::Context(()) = context else {
                panic!("rollover must not call calculate_all with Authentication::Full");
            };
            seen_tenants_cb.lock().unwrap().push(());
            Ok(Arc::from([]))
        });

        run_payroll_rollover::<TestSchedulerDeps>(
            Arc::new(employee_dao),
            Arc::new(transaction_dao),
            Arc::new(payroll_service),
        )
        .await
        .expect("rollover should succeed");

        assert_eq!(seen_tenants.lock().unwrap().len(), 2);
    }

    /// A per-tenant `calculate_all` failure is logged and does not abort the
    /// loop over the remaining tenants.
    #[tokio::test]
    async fn rollover_continues_past_a_failing_tenant() {
        let mut employee_dao = MockEmployeeDao::new();
        employee_dao
            .expect_all_tenant_ids()
            .returning(|_| Ok(Arc::from([tenant_a(), tenant_b()])));

        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_new_transaction().returning(|| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        let call_count = Arc::new(StdMutex::new(0usize));
        let call_count_cb = call_count.clone();
        let mut payroll_service = MockPayrollService::new();
        payroll_service.expect_calculate_all().returning(move |_, _, _| {
            *call_count_cb.lock().unwrap() += 1;
            Err(service::ServiceError::EntityConflicts("payroll entry is locked".into()))
        });

        run_payroll_rollover::<TestSchedulerDeps>(
            Arc::new(employee_dao),
            Arc::new(transaction_dao),
            Arc::new(payroll_service),
        )
        .await
        .expect("rollover itself should still succeed even if individual tenants fail");

        assert_eq!(*call_count.lock().unwrap(), 2);
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use dao::payroll::{
    HoursCarryoverDao, HoursCarryoverEntity, PayrollEntryDao, PayrollEntryEntity,
    PayrollStatus as DaoPayrollStatus,
};
use dao::shift::{ShiftDao, ShiftFilter, ShiftStatus as DaoShiftStatus};
use dao::TransactionDao;
use service::clock::ClockService;
use service::config::ConfigService;
use service::contract_history::ContractHistoryService;
use service::employee::EmployeeService;
use service::payroll::{PayrollCalculation, PayrollEntry, PayrollService, PayrollStatus, SurchargeBreakdown};
use service::permission::{Authentication, PermissionService, Role};
use service::uuid_service::UuidService;
use service::ServiceError;
use time::{Date, Duration, Time};
use uuid::Uuid;
use vera_utils::DayOfWeek;

use crate::gen_service_impl;

const EARLY_SURCHARGE_RATE: f64 = 0.125;
const LATE_SURCHARGE_RATE: f64 = 0.125;
const NIGHT_SURCHARGE_RATE: f64 = 0.25;
const WEEKEND_SURCHARGE_RATE: f64 = 0.25;
const SUNDAY_SURCHARGE_RATE: f64 = 0.50;
const HOLIDAY_SURCHARGE_RATE: f64 = 1.25;

gen_service_impl! {
    struct PayrollServiceImpl: service::payroll::PayrollService = PayrollServiceDeps {
        PayrollEntryDao: dao::payroll::PayrollEntryDao<Transaction = Self::Transaction> = payroll_entry_dao,
        HoursCarryoverDao: dao::payroll::HoursCarryoverDao<Transaction = Self::Transaction> = hours_carryover_dao,
        ShiftDao: dao::shift::ShiftDao<Transaction = Self::Transaction> = shift_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        ConfigService: service::config::ConfigService = config_service,
        EmployeeService: service::employee::EmployeeService<Context = Self::Context, Transaction = Self::Transaction> = employee_service,
        ContractHistoryService: service::contract_history::ContractHistoryService<Context = Self::Context, Transaction = Self::Transaction> = contract_history_service,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn first_of_next_month(month: Date) -> Date {
    let next = month.month().next();
    let year = if next == time::Month::January { month.year() + 1 } else { month.year() };
    Date::from_calendar_date(year, next, 1).unwrap_or(month)
}

fn first_of_year(month: Date) -> Date {
    Date::from_calendar_date(month.year(), time::Month::January, 1).unwrap_or(month)
}

/// Net hours of the shift's `[startTime, endTime)` window, after the
/// day-category walk is resolved, walking real hour-of-day boundaries
/// rather than shift-relative ones; see SPEC_FULL.md §4.H.1.
fn time_of_day_hours(start: Time, end: Time) -> (f64, f64, f64) {
    let start_minutes = start.hour() as f64 * 60.0 + start.minute() as f64 + start.second() as f64 / 60.0;
    let end_minutes_raw = end.hour() as f64 * 60.0 + end.minute() as f64 + end.second() as f64 / 60.0;
    let end_minutes = if end <= start { end_minutes_raw + 24.0 * 60.0 } else { end_minutes_raw };

    let mut early = 0.0;
    let mut late = 0.0;
    let mut night = 0.0;
    let mut t = start_minutes;
    while t < end_minutes {
        let hour_of_day = ((t / 60.0).floor() as i64).rem_euclid(24);
        let next_boundary = (t / 60.0).floor() * 60.0 + 60.0;
        let slice_end = next_boundary.min(end_minutes);
        let slice_hours = (slice_end - t) / 60.0;
        if hour_of_day < 6 {
            early += slice_hours;
        }
        if hour_of_day >= 20 {
            late += slice_hours;
        }
        if hour_of_day >= 23 || hour_of_day < 6 {
            night += slice_hours;
        }
        t = slice_end;
    }
    (early, late, night)
}

#[derive(Default)]
struct MonthTotals {
    gross_hours: f64,
    surcharges: SurchargeBreakdown,
}

#[async_trait]
impl<Deps: PayrollServiceDeps> PayrollService for PayrollServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        month: Option<Date>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[PayrollEntry]>, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let month = month.unwrap_or_else(|| first_of_year(self.clock_service.date_now()));
        let entries = self
            .payroll_entry_dao
            .find_by_tenant_and_month(tenant_id, month, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(entries.iter().map(PayrollEntry::from).collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<PayrollEntry, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .payroll_entry_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn calculate_one(
        &self,
        employee_id: Uuid,
        month: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<PayrollCalculation, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;

        let existing = self
            .payroll_entry_dao
            .find_by_employee_and_month(employee_id, tenant_id, month, tx.clone())
            .await?;
        if let Some(existing) = &existing {
            if matches!(existing.status, DaoPayrollStatus::Approved | DaoPayrollStatus::Paid) {
                return Err(ServiceError::EntityConflicts("payroll entry is locked".into()));
            }
        }

        // 4.G: resolve the contract snapshot in effect for this month.
        let snapshot = self
            .contract_history_service
            .resolve_for_month(employee_id, month, context.clone(), Some(tx.clone()))
            .await?;

        let region = self.config_service.get_config().await?.holiday_region;
        let holidays = service::holiday_calendar::HolidayCalendar::for_year(&region, month.year());

        let month_end = first_of_next_month(month) - Duration::days(1);
        let shifts = self
            .shift_dao
            .find(
                tenant_id,
                ShiftFilter {
                    employee_id: Some(employee_id),
                    from_date: Some(month),
                    to_date: Some(month_end),
                    recurring_shift_id: None,
                },
                tx.clone(),
            )
            .await?;

        let mut totals = MonthTotals::default();
        for shift in shifts.iter() {
            if !matches!(shift.status, DaoShiftStatus::Confirmed | DaoShiftStatus::Completed) {
                continue;
            }
            let net_hours = service::shift::net_hours(shift.start_time, shift.end_time, shift.break_minutes);
            totals.gross_hours += net_hours;

            let weekday = DayOfWeek::from(shift.date.weekday());
            if holidays.contains_key(&shift.date) {
                totals.surcharges.holiday_hours += net_hours;
            } else if weekday.is_sunday() {
                totals.surcharges.sunday_hours += net_hours;
            } else if weekday.is_weekend() {
                totals.surcharges.weekend_hours += net_hours;
            }

            let (early, late, night) = time_of_day_hours(shift.start_time, shift.end_time);
            totals.surcharges.early_hours += early;
            totals.surcharges.late_hours += late;
            totals.surcharges.night_hours += night;
        }

        let carryover_in = self
            .hours_carryover_dao
            .find_latest_into_month(employee_id, tenant_id, month, tx.clone())
            .await?
            .map(|c| c.hours)
            .unwrap_or(0.0);

        let gross_hours = totals.gross_hours;
        let mut paid_hours = gross_hours + carryover_in;
        let new_carryover = match snapshot.monthly_hours_limit {
            Some(limit) if paid_hours > limit => {
                let overflow = paid_hours - limit;
                paid_hours = limit;
                overflow
            }
            _ => 0.0,
        };

        totals.surcharges.early_surcharge = totals.surcharges.early_hours * snapshot.hourly_rate * EARLY_SURCHARGE_RATE;
        totals.surcharges.late_surcharge = totals.surcharges.late_hours * snapshot.hourly_rate * LATE_SURCHARGE_RATE;
        totals.surcharges.night_surcharge = totals.surcharges.night_hours * snapshot.hourly_rate * NIGHT_SURCHARGE_RATE;
        totals.surcharges.weekend_surcharge =
            totals.surcharges.weekend_hours * snapshot.hourly_rate * WEEKEND_SURCHARGE_RATE;
        totals.surcharges.sunday_surcharge = totals.surcharges.sunday_hours * snapshot.hourly_rate * SUNDAY_SURCHARGE_RATE;
        totals.surcharges.holiday_surcharge =
            totals.surcharges.holiday_hours * snapshot.hourly_rate * HOLIDAY_SURCHARGE_RATE;

        let base_wage = paid_hours * snapshot.hourly_rate;
        let total_gross = base_wage + totals.surcharges.total_surcharge();

        let year_start = first_of_year(month);
        let committed = self
            .payroll_entry_dao
            .find_committed_in_range(employee_id, tenant_id, year_start, month, tx.clone())
            .await?;
        let ytd_gross: f64 = committed.iter().map(|e| e.total_gross).sum::<f64>() + total_gross;
        let annual_limit_remaining = snapshot.annual_salary_limit - ytd_gross;

        let id = existing.as_ref().map(|e| e.id).unwrap_or_else(|| self.uuid_service.new_uuid("payroll-entry-id"));
        let status = existing.as_ref().map(|e| e.status).unwrap_or(DaoPayrollStatus::Draft);
        let notes = existing.as_ref().and_then(|e| e.notes.clone());
        let created_at = existing.as_ref().map(|e| e.created_at).unwrap_or_else(|| self.clock_service.date_time_now());

        let entity = PayrollEntryEntity {
            id,
            tenant_id,
            employee_id,
            month,
            planned_hours: snapshot.monthly_hours_limit,
            actual_hours: round2(gross_hours),
            carryover_hours: round2(carryover_in),
            paid_hours: round2(paid_hours),
            early_hours: round2(totals.surcharges.early_hours),
            late_hours: round2(totals.surcharges.late_hours),
            night_hours: round2(totals.surcharges.night_hours),
            weekend_hours: round2(totals.surcharges.weekend_hours),
            sunday_hours: round2(totals.surcharges.sunday_hours),
            holiday_hours: round2(totals.surcharges.holiday_hours),
            base_wage: round2(base_wage),
            early_surcharge: round2(totals.surcharges.early_surcharge),
            late_surcharge: round2(totals.surcharges.late_surcharge),
            night_surcharge: round2(totals.surcharges.night_surcharge),
            weekend_surcharge: round2(totals.surcharges.weekend_surcharge),
            sunday_surcharge: round2(totals.surcharges.sunday_surcharge),
            holiday_surcharge: round2(totals.surcharges.holiday_surcharge),
            total_gross: round2(total_gross),
            ytd_gross: round2(ytd_gross),
            annual_limit_remaining: round2(annual_limit_remaining),
            status,
            notes,
            created_at,
        };
        self.payroll_entry_dao.upsert(&entity, tx.clone()).await?;

        let new_carryover = round2(new_carryover);
        if new_carryover != 0.0 {
            let carryover_entity = HoursCarryoverEntity {
                id: self.uuid_service.new_uuid("hours-carryover-id"),
                tenant_id,
                employee_id,
                from_month: month,
                to_month: first_of_next_month(month),
                hours: new_carryover,
                reason: Some(Arc::from("monthly hours limit overflow")),
                created_by: self.permission_service.current_user_id(&context).await.ok(),
                created_at: self.clock_service.date_time_now(),
            };
            self.hours_carryover_dao.create(&carryover_entity, tx.clone()).await?;
        }

        self.transaction_dao.commit(tx).await?;
        Ok(PayrollCalculation {
            entry: (&entity).into(),
            new_carryover,
        })
    }

    async fn calculate_all(
        &self,
        month: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[PayrollCalculation]>, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let employees = self.employee_service.get_all_active(context.clone(), None).await?;

        let mut out = Vec::new();
        for employee in employees.iter() {
            match self.calculate_one(employee.id, month, context.clone(), tx.clone()).await {
                Ok(calculation) => out.push(calculation),
                Err(ServiceError::EntityConflicts(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(Arc::from(out))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: PayrollStatus,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<PayrollEntry, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .payroll_entry_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;

        let allowed = matches!(
            (entity.status, DaoPayrollStatus::from(status)),
            (DaoPayrollStatus::Draft, DaoPayrollStatus::Approved)
                | (DaoPayrollStatus::Approved, DaoPayrollStatus::Paid)
                | (DaoPayrollStatus::Approved, DaoPayrollStatus::Draft)
        );
        if !allowed {
            return Err(ServiceError::EntityConflicts("invalid payroll status transition".into()));
        }
        entity.status = status.into();
        self.payroll_entry_dao.upsert(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }
}

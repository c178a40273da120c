use std::sync::Arc;

use async_trait::async_trait;
use dao::employee::EmployeeDao;
use dao::payroll::{PayrollEntryDao, PayrollStatus as DaoPayrollStatus};
use dao::shift::{ShiftDao, ShiftFilter};
use dao::TransactionDao;
use service::compliance::{ComplianceEvaluation, ComplianceMessage, ComplianceService};
use service::config::ConfigService;
use service::employee::{ContractType, MINIJOB_ANNUAL_LIMIT, MINIJOB_MONTHLY_LIMIT};
use service::holiday_calendar::HolidayCalendar;
use service::permission::{Authentication, PermissionService};
use service::shift::{net_hours, Shift};
use service::ServiceError;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use crate::gen_service_impl;

/// Minimum rest between the end of one shift and the start of the next,
/// per spec.md §4.F.1.
const REST_PERIOD_MIN_HOURS: f64 = 11.0;
const LONG_SHIFT_HOURS: f64 = 9.0;
const LONG_SHIFT_MIN_BREAK_MINUTES: i32 = 45;
const MEDIUM_SHIFT_HOURS: f64 = 6.0;
const MEDIUM_SHIFT_MIN_BREAK_MINUTES: i32 = 30;
const MINIJOB_ANNUAL_WARNING_RATIO: f64 = 0.95;

gen_service_impl! {
    struct ComplianceServiceImpl: service::compliance::ComplianceService = ComplianceServiceDeps {
        ShiftDao: dao::shift::ShiftDao<Transaction = Self::Transaction> = shift_dao,
        EmployeeDao: dao::employee::EmployeeDao<Transaction = Self::Transaction> = employee_dao,
        PayrollEntryDao: dao::payroll::PayrollEntryDao<Transaction = Self::Transaction> = payroll_entry_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ConfigService: service::config::ConfigService = config_service,
    }
}

fn first_of_month(date: Date) -> Date {
    Date::from_calendar_date(date.year(), date.month(), 1).unwrap_or(date)
}

fn first_of_year(date: Date) -> Date {
    Date::from_calendar_date(date.year(), Month::January, 1).unwrap_or(date)
}

/// `end_time` interpreted on `date + 1` when the shift crosses midnight.
fn effective_end(date: Date, start: Time, end: Time) -> PrimitiveDateTime {
    if end <= start {
        PrimitiveDateTime::new(date + Duration::days(1), end)
    } else {
        PrimitiveDateTime::new(date, end)
    }
}

#[async_trait]
impl<Deps: ComplianceServiceDeps> ComplianceService for ComplianceServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn evaluate(
        &self,
        shift: &Shift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ComplianceEvaluation, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;

        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        // Computed live from the calendar rather than trusted from the
        // persisted flag: a manually created or rule-generated shift never
        // has `is_holiday` set true by the shift/expander write paths, so
        // this check would never fire against the stored field.
        let region = self.config_service.get_config().await?.holiday_region;
        if HolidayCalendar::is_holiday(&region, shift.date) {
            warnings.push(ComplianceMessage::PublicHoliday);
        }

        // §4.F.1 rest period, relative to the employee's previous non-cancelled shift.
        if let Some(employee_id) = shift.employee_id {
            let last = self
                .shift_dao
                .find_last_before(employee_id, tenant_id, shift.date, tx.clone())
                .await?;
            if let Some(last) = last {
                let last_end = effective_end(last.date, last.start_time, last.end_time);
                let this_start = PrimitiveDateTime::new(shift.date, shift.start_time);
                let gap_hours = (this_start - last_end).as_seconds_f64() / 3600.0;
                if gap_hours < REST_PERIOD_MIN_HOURS {
                    violations.push(ComplianceMessage::RestPeriodTooShort { gap_hours });
                }
            }
        }

        // §4.F.2 break, independent of employee.
        let worked_hours = net_hours(shift.start_time, shift.end_time, shift.break_minutes);
        if worked_hours > LONG_SHIFT_HOURS && shift.break_minutes < LONG_SHIFT_MIN_BREAK_MINUTES {
            violations.push(ComplianceMessage::BreakTooShort {
                worked_hours,
                break_minutes: shift.break_minutes,
            });
        } else if worked_hours > MEDIUM_SHIFT_HOURS && shift.break_minutes < MEDIUM_SHIFT_MIN_BREAK_MINUTES {
            violations.push(ComplianceMessage::BreakTooShort {
                worked_hours,
                break_minutes: shift.break_minutes,
            });
        }

        // §4.F.3 minijob monthly/annual ceilings.
        if let Some(employee_id) = shift.employee_id {
            let employee = self
                .employee_dao
                .find_by_id(employee_id, tenant_id, tx.clone())
                .await?;
            if let Some(employee) = employee {
                if ContractType::from(employee.contract_type) == ContractType::Minijob {
                    let month = first_of_month(shift.date);

                    let monthly_committed = self
                        .payroll_entry_dao
                        .find_by_employee_and_month(employee_id, tenant_id, month, tx.clone())
                        .await?
                        .filter(|e| {
                            matches!(e.status, DaoPayrollStatus::Approved | DaoPayrollStatus::Paid)
                        })
                        .map(|e| e.total_gross)
                        .unwrap_or(0.0);
                    if monthly_committed > MINIJOB_MONTHLY_LIMIT {
                        warnings.push(ComplianceMessage::MinijobMonthlyLimitExceeded {
                            total: monthly_committed,
                        });
                    }

                    let year_start = first_of_year(shift.date);
                    let committed = self
                        .payroll_entry_dao
                        .find_committed_in_range(employee_id, tenant_id, year_start, month, tx.clone())
                        .await?;
                    let ytd: f64 = committed.iter().map(|e| e.total_gross).sum();
                    if ytd > MINIJOB_ANNUAL_LIMIT {
                        violations.push(ComplianceMessage::MinijobAnnualLimitExceeded {
                            ytd,
                            limit: MINIJOB_ANNUAL_LIMIT,
                        });
                    } else if ytd > MINIJOB_ANNUAL_LIMIT * MINIJOB_ANNUAL_WARNING_RATIO {
                        warnings.push(ComplianceMessage::MinijobAnnualLimitWarning {
                            ytd,
                            limit: MINIJOB_ANNUAL_LIMIT,
                        });
                    }
                }
            }
        }

        self.transaction_dao.commit(tx).await?;
        Ok(ComplianceEvaluation {
            violations: Arc::from(violations),
            warnings: Arc::from(warnings),
        })
    }

    async fn list_violations(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[(Shift, ComplianceEvaluation)]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let shifts = self
            .shift_dao
            .find(tenant_id, ShiftFilter::default(), tx.clone())
            .await?;

        let mut out = Vec::new();
        for entity in shifts.iter() {
            if matches!(
                entity.status,
                dao::shift::ShiftStatus::Cancelled | dao::shift::ShiftStatus::CancelledAbsence
            ) {
                continue;
            }
            let shift = Shift::from(entity);
            let evaluation = self
                .evaluate(&shift, context.clone(), Some(tx.clone()))
                .await?;
            if !evaluation.is_ok() {
                out.push((shift, evaluation));
            }
        }
        self.transaction_dao.commit(tx).await?;
        Ok(Arc::from(out))
    }
}

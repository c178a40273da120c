use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayrollStatus {
    Draft,
    Approved,
    Paid,
}

impl From<dao::payroll::PayrollStatus> for PayrollStatus {
    fn from(s: dao::payroll::PayrollStatus) -> Self {
        match s {
            dao::payroll::PayrollStatus::Draft => Self::Draft,
            dao::payroll::PayrollStatus::Approved => Self::Approved,
            dao::payroll::PayrollStatus::Paid => Self::Paid,
        }
    }
}
impl From<PayrollStatus> for dao::payroll::PayrollStatus {
    fn from(s: PayrollStatus) -> Self {
        match s {
            PayrollStatus::Draft => Self::Draft,
            PayrollStatus::Approved => Self::Approved,
            PayrollStatus::Paid => Self::Paid,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurchargeBreakdown {
    pub early_hours: f64,
    pub late_hours: f64,
    pub night_hours: f64,
    pub weekend_hours: f64,
    pub sunday_hours: f64,
    pub holiday_hours: f64,
    pub early_surcharge: f64,
    pub late_surcharge: f64,
    pub night_surcharge: f64,
    pub weekend_surcharge: f64,
    pub sunday_surcharge: f64,
    pub holiday_surcharge: f64,
}

impl SurchargeBreakdown {
    pub fn total_surcharge(&self) -> f64 {
        self.early_surcharge
            + self.late_surcharge
            + self.night_surcharge
            + self.weekend_surcharge
            + self.sunday_surcharge
            + self.holiday_surcharge
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PayrollEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub month: Date,
    pub planned_hours: Option<f64>,
    pub actual_hours: f64,
    pub carryover_hours: f64,
    pub paid_hours: f64,
    pub surcharges: SurchargeBreakdown,
    pub base_wage: f64,
    pub total_gross: f64,
    pub ytd_gross: f64,
    pub annual_limit_remaining: f64,
    pub status: PayrollStatus,
    pub notes: Option<Arc<str>>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&dao::payroll::PayrollEntryEntity> for PayrollEntry {
    fn from(e: &dao::payroll::PayrollEntryEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            employee_id: e.employee_id,
            month: e.month,
            planned_hours: e.planned_hours,
            actual_hours: e.actual_hours,
            carryover_hours: e.carryover_hours,
            paid_hours: e.paid_hours,
            surcharges: SurchargeBreakdown {
                early_hours: e.early_hours,
                late_hours: e.late_hours,
                night_hours: e.night_hours,
                weekend_hours: e.weekend_hours,
                sunday_hours: e.sunday_hours,
                holiday_hours: e.holiday_hours,
                early_surcharge: e.early_surcharge,
                late_surcharge: e.late_surcharge,
                night_surcharge: e.night_surcharge,
                weekend_surcharge: e.weekend_surcharge,
                sunday_surcharge: e.sunday_surcharge,
                holiday_surcharge: e.holiday_surcharge,
            },
            base_wage: e.base_wage,
            total_gross: e.total_gross,
            ytd_gross: e.ytd_gross,
            annual_limit_remaining: e.annual_limit_remaining,
            status: e.status.into(),
            notes: e.notes.clone(),
            created_at: Some(e.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PayrollCalculation {
    pub entry: PayrollEntry,
    pub new_carryover: f64,
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait PayrollService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        month: Option<Date>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[PayrollEntry]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<PayrollEntry, ServiceError>;

    /// Fails with `EntityConflicts` if a locked (approved|paid) entry
    /// already exists for (employee, month).
    async fn calculate_one(
        &self,
        employee_id: Uuid,
        month: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<PayrollCalculation, ServiceError>;

    /// Runs `calculate_one` for every active employee, skipping locked
    /// entries silently.
    async fn calculate_all(
        &self,
        month: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[PayrollCalculation]>, ServiceError>;

    /// draft -> approved, approved -> paid, approved -> draft. `paid` is terminal.
    async fn set_status(
        &self,
        id: Uuid,
        status: PayrollStatus,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<PayrollEntry, ServiceError>;
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayrollStatus {
    Draft,
    Approved,
    Paid,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PayrollEntryEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    /// First-of-month.
    pub month: Date,
    pub planned_hours: Option<f64>,
    pub actual_hours: f64,
    pub carryover_hours: f64,
    pub paid_hours: f64,
    pub early_hours: f64,
    pub late_hours: f64,
    pub night_hours: f64,
    pub weekend_hours: f64,
    pub sunday_hours: f64,
    pub holiday_hours: f64,
    pub base_wage: f64,
    pub early_surcharge: f64,
    pub late_surcharge: f64,
    pub night_surcharge: f64,
    pub weekend_surcharge: f64,
    pub sunday_surcharge: f64,
    pub holiday_surcharge: f64,
    pub total_gross: f64,
    pub ytd_gross: f64,
    pub annual_limit_remaining: f64,
    pub status: PayrollStatus,
    pub notes: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait PayrollEntryDao {
    type Transaction: crate::Transaction;

    async fn find_by_employee_and_month(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        month: Date,
        tx: Self::Transaction,
    ) -> Result<Option<PayrollEntryEntity>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<PayrollEntryEntity>, DaoError>;
    async fn find_by_tenant_and_month(
        &self,
        tenant_id: Uuid,
        month: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[PayrollEntryEntity]>, DaoError>;
    /// Committed (approved|paid) entries for `employee_id` with
    /// `from_month <= month < before_month`, ascending.
    async fn find_committed_in_range(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        from_month: Date,
        before_month: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[PayrollEntryEntity]>, DaoError>;
    async fn upsert(
        &self,
        entity: &PayrollEntryEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoursCarryoverEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub from_month: Date,
    pub to_month: Date,
    pub hours: f64,
    pub reason: Option<Arc<str>>,
    pub created_by: Option<Uuid>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait HoursCarryoverDao {
    type Transaction: crate::Transaction;

    /// The most recent carry-over entry with `to_month = month`, if any.
    async fn find_latest_into_month(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        to_month: Date,
        tx: Self::Transaction,
    ) -> Result<Option<HoursCarryoverEntity>, DaoError>;
    async fn create(
        &self,
        entity: &HoursCarryoverEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::employee::ContractType;
use crate::DaoError;

#[derive(Clone, Debug, PartialEq)]
pub struct ContractHistoryEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub valid_from: Date,
    pub valid_to: Option<Date>,
    pub contract_type: ContractType,
    pub hourly_rate: f64,
    pub weekly_hours: Option<f64>,
    pub full_time_percentage: Option<f64>,
    pub monthly_hours_limit: Option<f64>,
    pub annual_salary_limit: Option<f64>,
    pub note: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
    pub created_by_user_id: Option<Uuid>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ContractHistoryDao {
    type Transaction: crate::Transaction;

    async fn find_by_employee(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[ContractHistoryEntity]>, DaoError>;
    /// The row with `valid_from <= at_date < valid_to` (or `valid_to IS NULL`).
    async fn find_effective_at(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        at_date: Date,
        tx: Self::Transaction,
    ) -> Result<Option<ContractHistoryEntity>, DaoError>;
    async fn find_open(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ContractHistoryEntity>, DaoError>;
    async fn create(
        &self,
        entity: &ContractHistoryEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn close_open_entry(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        valid_to: Date,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::employee::ContractType;
use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq)]
pub struct ContractHistoryEntry {
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
    pub created_at: Option<PrimitiveDateTime>,
    pub created_by_user_id: Option<Uuid>,
}

impl From<&dao::contract_history::ContractHistoryEntity> for ContractHistoryEntry {
    fn from(e: &dao::contract_history::ContractHistoryEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            employee_id: e.employee_id,
            valid_from: e.valid_from,
            valid_to: e.valid_to,
            contract_type: e.contract_type.into(),
            hourly_rate: e.hourly_rate,
            weekly_hours: e.weekly_hours,
            full_time_percentage: e.full_time_percentage,
            monthly_hours_limit: e.monthly_hours_limit,
            annual_salary_limit: e.annual_salary_limit,
            note: e.note.clone(),
            created_at: Some(e.created_at),
            created_by_user_id: e.created_by_user_id,
        }
    }
}

/// The contract terms in effect for a given month, resolved either from a
/// `ContractHistory` row or, absent one, from the `Employee` cache fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractSnapshot {
    pub contract_type: ContractType,
    pub hourly_rate: f64,
    pub monthly_hours_limit: Option<f64>,
    pub annual_salary_limit: f64,
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait ContractHistoryService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all_for_employee(
        &self,
        employee_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[ContractHistoryEntry]>, ServiceError>;

    /// Resolves the contract snapshot in effect on the first of `month`,
    /// per spec.md §4.G.
    async fn resolve_for_month(
        &self,
        employee_id: Uuid,
        month: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ContractSnapshot, ServiceError>;

    /// Appends a new entry effective `valid_from`, closing the currently
    /// open entry and mirroring the new terms onto the `Employee` cache.
    async fn add_entry(
        &self,
        entry: &ContractHistoryEntry,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ContractHistoryEntry, ServiceError>;
}

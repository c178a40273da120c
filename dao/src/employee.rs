use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractType {
    Minijob,
    PartTime,
    FullTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmployeeEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: Arc<str>,
    pub last_name: Arc<str>,
    pub email: Option<Arc<str>>,
    pub phone: Option<Arc<str>>,
    pub contract_type: ContractType,
    pub hourly_rate: f64,
    pub weekly_hours: Option<f64>,
    pub full_time_percentage: Option<f64>,
    pub monthly_hours_limit: Option<f64>,
    pub annual_salary_limit: f64,
    pub vacation_days: i32,
    /// Opaque JSON array, decoded at the service edge.
    pub qualifications: Arc<str>,
    pub ical_token: Arc<str>,
    pub telegram_chat_id: Option<Arc<str>>,
    pub quiet_hours_start: Time,
    pub quiet_hours_end: Time,
    /// Opaque JSON object, decoded at the service edge; see §4.J.
    pub notification_prefs: Arc<str>,
    pub active: bool,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait EmployeeDao {
    type Transaction: crate::Transaction;

    /// Distinct tenant ids with at least one employee row. No `Tenant`
    /// aggregate is modelled in this schema; background jobs that must loop
    /// over tenants (see SPEC_FULL.md §5) use this as their tenant registry.
    async fn all_tenant_ids(&self, tx: Self::Transaction) -> Result<Arc<[Uuid]>, DaoError>;
    async fn all(&self, tenant_id: Uuid, tx: Self::Transaction) -> Result<Arc<[EmployeeEntity]>, DaoError>;
    async fn all_active(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeEntity>, DaoError>;
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeEntity>, DaoError>;
    async fn find_by_ical_token(
        &self,
        token: &str,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeEntity>, DaoError>;
    async fn create(&self, entity: &EmployeeEntity, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn update(&self, entity: &EmployeeEntity, tx: Self::Transaction) -> Result<(), DaoError>;
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurringShiftEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
    pub start_time: Time,
    pub end_time: Time,
    pub break_minutes: i32,
    pub employee_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub valid_from: Date,
    pub valid_until: Date,
    pub holiday_profile_id: Option<Uuid>,
    pub skip_public_holidays: bool,
    pub label: Option<Arc<str>>,
    pub active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait RecurringShiftDao {
    type Transaction: crate::Transaction;

    async fn all(&self, tenant_id: Uuid, tx: Self::Transaction) -> Result<Arc<[RecurringShiftEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<RecurringShiftEntity>, DaoError>;
    async fn create(
        &self,
        entity: &RecurringShiftEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &RecurringShiftEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn set_active(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        active: bool,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftTemplateEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: Arc<str>,
    /// Bitmask over weekdays, bit 0 = Monday .. bit 6 = Sunday.
    pub weekdays: u8,
    pub start_time: Time,
    pub end_time: Time,
    pub break_minutes: i32,
    pub location: Option<Arc<str>>,
    pub required_skills: Arc<[Arc<str>]>,
    pub color: Arc<str>,
    pub active: bool,
    pub valid_from: Option<Date>,
    pub valid_until: Option<Date>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ShiftTemplateDao {
    type Transaction: crate::Transaction;

    async fn all(&self, tenant_id: Uuid, tx: Self::Transaction) -> Result<Arc<[ShiftTemplateEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ShiftTemplateEntity>, DaoError>;
    async fn create(
        &self,
        entity: &ShiftTemplateEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &ShiftTemplateEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

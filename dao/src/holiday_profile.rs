use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolidayProfileEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: Arc<str>,
    pub region_code: Arc<str>,
    pub active: bool,
    pub created_at: PrimitiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VacationPeriodEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub tenant_id: Uuid,
    pub name: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub color: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomHolidayEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub tenant_id: Uuid,
    pub date: Date,
    pub name: Arc<str>,
    pub color: Arc<str>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait HolidayProfileDao {
    type Transaction: crate::Transaction;

    async fn all(&self, tenant_id: Uuid, tx: Self::Transaction) -> Result<Arc<[HolidayProfileEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<HolidayProfileEntity>, DaoError>;
    async fn find_active(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<HolidayProfileEntity>, DaoError>;
    async fn create(
        &self,
        entity: &HolidayProfileEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &HolidayProfileEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    /// Sets `active = false` on every profile of the tenant except `keep_id` (if given).
    async fn deactivate_all_except(
        &self,
        tenant_id: Uuid,
        keep_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete(&self, id: Uuid, tenant_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait VacationPeriodDao {
    type Transaction: crate::Transaction;

    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[VacationPeriodEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &VacationPeriodEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete(&self, id: Uuid, profile_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn delete_by_profile(&self, profile_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait CustomHolidayDao {
    type Transaction: crate::Transaction;

    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CustomHolidayEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &CustomHolidayEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete(&self, id: Uuid, profile_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn delete_by_profile(&self, profile_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
}

use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, DATE_FORMAT};
use async_trait::async_trait;
use dao::{
    holiday_profile::{
        CustomHolidayDao, CustomHolidayEntity, HolidayProfileDao, HolidayProfileEntity,
        VacationPeriodDao, VacationPeriodEntity,
    },
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

pub struct HolidayProfileDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl HolidayProfileDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct HolidayProfileDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    name: String,
    region_code: String,
    active: bool,
    created_at: String,
}
impl TryFrom<&HolidayProfileDb> for HolidayProfileEntity {
    type Error = DaoError;
    fn try_from(row: &HolidayProfileDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            name: row.name.as_str().into(),
            region_code: row.region_code.as_str().into(),
            active: row.active,
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl HolidayProfileDao for HolidayProfileDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[HolidayProfileEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            HolidayProfileDb,
            "SELECT id, tenant_id, name, region_code, active, created_at FROM holiday_profile \
             WHERE tenant_id = ?",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(HolidayProfileEntity::try_from)
        .collect::<Result<Arc<[HolidayProfileEntity]>, DaoError>>()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<HolidayProfileEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            HolidayProfileDb,
            "SELECT id, tenant_id, name, region_code, active, created_at FROM holiday_profile \
             WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(HolidayProfileEntity::try_from)
        .transpose()?)
    }

    async fn find_active(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<HolidayProfileEntity>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            HolidayProfileDb,
            "SELECT id, tenant_id, name, region_code, active, created_at FROM holiday_profile \
             WHERE tenant_id = ? AND active = 1",
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(HolidayProfileEntity::try_from)
        .transpose()?)
    }

    async fn create(
        &self,
        entity: &HolidayProfileEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let name = entity.name.as_ref();
        let region_code = entity.region_code.as_ref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO holiday_profile (id, tenant_id, name, region_code, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            name,
            region_code,
            entity.active,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &HolidayProfileEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let name = entity.name.as_ref();
        let region_code = entity.region_code.as_ref();
        query!(
            "UPDATE holiday_profile SET name = ?, region_code = ?, active = ? \
             WHERE id = ? AND tenant_id = ?",
            name,
            region_code,
            entity.active,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn deactivate_all_except(
        &self,
        tenant_id: Uuid,
        keep_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        let keep_id = keep_id.map(|id| id.as_bytes().to_vec());
        query!(
            "UPDATE holiday_profile SET active = 0 WHERE tenant_id = ? AND (? IS NULL OR id != ?)",
            tenant_id,
            keep_id,
            keep_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, tenant_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        query!(
            "DELETE FROM holiday_profile WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

pub struct VacationPeriodDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl VacationPeriodDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct VacationPeriodDb {
    id: Vec<u8>,
    profile_id: Vec<u8>,
    tenant_id: Vec<u8>,
    name: String,
    start_date: String,
    end_date: String,
    color: String,
}
impl TryFrom<&VacationPeriodDb> for VacationPeriodEntity {
    type Error = DaoError;
    fn try_from(row: &VacationPeriodDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            profile_id: Uuid::from_slice(&row.profile_id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            name: row.name.as_str().into(),
            start_date: Date::parse(&row.start_date, DATE_FORMAT).map_db_error()?,
            end_date: Date::parse(&row.end_date, DATE_FORMAT).map_db_error()?,
            color: row.color.as_str().into(),
        })
    }
}

#[async_trait]
impl VacationPeriodDao for VacationPeriodDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[VacationPeriodEntity]>, DaoError> {
        let profile_id = profile_id.as_bytes().to_vec();
        Ok(query_as!(
            VacationPeriodDb,
            "SELECT id, profile_id, tenant_id, name, start_date, end_date, color \
             FROM vacation_period WHERE profile_id = ?",
            profile_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(VacationPeriodEntity::try_from)
        .collect::<Result<Arc<[VacationPeriodEntity]>, DaoError>>()?)
    }

    async fn create(
        &self,
        entity: &VacationPeriodEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let profile_id = entity.profile_id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let name = entity.name.as_ref();
        let start_date = entity.start_date.format(DATE_FORMAT).map_db_error()?;
        let end_date = entity.end_date.format(DATE_FORMAT).map_db_error()?;
        let color = entity.color.as_ref();
        query!(
            "INSERT INTO vacation_period (id, profile_id, tenant_id, name, start_date, \
             end_date, color) VALUES (?, ?, ?, ?, ?, ?, ?)",
            id,
            profile_id,
            tenant_id,
            name,
            start_date,
            end_date,
            color,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, profile_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = id.as_bytes().to_vec();
        let profile_id = profile_id.as_bytes().to_vec();
        query!(
            "DELETE FROM vacation_period WHERE id = ? AND profile_id = ?",
            id,
            profile_id
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete_by_profile(
        &self,
        profile_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let profile_id = profile_id.as_bytes().to_vec();
        query!(
            "DELETE FROM vacation_period WHERE profile_id = ?",
            profile_id
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

pub struct CustomHolidayDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl CustomHolidayDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct CustomHolidayDb {
    id: Vec<u8>,
    profile_id: Vec<u8>,
    tenant_id: Vec<u8>,
    date: String,
    name: String,
    color: String,
}
impl TryFrom<&CustomHolidayDb> for CustomHolidayEntity {
    type Error = DaoError;
    fn try_from(row: &CustomHolidayDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            profile_id: Uuid::from_slice(&row.profile_id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            date: Date::parse(&row.date, DATE_FORMAT).map_db_error()?,
            name: row.name.as_str().into(),
            color: row.color.as_str().into(),
        })
    }
}

#[async_trait]
impl CustomHolidayDao for CustomHolidayDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CustomHolidayEntity]>, DaoError> {
        let profile_id = profile_id.as_bytes().to_vec();
        Ok(query_as!(
            CustomHolidayDb,
            "SELECT id, profile_id, tenant_id, date, name, color FROM custom_holiday \
             WHERE profile_id = ?",
            profile_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(CustomHolidayEntity::try_from)
        .collect::<Result<Arc<[CustomHolidayEntity]>, DaoError>>()?)
    }

    async fn create(
        &self,
        entity: &CustomHolidayEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let profile_id = entity.profile_id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let date = entity.date.format(DATE_FORMAT).map_db_error()?;
        let name = entity.name.as_ref();
        let color = entity.color.as_ref();
        query!(
            "INSERT INTO custom_holiday (id, profile_id, tenant_id, date, name, color) \
             VALUES (?, ?, ?, ?, ?, ?)",
            id,
            profile_id,
            tenant_id,
            date,
            name,
            color,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, profile_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = id.as_bytes().to_vec();
        let profile_id = profile_id.as_bytes().to_vec();
        query!(
            "DELETE FROM custom_holiday WHERE id = ? AND profile_id = ?",
            id,
            profile_id
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete_by_profile(
        &self,
        profile_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let profile_id = profile_id.as_bytes().to_vec();
        query!("DELETE FROM custom_holiday WHERE profile_id = ?", profile_id)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}

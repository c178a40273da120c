use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, DATE_FORMAT, TIME_FORMAT};
use async_trait::async_trait;
use dao::{
    recurring_shift::{RecurringShiftDao, RecurringShiftEntity},
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime, Time};
use uuid::Uuid;

pub struct RecurringShiftDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl RecurringShiftDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct RecurringShiftDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    weekday: i64,
    start_time: String,
    end_time: String,
    break_minutes: i64,
    employee_id: Option<Vec<u8>>,
    template_id: Option<Vec<u8>>,
    valid_from: String,
    valid_until: String,
    holiday_profile_id: Option<Vec<u8>>,
    skip_public_holidays: bool,
    label: Option<String>,
    active: bool,
    created_by: Option<Vec<u8>>,
    created_at: String,
}
impl TryFrom<&RecurringShiftDb> for RecurringShiftEntity {
    type Error = DaoError;
    fn try_from(row: &RecurringShiftDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            weekday: row.weekday as u8,
            start_time: Time::parse(&row.start_time, TIME_FORMAT).map_db_error()?,
            end_time: Time::parse(&row.end_time, TIME_FORMAT).map_db_error()?,
            break_minutes: row.break_minutes as i32,
            employee_id: row
                .employee_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            template_id: row
                .template_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            valid_from: Date::parse(&row.valid_from, DATE_FORMAT).map_db_error()?,
            valid_until: Date::parse(&row.valid_until, DATE_FORMAT).map_db_error()?,
            holiday_profile_id: row
                .holiday_profile_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            skip_public_holidays: row.skip_public_holidays,
            label: row.label.as_deref().map(Into::into),
            active: row.active,
            created_by: row
                .created_by
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl RecurringShiftDao for RecurringShiftDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[RecurringShiftEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            RecurringShiftDb,
            "SELECT id, tenant_id, weekday, start_time, end_time, break_minutes, employee_id, \
             template_id, valid_from, valid_until, holiday_profile_id, skip_public_holidays, \
             label, active, created_by, created_at FROM recurring_shift WHERE tenant_id = ?",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(RecurringShiftEntity::try_from)
        .collect::<Result<Arc<[RecurringShiftEntity]>, DaoError>>()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<RecurringShiftEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            RecurringShiftDb,
            "SELECT id, tenant_id, weekday, start_time, end_time, break_minutes, employee_id, \
             template_id, valid_from, valid_until, holiday_profile_id, skip_public_holidays, \
             label, active, created_by, created_at FROM recurring_shift \
             WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(RecurringShiftEntity::try_from)
        .transpose()?)
    }

    async fn create(
        &self,
        entity: &RecurringShiftEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let weekday = entity.weekday as i64;
        let start_time = entity.start_time.format(TIME_FORMAT).map_db_error()?;
        let end_time = entity.end_time.format(TIME_FORMAT).map_db_error()?;
        let employee_id = entity.employee_id.map(|id| id.as_bytes().to_vec());
        let template_id = entity.template_id.map(|id| id.as_bytes().to_vec());
        let valid_from = entity.valid_from.format(DATE_FORMAT).map_db_error()?;
        let valid_until = entity.valid_until.format(DATE_FORMAT).map_db_error()?;
        let holiday_profile_id = entity.holiday_profile_id.map(|id| id.as_bytes().to_vec());
        let label = entity.label.as_deref();
        let created_by = entity.created_by.map(|id| id.as_bytes().to_vec());
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO recurring_shift (id, tenant_id, weekday, start_time, end_time, \
             break_minutes, employee_id, template_id, valid_from, valid_until, \
             holiday_profile_id, skip_public_holidays, label, active, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            weekday,
            start_time,
            end_time,
            entity.break_minutes,
            employee_id,
            template_id,
            valid_from,
            valid_until,
            holiday_profile_id,
            entity.skip_public_holidays,
            label,
            entity.active,
            created_by,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &RecurringShiftEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let weekday = entity.weekday as i64;
        let start_time = entity.start_time.format(TIME_FORMAT).map_db_error()?;
        let end_time = entity.end_time.format(TIME_FORMAT).map_db_error()?;
        let employee_id = entity.employee_id.map(|id| id.as_bytes().to_vec());
        let template_id = entity.template_id.map(|id| id.as_bytes().to_vec());
        let valid_from = entity.valid_from.format(DATE_FORMAT).map_db_error()?;
        let valid_until = entity.valid_until.format(DATE_FORMAT).map_db_error()?;
        let holiday_profile_id = entity.holiday_profile_id.map(|id| id.as_bytes().to_vec());
        let label = entity.label.as_deref();
        query!(
            "UPDATE recurring_shift SET weekday = ?, start_time = ?, end_time = ?, \
             break_minutes = ?, employee_id = ?, template_id = ?, valid_from = ?, \
             valid_until = ?, holiday_profile_id = ?, skip_public_holidays = ?, label = ?, \
             active = ? WHERE id = ? AND tenant_id = ?",
            weekday,
            start_time,
            end_time,
            entity.break_minutes,
            employee_id,
            template_id,
            valid_from,
            valid_until,
            holiday_profile_id,
            entity.skip_public_holidays,
            label,
            entity.active,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn set_active(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        active: bool,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        query!(
            "UPDATE recurring_shift SET active = ? WHERE id = ? AND tenant_id = ?",
            active,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, TIME_FORMAT};
use async_trait::async_trait;
use dao::{
    shift::{ShiftDao, ShiftEntity, ShiftFilter, ShiftStatus},
    DaoError,
};
use sqlx::{query, query_as};
use time::{
    format_description::well_known::Iso8601, macros::format_description, Date, PrimitiveDateTime,
    Time,
};
use uuid::Uuid;

const SHIFT_DATE_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub struct ShiftDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl ShiftDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

fn status_to_str(status: ShiftStatus) -> &'static str {
    match status {
        ShiftStatus::Planned => "planned",
        ShiftStatus::Confirmed => "confirmed",
        ShiftStatus::Completed => "completed",
        ShiftStatus::Cancelled => "cancelled",
        ShiftStatus::CancelledAbsence => "cancelled_absence",
    }
}

fn status_from_str(status: &str) -> Result<ShiftStatus, DaoError> {
    match status {
        "planned" => Ok(ShiftStatus::Planned),
        "confirmed" => Ok(ShiftStatus::Confirmed),
        "completed" => Ok(ShiftStatus::Completed),
        "cancelled" => Ok(ShiftStatus::Cancelled),
        "cancelled_absence" => Ok(ShiftStatus::CancelledAbsence),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown shift status `{other}`").into(),
        )),
    }
}

struct ShiftDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    employee_id: Option<Vec<u8>>,
    template_id: Option<Vec<u8>>,
    recurring_shift_id: Option<Vec<u8>>,
    date: String,
    start_time: String,
    end_time: String,
    break_minutes: i64,
    location: Option<String>,
    notes: Option<String>,
    status: String,
    cancellation_reason: Option<String>,
    actual_start: Option<String>,
    actual_end: Option<String>,
    confirmed_by: Option<Vec<u8>>,
    confirmed_at: Option<String>,
    confirmation_note: Option<String>,
    is_holiday: bool,
    is_weekend: bool,
    is_sunday: bool,
    rest_period_ok: bool,
    break_ok: bool,
    minijob_limit_ok: bool,
    hours_carried_over: bool,
    is_override: bool,
    created_at: String,
    updated_at: String,
}
impl TryFrom<&ShiftDb> for ShiftEntity {
    type Error = DaoError;
    fn try_from(row: &ShiftDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
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
            recurring_shift_id: row
                .recurring_shift_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            date: Date::parse(&row.date, SHIFT_DATE_FORMAT).map_db_error()?,
            start_time: Time::parse(&row.start_time, TIME_FORMAT).map_db_error()?,
            end_time: Time::parse(&row.end_time, TIME_FORMAT).map_db_error()?,
            break_minutes: row.break_minutes as i32,
            location: row.location.as_deref().map(Into::into),
            notes: row.notes.as_deref().map(Into::into),
            status: status_from_str(&row.status)?,
            cancellation_reason: row.cancellation_reason.as_deref().map(Into::into),
            actual_start: row
                .actual_start
                .as_ref()
                .map(|time| Time::parse(time, TIME_FORMAT))
                .transpose()
                .map_db_error()?,
            actual_end: row
                .actual_end
                .as_ref()
                .map(|time| Time::parse(time, TIME_FORMAT))
                .transpose()
                .map_db_error()?,
            confirmed_by: row
                .confirmed_by
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            confirmed_at: row
                .confirmed_at
                .as_ref()
                .map(|ts| PrimitiveDateTime::parse(ts, &Iso8601::DATE_TIME))
                .transpose()
                .map_db_error()?,
            confirmation_note: row.confirmation_note.as_deref().map(Into::into),
            is_holiday: row.is_holiday,
            is_weekend: row.is_weekend,
            is_sunday: row.is_sunday,
            rest_period_ok: row.rest_period_ok,
            break_ok: row.break_ok,
            minijob_limit_ok: row.minijob_limit_ok,
            hours_carried_over: row.hours_carried_over,
            is_override: row.is_override,
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
            updated_at: PrimitiveDateTime::parse(&row.updated_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl ShiftDao for ShiftDaoImpl {
    type Transaction = TransactionImpl;

    /// Filters are applied with `(? IS NULL OR col = ?)` so the query plan
    /// stays static regardless of which combination the caller supplies.
    async fn find(
        &self,
        tenant_id: Uuid,
        filter: ShiftFilter,
        tx: Self::Transaction,
    ) -> Result<Arc<[ShiftEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        let employee_id = filter.employee_id.map(|id| id.as_bytes().to_vec());
        let from_date = filter
            .from_date
            .map(|date| date.format(SHIFT_DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        let to_date = filter
            .to_date
            .map(|date| date.format(SHIFT_DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        let recurring_shift_id = filter.recurring_shift_id.map(|id| id.as_bytes().to_vec());
        Ok(query_as!(
            ShiftDb,
            "SELECT id, tenant_id, employee_id, template_id, recurring_shift_id, date, \
             start_time, end_time, break_minutes, location, notes, status, \
             cancellation_reason, actual_start, actual_end, confirmed_by, confirmed_at, \
             confirmation_note, is_holiday, is_weekend, is_sunday, rest_period_ok, break_ok, \
             minijob_limit_ok, hours_carried_over, is_override, created_at, updated_at \
             FROM shift WHERE tenant_id = ? \
             AND (?1 IS NULL OR employee_id = ?1) \
             AND (?2 IS NULL OR date >= ?2) \
             AND (?3 IS NULL OR date <= ?3) \
             AND (?4 IS NULL OR recurring_shift_id = ?4) \
             ORDER BY date, start_time",
            tenant_id,
            employee_id,
            from_date,
            to_date,
            recurring_shift_id,
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(ShiftEntity::try_from)
        .collect::<Result<Arc<[ShiftEntity]>, DaoError>>()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ShiftEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            ShiftDb,
            "SELECT id, tenant_id, employee_id, template_id, recurring_shift_id, date, \
             start_time, end_time, break_minutes, location, notes, status, \
             cancellation_reason, actual_start, actual_end, confirmed_by, confirmed_at, \
             confirmation_note, is_holiday, is_weekend, is_sunday, rest_period_ok, break_ok, \
             minijob_limit_ok, hours_carried_over, is_override, created_at, updated_at \
             FROM shift WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ShiftEntity::try_from)
        .transpose()?)
    }

    async fn find_last_before(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        before_date: Date,
        tx: Self::Transaction,
    ) -> Result<Option<ShiftEntity>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        let before_date = before_date.format(SHIFT_DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            ShiftDb,
            "SELECT id, tenant_id, employee_id, template_id, recurring_shift_id, date, \
             start_time, end_time, break_minutes, location, notes, status, \
             cancellation_reason, actual_start, actual_end, confirmed_by, confirmed_at, \
             confirmation_note, is_holiday, is_weekend, is_sunday, rest_period_ok, break_ok, \
             minijob_limit_ok, hours_carried_over, is_override, created_at, updated_at \
             FROM shift WHERE employee_id = ? AND tenant_id = ? AND date < ? AND \
             status != 'cancelled' AND status != 'cancelled_absence' \
             ORDER BY date DESC, end_time DESC LIMIT 1",
            employee_id,
            tenant_id,
            before_date,
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ShiftEntity::try_from)
        .transpose()?)
    }

    async fn find_planned_non_override_by_rule_from(
        &self,
        recurring_shift_id: Uuid,
        from_date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[ShiftEntity]>, DaoError> {
        let recurring_shift_id = recurring_shift_id.as_bytes().to_vec();
        let from_date = from_date.format(SHIFT_DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            ShiftDb,
            "SELECT id, tenant_id, employee_id, template_id, recurring_shift_id, date, \
             start_time, end_time, break_minutes, location, notes, status, \
             cancellation_reason, actual_start, actual_end, confirmed_by, confirmed_at, \
             confirmation_note, is_holiday, is_weekend, is_sunday, rest_period_ok, break_ok, \
             minijob_limit_ok, hours_carried_over, is_override, created_at, updated_at \
             FROM shift WHERE recurring_shift_id = ? AND date >= ? AND status = 'planned' \
             AND is_override = 0 ORDER BY date",
            recurring_shift_id,
            from_date,
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(ShiftEntity::try_from)
        .collect::<Result<Arc<[ShiftEntity]>, DaoError>>()?)
    }

    async fn create(&self, entity: &ShiftEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.map(|id| id.as_bytes().to_vec());
        let template_id = entity.template_id.map(|id| id.as_bytes().to_vec());
        let recurring_shift_id = entity.recurring_shift_id.map(|id| id.as_bytes().to_vec());
        let date = entity.date.format(SHIFT_DATE_FORMAT).map_db_error()?;
        let start_time = entity.start_time.format(TIME_FORMAT).map_db_error()?;
        let end_time = entity.end_time.format(TIME_FORMAT).map_db_error()?;
        let location = entity.location.as_deref();
        let notes = entity.notes.as_deref();
        let status = status_to_str(entity.status);
        let cancellation_reason = entity.cancellation_reason.as_deref();
        let actual_start = entity
            .actual_start
            .map(|time| time.format(TIME_FORMAT))
            .transpose()
            .map_db_error()?;
        let actual_end = entity
            .actual_end
            .map(|time| time.format(TIME_FORMAT))
            .transpose()
            .map_db_error()?;
        let confirmed_by = entity.confirmed_by.map(|id| id.as_bytes().to_vec());
        let confirmed_at = entity
            .confirmed_at
            .map(|ts| ts.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        let confirmation_note = entity.confirmation_note.as_deref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        let updated_at = entity.updated_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO shift (id, tenant_id, employee_id, template_id, recurring_shift_id, \
             date, start_time, end_time, break_minutes, location, notes, status, \
             cancellation_reason, actual_start, actual_end, confirmed_by, confirmed_at, \
             confirmation_note, is_holiday, is_weekend, is_sunday, rest_period_ok, break_ok, \
             minijob_limit_ok, hours_carried_over, is_override, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, \
             ?, ?, ?)",
            id,
            tenant_id,
            employee_id,
            template_id,
            recurring_shift_id,
            date,
            start_time,
            end_time,
            entity.break_minutes,
            location,
            notes,
            status,
            cancellation_reason,
            actual_start,
            actual_end,
            confirmed_by,
            confirmed_at,
            confirmation_note,
            entity.is_holiday,
            entity.is_weekend,
            entity.is_sunday,
            entity.rest_period_ok,
            entity.break_ok,
            entity.minijob_limit_ok,
            entity.hours_carried_over,
            entity.is_override,
            created_at,
            updated_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(&self, entity: &ShiftEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.map(|id| id.as_bytes().to_vec());
        let template_id = entity.template_id.map(|id| id.as_bytes().to_vec());
        let date = entity.date.format(SHIFT_DATE_FORMAT).map_db_error()?;
        let start_time = entity.start_time.format(TIME_FORMAT).map_db_error()?;
        let end_time = entity.end_time.format(TIME_FORMAT).map_db_error()?;
        let location = entity.location.as_deref();
        let notes = entity.notes.as_deref();
        let status = status_to_str(entity.status);
        let cancellation_reason = entity.cancellation_reason.as_deref();
        let actual_start = entity
            .actual_start
            .map(|time| time.format(TIME_FORMAT))
            .transpose()
            .map_db_error()?;
        let actual_end = entity
            .actual_end
            .map(|time| time.format(TIME_FORMAT))
            .transpose()
            .map_db_error()?;
        let confirmed_by = entity.confirmed_by.map(|id| id.as_bytes().to_vec());
        let confirmed_at = entity
            .confirmed_at
            .map(|ts| ts.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        let confirmation_note = entity.confirmation_note.as_deref();
        let updated_at = entity.updated_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "UPDATE shift SET employee_id = ?, template_id = ?, date = ?, start_time = ?, \
             end_time = ?, break_minutes = ?, location = ?, notes = ?, status = ?, \
             cancellation_reason = ?, actual_start = ?, actual_end = ?, confirmed_by = ?, \
             confirmed_at = ?, confirmation_note = ?, is_holiday = ?, is_weekend = ?, \
             is_sunday = ?, rest_period_ok = ?, break_ok = ?, minijob_limit_ok = ?, \
             hours_carried_over = ?, is_override = ?, updated_at = ? WHERE id = ? AND \
             tenant_id = ?",
            employee_id,
            template_id,
            date,
            start_time,
            end_time,
            entity.break_minutes,
            location,
            notes,
            status,
            cancellation_reason,
            actual_start,
            actual_end,
            confirmed_by,
            confirmed_at,
            confirmation_note,
            entity.is_holiday,
            entity.is_weekend,
            entity.is_sunday,
            entity.rest_period_ok,
            entity.break_ok,
            entity.minijob_limit_ok,
            entity.hours_carried_over,
            entity.is_override,
            updated_at,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, tenant_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        query!("DELETE FROM shift WHERE id = ? AND tenant_id = ?", id, tenant_id)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn delete_planned_non_override_by_rule_from(
        &self,
        recurring_shift_id: Uuid,
        from_date: Date,
        tx: Self::Transaction,
    ) -> Result<u64, DaoError> {
        let recurring_shift_id = recurring_shift_id.as_bytes().to_vec();
        let from_date = from_date.format(SHIFT_DATE_FORMAT).map_db_error()?;
        Ok(query!(
            "DELETE FROM shift WHERE recurring_shift_id = ? AND date >= ? AND status = \
             'planned' AND is_override = 0",
            recurring_shift_id,
            from_date,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .rows_affected())
    }

    async fn delete_planned_non_override_by_rule(
        &self,
        recurring_shift_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<u64, DaoError> {
        let recurring_shift_id = recurring_shift_id.as_bytes().to_vec();
        Ok(query!(
            "DELETE FROM shift WHERE recurring_shift_id = ? AND status = 'planned' AND \
             is_override = 0",
            recurring_shift_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .rows_affected())
    }
}

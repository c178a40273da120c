use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, DATE_FORMAT};
use async_trait::async_trait;
use dao::{
    payroll::{
        HoursCarryoverDao, HoursCarryoverEntity, PayrollEntryDao, PayrollEntryEntity,
        PayrollStatus,
    },
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

pub struct PayrollEntryDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl PayrollEntryDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

fn status_to_str(value: PayrollStatus) -> &'static str {
    match value {
        PayrollStatus::Draft => "draft",
        PayrollStatus::Approved => "approved",
        PayrollStatus::Paid => "paid",
    }
}
fn status_from_str(value: &str) -> Result<PayrollStatus, DaoError> {
    match value {
        "draft" => Ok(PayrollStatus::Draft),
        "approved" => Ok(PayrollStatus::Approved),
        "paid" => Ok(PayrollStatus::Paid),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown payroll status `{other}`").into(),
        )),
    }
}

struct PayrollEntryDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    employee_id: Vec<u8>,
    month: String,
    planned_hours: Option<f64>,
    actual_hours: f64,
    carryover_hours: f64,
    paid_hours: f64,
    early_hours: f64,
    late_hours: f64,
    night_hours: f64,
    weekend_hours: f64,
    sunday_hours: f64,
    holiday_hours: f64,
    base_wage: f64,
    early_surcharge: f64,
    late_surcharge: f64,
    night_surcharge: f64,
    weekend_surcharge: f64,
    sunday_surcharge: f64,
    holiday_surcharge: f64,
    total_gross: f64,
    ytd_gross: f64,
    annual_limit_remaining: f64,
    status: String,
    notes: Option<String>,
    created_at: String,
}
impl TryFrom<&PayrollEntryDb> for PayrollEntryEntity {
    type Error = DaoError;
    fn try_from(row: &PayrollEntryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            employee_id: Uuid::from_slice(&row.employee_id).map_db_error()?,
            month: Date::parse(&row.month, DATE_FORMAT).map_db_error()?,
            planned_hours: row.planned_hours,
            actual_hours: row.actual_hours,
            carryover_hours: row.carryover_hours,
            paid_hours: row.paid_hours,
            early_hours: row.early_hours,
            late_hours: row.late_hours,
            night_hours: row.night_hours,
            weekend_hours: row.weekend_hours,
            sunday_hours: row.sunday_hours,
            holiday_hours: row.holiday_hours,
            base_wage: row.base_wage,
            early_surcharge: row.early_surcharge,
            late_surcharge: row.late_surcharge,
            night_surcharge: row.night_surcharge,
            weekend_surcharge: row.weekend_surcharge,
            sunday_surcharge: row.sunday_surcharge,
            holiday_surcharge: row.holiday_surcharge,
            total_gross: row.total_gross,
            ytd_gross: row.ytd_gross,
            annual_limit_remaining: row.annual_limit_remaining,
            status: status_from_str(&row.status)?,
            notes: row.notes.as_deref().map(Into::into),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl PayrollEntryDao for PayrollEntryDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_employee_and_month(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        month: Date,
        tx: Self::Transaction,
    ) -> Result<Option<PayrollEntryEntity>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        let month = month.format(DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            PayrollEntryDb,
            "SELECT id, tenant_id, employee_id, month, planned_hours, actual_hours, \
             carryover_hours, paid_hours, early_hours, late_hours, night_hours, weekend_hours, \
             sunday_hours, holiday_hours, base_wage, early_surcharge, late_surcharge, \
             night_surcharge, weekend_surcharge, sunday_surcharge, holiday_surcharge, \
             total_gross, ytd_gross, annual_limit_remaining, status, notes, created_at \
             FROM payroll_entry WHERE employee_id = ? AND tenant_id = ? AND month = ?",
            employee_id,
            tenant_id,
            month,
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(PayrollEntryEntity::try_from)
        .transpose()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<PayrollEntryEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            PayrollEntryDb,
            "SELECT id, tenant_id, employee_id, month, planned_hours, actual_hours, \
             carryover_hours, paid_hours, early_hours, late_hours, night_hours, weekend_hours, \
             sunday_hours, holiday_hours, base_wage, early_surcharge, late_surcharge, \
             night_surcharge, weekend_surcharge, sunday_surcharge, holiday_surcharge, \
             total_gross, ytd_gross, annual_limit_remaining, status, notes, created_at \
             FROM payroll_entry WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(PayrollEntryEntity::try_from)
        .transpose()?)
    }

    async fn find_by_tenant_and_month(
        &self,
        tenant_id: Uuid,
        month: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[PayrollEntryEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        let month = month.format(DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            PayrollEntryDb,
            "SELECT id, tenant_id, employee_id, month, planned_hours, actual_hours, \
             carryover_hours, paid_hours, early_hours, late_hours, night_hours, weekend_hours, \
             sunday_hours, holiday_hours, base_wage, early_surcharge, late_surcharge, \
             night_surcharge, weekend_surcharge, sunday_surcharge, holiday_surcharge, \
             total_gross, ytd_gross, annual_limit_remaining, status, notes, created_at \
             FROM payroll_entry WHERE tenant_id = ? AND month = ?",
            tenant_id,
            month,
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(PayrollEntryEntity::try_from)
        .collect::<Result<Arc<[PayrollEntryEntity]>, DaoError>>()?)
    }

    async fn find_committed_in_range(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        from_month: Date,
        before_month: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[PayrollEntryEntity]>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        let from_month = from_month.format(DATE_FORMAT).map_db_error()?;
        let before_month = before_month.format(DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            PayrollEntryDb,
            "SELECT id, tenant_id, employee_id, month, planned_hours, actual_hours, \
             carryover_hours, paid_hours, early_hours, late_hours, night_hours, weekend_hours, \
             sunday_hours, holiday_hours, base_wage, early_surcharge, late_surcharge, \
             night_surcharge, weekend_surcharge, sunday_surcharge, holiday_surcharge, \
             total_gross, ytd_gross, annual_limit_remaining, status, notes, created_at \
             FROM payroll_entry WHERE employee_id = ? AND tenant_id = ? AND month >= ? AND \
             month < ? AND status != 'draft' ORDER BY month",
            employee_id,
            tenant_id,
            from_month,
            before_month,
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(PayrollEntryEntity::try_from)
        .collect::<Result<Arc<[PayrollEntryEntity]>, DaoError>>()?)
    }

    async fn upsert(
        &self,
        entity: &PayrollEntryEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.as_bytes().to_vec();
        let month = entity.month.format(DATE_FORMAT).map_db_error()?;
        let status = status_to_str(entity.status);
        let notes = entity.notes.as_deref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO payroll_entry (id, tenant_id, employee_id, month, planned_hours, \
             actual_hours, carryover_hours, paid_hours, early_hours, late_hours, night_hours, \
             weekend_hours, sunday_hours, holiday_hours, base_wage, early_surcharge, \
             late_surcharge, night_surcharge, weekend_surcharge, sunday_surcharge, \
             holiday_surcharge, total_gross, ytd_gross, annual_limit_remaining, status, notes, \
             created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, \
             ?, ?) \
             ON CONFLICT (tenant_id, employee_id, month) DO UPDATE SET \
             planned_hours = excluded.planned_hours, \
             actual_hours = excluded.actual_hours, \
             carryover_hours = excluded.carryover_hours, \
             paid_hours = excluded.paid_hours, \
             early_hours = excluded.early_hours, \
             late_hours = excluded.late_hours, \
             night_hours = excluded.night_hours, \
             weekend_hours = excluded.weekend_hours, \
             sunday_hours = excluded.sunday_hours, \
             holiday_hours = excluded.holiday_hours, \
             base_wage = excluded.base_wage, \
             early_surcharge = excluded.early_surcharge, \
             late_surcharge = excluded.late_surcharge, \
             night_surcharge = excluded.night_surcharge, \
             weekend_surcharge = excluded.weekend_surcharge, \
             sunday_surcharge = excluded.sunday_surcharge, \
             holiday_surcharge = excluded.holiday_surcharge, \
             total_gross = excluded.total_gross, \
             ytd_gross = excluded.ytd_gross, \
             annual_limit_remaining = excluded.annual_limit_remaining, \
             status = excluded.status, \
             notes = excluded.notes",
            id,
            tenant_id,
            employee_id,
            month,
            entity.planned_hours,
            entity.actual_hours,
            entity.carryover_hours,
            entity.paid_hours,
            entity.early_hours,
            entity.late_hours,
            entity.night_hours,
            entity.weekend_hours,
            entity.sunday_hours,
            entity.holiday_hours,
            entity.base_wage,
            entity.early_surcharge,
            entity.late_surcharge,
            entity.night_surcharge,
            entity.weekend_surcharge,
            entity.sunday_surcharge,
            entity.holiday_surcharge,
            entity.total_gross,
            entity.ytd_gross,
            entity.annual_limit_remaining,
            status,
            notes,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

pub struct HoursCarryoverDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl HoursCarryoverDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct HoursCarryoverDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    employee_id: Vec<u8>,
    from_month: String,
    to_month: String,
    hours: f64,
    reason: Option<String>,
    created_by: Option<Vec<u8>>,
    created_at: String,
}
impl TryFrom<&HoursCarryoverDb> for HoursCarryoverEntity {
    type Error = DaoError;
    fn try_from(row: &HoursCarryoverDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            employee_id: Uuid::from_slice(&row.employee_id).map_db_error()?,
            from_month: Date::parse(&row.from_month, DATE_FORMAT).map_db_error()?,
            to_month: Date::parse(&row.to_month, DATE_FORMAT).map_db_error()?,
            hours: row.hours,
            reason: row.reason.as_deref().map(Into::into),
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
impl HoursCarryoverDao for HoursCarryoverDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_latest_into_month(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        to_month: Date,
        tx: Self::Transaction,
    ) -> Result<Option<HoursCarryoverEntity>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        let to_month = to_month.format(DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            HoursCarryoverDb,
            "SELECT id, tenant_id, employee_id, from_month, to_month, hours, reason, \
             created_by, created_at FROM hours_carryover WHERE employee_id = ? AND \
             tenant_id = ? AND to_month = ? ORDER BY created_at DESC LIMIT 1",
            employee_id,
            tenant_id,
            to_month,
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(HoursCarryoverEntity::try_from)
        .transpose()?)
    }

    async fn create(
        &self,
        entity: &HoursCarryoverEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.as_bytes().to_vec();
        let from_month = entity.from_month.format(DATE_FORMAT).map_db_error()?;
        let to_month = entity.to_month.format(DATE_FORMAT).map_db_error()?;
        let reason = entity.reason.as_deref();
        let created_by = entity.created_by.map(|id| id.as_bytes().to_vec());
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO hours_carryover (id, tenant_id, employee_id, from_month, to_month, \
             hours, reason, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            employee_id,
            from_month,
            to_month,
            entity.hours,
            reason,
            created_by,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

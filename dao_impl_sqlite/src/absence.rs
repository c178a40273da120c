use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, DATE_FORMAT};
use async_trait::async_trait;
use dao::{
    absence::{
        AbsenceStatus, AbsenceType, CareRecipientAbsenceDao, CareRecipientAbsenceEntity,
        EmployeeAbsenceDao, EmployeeAbsenceEntity,
    },
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

pub struct EmployeeAbsenceDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl EmployeeAbsenceDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

fn absence_type_to_str(value: AbsenceType) -> &'static str {
    match value {
        AbsenceType::Vacation => "vacation",
        AbsenceType::Sick => "sick",
        AbsenceType::SchoolHoliday => "school_holiday",
        AbsenceType::Other => "other",
    }
}
fn absence_type_from_str(value: &str) -> Result<AbsenceType, DaoError> {
    match value {
        "vacation" => Ok(AbsenceType::Vacation),
        "sick" => Ok(AbsenceType::Sick),
        "school_holiday" => Ok(AbsenceType::SchoolHoliday),
        "other" => Ok(AbsenceType::Other),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown absence_type `{other}`").into(),
        )),
    }
}
fn absence_status_to_str(value: AbsenceStatus) -> &'static str {
    match value {
        AbsenceStatus::Pending => "pending",
        AbsenceStatus::Approved => "approved",
        AbsenceStatus::Rejected => "rejected",
    }
}
fn absence_status_from_str(value: &str) -> Result<AbsenceStatus, DaoError> {
    match value {
        "pending" => Ok(AbsenceStatus::Pending),
        "approved" => Ok(AbsenceStatus::Approved),
        "rejected" => Ok(AbsenceStatus::Rejected),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown absence status `{other}`").into(),
        )),
    }
}

struct EmployeeAbsenceDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    employee_id: Vec<u8>,
    absence_type: String,
    start_date: String,
    end_date: String,
    days_count: Option<i64>,
    status: String,
    notes: Option<String>,
    approved_by: Option<Vec<u8>>,
    approved_at: Option<String>,
    created_at: String,
}
impl TryFrom<&EmployeeAbsenceDb> for EmployeeAbsenceEntity {
    type Error = DaoError;
    fn try_from(row: &EmployeeAbsenceDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            employee_id: Uuid::from_slice(&row.employee_id).map_db_error()?,
            absence_type: absence_type_from_str(&row.absence_type)?,
            start_date: Date::parse(&row.start_date, DATE_FORMAT).map_db_error()?,
            end_date: Date::parse(&row.end_date, DATE_FORMAT).map_db_error()?,
            days_count: row.days_count.map(|count| count as i32),
            status: absence_status_from_str(&row.status)?,
            notes: row.notes.as_deref().map(Into::into),
            approved_by: row
                .approved_by
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            approved_at: row
                .approved_at
                .as_ref()
                .map(|ts| PrimitiveDateTime::parse(ts, &Iso8601::DATE_TIME))
                .transpose()
                .map_db_error()?,
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl EmployeeAbsenceDao for EmployeeAbsenceDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeAbsenceEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeAbsenceDb,
            "SELECT id, tenant_id, employee_id, absence_type, start_date, end_date, \
             days_count, status, notes, approved_by, approved_at, created_at \
             FROM employee_absence WHERE tenant_id = ? ORDER BY start_date",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(EmployeeAbsenceEntity::try_from)
        .collect::<Result<Arc<[EmployeeAbsenceEntity]>, DaoError>>()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeAbsenceEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeAbsenceDb,
            "SELECT id, tenant_id, employee_id, absence_type, start_date, end_date, \
             days_count, status, notes, approved_by, approved_at, created_at \
             FROM employee_absence WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(EmployeeAbsenceEntity::try_from)
        .transpose()?)
    }

    async fn find_by_employee(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeAbsenceEntity]>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeAbsenceDb,
            "SELECT id, tenant_id, employee_id, absence_type, start_date, end_date, \
             days_count, status, notes, approved_by, approved_at, created_at \
             FROM employee_absence WHERE employee_id = ? AND tenant_id = ? ORDER BY start_date",
            employee_id,
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(EmployeeAbsenceEntity::try_from)
        .collect::<Result<Arc<[EmployeeAbsenceEntity]>, DaoError>>()?)
    }

    async fn create(
        &self,
        entity: &EmployeeAbsenceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.as_bytes().to_vec();
        let absence_type = absence_type_to_str(entity.absence_type);
        let start_date = entity.start_date.format(DATE_FORMAT).map_db_error()?;
        let end_date = entity.end_date.format(DATE_FORMAT).map_db_error()?;
        let days_count = entity.days_count;
        let status = absence_status_to_str(entity.status);
        let notes = entity.notes.as_deref();
        let approved_by = entity.approved_by.map(|id| id.as_bytes().to_vec());
        let approved_at = entity
            .approved_at
            .map(|ts| ts.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO employee_absence (id, tenant_id, employee_id, absence_type, \
             start_date, end_date, days_count, status, notes, approved_by, approved_at, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            employee_id,
            absence_type,
            start_date,
            end_date,
            days_count,
            status,
            notes,
            approved_by,
            approved_at,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &EmployeeAbsenceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let absence_type = absence_type_to_str(entity.absence_type);
        let start_date = entity.start_date.format(DATE_FORMAT).map_db_error()?;
        let end_date = entity.end_date.format(DATE_FORMAT).map_db_error()?;
        let days_count = entity.days_count;
        let status = absence_status_to_str(entity.status);
        let notes = entity.notes.as_deref();
        let approved_by = entity.approved_by.map(|id| id.as_bytes().to_vec());
        let approved_at = entity
            .approved_at
            .map(|ts| ts.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        query!(
            "UPDATE employee_absence SET absence_type = ?, start_date = ?, end_date = ?, \
             days_count = ?, status = ?, notes = ?, approved_by = ?, approved_at = ? \
             WHERE id = ? AND tenant_id = ?",
            absence_type,
            start_date,
            end_date,
            days_count,
            status,
            notes,
            approved_by,
            approved_at,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

pub struct CareRecipientAbsenceDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl CareRecipientAbsenceDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct CareRecipientAbsenceDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    care_recipient_name: String,
    start_date: String,
    end_date: String,
    notes: Option<String>,
    created_at: String,
}
impl TryFrom<&CareRecipientAbsenceDb> for CareRecipientAbsenceEntity {
    type Error = DaoError;
    fn try_from(row: &CareRecipientAbsenceDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            care_recipient_name: row.care_recipient_name.as_str().into(),
            start_date: Date::parse(&row.start_date, DATE_FORMAT).map_db_error()?,
            end_date: Date::parse(&row.end_date, DATE_FORMAT).map_db_error()?,
            notes: row.notes.as_deref().map(Into::into),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl CareRecipientAbsenceDao for CareRecipientAbsenceDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CareRecipientAbsenceEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            CareRecipientAbsenceDb,
            "SELECT id, tenant_id, care_recipient_name, start_date, end_date, notes, \
             created_at FROM care_recipient_absence WHERE tenant_id = ? ORDER BY start_date",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(CareRecipientAbsenceEntity::try_from)
        .collect::<Result<Arc<[CareRecipientAbsenceEntity]>, DaoError>>()?)
    }

    async fn create(
        &self,
        entity: &CareRecipientAbsenceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let care_recipient_name = entity.care_recipient_name.as_ref();
        let start_date = entity.start_date.format(DATE_FORMAT).map_db_error()?;
        let end_date = entity.end_date.format(DATE_FORMAT).map_db_error()?;
        let notes = entity.notes.as_deref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO care_recipient_absence (id, tenant_id, care_recipient_name, \
             start_date, end_date, notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            care_recipient_name,
            start_date,
            end_date,
            notes,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

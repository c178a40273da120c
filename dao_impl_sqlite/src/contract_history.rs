use std::sync::Arc;

use crate::{employee::contract_type_from_str, employee::contract_type_to_str, ResultDbErrorExt, TransactionImpl, DATE_FORMAT};
use async_trait::async_trait;
use dao::{
    contract_history::{ContractHistoryDao, ContractHistoryEntity},
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

pub struct ContractHistoryDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl ContractHistoryDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct ContractHistoryDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    employee_id: Vec<u8>,
    valid_from: String,
    valid_to: Option<String>,
    contract_type: String,
    hourly_rate: f64,
    weekly_hours: Option<f64>,
    full_time_percentage: Option<f64>,
    monthly_hours_limit: Option<f64>,
    annual_salary_limit: Option<f64>,
    note: Option<String>,
    created_at: String,
    created_by_user_id: Option<Vec<u8>>,
}
impl TryFrom<&ContractHistoryDb> for ContractHistoryEntity {
    type Error = DaoError;
    fn try_from(row: &ContractHistoryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            employee_id: Uuid::from_slice(&row.employee_id).map_db_error()?,
            valid_from: Date::parse(&row.valid_from, DATE_FORMAT).map_db_error()?,
            valid_to: row
                .valid_to
                .as_ref()
                .map(|date| Date::parse(date, DATE_FORMAT))
                .transpose()
                .map_db_error()?,
            contract_type: contract_type_from_str(&row.contract_type)?,
            hourly_rate: row.hourly_rate,
            weekly_hours: row.weekly_hours,
            full_time_percentage: row.full_time_percentage,
            monthly_hours_limit: row.monthly_hours_limit,
            annual_salary_limit: row.annual_salary_limit,
            note: row.note.as_deref().map(Into::into),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
            created_by_user_id: row
                .created_by_user_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl ContractHistoryDao for ContractHistoryDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_employee(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[ContractHistoryEntity]>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            ContractHistoryDb,
            "SELECT id, tenant_id, employee_id, valid_from, valid_to, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, note, created_at, created_by_user_id FROM contract_history \
             WHERE employee_id = ? AND tenant_id = ? ORDER BY valid_from",
            employee_id,
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(ContractHistoryEntity::try_from)
        .collect::<Result<Arc<[ContractHistoryEntity]>, DaoError>>()?)
    }

    async fn find_effective_at(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        at_date: Date,
        tx: Self::Transaction,
    ) -> Result<Option<ContractHistoryEntity>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        let at_date = at_date.format(DATE_FORMAT).map_db_error()?;
        Ok(query_as!(
            ContractHistoryDb,
            "SELECT id, tenant_id, employee_id, valid_from, valid_to, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, note, created_at, created_by_user_id FROM contract_history \
             WHERE employee_id = ? AND tenant_id = ? AND valid_from <= ? AND \
             (valid_to IS NULL OR valid_to > ?)",
            employee_id,
            tenant_id,
            at_date,
            at_date,
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ContractHistoryEntity::try_from)
        .transpose()?)
    }

    async fn find_open(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ContractHistoryEntity>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            ContractHistoryDb,
            "SELECT id, tenant_id, employee_id, valid_from, valid_to, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, note, created_at, created_by_user_id FROM contract_history \
             WHERE employee_id = ? AND tenant_id = ? AND valid_to IS NULL",
            employee_id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ContractHistoryEntity::try_from)
        .transpose()?)
    }

    async fn create(
        &self,
        entity: &ContractHistoryEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.as_bytes().to_vec();
        let valid_from = entity.valid_from.format(DATE_FORMAT).map_db_error()?;
        let valid_to = entity
            .valid_to
            .map(|date| date.format(DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        let contract_type = contract_type_to_str(entity.contract_type);
        let note = entity.note.as_deref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        let created_by_user_id = entity.created_by_user_id.map(|id| id.as_bytes().to_vec());
        query!(
            "INSERT INTO contract_history (id, tenant_id, employee_id, valid_from, valid_to, \
             contract_type, hourly_rate, weekly_hours, full_time_percentage, \
             monthly_hours_limit, annual_salary_limit, note, created_at, created_by_user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            employee_id,
            valid_from,
            valid_to,
            contract_type,
            entity.hourly_rate,
            entity.weekly_hours,
            entity.full_time_percentage,
            entity.monthly_hours_limit,
            entity.annual_salary_limit,
            note,
            created_at,
            created_by_user_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn close_open_entry(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        valid_to: Date,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        let valid_to = valid_to.format(DATE_FORMAT).map_db_error()?;
        query!(
            "UPDATE contract_history SET valid_to = ? WHERE employee_id = ? AND tenant_id = ? \
             AND valid_to IS NULL",
            valid_to,
            employee_id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

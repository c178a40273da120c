use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, TIME_FORMAT};
use async_trait::async_trait;
use dao::{
    employee::{ContractType, EmployeeDao, EmployeeEntity},
    DaoError,
};
use sqlx::query_as;
use time::{PrimitiveDateTime, Time};
use uuid::Uuid;

pub struct EmployeeDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl EmployeeDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

pub(crate) fn contract_type_to_str(value: ContractType) -> &'static str {
    match value {
        ContractType::Minijob => "minijob",
        ContractType::PartTime => "part_time",
        ContractType::FullTime => "full_time",
    }
}

pub(crate) fn contract_type_from_str(value: &str) -> Result<ContractType, DaoError> {
    match value {
        "minijob" => Ok(ContractType::Minijob),
        "part_time" => Ok(ContractType::PartTime),
        "full_time" => Ok(ContractType::FullTime),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown contract_type `{other}`").into(),
        )),
    }
}

struct EmployeeDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    user_id: Option<Vec<u8>>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    contract_type: String,
    hourly_rate: f64,
    weekly_hours: Option<f64>,
    full_time_percentage: Option<f64>,
    monthly_hours_limit: Option<f64>,
    annual_salary_limit: f64,
    vacation_days: i64,
    qualifications: String,
    ical_token: String,
    telegram_chat_id: Option<String>,
    quiet_hours_start: String,
    quiet_hours_end: String,
    notification_prefs: String,
    active: bool,
    created_at: String,
}
impl TryFrom<&EmployeeDb> for EmployeeEntity {
    type Error = DaoError;
    fn try_from(row: &EmployeeDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            user_id: row
                .user_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            first_name: row.first_name.as_str().into(),
            last_name: row.last_name.as_str().into(),
            email: row.email.as_deref().map(Into::into),
            phone: row.phone.as_deref().map(Into::into),
            contract_type: contract_type_from_str(&row.contract_type)?,
            hourly_rate: row.hourly_rate,
            weekly_hours: row.weekly_hours,
            full_time_percentage: row.full_time_percentage,
            monthly_hours_limit: row.monthly_hours_limit,
            annual_salary_limit: row.annual_salary_limit,
            vacation_days: row.vacation_days as i32,
            qualifications: row.qualifications.as_str().into(),
            ical_token: row.ical_token.as_str().into(),
            telegram_chat_id: row.telegram_chat_id.as_deref().map(Into::into),
            quiet_hours_start: Time::parse(&row.quiet_hours_start, TIME_FORMAT).map_db_error()?,
            quiet_hours_end: Time::parse(&row.quiet_hours_end, TIME_FORMAT).map_db_error()?,
            notification_prefs: row.notification_prefs.as_str().into(),
            active: row.active,
            created_at: PrimitiveDateTime::parse(
                &row.created_at,
                &time::format_description::well_known::Iso8601::DATE_TIME,
            )
            .map_db_error()?,
        })
    }
}

#[async_trait]
impl EmployeeDao for EmployeeDaoImpl {
    type Transaction = TransactionImpl;

    async fn all_tenant_ids(&self, tx: Self::Transaction) -> Result<Arc<[Uuid]>, DaoError> {
        let rows = query_as!(
            TenantIdRow,
            "SELECT DISTINCT tenant_id FROM employee"
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        rows.iter()
            .map(|row| Uuid::from_slice(&row.tenant_id).map_db_error())
            .collect::<Result<Arc<[Uuid]>, DaoError>>()
    }

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeDb,
            "SELECT id, tenant_id, user_id, first_name, last_name, email, phone, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, vacation_days, qualifications, ical_token, telegram_chat_id, \
             quiet_hours_start, quiet_hours_end, notification_prefs, active, created_at \
             FROM employee WHERE tenant_id = ?",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(EmployeeEntity::try_from)
        .collect::<Result<Arc<[EmployeeEntity]>, DaoError>>()?)
    }

    async fn all_active(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeDb,
            "SELECT id, tenant_id, user_id, first_name, last_name, email, phone, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, vacation_days, qualifications, ical_token, telegram_chat_id, \
             quiet_hours_start, quiet_hours_end, notification_prefs, active, created_at \
             FROM employee WHERE tenant_id = ? AND active = 1",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(EmployeeEntity::try_from)
        .collect::<Result<Arc<[EmployeeEntity]>, DaoError>>()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeDb,
            "SELECT id, tenant_id, user_id, first_name, last_name, email, phone, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, vacation_days, qualifications, ical_token, telegram_chat_id, \
             quiet_hours_start, quiet_hours_end, notification_prefs, active, created_at \
             FROM employee WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(EmployeeEntity::try_from)
        .transpose()?)
    }

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeEntity>, DaoError> {
        let user_id = user_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            EmployeeDb,
            "SELECT id, tenant_id, user_id, first_name, last_name, email, phone, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, vacation_days, qualifications, ical_token, telegram_chat_id, \
             quiet_hours_start, quiet_hours_end, notification_prefs, active, created_at \
             FROM employee WHERE user_id = ? AND tenant_id = ?",
            user_id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(EmployeeEntity::try_from)
        .transpose()?)
    }

    async fn find_by_ical_token(
        &self,
        token: &str,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeEntity>, DaoError> {
        Ok(query_as!(
            EmployeeDb,
            "SELECT id, tenant_id, user_id, first_name, last_name, email, phone, contract_type, \
             hourly_rate, weekly_hours, full_time_percentage, monthly_hours_limit, \
             annual_salary_limit, vacation_days, qualifications, ical_token, telegram_chat_id, \
             quiet_hours_start, quiet_hours_end, notification_prefs, active, created_at \
             FROM employee WHERE ical_token = ?",
            token
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(EmployeeEntity::try_from)
        .transpose()?)
    }

    async fn create(&self, entity: &EmployeeEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let user_id = entity.user_id.map(|id| id.as_bytes().to_vec());
        let first_name = entity.first_name.as_ref();
        let last_name = entity.last_name.as_ref();
        let email = entity.email.as_deref();
        let phone = entity.phone.as_deref();
        let contract_type = contract_type_to_str(entity.contract_type);
        let qualifications = entity.qualifications.as_ref();
        let ical_token = entity.ical_token.as_ref();
        let telegram_chat_id = entity.telegram_chat_id.as_deref();
        let quiet_hours_start = entity.quiet_hours_start.format(TIME_FORMAT).map_db_error()?;
        let quiet_hours_end = entity.quiet_hours_end.format(TIME_FORMAT).map_db_error()?;
        let notification_prefs = entity.notification_prefs.as_ref();
        let created_at = entity
            .created_at
            .format(&time::format_description::well_known::Iso8601::DATE_TIME)
            .map_db_error()?;
        sqlx::query!(
            "INSERT INTO employee (id, tenant_id, user_id, first_name, last_name, email, phone, \
             contract_type, hourly_rate, weekly_hours, full_time_percentage, \
             monthly_hours_limit, annual_salary_limit, vacation_days, qualifications, \
             ical_token, telegram_chat_id, quiet_hours_start, quiet_hours_end, \
             notification_prefs, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            user_id,
            first_name,
            last_name,
            email,
            phone,
            contract_type,
            entity.hourly_rate,
            entity.weekly_hours,
            entity.full_time_percentage,
            entity.monthly_hours_limit,
            entity.annual_salary_limit,
            entity.vacation_days,
            qualifications,
            ical_token,
            telegram_chat_id,
            quiet_hours_start,
            quiet_hours_end,
            notification_prefs,
            entity.active,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(&self, entity: &EmployeeEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let user_id = entity.user_id.map(|id| id.as_bytes().to_vec());
        let first_name = entity.first_name.as_ref();
        let last_name = entity.last_name.as_ref();
        let email = entity.email.as_deref();
        let phone = entity.phone.as_deref();
        let contract_type = contract_type_to_str(entity.contract_type);
        let qualifications = entity.qualifications.as_ref();
        let telegram_chat_id = entity.telegram_chat_id.as_deref();
        let quiet_hours_start = entity.quiet_hours_start.format(TIME_FORMAT).map_db_error()?;
        let quiet_hours_end = entity.quiet_hours_end.format(TIME_FORMAT).map_db_error()?;
        let notification_prefs = entity.notification_prefs.as_ref();
        sqlx::query!(
            "UPDATE employee SET user_id = ?, first_name = ?, last_name = ?, email = ?, \
             phone = ?, contract_type = ?, hourly_rate = ?, weekly_hours = ?, \
             full_time_percentage = ?, monthly_hours_limit = ?, annual_salary_limit = ?, \
             vacation_days = ?, qualifications = ?, telegram_chat_id = ?, \
             quiet_hours_start = ?, quiet_hours_end = ?, notification_prefs = ?, active = ? \
             WHERE id = ? AND tenant_id = ?",
            user_id,
            first_name,
            last_name,
            email,
            phone,
            contract_type,
            entity.hourly_rate,
            entity.weekly_hours,
            entity.full_time_percentage,
            entity.monthly_hours_limit,
            entity.annual_salary_limit,
            entity.vacation_days,
            qualifications,
            telegram_chat_id,
            quiet_hours_start,
            quiet_hours_end,
            notification_prefs,
            entity.active,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

struct TenantIdRow {
    tenant_id: Vec<u8>,
}

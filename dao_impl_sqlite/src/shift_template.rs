use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl, DATE_FORMAT, TIME_FORMAT};
use async_trait::async_trait;
use dao::{
    shift_template::{ShiftTemplateDao, ShiftTemplateEntity},
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime, Time};
use uuid::Uuid;

pub struct ShiftTemplateDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl ShiftTemplateDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct ShiftTemplateDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    name: String,
    weekdays: i64,
    start_time: String,
    end_time: String,
    break_minutes: i64,
    location: Option<String>,
    required_skills: String,
    color: String,
    active: bool,
    valid_from: Option<String>,
    valid_until: Option<String>,
    created_at: String,
}
impl TryFrom<&ShiftTemplateDb> for ShiftTemplateEntity {
    type Error = DaoError;
    fn try_from(row: &ShiftTemplateDb) -> Result<Self, Self::Error> {
        let required_skills: Vec<String> =
            serde_json::from_str(&row.required_skills).map_db_error()?;
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            name: row.name.as_str().into(),
            weekdays: row.weekdays as u8,
            start_time: Time::parse(&row.start_time, TIME_FORMAT).map_db_error()?,
            end_time: Time::parse(&row.end_time, TIME_FORMAT).map_db_error()?,
            break_minutes: row.break_minutes as i32,
            location: row.location.as_deref().map(Into::into),
            required_skills: required_skills
                .iter()
                .map(|skill| Arc::<str>::from(skill.as_str()))
                .collect(),
            color: row.color.as_str().into(),
            active: row.active,
            valid_from: row
                .valid_from
                .as_ref()
                .map(|date| Date::parse(date, DATE_FORMAT))
                .transpose()
                .map_db_error()?,
            valid_until: row
                .valid_until
                .as_ref()
                .map(|date| Date::parse(date, DATE_FORMAT))
                .transpose()
                .map_db_error()?,
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl ShiftTemplateDao for ShiftTemplateDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[ShiftTemplateEntity]>, DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            ShiftTemplateDb,
            "SELECT id, tenant_id, name, weekdays, start_time, end_time, break_minutes, \
             location, required_skills, color, active, valid_from, valid_until, created_at \
             FROM shift_template WHERE tenant_id = ?",
            tenant_id
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(ShiftTemplateEntity::try_from)
        .collect::<Result<Arc<[ShiftTemplateEntity]>, DaoError>>()?)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ShiftTemplateEntity>, DaoError> {
        let id = id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            ShiftTemplateDb,
            "SELECT id, tenant_id, name, weekdays, start_time, end_time, break_minutes, \
             location, required_skills, color, active, valid_from, valid_until, created_at \
             FROM shift_template WHERE id = ? AND tenant_id = ?",
            id,
            tenant_id
        )
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(ShiftTemplateEntity::try_from)
        .transpose()?)
    }

    async fn create(
        &self,
        entity: &ShiftTemplateEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let name = entity.name.as_ref();
        let weekdays = entity.weekdays as i64;
        let start_time = entity.start_time.format(TIME_FORMAT).map_db_error()?;
        let end_time = entity.end_time.format(TIME_FORMAT).map_db_error()?;
        let break_minutes = entity.break_minutes;
        let location = entity.location.as_deref();
        let required_skills = serde_json::to_string(
            &entity
                .required_skills
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>(),
        )
        .map_db_error()?;
        let color = entity.color.as_ref();
        let valid_from = entity
            .valid_from
            .map(|date| date.format(DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        let valid_until = entity
            .valid_until
            .map(|date| date.format(DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO shift_template (id, tenant_id, name, weekdays, start_time, end_time, \
             break_minutes, location, required_skills, color, active, valid_from, valid_until, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            name,
            weekdays,
            start_time,
            end_time,
            break_minutes,
            location,
            required_skills,
            color,
            entity.active,
            valid_from,
            valid_until,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &ShiftTemplateEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let name = entity.name.as_ref();
        let weekdays = entity.weekdays as i64;
        let start_time = entity.start_time.format(TIME_FORMAT).map_db_error()?;
        let end_time = entity.end_time.format(TIME_FORMAT).map_db_error()?;
        let break_minutes = entity.break_minutes;
        let location = entity.location.as_deref();
        let required_skills = serde_json::to_string(
            &entity
                .required_skills
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>(),
        )
        .map_db_error()?;
        let color = entity.color.as_ref();
        let valid_from = entity
            .valid_from
            .map(|date| date.format(DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        let valid_until = entity
            .valid_until
            .map(|date| date.format(DATE_FORMAT))
            .transpose()
            .map_db_error()?;
        query!(
            "UPDATE shift_template SET name = ?, weekdays = ?, start_time = ?, end_time = ?, \
             break_minutes = ?, location = ?, required_skills = ?, color = ?, active = ?, \
             valid_from = ?, valid_until = ? WHERE id = ? AND tenant_id = ?",
            name,
            weekdays,
            start_time,
            end_time,
            break_minutes,
            location,
            required_skills,
            color,
            entity.active,
            valid_from,
            valid_until,
            id,
            tenant_id,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}

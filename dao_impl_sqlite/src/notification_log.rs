use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    notification_log::{
        NotificationChannel, NotificationLogDao, NotificationLogEntity, NotificationStatus,
    },
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, PrimitiveDateTime};
use uuid::Uuid;

pub struct NotificationLogDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl NotificationLogDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

fn channel_to_str(value: NotificationChannel) -> &'static str {
    match value {
        NotificationChannel::Telegram => "telegram",
        NotificationChannel::Email => "email",
        NotificationChannel::Push => "push",
        NotificationChannel::All => "all",
    }
}
fn channel_from_str(value: &str) -> Result<NotificationChannel, DaoError> {
    match value {
        "telegram" => Ok(NotificationChannel::Telegram),
        "email" => Ok(NotificationChannel::Email),
        "push" => Ok(NotificationChannel::Push),
        "all" => Ok(NotificationChannel::All),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown notification channel `{other}`").into(),
        )),
    }
}
fn status_to_str(value: NotificationStatus) -> &'static str {
    match value {
        NotificationStatus::Sent => "sent",
        NotificationStatus::Failed => "failed",
        NotificationStatus::SkippedQuietHours => "skipped_quiet_hours",
    }
}
fn status_from_str(value: &str) -> Result<NotificationStatus, DaoError> {
    match value {
        "sent" => Ok(NotificationStatus::Sent),
        "failed" => Ok(NotificationStatus::Failed),
        "skipped_quiet_hours" => Ok(NotificationStatus::SkippedQuietHours),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown notification status `{other}`").into(),
        )),
    }
}

struct NotificationLogDb {
    id: Vec<u8>,
    tenant_id: Vec<u8>,
    employee_id: Option<Vec<u8>>,
    channel: String,
    event_type: String,
    subject: Option<String>,
    body: String,
    status: String,
    sent_at: Option<String>,
    error: Option<String>,
    created_at: String,
}
impl TryFrom<&NotificationLogDb> for NotificationLogEntity {
    type Error = DaoError;
    fn try_from(row: &NotificationLogDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: Uuid::from_slice(&row.tenant_id).map_db_error()?,
            employee_id: row
                .employee_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            channel: channel_from_str(&row.channel)?,
            event_type: row.event_type.as_str().into(),
            subject: row.subject.as_deref().map(Into::into),
            body: row.body.as_str().into(),
            status: status_from_str(&row.status)?,
            sent_at: row
                .sent_at
                .as_ref()
                .map(|ts| PrimitiveDateTime::parse(ts, &Iso8601::DATE_TIME))
                .transpose()
                .map_db_error()?,
            error: row.error.as_deref().map(Into::into),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl NotificationLogDao for NotificationLogDaoImpl {
    type Transaction = TransactionImpl;

    async fn append(
        &self,
        entity: &NotificationLogEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.as_bytes().to_vec();
        let employee_id = entity.employee_id.map(|id| id.as_bytes().to_vec());
        let channel = channel_to_str(entity.channel);
        let event_type = entity.event_type.as_ref();
        let subject = entity.subject.as_deref();
        let body = entity.body.as_ref();
        let status = status_to_str(entity.status);
        let sent_at = entity
            .sent_at
            .map(|ts| ts.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        let error = entity.error.as_deref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO notification_log (id, tenant_id, employee_id, channel, event_type, \
             subject, body, status, sent_at, error, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            employee_id,
            channel,
            event_type,
            subject,
            body,
            status,
            sent_at,
            error,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn find_by_employee(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[NotificationLogEntity]>, DaoError> {
        let employee_id = employee_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            NotificationLogDb,
            "SELECT id, tenant_id, employee_id, channel, event_type, subject, body, status, \
             sent_at, error, created_at FROM notification_log \
             WHERE employee_id = ? AND tenant_id = ? ORDER BY created_at DESC",
            employee_id,
            tenant_id,
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(NotificationLogEntity::try_from)
        .collect::<Result<Arc<[NotificationLogEntity]>, DaoError>>()?)
    }
}

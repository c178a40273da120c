use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationChannel {
    Telegram,
    Email,
    Push,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    Failed,
    SkippedQuietHours,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationLogEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub channel: NotificationChannel,
    pub event_type: Arc<str>,
    pub subject: Option<Arc<str>>,
    pub body: Arc<str>,
    pub status: NotificationStatus,
    pub sent_at: Option<PrimitiveDateTime>,
    pub error: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait NotificationLogDao {
    type Transaction: crate::Transaction;

    async fn append(
        &self,
        entity: &NotificationLogEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn find_by_employee(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[NotificationLogEntity]>, DaoError>;
}

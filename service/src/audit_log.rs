use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditLogRecord {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub entity_type: Arc<str>,
    pub entity_id: Option<Uuid>,
    pub action: Arc<str>,
    pub old_values: Option<Arc<str>>,
    pub new_values: Option<Arc<str>>,
    pub ip_address: Option<Arc<str>>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&dao::audit_log::AuditLogEntity> for AuditLogRecord {
    fn from(e: &dao::audit_log::AuditLogEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            user_id: e.user_id,
            entity_type: e.entity_type.clone(),
            entity_id: e.entity_id,
            action: e.action.clone(),
            old_values: e.old_values.clone(),
            new_values: e.new_values.clone(),
            ip_address: e.ip_address.clone(),
            created_at: Some(e.created_at),
        }
    }
}

/// Append-only; records are never updated, only appended, per spec.md §4.K.
#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait AuditLogService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn record(
        &self,
        entity_type: &str,
        entity_id: Option<Uuid>,
        action: &str,
        old_values: Option<Arc<str>>,
        new_values: Option<Arc<str>>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;

    async fn find_for_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[AuditLogRecord]>, ServiceError>;
}

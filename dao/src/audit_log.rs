use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditLogEntity {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub entity_type: Arc<str>,
    pub entity_id: Option<Uuid>,
    pub action: Arc<str>,
    /// Opaque JSON, decoded at the service edge.
    pub old_values: Option<Arc<str>>,
    pub new_values: Option<Arc<str>>,
    pub ip_address: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait AuditLogDao {
    type Transaction: crate::Transaction;

    async fn append(&self, entity: &AuditLogEntity, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[AuditLogEntity]>, DaoError>;
    /// Deletes every audit record for the tenant; used only during tenant
    /// offboarding, where audit rows are deliberately not cascaded.
    async fn clear_tenant(&self, tenant_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
}

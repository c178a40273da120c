use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{audit_log::AuditLogDao, audit_log::AuditLogEntity, DaoError};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, PrimitiveDateTime};
use uuid::Uuid;

pub struct AuditLogDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl AuditLogDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

struct AuditLogDb {
    id: Vec<u8>,
    tenant_id: Option<Vec<u8>>,
    user_id: Option<Vec<u8>>,
    entity_type: String,
    entity_id: Option<Vec<u8>>,
    action: String,
    old_values: Option<String>,
    new_values: Option<String>,
    ip_address: Option<String>,
    created_at: String,
}
impl TryFrom<&AuditLogDb> for AuditLogEntity {
    type Error = DaoError;
    fn try_from(row: &AuditLogDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            tenant_id: row
                .tenant_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            user_id: row
                .user_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            entity_type: row.entity_type.as_str().into(),
            entity_id: row
                .entity_id
                .as_ref()
                .map(|id| Uuid::from_slice(id))
                .transpose()
                .map_db_error()?,
            action: row.action.as_str().into(),
            old_values: row.old_values.as_deref().map(Into::into),
            new_values: row.new_values.as_deref().map(Into::into),
            ip_address: row.ip_address.as_deref().map(Into::into),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME)
                .map_db_error()?,
        })
    }
}

#[async_trait]
impl AuditLogDao for AuditLogDaoImpl {
    type Transaction = TransactionImpl;

    async fn append(&self, entity: &AuditLogEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        let id = entity.id.as_bytes().to_vec();
        let tenant_id = entity.tenant_id.map(|id| id.as_bytes().to_vec());
        let user_id = entity.user_id.map(|id| id.as_bytes().to_vec());
        let entity_type = entity.entity_type.as_ref();
        let entity_id = entity.entity_id.map(|id| id.as_bytes().to_vec());
        let action = entity.action.as_ref();
        let old_values = entity.old_values.as_deref();
        let new_values = entity.new_values.as_deref();
        let ip_address = entity.ip_address.as_deref();
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query!(
            "INSERT INTO audit_log (id, tenant_id, user_id, entity_type, entity_id, action, \
             old_values, new_values, ip_address, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            id,
            tenant_id,
            user_id,
            entity_type,
            entity_id,
            action,
            old_values,
            new_values,
            ip_address,
            created_at,
        )
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[AuditLogEntity]>, DaoError> {
        let entity_id = entity_id.as_bytes().to_vec();
        let tenant_id = tenant_id.as_bytes().to_vec();
        Ok(query_as!(
            AuditLogDb,
            "SELECT id, tenant_id, user_id, entity_type, entity_id, action, old_values, \
             new_values, ip_address, created_at FROM audit_log \
             WHERE entity_type = ? AND entity_id = ? AND tenant_id = ? ORDER BY created_at",
            entity_type,
            entity_id,
            tenant_id,
        )
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(AuditLogEntity::try_from)
        .collect::<Result<Arc<[AuditLogEntity]>, DaoError>>()?)
    }

    async fn clear_tenant(&self, tenant_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError> {
        let tenant_id = tenant_id.as_bytes().to_vec();
        query!("DELETE FROM audit_log WHERE tenant_id = ?", tenant_id)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}

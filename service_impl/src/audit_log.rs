use std::sync::Arc;

use async_trait::async_trait;
use dao::audit_log::{AuditLogDao, AuditLogEntity};
use dao::TransactionDao;
use service::audit_log::{AuditLogRecord, AuditLogService};
use service::clock::ClockService;
use service::permission::{Authentication, PermissionService};
use service::uuid_service::UuidService;
use service::ServiceError;
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct AuditLogServiceImpl: service::audit_log::AuditLogService = AuditLogServiceDeps {
        AuditLogDao: dao::audit_log::AuditLogDao<Transaction = Self::Transaction> = audit_log_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
    }
}

#[async_trait]
impl<Deps: AuditLogServiceDeps> AuditLogService for AuditLogServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn record(
        &self,
        entity_type: &str,
        entity_id: Option<Uuid>,
        action: &str,
        old_values: Option<Arc<str>>,
        new_values: Option<Arc<str>>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await.ok();
        let user_id = self.permission_service.current_user_id(&context).await.ok();
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = AuditLogEntity {
            id: self.uuid_service.new_uuid("audit-log-id"),
            tenant_id,
            user_id,
            entity_type: Arc::from(entity_type),
            entity_id,
            action: Arc::from(action),
            old_values,
            new_values,
            ip_address: None,
            created_at: self.clock_service.date_time_now(),
        };
        self.audit_log_dao.append(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn find_for_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[AuditLogRecord]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let records = self
            .audit_log_dao
            .find_by_entity(entity_type, entity_id, tenant_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(records.iter().map(AuditLogRecord::from).collect())
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use dao::audit_log::{AuditLogDao, AuditLogEntity};
use dao::shift::{ShiftDao, ShiftEntity, ShiftFilter, ShiftStatus as DaoShiftStatus};
use dao::TransactionDao;
use service::clock::ClockService;
use service::compliance::ComplianceService;
use service::notification::{DomainEvent, NotificationDispatcher};
use service::permission::{Authentication, PermissionService, Role};
use service::shift::{Shift, ShiftListFilter, ShiftService};
use service::uuid_service::UuidService;
use service::ServiceError;
use uuid::Uuid;
use vera_utils::DayOfWeek;

use crate::gen_service_impl;

gen_service_impl! {
    struct ShiftServiceImpl: service::shift::ShiftService = ShiftServiceDeps {
        ShiftDao: dao::shift::ShiftDao<Transaction = Self::Transaction> = shift_dao,
        AuditLogDao: dao::audit_log::AuditLogDao<Transaction = Self::Transaction> = audit_log_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        ComplianceService: service::compliance::ComplianceService<Context = Self::Context, Transaction = Self::Transaction> = compliance_service,
        NotificationDispatcher: service::notification::NotificationDispatcher = notification_dispatcher,
    }
}

fn shift_summary(entity: &ShiftEntity) -> String {
    serde_json::json!({
        "status": format!("{:?}", entity.status),
        "employeeId": entity.employee_id.map(|id| id.to_string()),
        "date": entity.date.to_string(),
        "startTime": entity.start_time.to_string(),
        "endTime": entity.end_time.to_string(),
    })
    .to_string()
}

#[async_trait]
impl<Deps: ShiftServiceDeps> ShiftService for ShiftServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        filter: ShiftListFilter,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Shift]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let shifts = self
            .shift_dao
            .find(
                tenant_id,
                ShiftFilter {
                    employee_id: filter.employee_id,
                    from_date: filter.from_date,
                    to_date: filter.to_date,
                    recurring_shift_id: None,
                },
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(shifts.iter().map(Shift::from).collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn create(
        &self,
        shift: &Shift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if shift.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let now = self.clock_service.date_time_now();
        let weekday = DayOfWeek::from(shift.date.weekday());
        let entity = ShiftEntity {
            id: self.uuid_service.new_uuid("shift-id"),
            tenant_id,
            employee_id: shift.employee_id,
            template_id: shift.template_id,
            recurring_shift_id: shift.recurring_shift_id,
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            break_minutes: shift.break_minutes,
            location: shift.location.clone(),
            notes: shift.notes.clone(),
            status: DaoShiftStatus::Planned,
            cancellation_reason: None,
            actual_start: None,
            actual_end: None,
            confirmed_by: None,
            confirmed_at: None,
            confirmation_note: None,
            is_holiday: false,
            is_weekend: weekday.is_weekend(),
            is_sunday: weekday.is_sunday(),
            rest_period_ok: true,
            break_ok: true,
            minijob_limit_ok: true,
            hours_carried_over: false,
            is_override: false,
            created_at: now,
            updated_at: now,
        };
        self.shift_dao.create(&entity, tx.clone()).await?;
        self.append_audit("create", entity.id, None, Some(shift_summary(&entity)), &context, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        self.refresh_compliance(&entity, &context).await;
        if let Some(employee_id) = entity.employee_id {
            self.notification_dispatcher
                .dispatch(
                    tenant_id,
                    DomainEvent::ShiftAssigned { shift_id: entity.id, employee_id },
                )
                .await;
        }
        Ok((&entity).into())
    }

    async fn update(
        &self,
        shift: &Shift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let role = self.permission_service.role(&context).await?;
        let current_employee_id = self.permission_service.current_employee_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .shift_dao
            .find_by_id(shift.id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(shift.id))?;
        let before = shift_summary(&entity);

        match role {
            Role::Admin => {
                // The administrative escape hatch: status is settable directly,
                // bypassing confirm/claim/delete, per spec.md §9.
                entity.employee_id = shift.employee_id;
                entity.template_id = shift.template_id;
                entity.date = shift.date;
                entity.start_time = shift.start_time;
                entity.end_time = shift.end_time;
                entity.break_minutes = shift.break_minutes;
                entity.location = shift.location.clone();
                entity.notes = shift.notes.clone();
                entity.status = shift.status.into();
                entity.cancellation_reason = shift.cancellation_reason.clone();
                entity.actual_start = shift.actual_start;
                entity.actual_end = shift.actual_end;
                entity.confirmed_by = shift.confirmed_by;
                entity.confirmed_at = shift.confirmed_at;
                entity.confirmation_note = shift.confirmation_note.clone();
            }
            Role::Manager => {
                if matches!(
                    entity.status,
                    DaoShiftStatus::Completed | DaoShiftStatus::Cancelled | DaoShiftStatus::CancelledAbsence
                ) {
                    return Err(ServiceError::Forbidden);
                }
                entity.employee_id = shift.employee_id;
                entity.template_id = shift.template_id;
                entity.date = shift.date;
                entity.start_time = shift.start_time;
                entity.end_time = shift.end_time;
                entity.break_minutes = shift.break_minutes;
                entity.location = shift.location.clone();
                entity.notes = shift.notes.clone();
                entity.actual_start = shift.actual_start;
                entity.actual_end = shift.actual_end;
                entity.confirmation_note = shift.confirmation_note.clone();
                if entity.recurring_shift_id.is_some() {
                    entity.is_override = true;
                }
            }
            Role::Employee => {
                if current_employee_id != entity.employee_id {
                    return Err(ServiceError::Forbidden);
                }
                if entity.status != DaoShiftStatus::Planned {
                    return Err(ServiceError::Forbidden);
                }
                entity.actual_start = shift.actual_start;
                entity.actual_end = shift.actual_end;
                entity.notes = shift.notes.clone();
            }
        }

        let weekday = DayOfWeek::from(entity.date.weekday());
        entity.is_weekend = weekday.is_weekend();
        entity.is_sunday = weekday.is_sunday();
        entity.updated_at = self.clock_service.date_time_now();

        self.shift_dao.update(&entity, tx.clone()).await?;
        self.append_audit("update", entity.id, Some(before), Some(shift_summary(&entity)), &context, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        self.refresh_compliance(&entity, &context).await;
        if let Some(employee_id) = entity.employee_id {
            self.notification_dispatcher
                .dispatch(
                    tenant_id,
                    DomainEvent::ShiftChanged { shift_id: entity.id, employee_id },
                )
                .await;
        }
        Ok((&entity).into())
    }

    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.shift_dao.delete(id, tenant_id, tx.clone()).await?;
        self.append_audit("delete", id, None, None, &context, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn confirm(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let user_id = self.permission_service.current_user_id(&context).await.ok();
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.status != DaoShiftStatus::Planned {
            return Err(ServiceError::EntityConflicts("shift is not planned".into()));
        }
        let before = shift_summary(&entity);
        entity.status = DaoShiftStatus::Confirmed;
        entity.confirmed_by = user_id;
        entity.confirmed_at = Some(self.clock_service.date_time_now());
        entity.updated_at = self.clock_service.date_time_now();
        self.shift_dao.update(&entity, tx.clone()).await?;
        self.append_audit("confirm", entity.id, Some(before), Some(shift_summary(&entity)), &context, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        if let Some(employee_id) = entity.employee_id {
            self.notification_dispatcher
                .dispatch(
                    tenant_id,
                    DomainEvent::ShiftChanged { shift_id: entity.id, employee_id },
                )
                .await;
        }
        Ok((&entity).into())
    }

    async fn claim(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let employee_id = self
            .permission_service
            .current_employee_id(&context)
            .await?
            .ok_or(ServiceError::Forbidden)?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.status != DaoShiftStatus::Planned || entity.employee_id.is_some() {
            return Err(ServiceError::EntityConflicts("shift already claimed".into()));
        }
        let before = shift_summary(&entity);
        entity.employee_id = Some(employee_id);
        entity.updated_at = self.clock_service.date_time_now();
        self.shift_dao.update(&entity, tx.clone()).await?;
        self.append_audit("claim", entity.id, Some(before), Some(shift_summary(&entity)), &context, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        self.notification_dispatcher
            .dispatch(
                tenant_id,
                DomainEvent::ShiftAssigned { shift_id: entity.id, employee_id },
            )
            .await;
        Ok((&entity).into())
    }
}

impl<Deps: ShiftServiceDeps> ShiftServiceImpl<Deps> {
    async fn append_audit(
        &self,
        action: &str,
        shift_id: Uuid,
        old_values: Option<String>,
        new_values: Option<String>,
        context: &Authentication<Deps::Context>,
        tx: Deps::Transaction,
    ) -> Result<(), ServiceError> {
        let tenant_id = self.permission_service.tenant_id(context).await.ok();
        let user_id = self.permission_service.current_user_id(context).await.ok();
        let entity = AuditLogEntity {
            id: self.uuid_service.new_uuid("audit-log-id"),
            tenant_id,
            user_id,
            entity_type: Arc::from("shift"),
            entity_id: Some(shift_id),
            action: Arc::from(action),
            old_values: old_values.map(Arc::from),
            new_values: new_values.map(Arc::from),
            ip_address: None,
            created_at: self.clock_service.date_time_now(),
        };
        self.audit_log_dao.append(&entity, tx).await?;
        Ok(())
    }

    /// Re-evaluates compliance and persists the three derived flags, per
    /// spec.md §4.F / §4.E. A failure here must not surface to the caller
    /// of the primary write that triggered it.
    async fn refresh_compliance(&self, entity: &ShiftEntity, context: &Authentication<Deps::Context>) {
        let shift = Shift::from(entity);
        let evaluation = match self.compliance_service.evaluate(&shift, context.clone(), None).await {
            Ok(evaluation) => evaluation,
            Err(err) => {
                tracing::warn!(shift_id = %entity.id, error = %err, "compliance evaluation failed");
                return;
            }
        };
        let mut updated = entity.clone();
        updated.rest_period_ok = evaluation.rest_period_ok();
        updated.break_ok = evaluation.break_ok();
        updated.minijob_limit_ok = evaluation.minijob_limit_ok();
        if updated.rest_period_ok == entity.rest_period_ok
            && updated.break_ok == entity.break_ok
            && updated.minijob_limit_ok == entity.minijob_limit_ok
        {
            return;
        }
        let Ok(tx) = self.transaction_dao.new_transaction().await else {
            return;
        };
        if self.shift_dao.update(&updated, tx.clone()).await.is_ok() {
            let _ = self.transaction_dao.commit(tx).await;
        }
    }
}

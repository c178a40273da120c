use std::sync::Arc;

use async_trait::async_trait;
use dao::absence::{
    AbsenceStatus as DaoAbsenceStatus, CareRecipientAbsenceDao, CareRecipientAbsenceEntity,
    EmployeeAbsenceDao, EmployeeAbsenceEntity,
};
use dao::shift::{ShiftDao, ShiftFilter, ShiftStatus as DaoShiftStatus};
use dao::TransactionDao;
use service::absence::{AbsenceService, AbsenceStatus, CareRecipientAbsence, EmployeeAbsence};
use service::clock::ClockService;
use service::notification::{DomainEvent, NotificationDispatcher};
use service::permission::{Authentication, PermissionService, Role};
use service::uuid_service::UuidService;
use service::ServiceError;
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct AbsenceServiceImpl: service::absence::AbsenceService = AbsenceServiceDeps {
        EmployeeAbsenceDao: dao::absence::EmployeeAbsenceDao<Transaction = Self::Transaction> = employee_absence_dao,
        CareRecipientAbsenceDao: dao::absence::CareRecipientAbsenceDao<Transaction = Self::Transaction> = care_recipient_absence_dao,
        ShiftDao: dao::shift::ShiftDao<Transaction = Self::Transaction> = shift_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
        NotificationDispatcher: service::notification::NotificationDispatcher = notification_dispatcher,
    }
}

#[async_trait]
impl<Deps: AbsenceServiceDeps> AbsenceService for AbsenceServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[EmployeeAbsence]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let absences = self.employee_absence_dao.all(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(absences.iter().map(EmployeeAbsence::from).collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<EmployeeAbsence, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .employee_absence_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn create(
        &self,
        absence: &EmployeeAbsence,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<EmployeeAbsence, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let role = self.permission_service.role(&context).await?;
        if role < Role::Manager {
            let current_employee_id = self.permission_service.current_employee_id(&context).await?;
            if current_employee_id != Some(absence.employee_id) {
                return Err(ServiceError::Forbidden);
            }
        }
        if absence.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if absence.start_date > absence.end_date {
            return Err(ServiceError::DateOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = EmployeeAbsenceEntity {
            id: self.uuid_service.new_uuid("employee-absence-id"),
            tenant_id,
            employee_id: absence.employee_id,
            absence_type: absence.absence_type.into(),
            start_date: absence.start_date,
            end_date: absence.end_date,
            days_count: absence.days_count,
            status: DaoAbsenceStatus::Pending,
            notes: absence.notes.clone(),
            approved_by: None,
            approved_at: None,
            created_at: self.clock_service.date_time_now(),
        };
        self.employee_absence_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AbsenceStatus,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<EmployeeAbsence, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let user_id = self.permission_service.current_user_id(&context).await.ok();
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .employee_absence_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;

        let previous_status = entity.status;
        entity.status = status.into();
        entity.approved_by = user_id;
        entity.approved_at = Some(self.clock_service.date_time_now());
        self.employee_absence_dao.update(&entity, tx.clone()).await?;

        // §4.I: approval cancels overlapping shifts; rejecting a
        // previously-approved absence restores them.
        if status == AbsenceStatus::Approved {
            self.cancel_overlapping_shifts(&entity, tx.clone()).await?;
        } else if status == AbsenceStatus::Rejected && previous_status == DaoAbsenceStatus::Approved {
            self.restore_overlapping_shifts(&entity, tx.clone()).await?;
        }

        self.transaction_dao.commit(tx).await?;

        let event = match status {
            AbsenceStatus::Approved => Some(DomainEvent::AbsenceApproved {
                absence_id: entity.id,
                employee_id: entity.employee_id,
            }),
            AbsenceStatus::Rejected => Some(DomainEvent::AbsenceRejected {
                absence_id: entity.id,
                employee_id: entity.employee_id,
            }),
            AbsenceStatus::Pending => None,
        };
        if let Some(event) = event {
            self.notification_dispatcher.dispatch(tenant_id, event).await;
        }
        Ok((&entity).into())
    }

    async fn get_all_care_recipient(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[CareRecipientAbsence]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let absences = self.care_recipient_absence_dao.all(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(absences.iter().map(CareRecipientAbsence::from).collect())
    }

    async fn create_care_recipient(
        &self,
        absence: &CareRecipientAbsence,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CareRecipientAbsence, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if absence.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if absence.start_date > absence.end_date {
            return Err(ServiceError::DateOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = CareRecipientAbsenceEntity {
            id: self.uuid_service.new_uuid("care-recipient-absence-id"),
            tenant_id,
            care_recipient_name: absence.care_recipient_name.clone(),
            start_date: absence.start_date,
            end_date: absence.end_date,
            notes: absence.notes.clone(),
            created_at: self.clock_service.date_time_now(),
        };
        self.care_recipient_absence_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }
}

impl<Deps: AbsenceServiceDeps> AbsenceServiceImpl<Deps> {
    async fn cancel_overlapping_shifts(
        &self,
        absence: &EmployeeAbsenceEntity,
        tx: Deps::Transaction,
    ) -> Result<(), ServiceError> {
        let shifts = self
            .shift_dao
            .find(
                absence.tenant_id,
                ShiftFilter {
                    employee_id: Some(absence.employee_id),
                    from_date: Some(absence.start_date),
                    to_date: Some(absence.end_date),
                    recurring_shift_id: None,
                },
                tx.clone(),
            )
            .await?;
        for shift in shifts.iter() {
            if matches!(shift.status, DaoShiftStatus::Cancelled | DaoShiftStatus::CancelledAbsence) {
                continue;
            }
            let mut updated = shift.clone();
            updated.status = DaoShiftStatus::CancelledAbsence;
            updated.updated_at = self.clock_service.date_time_now();
            self.shift_dao.update(&updated, tx.clone()).await?;
        }
        Ok(())
    }

    async fn restore_overlapping_shifts(
        &self,
        absence: &EmployeeAbsenceEntity,
        tx: Deps::Transaction,
    ) -> Result<(), ServiceError> {
        let shifts = self
            .shift_dao
            .find(
                absence.tenant_id,
                ShiftFilter {
                    employee_id: Some(absence.employee_id),
                    from_date: Some(absence.start_date),
                    to_date: Some(absence.end_date),
                    recurring_shift_id: None,
                },
                tx.clone(),
            )
            .await?;
        for shift in shifts.iter() {
            if shift.status != DaoShiftStatus::CancelledAbsence {
                continue;
            }
            let mut updated = shift.clone();
            updated.status = DaoShiftStatus::Planned;
            updated.updated_at = self.clock_service.date_time_now();
            self.shift_dao.update(&updated, tx.clone()).await?;
        }
        Ok(())
    }
}

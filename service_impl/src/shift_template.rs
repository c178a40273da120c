use std::sync::Arc;

use async_trait::async_trait;
use dao::shift_template::{ShiftTemplateDao, ShiftTemplateEntity};
use dao::TransactionDao;
use service::permission::{Authentication, PermissionService, Role};
use service::shift_template::{ShiftTemplate, ShiftTemplateService};
use service::uuid_service::UuidService;
use service::{clock::ClockService, ServiceError};
use uuid::Uuid;
use vera_utils::DayOfWeek;

use crate::gen_service_impl;

gen_service_impl! {
    struct ShiftTemplateServiceImpl: service::shift_template::ShiftTemplateService = ShiftTemplateServiceDeps {
        ShiftTemplateDao: dao::shift_template::ShiftTemplateDao<Transaction = Self::Transaction> = shift_template_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
    }
}

fn weekdays_to_bitmask(weekdays: &[DayOfWeek]) -> u8 {
    weekdays.iter().fold(0u8, |acc, d| acc | (1 << d.to_index0()))
}

#[async_trait]
impl<Deps: ShiftTemplateServiceDeps> ShiftTemplateService for ShiftTemplateServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[ShiftTemplate]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let templates = self.shift_template_dao.all(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(templates.iter().map(ShiftTemplate::from).collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ShiftTemplate, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .shift_template_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn create(
        &self,
        template: &ShiftTemplate,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ShiftTemplate, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if template.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if template.start_time >= template.end_time {
            return Err(ServiceError::TimeOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = ShiftTemplateEntity {
            id: self.uuid_service.new_uuid("shift-template-id"),
            tenant_id,
            name: template.name.clone(),
            weekdays: weekdays_to_bitmask(&template.weekdays),
            start_time: template.start_time,
            end_time: template.end_time,
            break_minutes: template.break_minutes,
            location: template.location.clone(),
            required_skills: template.required_skills.clone(),
            color: template.color.clone(),
            active: template.active,
            valid_from: template.valid_from,
            valid_until: template.valid_until,
            created_at: self.clock_service.date_time_now(),
        };
        self.shift_template_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn update(
        &self,
        template: &ShiftTemplate,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ShiftTemplate, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if template.start_time >= template.end_time {
            return Err(ServiceError::TimeOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .shift_template_dao
            .find_by_id(template.id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(template.id))?;
        entity.name = template.name.clone();
        entity.weekdays = weekdays_to_bitmask(&template.weekdays);
        entity.start_time = template.start_time;
        entity.end_time = template.end_time;
        entity.break_minutes = template.break_minutes;
        entity.location = template.location.clone();
        entity.required_skills = template.required_skills.clone();
        entity.color = template.color.clone();
        entity.active = template.active;
        entity.valid_from = template.valid_from;
        entity.valid_until = template.valid_until;
        self.shift_template_dao.update(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }
}

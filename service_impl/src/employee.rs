use std::sync::Arc;

use async_trait::async_trait;
use dao::employee::{EmployeeDao, EmployeeEntity};
use dao::TransactionDao;
use service::employee::{Employee, EmployeeService, MINIJOB_ANNUAL_LIMIT};
use service::permission::{Authentication, PermissionService, Role};
use service::uuid_service::UuidService;
use service::{clock::ClockService, ServiceError};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct EmployeeServiceImpl: service::employee::EmployeeService = EmployeeServiceDeps {
        EmployeeDao: dao::employee::EmployeeDao<Transaction = Self::Transaction> = employee_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
    }
}

#[async_trait]
impl<Deps: EmployeeServiceDeps> EmployeeService for EmployeeServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Employee]>, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let employees = self.employee_dao.all(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(employees.iter().map(Employee::from).collect())
    }

    async fn get_all_active(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Employee]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let employees = self.employee_dao.all_active(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(employees.iter().map(Employee::from).collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .employee_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn get_me(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError> {
        let user_id = self.permission_service.current_user_id(&context).await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .employee_dao
            .find_by_user_id(user_id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFoundGeneric)?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn find_by_ical_token(
        &self,
        token: &str,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<Employee>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self.employee_dao.find_by_ical_token(token, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(entity.as_ref().map(Employee::from))
    }

    async fn create(
        &self,
        employee: &Employee,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if employee.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let id = self.uuid_service.new_uuid("employee-id");
        let entity = EmployeeEntity {
            id,
            tenant_id,
            user_id: employee.user_id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            contract_type: employee.contract_type.into(),
            hourly_rate: employee.hourly_rate,
            weekly_hours: employee.weekly_hours,
            full_time_percentage: employee.full_time_percentage,
            monthly_hours_limit: employee.monthly_hours_limit,
            annual_salary_limit: if employee.annual_salary_limit > 0.0 {
                employee.annual_salary_limit
            } else {
                MINIJOB_ANNUAL_LIMIT
            },
            vacation_days: employee.vacation_days,
            qualifications: serde_json::to_string(&employee.qualifications)
                .unwrap_or_else(|_| "[]".to_string())
                .into(),
            ical_token: self
                .uuid_service
                .new_uuid("ical-token")
                .to_string()
                .into(),
            telegram_chat_id: employee.telegram_chat_id.clone(),
            quiet_hours_start: employee.quiet_hours_start,
            quiet_hours_end: employee.quiet_hours_end,
            notification_prefs: Arc::from("{}"),
            active: employee.active,
            created_at: self.clock_service.date_time_now(),
        };
        self.employee_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn update(
        &self,
        employee: &Employee,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let is_self = self
            .permission_service
            .current_employee_id(&context)
            .await?
            == Some(employee.id);
        if !is_self {
            self.permission_service
                .check_role_at_least(Role::Manager, &context)
                .await?;
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .employee_dao
            .find_by_id(employee.id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(employee.id))?;
        entity.first_name = employee.first_name.clone();
        entity.last_name = employee.last_name.clone();
        entity.email = employee.email.clone();
        entity.phone = employee.phone.clone();
        entity.telegram_chat_id = employee.telegram_chat_id.clone();
        entity.quiet_hours_start = employee.quiet_hours_start;
        entity.quiet_hours_end = employee.quiet_hours_end;
        entity.vacation_days = employee.vacation_days;
        entity.qualifications = serde_json::to_string(&employee.qualifications)
            .unwrap_or_else(|_| "[]".to_string())
            .into();
        if !is_self {
            entity.contract_type = employee.contract_type.into();
            entity.hourly_rate = employee.hourly_rate;
            entity.weekly_hours = employee.weekly_hours;
            entity.full_time_percentage = employee.full_time_percentage;
            entity.monthly_hours_limit = employee.monthly_hours_limit;
            entity.annual_salary_limit = employee.annual_salary_limit;
            entity.active = employee.active;
        }
        self.employee_dao.update(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }
}

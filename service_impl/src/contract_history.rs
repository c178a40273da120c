use std::sync::Arc;

use async_trait::async_trait;
use dao::contract_history::{ContractHistoryDao, ContractHistoryEntity};
use dao::employee::EmployeeDao;
use dao::TransactionDao;
use service::contract_history::{ContractHistoryEntry, ContractHistoryService, ContractSnapshot};
use service::employee::MINIJOB_ANNUAL_LIMIT;
use service::permission::{Authentication, PermissionService, Role};
use service::uuid_service::UuidService;
use service::{clock::ClockService, ServiceError};
use time::Date;
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct ContractHistoryServiceImpl: service::contract_history::ContractHistoryService = ContractHistoryServiceDeps {
        ContractHistoryDao: dao::contract_history::ContractHistoryDao<Transaction = Self::Transaction> = contract_history_dao,
        EmployeeDao: dao::employee::EmployeeDao<Transaction = Self::Transaction> = employee_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
    }
}

#[async_trait]
impl<Deps: ContractHistoryServiceDeps> ContractHistoryService for ContractHistoryServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all_for_employee(
        &self,
        employee_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[ContractHistoryEntry]>, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entries = self
            .contract_history_dao
            .find_by_employee(employee_id, tenant_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(entries.iter().map(ContractHistoryEntry::from).collect())
    }

    /// Per spec.md §4.G: falls back to the Employee cache fields when no
    /// ContractHistory row is in effect for the month.
    async fn resolve_for_month(
        &self,
        employee_id: Uuid,
        month: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ContractSnapshot, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let effective = self
            .contract_history_dao
            .find_effective_at(employee_id, tenant_id, month, tx.clone())
            .await?;
        let snapshot = match effective {
            Some(entry) => ContractSnapshot {
                contract_type: entry.contract_type.into(),
                hourly_rate: entry.hourly_rate,
                monthly_hours_limit: entry.monthly_hours_limit,
                annual_salary_limit: entry.annual_salary_limit.unwrap_or(MINIJOB_ANNUAL_LIMIT),
            },
            None => {
                let employee = self
                    .employee_dao
                    .find_by_id(employee_id, tenant_id, tx.clone())
                    .await?
                    .ok_or(ServiceError::EntityNotFound(employee_id))?;
                ContractSnapshot {
                    contract_type: employee.contract_type.into(),
                    hourly_rate: employee.hourly_rate,
                    monthly_hours_limit: employee.monthly_hours_limit,
                    annual_salary_limit: employee.annual_salary_limit,
                }
            }
        };
        self.transaction_dao.commit(tx).await?;
        Ok(snapshot)
    }

    async fn add_entry(
        &self,
        entry: &ContractHistoryEntry,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ContractHistoryEntry, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let created_by_user_id = self.permission_service.current_user_id(&context).await.ok();
        let tx = self.transaction_dao.use_transaction(tx).await?;

        self.contract_history_dao
            .close_open_entry(entry.employee_id, tenant_id, entry.valid_from, tx.clone())
            .await?;

        let entity = ContractHistoryEntity {
            id: self.uuid_service.new_uuid("contract-history-id"),
            tenant_id,
            employee_id: entry.employee_id,
            valid_from: entry.valid_from,
            valid_to: None,
            contract_type: entry.contract_type.into(),
            hourly_rate: entry.hourly_rate,
            weekly_hours: entry.weekly_hours,
            full_time_percentage: entry.full_time_percentage,
            monthly_hours_limit: entry.monthly_hours_limit,
            annual_salary_limit: entry.annual_salary_limit,
            note: entry.note.clone(),
            created_at: self.clock_service.date_time_now(),
            created_by_user_id,
        };
        self.contract_history_dao.create(&entity, tx.clone()).await?;

        // The Employee cache fields must mirror the open entry, per spec.md §3.
        let mut employee = self
            .employee_dao
            .find_by_id(entry.employee_id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(entry.employee_id))?;
        employee.contract_type = entity.contract_type;
        employee.hourly_rate = entity.hourly_rate;
        employee.weekly_hours = entity.weekly_hours;
        employee.full_time_percentage = entity.full_time_percentage;
        employee.monthly_hours_limit = entity.monthly_hours_limit;
        employee.annual_salary_limit = entity.annual_salary_limit.unwrap_or(MINIJOB_ANNUAL_LIMIT);
        self.employee_dao.update(&employee, tx.clone()).await?;

        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }
}

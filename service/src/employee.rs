use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::Time;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractType {
    Minijob,
    PartTime,
    FullTime,
}

impl From<dao::employee::ContractType> for ContractType {
    fn from(c: dao::employee::ContractType) -> Self {
        match c {
            dao::employee::ContractType::Minijob => Self::Minijob,
            dao::employee::ContractType::PartTime => Self::PartTime,
            dao::employee::ContractType::FullTime => Self::FullTime,
        }
    }
}
impl From<ContractType> for dao::employee::ContractType {
    fn from(c: ContractType) -> Self {
        match c {
            ContractType::Minijob => Self::Minijob,
            ContractType::PartTime => Self::PartTime,
            ContractType::FullTime => Self::FullTime,
        }
    }
}

/// Statutory minijob monthly earnings ceiling (EUR), 2025 value.
pub const MINIJOB_MONTHLY_LIMIT: f64 = 556.00;
/// Statutory minijob annual earnings ceiling (EUR), 2025 value; also the
/// `Employee.annualSalaryLimit` default.
pub const MINIJOB_ANNUAL_LIMIT: f64 = 6672.00;

#[derive(Clone, Debug, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: Arc<str>,
    pub last_name: Arc<str>,
    pub email: Option<Arc<str>>,
    pub phone: Option<Arc<str>>,
    pub contract_type: ContractType,
    pub hourly_rate: f64,
    pub weekly_hours: Option<f64>,
    pub full_time_percentage: Option<f64>,
    pub monthly_hours_limit: Option<f64>,
    pub annual_salary_limit: f64,
    pub vacation_days: i32,
    pub qualifications: Arc<[Arc<str>]>,
    pub ical_token: Arc<str>,
    pub telegram_chat_id: Option<Arc<str>>,
    pub quiet_hours_start: Time,
    pub quiet_hours_end: Time,
    pub active: bool,
}

impl From<&dao::employee::EmployeeEntity> for Employee {
    fn from(e: &dao::employee::EmployeeEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            user_id: e.user_id,
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: e.email.clone(),
            phone: e.phone.clone(),
            contract_type: e.contract_type.into(),
            hourly_rate: e.hourly_rate,
            weekly_hours: e.weekly_hours,
            full_time_percentage: e.full_time_percentage,
            monthly_hours_limit: e.monthly_hours_limit,
            annual_salary_limit: e.annual_salary_limit,
            vacation_days: e.vacation_days,
            qualifications: serde_json::from_str(&e.qualifications).unwrap_or_default(),
            ical_token: e.ical_token.clone(),
            telegram_chat_id: e.telegram_chat_id.clone(),
            quiet_hours_start: e.quiet_hours_start,
            quiet_hours_end: e.quiet_hours_end,
            active: e.active,
        }
    }
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait EmployeeService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Employee]>, ServiceError>;
    async fn get_all_active(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Employee]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError>;
    async fn get_me(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError>;
    /// Looks up the employee owning an ical feed token. Bypasses tenant
    /// scoping since the calendar feed is fetched without a session.
    async fn find_by_ical_token(
        &self,
        token: &str,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<Employee>, ServiceError>;
    async fn create(
        &self,
        employee: &Employee,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError>;
    async fn update(
        &self,
        employee: &Employee,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Employee, ServiceError>;
}

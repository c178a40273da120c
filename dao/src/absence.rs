use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceType {
    Vacation,
    Sick,
    SchoolHoliday,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeAbsenceEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub absence_type: AbsenceType,
    pub start_date: Date,
    pub end_date: Date,
    pub days_count: Option<i32>,
    pub status: AbsenceStatus,
    pub notes: Option<Arc<str>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<PrimitiveDateTime>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait EmployeeAbsenceDao {
    type Transaction: crate::Transaction;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeAbsenceEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<EmployeeAbsenceEntity>, DaoError>;
    async fn find_by_employee(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[EmployeeAbsenceEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &EmployeeAbsenceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &EmployeeAbsenceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

/// Informational record of the care recipient's own absence; see SPEC_FULL.md §3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CareRecipientAbsenceEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub care_recipient_name: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub notes: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait CareRecipientAbsenceDao {
    type Transaction: crate::Transaction;

    async fn all(
        &self,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[CareRecipientAbsenceEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &CareRecipientAbsenceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

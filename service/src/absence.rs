use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceType {
    Vacation,
    Sick,
    SchoolHoliday,
    Other,
}

impl From<dao::absence::AbsenceType> for AbsenceType {
    fn from(t: dao::absence::AbsenceType) -> Self {
        match t {
            dao::absence::AbsenceType::Vacation => Self::Vacation,
            dao::absence::AbsenceType::Sick => Self::Sick,
            dao::absence::AbsenceType::SchoolHoliday => Self::SchoolHoliday,
            dao::absence::AbsenceType::Other => Self::Other,
        }
    }
}
impl From<AbsenceType> for dao::absence::AbsenceType {
    fn from(t: AbsenceType) -> Self {
        match t {
            AbsenceType::Vacation => Self::Vacation,
            AbsenceType::Sick => Self::Sick,
            AbsenceType::SchoolHoliday => Self::SchoolHoliday,
            AbsenceType::Other => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

impl From<dao::absence::AbsenceStatus> for AbsenceStatus {
    fn from(s: dao::absence::AbsenceStatus) -> Self {
        match s {
            dao::absence::AbsenceStatus::Pending => Self::Pending,
            dao::absence::AbsenceStatus::Approved => Self::Approved,
            dao::absence::AbsenceStatus::Rejected => Self::Rejected,
        }
    }
}
impl From<AbsenceStatus> for dao::absence::AbsenceStatus {
    fn from(s: AbsenceStatus) -> Self {
        match s {
            AbsenceStatus::Pending => Self::Pending,
            AbsenceStatus::Approved => Self::Approved,
            AbsenceStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmployeeAbsence {
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
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&dao::absence::EmployeeAbsenceEntity> for EmployeeAbsence {
    fn from(e: &dao::absence::EmployeeAbsenceEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            employee_id: e.employee_id,
            absence_type: e.absence_type.into(),
            start_date: e.start_date,
            end_date: e.end_date,
            days_count: e.days_count,
            status: e.status.into(),
            notes: e.notes.clone(),
            approved_by: e.approved_by,
            approved_at: e.approved_at,
            created_at: Some(e.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CareRecipientAbsence {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub care_recipient_name: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub notes: Option<Arc<str>>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&dao::absence::CareRecipientAbsenceEntity> for CareRecipientAbsence {
    fn from(e: &dao::absence::CareRecipientAbsenceEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            care_recipient_name: e.care_recipient_name.clone(),
            start_date: e.start_date,
            end_date: e.end_date,
            notes: e.notes.clone(),
            created_at: Some(e.created_at),
        }
    }
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait AbsenceService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[EmployeeAbsence]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<EmployeeAbsence, ServiceError>;
    /// Non-admins may only create an absence for their own linked employee.
    async fn create(
        &self,
        absence: &EmployeeAbsence,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<EmployeeAbsence, ServiceError>;
    /// Approval cancels overlapping shifts to `cancelledAbsence`; rejecting
    /// a previously-approved absence restores them to `planned`.
    async fn set_status(
        &self,
        id: Uuid,
        status: AbsenceStatus,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<EmployeeAbsence, ServiceError>;

    async fn get_all_care_recipient(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[CareRecipientAbsence]>, ServiceError>;
    async fn create_care_recipient(
        &self,
        absence: &CareRecipientAbsence,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CareRecipientAbsence, ServiceError>;
}

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftStatus {
    Planned,
    Confirmed,
    Completed,
    Cancelled,
    CancelledAbsence,
}

impl From<dao::shift::ShiftStatus> for ShiftStatus {
    fn from(status: dao::shift::ShiftStatus) -> Self {
        match status {
            dao::shift::ShiftStatus::Planned => Self::Planned,
            dao::shift::ShiftStatus::Confirmed => Self::Confirmed,
            dao::shift::ShiftStatus::Completed => Self::Completed,
            dao::shift::ShiftStatus::Cancelled => Self::Cancelled,
            dao::shift::ShiftStatus::CancelledAbsence => Self::CancelledAbsence,
        }
    }
}
impl From<ShiftStatus> for dao::shift::ShiftStatus {
    fn from(status: ShiftStatus) -> Self {
        match status {
            ShiftStatus::Planned => Self::Planned,
            ShiftStatus::Confirmed => Self::Confirmed,
            ShiftStatus::Completed => Self::Completed,
            ShiftStatus::Cancelled => Self::Cancelled,
            ShiftStatus::CancelledAbsence => Self::CancelledAbsence,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shift {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub recurring_shift_id: Option<Uuid>,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub break_minutes: i32,
    pub location: Option<Arc<str>>,
    pub notes: Option<Arc<str>>,
    pub status: ShiftStatus,
    pub cancellation_reason: Option<Arc<str>>,
    pub actual_start: Option<Time>,
    pub actual_end: Option<Time>,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<PrimitiveDateTime>,
    pub confirmation_note: Option<Arc<str>>,
    pub is_holiday: bool,
    pub is_weekend: bool,
    pub is_sunday: bool,
    pub rest_period_ok: bool,
    pub break_ok: bool,
    pub minijob_limit_ok: bool,
    pub hours_carried_over: bool,
    pub is_override: bool,
    pub created_at: Option<PrimitiveDateTime>,
    pub updated_at: Option<PrimitiveDateTime>,
}

impl From<&dao::shift::ShiftEntity> for Shift {
    fn from(e: &dao::shift::ShiftEntity) -> Self {
        Self {
            id: e.id,
            tenant_id: e.tenant_id,
            employee_id: e.employee_id,
            template_id: e.template_id,
            recurring_shift_id: e.recurring_shift_id,
            date: e.date,
            start_time: e.start_time,
            end_time: e.end_time,
            break_minutes: e.break_minutes,
            location: e.location.clone(),
            notes: e.notes.clone(),
            status: e.status.into(),
            cancellation_reason: e.cancellation_reason.clone(),
            actual_start: e.actual_start,
            actual_end: e.actual_end,
            confirmed_by: e.confirmed_by,
            confirmed_at: e.confirmed_at,
            confirmation_note: e.confirmation_note.clone(),
            is_holiday: e.is_holiday,
            is_weekend: e.is_weekend,
            is_sunday: e.is_sunday,
            rest_period_ok: e.rest_period_ok,
            break_ok: e.break_ok,
            minijob_limit_ok: e.minijob_limit_ok,
            hours_carried_over: e.hours_carried_over,
            is_override: e.is_override,
            created_at: Some(e.created_at),
            updated_at: Some(e.updated_at),
        }
    }
}

/// Net worked hours, handling a midnight-crossing shift by interpreting
/// `end_time` on the following day when `end_time <= start_time`.
pub fn net_hours(start: Time, end: Time, break_minutes: i32) -> f64 {
    let gross_minutes = if end <= start {
        (24 * 60 - (start.hour() as i32 * 60 + start.minute() as i32))
            + (end.hour() as i32 * 60 + end.minute() as i32)
    } else {
        (end.hour() as i32 * 60 + end.minute() as i32)
            - (start.hour() as i32 * 60 + start.minute() as i32)
    };
    ((gross_minutes - break_minutes).max(0) as f64) / 60.0
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftListFilter {
    pub employee_id: Option<Uuid>,
    pub from_date: Option<Date>,
    pub to_date: Option<Date>,
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait ShiftService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        filter: ShiftListFilter,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Shift]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError>;
    async fn create(
        &self,
        shift: &Shift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError>;
    async fn update(
        &self,
        shift: &Shift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError>;
    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
    /// planned -> confirmed.
    async fn confirm(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError>;
    /// Atomically assigns an open shift to the caller's linked employee.
    async fn claim(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Shift, ServiceError>;
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftStatus {
    Planned,
    Confirmed,
    Completed,
    Cancelled,
    CancelledAbsence,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftEntity {
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
    /// Schema parity field; not consulted by any current business logic,
    /// see DESIGN.md. Hour carry-over bookkeeping lives on `HoursCarryover`.
    pub hours_carried_over: bool,
    pub is_override: bool,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftFilter {
    pub employee_id: Option<Uuid>,
    pub from_date: Option<Date>,
    pub to_date: Option<Date>,
    pub recurring_shift_id: Option<Uuid>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ShiftDao {
    type Transaction: crate::Transaction;

    async fn find(
        &self,
        tenant_id: Uuid,
        filter: ShiftFilter,
        tx: Self::Transaction,
    ) -> Result<Arc<[ShiftEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ShiftEntity>, DaoError>;
    /// Last non-cancelled shift of the employee strictly before `before_date`,
    /// ordered descending by (date, end_time).
    async fn find_last_before(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
        before_date: Date,
        tx: Self::Transaction,
    ) -> Result<Option<ShiftEntity>, DaoError>;
    async fn find_planned_non_override_by_rule_from(
        &self,
        recurring_shift_id: Uuid,
        from_date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[ShiftEntity]>, DaoError>;
    async fn create(&self, entity: &ShiftEntity, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn update(&self, entity: &ShiftEntity, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn delete(&self, id: Uuid, tenant_id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn delete_planned_non_override_by_rule_from(
        &self,
        recurring_shift_id: Uuid,
        from_date: Date,
        tx: Self::Transaction,
    ) -> Result<u64, DaoError>;
    async fn delete_planned_non_override_by_rule(
        &self,
        recurring_shift_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<u64, DaoError>;
}

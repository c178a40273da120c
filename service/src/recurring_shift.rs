use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;
use vera_utils::DayOfWeek;

#[derive(Clone, Debug, PartialEq)]
pub struct RecurringShift {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub weekday: DayOfWeek,
    pub start_time: Time,
    pub end_time: Time,
    pub break_minutes: i32,
    pub employee_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub valid_from: Date,
    pub valid_until: Date,
    pub holiday_profile_id: Option<Uuid>,
    pub skip_public_holidays: bool,
    pub label: Option<Arc<str>>,
    pub active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&dao::recurring_shift::RecurringShiftEntity> for RecurringShift {
    fn from(entity: &dao::recurring_shift::RecurringShiftEntity) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            weekday: DayOfWeek::from_index0(entity.weekday).unwrap_or(DayOfWeek::Monday),
            start_time: entity.start_time,
            end_time: entity.end_time,
            break_minutes: entity.break_minutes,
            employee_id: entity.employee_id,
            template_id: entity.template_id,
            valid_from: entity.valid_from,
            valid_until: entity.valid_until,
            holiday_profile_id: entity.holiday_profile_id,
            skip_public_holidays: entity.skip_public_holidays,
            label: entity.label.clone(),
            active: entity.active,
            created_by: entity.created_by,
            created_at: Some(entity.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ExpansionPreview {
    pub generated_count: u32,
    pub skipped_count: u32,
    pub skipped_dates: Arc<[Date]>,
}

#[derive(Clone, Debug, Default)]
pub struct ExpansionResult {
    pub new_shifts: Arc<[crate::shift::Shift]>,
    pub skipped_count: u32,
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait RecurringShiftService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[RecurringShift]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<RecurringShift, ServiceError>;

    /// Pure preview; does not write, per spec.md §4.D.
    async fn preview(
        &self,
        weekday: vera_utils::DayOfWeek,
        from_date: Date,
        until_date: Date,
        holiday_profile_id: Option<Uuid>,
        skip_public_holidays: bool,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ExpansionPreview, ServiceError>;

    /// Creates the rule and materialises its shifts in one transaction.
    async fn create(
        &self,
        rule: &RecurringShift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(RecurringShift, ExpansionResult), ServiceError>;

    async fn update(
        &self,
        rule: &RecurringShift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<RecurringShift, ServiceError>;

    /// Deletes every planned, non-override shift from `from_date` onward
    /// then regenerates through `rule.valid_until`.
    async fn regenerate_from(
        &self,
        id: Uuid,
        from_date: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ExpansionResult, ServiceError>;

    /// Soft-deletes the rule and purges its planned, non-override shifts.
    async fn soft_delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}

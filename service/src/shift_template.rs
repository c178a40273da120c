use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, Time};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;
use vera_utils::DayOfWeek;

#[derive(Clone, Debug, PartialEq)]
pub struct ShiftTemplate {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: Arc<str>,
    pub weekdays: Arc<[DayOfWeek]>,
    pub start_time: Time,
    pub end_time: Time,
    pub break_minutes: i32,
    pub location: Option<Arc<str>>,
    pub required_skills: Arc<[Arc<str>]>,
    pub color: Arc<str>,
    pub active: bool,
    pub valid_from: Option<Date>,
    pub valid_until: Option<Date>,
}

impl From<&dao::shift_template::ShiftTemplateEntity> for ShiftTemplate {
    fn from(entity: &dao::shift_template::ShiftTemplateEntity) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            name: entity.name.clone(),
            weekdays: (0..7u8)
                .filter(|bit| entity.weekdays & (1 << bit) != 0)
                .filter_map(DayOfWeek::from_index0)
                .collect(),
            start_time: entity.start_time,
            end_time: entity.end_time,
            break_minutes: entity.break_minutes,
            location: entity.location.clone(),
            required_skills: entity.required_skills.clone(),
            color: entity.color.clone(),
            active: entity.active,
            valid_from: entity.valid_from,
            valid_until: entity.valid_until,
        }
    }
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait ShiftTemplateService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[ShiftTemplate]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ShiftTemplate, ServiceError>;
    async fn create(
        &self,
        template: &ShiftTemplate,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ShiftTemplate, ServiceError>;
    async fn update(
        &self,
        template: &ShiftTemplate,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ShiftTemplate, ServiceError>;
}

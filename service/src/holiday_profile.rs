use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolidayProfile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: Arc<str>,
    pub region_code: Arc<str>,
    pub active: bool,
    pub created_at: Option<PrimitiveDateTime>,
}

impl From<&dao::holiday_profile::HolidayProfileEntity> for HolidayProfile {
    fn from(entity: &dao::holiday_profile::HolidayProfileEntity) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            name: entity.name.clone(),
            region_code: entity.region_code.clone(),
            active: entity.active,
            created_at: Some(entity.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VacationPeriod {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub tenant_id: Uuid,
    pub name: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub color: Arc<str>,
}

impl From<&dao::holiday_profile::VacationPeriodEntity> for VacationPeriod {
    fn from(entity: &dao::holiday_profile::VacationPeriodEntity) -> Self {
        Self {
            id: entity.id,
            profile_id: entity.profile_id,
            tenant_id: entity.tenant_id,
            name: entity.name.clone(),
            start_date: entity.start_date,
            end_date: entity.end_date,
            color: entity.color.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomHoliday {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub tenant_id: Uuid,
    pub date: Date,
    pub name: Arc<str>,
    pub color: Arc<str>,
}

impl From<&dao::holiday_profile::CustomHolidayEntity> for CustomHoliday {
    fn from(entity: &dao::holiday_profile::CustomHolidayEntity) -> Self {
        Self {
            id: entity.id,
            profile_id: entity.profile_id,
            tenant_id: entity.tenant_id,
            date: entity.date,
            name: entity.name.clone(),
            color: entity.color.clone(),
        }
    }
}

/// The tabulated BW school-vacation ranges for the 2025/2026 school year,
/// used verbatim by the convenience profile constructor. See SPEC_FULL.md
/// §4.B.1.
pub const BW_SCHOOL_VACATIONS_2025_2026: &[(&str, time::Date, time::Date)] = &[
    (
        "Herbstferien",
        time::macros::date!(2025 - 10 - 27),
        time::macros::date!(2025 - 10 - 30),
    ),
    (
        "Weihnachtsferien",
        time::macros::date!(2025 - 12 - 22),
        time::macros::date!(2026 - 01 - 05),
    ),
    (
        "Osterferien",
        time::macros::date!(2026 - 03 - 30),
        time::macros::date!(2026 - 04 - 11),
    ),
    (
        "Pfingstferien",
        time::macros::date!(2026 - 05 - 26),
        time::macros::date!(2026 - 06 - 05),
    ),
    (
        "Sommerferien",
        time::macros::date!(2026 - 07 - 30),
        time::macros::date!(2026 - 09 - 12),
    ),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolidayProfileDetail {
    pub profile: HolidayProfile,
    pub vacation_periods: Arc<[VacationPeriod]>,
    pub custom_holidays: Arc<[CustomHoliday]>,
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait HolidayProfileService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[HolidayProfile]>, ServiceError>;
    /// Eager-loads the profile with its vacation periods and custom
    /// holidays in one call, per SPEC_FULL.md's cyclic-relationship note.
    async fn get_detail(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfileDetail, ServiceError>;
    async fn get_active(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<HolidayProfile>, ServiceError>;
    async fn create(
        &self,
        profile: &HolidayProfile,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfile, ServiceError>;
    /// Convenience constructor that pre-populates the new profile's
    /// vacation periods from `BW_SCHOOL_VACATIONS_2025_2026`.
    async fn create_with_school_vacations(
        &self,
        name: &str,
        region_code: &str,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfileDetail, ServiceError>;
    async fn update(
        &self,
        profile: &HolidayProfile,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfile, ServiceError>;
    /// Atomically deactivates every other profile of the tenant before
    /// activating `id`.
    async fn activate(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfile, ServiceError>;
    /// Fails with `EntityConflicts` if an active RecurringShift references it.
    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;

    async fn add_vacation_period(
        &self,
        period: &VacationPeriod,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VacationPeriod, ServiceError>;
    async fn delete_vacation_period(
        &self,
        profile_id: Uuid,
        period_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
    async fn add_custom_holiday(
        &self,
        holiday: &CustomHoliday,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CustomHoliday, ServiceError>;
    async fn delete_custom_holiday(
        &self,
        profile_id: Uuid,
        holiday_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}

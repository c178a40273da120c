use std::sync::Arc;

use async_trait::async_trait;
use dao::holiday_profile::{
    CustomHolidayDao, CustomHolidayEntity, HolidayProfileDao, HolidayProfileEntity,
    VacationPeriodDao, VacationPeriodEntity,
};
use dao::recurring_shift::RecurringShiftDao;
use dao::TransactionDao;
use service::clock::ClockService;
use service::holiday_profile::{
    CustomHoliday, HolidayProfile, HolidayProfileDetail, HolidayProfileService, VacationPeriod,
    BW_SCHOOL_VACATIONS_2025_2026,
};
use service::permission::{Authentication, PermissionService, Role};
use service::uuid_service::UuidService;
use service::ServiceError;
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct HolidayProfileServiceImpl: service::holiday_profile::HolidayProfileService = HolidayProfileServiceDeps {
        HolidayProfileDao: dao::holiday_profile::HolidayProfileDao<Transaction = Self::Transaction> = holiday_profile_dao,
        VacationPeriodDao: dao::holiday_profile::VacationPeriodDao<Transaction = Self::Transaction> = vacation_period_dao,
        CustomHolidayDao: dao::holiday_profile::CustomHolidayDao<Transaction = Self::Transaction> = custom_holiday_dao,
        RecurringShiftDao: dao::recurring_shift::RecurringShiftDao<Transaction = Self::Transaction> = recurring_shift_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
    }
}

#[async_trait]
impl<Deps: HolidayProfileServiceDeps> HolidayProfileService for HolidayProfileServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[HolidayProfile]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let profiles = self.holiday_profile_dao.all(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(profiles.iter().map(HolidayProfile::from).collect())
    }

    async fn get_detail(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfileDetail, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .holiday_profile_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        let periods = self.vacation_period_dao.find_by_profile(id, tx.clone()).await?;
        let holidays = self.custom_holiday_dao.find_by_profile(id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(HolidayProfileDetail {
            profile: (&entity).into(),
            vacation_periods: periods.iter().map(VacationPeriod::from).collect(),
            custom_holidays: holidays.iter().map(CustomHoliday::from).collect(),
        })
    }

    async fn get_active(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<HolidayProfile>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let profile = self.holiday_profile_dao.find_active(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(profile.as_ref().map(HolidayProfile::from))
    }

    async fn create(
        &self,
        profile: &HolidayProfile,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfile, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if profile.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = HolidayProfileEntity {
            id: self.uuid_service.new_uuid("holiday-profile-id"),
            tenant_id,
            name: profile.name.clone(),
            region_code: profile.region_code.clone(),
            active: false,
            created_at: self.clock_service.date_time_now(),
        };
        self.holiday_profile_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn create_with_school_vacations(
        &self,
        name: &str,
        region_code: &str,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfileDetail, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let profile_entity = HolidayProfileEntity {
            id: self.uuid_service.new_uuid("holiday-profile-id"),
            tenant_id,
            name: Arc::from(name),
            region_code: Arc::from(region_code),
            active: false,
            created_at: self.clock_service.date_time_now(),
        };
        self.holiday_profile_dao.create(&profile_entity, tx.clone()).await?;

        let mut periods = Vec::with_capacity(BW_SCHOOL_VACATIONS_2025_2026.len());
        for (period_name, start, end) in BW_SCHOOL_VACATIONS_2025_2026 {
            let entity = VacationPeriodEntity {
                id: self.uuid_service.new_uuid("vacation-period-id"),
                profile_id: profile_entity.id,
                tenant_id,
                name: Arc::from(*period_name),
                start_date: *start,
                end_date: *end,
                color: Arc::from("#a0c4ff"),
            };
            self.vacation_period_dao.create(&entity, tx.clone()).await?;
            periods.push(entity);
        }
        self.transaction_dao.commit(tx).await?;

        Ok(HolidayProfileDetail {
            profile: (&profile_entity).into(),
            vacation_periods: periods.iter().map(VacationPeriod::from).collect(),
            custom_holidays: Arc::new([]),
        })
    }

    async fn update(
        &self,
        profile: &HolidayProfile,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfile, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .holiday_profile_dao
            .find_by_id(profile.id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(profile.id))?;
        entity.name = profile.name.clone();
        entity.region_code = profile.region_code.clone();
        self.holiday_profile_dao.update(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn activate(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HolidayProfile, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .holiday_profile_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        // Atomic within this transaction: deactivate every sibling first,
        // then activate the target, preserving the at-most-one-active invariant.
        self.holiday_profile_dao
            .deactivate_all_except(tenant_id, Some(id), tx.clone())
            .await?;
        entity.active = true;
        self.holiday_profile_dao.update(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let in_use = self
            .recurring_shift_dao
            .all(tenant_id, tx.clone())
            .await?
            .iter()
            .any(|r| r.active && r.holiday_profile_id == Some(id));
        if in_use {
            return Err(ServiceError::EntityConflicts(
                "holiday profile is referenced by an active recurring shift".into(),
            ));
        }
        self.vacation_period_dao.delete_by_profile(id, tx.clone()).await?;
        self.custom_holiday_dao.delete_by_profile(id, tx.clone()).await?;
        self.holiday_profile_dao.delete(id, tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn add_vacation_period(
        &self,
        period: &VacationPeriod,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VacationPeriod, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if period.start_date > period.end_date {
            return Err(ServiceError::DateOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = VacationPeriodEntity {
            id: self.uuid_service.new_uuid("vacation-period-id"),
            profile_id: period.profile_id,
            tenant_id,
            name: period.name.clone(),
            start_date: period.start_date,
            end_date: period.end_date,
            color: period.color.clone(),
        };
        self.vacation_period_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn delete_vacation_period(
        &self,
        profile_id: Uuid,
        period_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.vacation_period_dao.delete(period_id, profile_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn add_custom_holiday(
        &self,
        holiday: &CustomHoliday,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<CustomHoliday, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = CustomHolidayEntity {
            id: self.uuid_service.new_uuid("custom-holiday-id"),
            profile_id: holiday.profile_id,
            tenant_id,
            date: holiday.date,
            name: holiday.name.clone(),
            color: holiday.color.clone(),
        };
        self.custom_holiday_dao.create(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn delete_custom_holiday(
        &self,
        profile_id: Uuid,
        holiday_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        self.custom_holiday_dao.delete(holiday_id, profile_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}

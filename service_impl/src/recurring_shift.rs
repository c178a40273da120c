use std::sync::Arc;

use async_trait::async_trait;
use dao::holiday_profile::{CustomHolidayDao, HolidayProfileDao, VacationPeriodDao};
use dao::recurring_shift::{RecurringShiftDao, RecurringShiftEntity};
use dao::shift::{ShiftDao, ShiftEntity, ShiftStatus as DaoShiftStatus};
use dao::TransactionDao;
use service::clock::ClockService;
use service::holiday_profile::{CustomHoliday, HolidayProfile, VacationPeriod};
use service::permission::{Authentication, PermissionService, Role};
use service::recurring_shift::{
    ExpansionPreview, ExpansionResult, RecurringShift, RecurringShiftService,
};
use service::shift::Shift;
use service::skip_set::build_skip_set;
use service::uuid_service::UuidService;
use service::ServiceError;
use time::Date;
use uuid::Uuid;
use vera_utils::{DateRangeIterator, DayOfWeek};

use crate::gen_service_impl;

gen_service_impl! {
    struct RecurringShiftServiceImpl: service::recurring_shift::RecurringShiftService = RecurringShiftServiceDeps {
        RecurringShiftDao: dao::recurring_shift::RecurringShiftDao<Transaction = Self::Transaction> = recurring_shift_dao,
        ShiftDao: dao::shift::ShiftDao<Transaction = Self::Transaction> = shift_dao,
        HolidayProfileDao: dao::holiday_profile::HolidayProfileDao<Transaction = Self::Transaction> = holiday_profile_dao,
        VacationPeriodDao: dao::holiday_profile::VacationPeriodDao<Transaction = Self::Transaction> = vacation_period_dao,
        CustomHolidayDao: dao::holiday_profile::CustomHolidayDao<Transaction = Self::Transaction> = custom_holiday_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao,
        PermissionService: service::permission::PermissionService<Context = Self::Context> = permission_service,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service,
    }
}

/// Splits `[from_date, until_date]` into dates matching `weekday`, into
/// generated dates (outside the skip set) and skipped dates. Ascending,
/// empty on an inverted range. See spec.md §4.D.
fn expand_dates(
    weekday: DayOfWeek,
    from_date: Date,
    until_date: Date,
    profile: Option<&HolidayProfile>,
    vacation_periods: &[VacationPeriod],
    custom_holidays: &[CustomHoliday],
    skip_public_holidays: bool,
) -> (Vec<Date>, Vec<Date>) {
    let skip_set = build_skip_set(
        profile,
        vacation_periods,
        custom_holidays,
        skip_public_holidays,
        from_date.year()..=until_date.year(),
    );
    let mut generated = Vec::new();
    let mut skipped = Vec::new();
    for date in DateRangeIterator::new(from_date, until_date) {
        if DayOfWeek::from(date.weekday()) != weekday {
            continue;
        }
        if skip_set.contains(&date) {
            skipped.push(date);
        } else {
            generated.push(date);
        }
    }
    (generated, skipped)
}

fn new_shift_entity(
    rule: &RecurringShiftEntity,
    date: Date,
    id: Uuid,
    now: time::PrimitiveDateTime,
) -> ShiftEntity {
    let weekday = DayOfWeek::from(date.weekday());
    ShiftEntity {
        id,
        tenant_id: rule.tenant_id,
        employee_id: rule.employee_id,
        template_id: rule.template_id,
        recurring_shift_id: Some(rule.id),
        date,
        start_time: rule.start_time,
        end_time: rule.end_time,
        break_minutes: rule.break_minutes,
        location: None,
        notes: None,
        status: DaoShiftStatus::Planned,
        cancellation_reason: None,
        actual_start: None,
        actual_end: None,
        confirmed_by: None,
        confirmed_at: None,
        confirmation_note: None,
        is_holiday: false,
        is_weekend: weekday.is_weekend(),
        is_sunday: weekday.is_sunday(),
        rest_period_ok: true,
        break_ok: true,
        minijob_limit_ok: true,
        hours_carried_over: false,
        is_override: false,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl<Deps: RecurringShiftServiceDeps> RecurringShiftService for RecurringShiftServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[RecurringShift]>, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let rules = self.recurring_shift_dao.all(tenant_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(rules.iter().map(RecurringShift::from).collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<RecurringShift, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .recurring_shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn preview(
        &self,
        weekday: DayOfWeek,
        from_date: Date,
        until_date: Date,
        holiday_profile_id: Option<Uuid>,
        skip_public_holidays: bool,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ExpansionPreview, ServiceError> {
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let (profile, vacation_periods, custom_holidays) = self
            .load_skip_inputs(holiday_profile_id, tenant_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let (generated, skipped) = expand_dates(
            weekday,
            from_date,
            until_date,
            profile.as_ref(),
            &vacation_periods,
            &custom_holidays,
            skip_public_holidays,
        );
        Ok(ExpansionPreview {
            generated_count: generated.len() as u32,
            skipped_count: skipped.len() as u32,
            skipped_dates: skipped.into(),
        })
    }

    async fn create(
        &self,
        rule: &RecurringShift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(RecurringShift, ExpansionResult), ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if rule.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if rule.valid_from > rule.valid_until {
            return Err(ServiceError::DateOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;

        let entity = RecurringShiftEntity {
            id: self.uuid_service.new_uuid("recurring-shift-id"),
            tenant_id,
            weekday: rule.weekday.to_index0(),
            start_time: rule.start_time,
            end_time: rule.end_time,
            break_minutes: rule.break_minutes,
            employee_id: rule.employee_id,
            template_id: rule.template_id,
            valid_from: rule.valid_from,
            valid_until: rule.valid_until,
            holiday_profile_id: rule.holiday_profile_id,
            skip_public_holidays: rule.skip_public_holidays,
            label: rule.label.clone(),
            active: true,
            created_by: self.permission_service.current_user_id(&context).await.ok(),
            created_at: self.clock_service.date_time_now(),
        };
        self.recurring_shift_dao.create(&entity, tx.clone()).await?;

        let result = self.generate_and_persist(&entity, entity.valid_from, tx.clone()).await?;

        self.transaction_dao.commit(tx).await?;
        Ok(((&entity).into(), result))
    }

    async fn update(
        &self,
        rule: &RecurringShift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<RecurringShift, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        if rule.valid_from > rule.valid_until {
            return Err(ServiceError::DateOrderWrong);
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .recurring_shift_dao
            .find_by_id(rule.id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(rule.id))?;
        entity.weekday = rule.weekday.to_index0();
        entity.start_time = rule.start_time;
        entity.end_time = rule.end_time;
        entity.break_minutes = rule.break_minutes;
        entity.employee_id = rule.employee_id;
        entity.template_id = rule.template_id;
        entity.valid_from = rule.valid_from;
        entity.valid_until = rule.valid_until;
        entity.holiday_profile_id = rule.holiday_profile_id;
        entity.skip_public_holidays = rule.skip_public_holidays;
        entity.label = rule.label.clone();
        self.recurring_shift_dao.update(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok((&entity).into())
    }

    async fn regenerate_from(
        &self,
        id: Uuid,
        from_date: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ExpansionResult, ServiceError> {
        self.permission_service
            .check_role_at_least(Role::Manager, &context)
            .await?;
        let tenant_id = self.permission_service.tenant_id(&context).await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let entity = self
            .recurring_shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;

        self.shift_dao
            .delete_planned_non_override_by_rule_from(id, from_date, tx.clone())
            .await?;
        let result = self.generate_and_persist(&entity, from_date, tx.clone()).await?;

        self.transaction_dao.commit(tx).await?;
        Ok(result)
    }

    async fn soft_delete(
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
        self.recurring_shift_dao
            .find_by_id(id, tenant_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.recurring_shift_dao
            .set_active(id, tenant_id, false, tx.clone())
            .await?;
        self.shift_dao
            .delete_planned_non_override_by_rule(id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}

impl<Deps: RecurringShiftServiceDeps> RecurringShiftServiceImpl<Deps> {
    async fn load_skip_inputs(
        &self,
        holiday_profile_id: Option<Uuid>,
        tenant_id: Uuid,
        tx: Deps::Transaction,
    ) -> Result<(Option<HolidayProfile>, Vec<VacationPeriod>, Vec<CustomHoliday>), ServiceError> {
        let Some(profile_id) = holiday_profile_id else {
            return Ok((None, Vec::new(), Vec::new()));
        };
        let Some(profile_entity) = self
            .holiday_profile_dao
            .find_by_id(profile_id, tenant_id, tx.clone())
            .await?
        else {
            return Ok((None, Vec::new(), Vec::new()));
        };
        let periods = self
            .vacation_period_dao
            .find_by_profile(profile_id, tx.clone())
            .await?;
        let holidays = self
            .custom_holiday_dao
            .find_by_profile(profile_id, tx.clone())
            .await?;
        Ok((
            Some((&profile_entity).into()),
            periods.iter().map(VacationPeriod::from).collect(),
            holidays.iter().map(CustomHoliday::from).collect(),
        ))
    }

    async fn generate_and_persist(
        &self,
        rule: &RecurringShiftEntity,
        from_date: Date,
        tx: Deps::Transaction,
    ) -> Result<ExpansionResult, ServiceError> {
        let (profile, vacation_periods, custom_holidays) = self
            .load_skip_inputs(rule.holiday_profile_id, rule.tenant_id, tx.clone())
            .await?;
        let (generated, skipped) = expand_dates(
            DayOfWeek::from_index0(rule.weekday).unwrap_or(DayOfWeek::Monday),
            from_date,
            rule.valid_until,
            profile.as_ref(),
            &vacation_periods,
            &custom_holidays,
            rule.skip_public_holidays,
        );

        let now = self.clock_service.date_time_now();
        let mut new_shifts = Vec::with_capacity(generated.len());
        for date in generated {
            let id = self.uuid_service.new_uuid("shift-id");
            let entity = new_shift_entity(rule, date, id, now);
            self.shift_dao.create(&entity, tx.clone()).await?;
            new_shifts.push(Shift::from(&entity));
        }

        Ok(ExpansionResult {
            new_shifts: new_shifts.into(),
            skipped_count: skipped.len() as u32,
        })
    }
}

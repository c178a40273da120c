use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod absence;
pub mod audit_log;
pub mod clock;
pub mod compliance;
pub mod config;
pub mod contract_history;
pub mod employee;
pub mod holiday_calendar;
pub mod holiday_profile;
pub mod ical;
pub mod notification;
pub mod payroll;
pub mod permission;
pub mod recurring_shift;
pub mod shift;
pub mod shift_template;
pub mod skip_set;
pub mod uuid_service;

/// One field-level validation failure, accumulated rather than short-circuited
/// so a caller sees every problem with a payload at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationFailureItem {
    InvalidValue(Arc<str>),
    MissingValue(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Entity not found: {0}")]
    EntityNotFound(Uuid),
    #[error("Entity not found")]
    EntityNotFoundGeneric,
    #[error("Entity conflicts: {0}")]
    EntityConflicts(Arc<str>),
    #[error("Entity already exists")]
    EntityAlreadyExists,
    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),
    #[error("validFrom must not be after validUntil")]
    DateOrderWrong,
    #[error("startTime must be before endTime")]
    TimeOrderWrong,
    #[error("Overlapping time range")]
    OverlappingTimeRange,
    #[error("id must not be set on create")]
    IdSetOnCreate,
    #[error("version must not be set on create")]
    VersionSetOnCreate,
    #[error("createdAt must not be set on create")]
    CreatedSetOnCreate,
    #[error("deletedAt must not be set on create")]
    DeletedSetOnCreate,
    #[error("Internal error")]
    InternalError,
}

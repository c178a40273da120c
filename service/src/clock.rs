use mockall::automock;

/// Indirection over wall-clock time so business logic never calls
/// `OffsetDateTime::now_utc()` directly; enables deterministic tests.
#[automock]
pub trait ClockService {
    fn time_now(&self) -> time::Time;
    fn date_now(&self) -> time::Date;
    fn date_time_now(&self) -> time::PrimitiveDateTime;
}

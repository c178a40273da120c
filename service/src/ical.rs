use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::shift::{Shift, ShiftStatus};
use crate::ServiceError;

/// One shift plus the handful of related facts the iCal renderer needs,
/// eager-loaded by the caller per SPEC_FULL.md's cyclic-relationship note
/// (shift + template name + employee display name in one bulk load).
#[derive(Clone, Debug, PartialEq)]
pub struct IcalShiftView {
    pub shift: Shift,
    pub template_name: Option<Arc<str>>,
    pub employee_name: Option<Arc<str>>,
}

/// Pure rendering of a tenant/employee's shifts into a VCALENDAR document.
/// No I/O, no suspension points: safe to call from any worker.
pub trait IcalService {
    fn render(&self, shifts: Arc<[IcalShiftView]>, now: PrimitiveDateTime) -> Result<Arc<str>, ServiceError>;

    /// UID namespace used for every VEVENT, per spec.md §6: `vera-shift-{id}@vera`.
    fn event_uid(&self, shift_id: Uuid) -> Arc<str> {
        Arc::from(format!("vera-shift-{shift_id}@vera"))
    }
}

pub fn status_label(status: ShiftStatus) -> &'static str {
    match status {
        ShiftStatus::Planned => "geplant",
        ShiftStatus::Confirmed => "bestätigt",
        ShiftStatus::Completed => "abgeschlossen",
        ShiftStatus::Cancelled => "storniert",
        ShiftStatus::CancelledAbsence => "storniert (Abwesenheit)",
    }
}

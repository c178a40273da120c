use std::sync::Arc;

use service::ical::{status_label, IcalService, IcalShiftView};
use service::shift::ShiftStatus;
use service::ServiceError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::PrimitiveDateTime;

pub struct IcalServiceImpl;

const DATETIME_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second]");

impl IcalService for IcalServiceImpl {
    fn render(&self, shifts: Arc<[IcalShiftView]>, now: PrimitiveDateTime) -> Result<Arc<str>, ServiceError> {
        let mut out = String::new();
        out.push_str("BEGIN:VCALENDAR\r\n");
        out.push_str("VERSION:2.0\r\n");
        out.push_str("PRODID:-//vera//scheduling-core//EN\r\n");
        out.push_str("CALSCALE:GREGORIAN\r\n");

        let dtstamp = now
            .assume_utc()
            .format(&Rfc3339)
            .map_err(|_| ServiceError::InternalError)?;

        for view in shifts.iter() {
            if matches!(view.shift.status, ShiftStatus::Cancelled | ShiftStatus::CancelledAbsence) {
                continue;
            }
            let shift = &view.shift;

            // Midnight-crossing shift: end_time <= start_time means the end
            // is interpreted on date+1, per spec.md §3's Shift invariant.
            let crosses_midnight = shift.end_time <= shift.start_time;
            let dtend_date = if crosses_midnight {
                shift.date.next_day().unwrap_or(shift.date)
            } else {
                shift.date
            };

            let dtstart = PrimitiveDateTime::new(shift.date, shift.start_time)
                .format(DATETIME_FORMAT)
                .map_err(|_| ServiceError::InternalError)?;
            let dtend = PrimitiveDateTime::new(dtend_date, shift.end_time)
                .format(DATETIME_FORMAT)
                .map_err(|_| ServiceError::InternalError)?;

            let summary = view.template_name.clone().unwrap_or_else(|| Arc::from("Dienst"));
            let status = match shift.status {
                ShiftStatus::Confirmed | ShiftStatus::Completed => "CONFIRMED",
                _ => "TENTATIVE",
            };

            let mut description = String::new();
            if let Some(name) = &view.employee_name {
                description.push_str(&format!("Mitarbeiter: {name}\\n"));
            }
            description.push_str(&format!("Status: {}\\n", status_label(shift.status)));
            description.push_str(&format!("Pause: {} Min.\\n", shift.break_minutes));
            if let Some(notes) = &shift.notes {
                description.push_str(&format!("Notiz: {notes}\\n"));
            }

            out.push_str("BEGIN:VEVENT\r\n");
            out.push_str(&format!("UID:vera-shift-{}@vera\r\n", shift.id));
            out.push_str(&format!("DTSTAMP:{dtstamp}\r\n"));
            out.push_str(&format!("DTSTART;TZID=Europe/Berlin:{dtstart}\r\n"));
            out.push_str(&format!("DTEND;TZID=Europe/Berlin:{dtend}\r\n"));
            out.push_str(&format!("SUMMARY:{summary}\r\n"));
            out.push_str(&format!("STATUS:{status}\r\n"));
            out.push_str(&format!("DESCRIPTION:{description}\r\n"));
            out.push_str("END:VEVENT\r\n");
        }

        out.push_str("END:VCALENDAR\r\n");
        Ok(Arc::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::shift::Shift;
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    fn base_shift() -> Shift {
        Shift {
            id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            employee_id: None,
            template_id: None,
            recurring_shift_id: None,
            date: date!(2025 - 09 - 01),
            start_time: time!(22:00),
            end_time: time!(02:00),
            break_minutes: 0,
            location: None,
            notes: None,
            status: ShiftStatus::Confirmed,
            cancellation_reason: None,
            actual_start: None,
            actual_end: None,
            confirmed_by: None,
            confirmed_at: None,
            confirmation_note: None,
            is_holiday: false,
            is_weekend: false,
            is_sunday: false,
            rest_period_ok: true,
            break_ok: true,
            minijob_limit_ok: true,
            hours_carried_over: false,
            is_override: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn midnight_crossing_shift_advances_dtend_by_one_day() {
        let view = IcalShiftView {
            shift: base_shift(),
            template_name: Some(Arc::from("Nachtdienst")),
            employee_name: Some(Arc::from("Jane Doe")),
        };
        let rendered = IcalServiceImpl
            .render(Arc::from(vec![view]), datetime!(2025-09-01 00:00))
            .unwrap();
        assert!(rendered.contains("DTSTART;TZID=Europe/Berlin:20250901T220000"));
        assert!(rendered.contains("DTEND;TZID=Europe/Berlin:20250902T020000"));
        assert!(rendered.contains("STATUS:CONFIRMED"));
    }

    #[test]
    fn cancelled_shifts_are_omitted() {
        let mut shift = base_shift();
        shift.status = ShiftStatus::Cancelled;
        let view = IcalShiftView {
            shift,
            template_name: None,
            employee_name: None,
        };
        let rendered = IcalServiceImpl
            .render(Arc::from(vec![view]), datetime!(2025-09-01 00:00))
            .unwrap();
        assert!(!rendered.contains("BEGIN:VEVENT"));
    }
}

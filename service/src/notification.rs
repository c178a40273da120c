use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationChannel {
    Telegram,
    Email,
    Push,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    ShiftAssigned { shift_id: Uuid, employee_id: Uuid },
    ShiftChanged { shift_id: Uuid, employee_id: Uuid },
    ShiftReminder { shift_id: Uuid, employee_id: Uuid },
    AbsenceApproved { absence_id: Uuid, employee_id: Uuid },
    AbsenceRejected { absence_id: Uuid, employee_id: Uuid },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::ShiftAssigned { .. } => "shift_assigned",
            DomainEvent::ShiftChanged { .. } => "shift_changed",
            DomainEvent::ShiftReminder { .. } => "shift_reminder",
            DomainEvent::AbsenceApproved { .. } => "absence_approved",
            DomainEvent::AbsenceRejected { .. } => "absence_rejected",
        }
    }

    pub fn employee_id(&self) -> Uuid {
        match self {
            DomainEvent::ShiftAssigned { employee_id, .. }
            | DomainEvent::ShiftChanged { employee_id, .. }
            | DomainEvent::ShiftReminder { employee_id, .. }
            | DomainEvent::AbsenceApproved { employee_id, .. }
            | DomainEvent::AbsenceRejected { employee_id, .. } => *employee_id,
        }
    }
}

/// Adapter boundary: fans an event out to the employee's configured
/// channels with quiet-hours gating. Best-effort; a dispatch failure must
/// never propagate back to the caller of the originating domain operation,
/// per spec.md §4.J / §9 "exceptions for control flow".
#[automock]
#[async_trait]
pub trait NotificationDispatcher {
    async fn dispatch(&self, tenant_id: Uuid, event: DomainEvent);
}

/// Channels resolved for one employee, decoded from their opaque
/// `notificationPrefs` document at the edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelPreferences {
    pub channels: Arc<[NotificationChannel]>,
}

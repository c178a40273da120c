use std::sync::Arc;

use async_trait::async_trait;
use dao::employee::EmployeeDao;
use dao::notification_log::{
    NotificationChannel as DaoNotificationChannel, NotificationLogDao, NotificationLogEntity,
    NotificationStatus,
};
use dao::TransactionDao;
use serde::Deserialize;
use service::clock::ClockService;
use service::notification::{ChannelPreferences, DomainEvent, NotificationChannel, NotificationDispatcher};
use service::uuid_service::UuidService;
use time::Time;
use uuid::Uuid;

/// Mirrors the `notificationPrefs` JSON document decoded at this adapter
/// boundary; see spec.md §4.J.
#[derive(Deserialize)]
struct NotificationPrefsDoc {
    #[serde(default)]
    channels: Vec<String>,
}

fn decode_channels(raw: &str) -> ChannelPreferences {
    let doc: NotificationPrefsDoc = serde_json::from_str(raw).unwrap_or(NotificationPrefsDoc { channels: Vec::new() });
    let channels: Arc<[NotificationChannel]> = doc
        .channels
        .iter()
        .filter_map(|c| match c.as_str() {
            "telegram" => Some(NotificationChannel::Telegram),
            "email" => Some(NotificationChannel::Email),
            "push" => Some(NotificationChannel::Push),
            _ => None,
        })
        .collect();
    ChannelPreferences { channels }
}

/// `[start, end)` with wrap-around when `start > end` (an overnight window
/// such as 21:00-07:00), per spec.md §4.J.
fn in_quiet_hours(now: Time, start: Time, end: Time) -> bool {
    if start <= end {
        now >= start && now < end
    } else {
        now >= start || now < end
    }
}

/// Fans a [`DomainEvent`] out to an employee's configured channels, applying
/// quiet-hours gating and recording a terminal-status log entry per attempt.
/// Deliberately does not use `gen_service_impl!`: unlike every other service
/// trait, `NotificationDispatcher::dispatch` carries no `Context`/`Transaction`
/// parameter, since it runs as a best-effort side channel after the caller's
/// own transaction has already committed.
pub trait NotificationDispatcherDeps {
    type Transaction: dao::Transaction + Send + Sync + Clone + std::fmt::Debug + 'static;
    type EmployeeDao: dao::employee::EmployeeDao<Transaction = Self::Transaction> + Sync + Send;
    type NotificationLogDao: dao::notification_log::NotificationLogDao<Transaction = Self::Transaction> + Sync + Send;
    type TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> + Sync + Send;
    type ClockService: service::clock::ClockService + Sync + Send;
    type UuidService: service::uuid_service::UuidService + Sync + Send;
}

pub struct NotificationDispatcherImpl<Deps: NotificationDispatcherDeps> {
    pub employee_dao: Arc<Deps::EmployeeDao>,
    pub notification_log_dao: Arc<Deps::NotificationLogDao>,
    pub transaction_dao: Arc<Deps::TransactionDao>,
    pub clock_service: Arc<Deps::ClockService>,
    pub uuid_service: Arc<Deps::UuidService>,
}

impl<Deps: NotificationDispatcherDeps> NotificationDispatcherImpl<Deps> {
    pub fn new(
        employee_dao: Arc<Deps::EmployeeDao>,
        notification_log_dao: Arc<Deps::NotificationLogDao>,
        transaction_dao: Arc<Deps::TransactionDao>,
        clock_service: Arc<Deps::ClockService>,
        uuid_service: Arc<Deps::UuidService>,
    ) -> Self {
        Self {
            employee_dao,
            notification_log_dao,
            transaction_dao,
            clock_service,
            uuid_service,
        }
    }

    /// Simulated channel send. Real delivery (Telegram bot API, SMTP, web
    /// push) is adapter-owned infrastructure outside this crate's scope.
    async fn send(&self, _channel: NotificationChannel, _subject: &str, _body: &str) -> Result<(), ()> {
        Ok(())
    }

    async fn log(
        &self,
        tenant_id: Uuid,
        employee_id: Option<Uuid>,
        channel: DaoNotificationChannel,
        event_type: &str,
        body: &str,
        status: NotificationStatus,
        error: Option<Arc<str>>,
    ) {
        let Ok(tx) = self.transaction_dao.new_transaction().await else {
            return;
        };
        let now = self.clock_service.date_time_now();
        let entity = NotificationLogEntity {
            id: self.uuid_service.new_uuid("notification-log-id"),
            tenant_id,
            employee_id,
            channel,
            event_type: Arc::from(event_type),
            subject: None,
            body: Arc::from(body),
            status,
            sent_at: matches!(status, NotificationStatus::Sent).then_some(now),
            error,
            created_at: now,
        };
        if self.notification_log_dao.append(&entity, tx.clone()).await.is_ok() {
            let _ = self.transaction_dao.commit(tx).await;
        }
    }
}

#[async_trait]
impl<Deps: NotificationDispatcherDeps + Sync + Send> NotificationDispatcher for NotificationDispatcherImpl<Deps> {
    async fn dispatch(&self, tenant_id: Uuid, event: DomainEvent) {
        let event_type = event.event_type();
        let employee_id = event.employee_id();
        let body = format!("{event:?}");

        let tx = match self.transaction_dao.new_transaction().await {
            Ok(tx) => tx,
            Err(err) => {
                tracing::warn!(%err, "could not open transaction for notification dispatch");
                return;
            }
        };
        let employee = match self.employee_dao.find_by_id(employee_id, tenant_id, tx.clone()).await {
            Ok(Some(employee)) => employee,
            Ok(None) => {
                tracing::warn!(%employee_id, "notification target employee not found");
                return;
            }
            Err(err) => {
                tracing::warn!(%err, "could not load employee for notification dispatch");
                return;
            }
        };
        let _ = self.transaction_dao.commit(tx).await;

        let prefs = decode_channels(&employee.notification_prefs);
        if prefs.channels.is_empty() {
            return;
        }

        let now = self.clock_service.time_now();
        let quiet = in_quiet_hours(now, employee.quiet_hours_start, employee.quiet_hours_end);

        for channel in prefs.channels.iter().copied() {
            let dao_channel = match channel {
                NotificationChannel::Telegram => DaoNotificationChannel::Telegram,
                NotificationChannel::Email => DaoNotificationChannel::Email,
                NotificationChannel::Push => DaoNotificationChannel::Push,
            };

            if quiet {
                self.log(
                    tenant_id,
                    Some(employee_id),
                    dao_channel,
                    event_type,
                    &body,
                    NotificationStatus::SkippedQuietHours,
                    None,
                )
                .await;
                continue;
            }

            match self.send(channel, event_type, &body).await {
                Ok(()) => {
                    self.log(
                        tenant_id,
                        Some(employee_id),
                        dao_channel,
                        event_type,
                        &body,
                        NotificationStatus::Sent,
                        None,
                    )
                    .await;
                }
                Err(()) => {
                    self.log(
                        tenant_id,
                        Some(employee_id),
                        dao_channel,
                        event_type,
                        &body,
                        NotificationStatus::Failed,
                        Some(Arc::from("delivery failed")),
                    )
                    .await;
                }
            }
        }
    }
}

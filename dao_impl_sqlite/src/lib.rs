use std::sync::Arc;

use async_trait::async_trait;
use dao::{BasicDao, DaoError, Transaction};
use sqlx::{query, SqlitePool};
use tokio::sync::Mutex;

pub mod absence;
pub mod audit_log;
pub mod contract_history;
pub mod employee;
pub mod holiday_profile;
pub mod notification_log;
pub mod payroll;
pub mod recurring_shift;
pub mod shift;
pub mod shift_template;

pub(crate) const DATE_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");
pub(crate) const TIME_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[hour]:[minute]:[second]");

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| DaoError::DatabaseQueryError(Box::new(err)))
    }
}

pub struct BasicDaoImpl {
    pool: Arc<SqlitePool>,
}
impl BasicDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BasicDao for BasicDaoImpl {
    async fn clear_all(&self) -> Result<(), DaoError> {
        query!(
            r"
                DELETE FROM notification_log;
                DELETE FROM audit_log;
                DELETE FROM hours_carryover;
                DELETE FROM payroll_entry;
                DELETE FROM care_recipient_absence;
                DELETE FROM employee_absence;
                DELETE FROM contract_history;
                DELETE FROM shift;
                DELETE FROM recurring_shift;
                DELETE FROM shift_template;
                DELETE FROM employee;
                DELETE FROM custom_holiday;
                DELETE FROM vacation_period;
                DELETE FROM holiday_profile;
                "
        )
        .execute(self.pool.as_ref())
        .await
        .map_db_error()?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct TransactionImpl {
    tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}

impl Transaction for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl dao::TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(tx.into()),
        })
    }

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        if let Some(tx) = Arc::into_inner(transaction.tx) {
            tx.into_inner().commit().await.map_db_error()?;
        }
        Ok(())
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

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

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("Entity not found")]
    EntityNotFound,
}

/// Marker for a live unit-of-work handle. Implementations wrap a connection
/// or transaction; DAO methods take one by value and are expected to be
/// cheap to clone (an `Arc<Mutex<..>>` internally) since a single request
/// may route through several DAOs sharing the same transaction.
pub trait Transaction: Clone + Send + Sync {}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao {
    type Transaction: Transaction;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError>;
    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;
    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError>;
}

#[derive(Clone, Debug, Default)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

/// Wipes every tenant-scoped table; used by integration test setup only.
#[automock]
#[async_trait]
pub trait BasicDao {
    async fn clear_all(&self) -> Result<(), DaoError>;
}

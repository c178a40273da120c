use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::permission::Authentication;
use crate::shift::Shift;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq)]
pub enum ComplianceMessage {
    RestPeriodTooShort { gap_hours: f64 },
    BreakTooShort { worked_hours: f64, break_minutes: i32 },
    MinijobMonthlyLimitExceeded { total: f64 },
    MinijobAnnualLimitWarning { ytd: f64, limit: f64 },
    MinijobAnnualLimitExceeded { ytd: f64, limit: f64 },
    PublicHoliday,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComplianceEvaluation {
    pub violations: Arc<[ComplianceMessage]>,
    pub warnings: Arc<[ComplianceMessage]>,
}

impl ComplianceEvaluation {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn rest_period_ok(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|m| matches!(m, ComplianceMessage::RestPeriodTooShort { .. }))
    }

    pub fn break_ok(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|m| matches!(m, ComplianceMessage::BreakTooShort { .. }))
    }

    pub fn minijob_limit_ok(&self) -> bool {
        !self.violations.iter().any(|m| {
            matches!(
                m,
                ComplianceMessage::MinijobMonthlyLimitExceeded { .. }
                    | ComplianceMessage::MinijobAnnualLimitExceeded { .. }
            )
        })
    }
}

#[automock(type Context = (); type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait ComplianceService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync;
    type Transaction: dao::Transaction;

    /// Evaluates `shift` against rest-period, break, and (for minijob
    /// employees) monthly/annual earnings ceilings. Side-channel: a failure
    /// here must never fail the caller's primary write, per spec.md §4.F.
    async fn evaluate(
        &self,
        shift: &Shift,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<ComplianceEvaluation, ServiceError>;

    async fn list_violations(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[(Shift, ComplianceEvaluation)]>, ServiceError>;
}

use std::fmt::Debug;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::ServiceError;

/// The authenticated caller of a request, scoped to one tenant.
///
/// `Authentication::Full` bypasses tenant scoping entirely and is reserved
/// for the super-admin surface and background jobs; everything reachable
/// through the HTTP API carries `Authentication::Context`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication<Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static> {
    Full,
    Context(Context),
}

impl<Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static> From<Context>
    for Authentication<Context>
{
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn at_least(&self, required: Role) -> bool {
        *self >= required
    }
}

/// The context carried on every tenant-scoped request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    /// Set when `user_id` is linked to an `Employee` row; `None` for
    /// manager/admin accounts with no shift-claiming identity of their own.
    pub employee_id: Option<Uuid>,
}

impl UserContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_manager_or_admin(&self) -> bool {
        self.role.at_least(Role::Manager)
    }

    pub fn owns_employee(&self, employee_id: Uuid) -> bool {
        self.employee_id == Some(employee_id)
    }
}

/// Resolves tenant/role facts out of an `Authentication<Context>` so
/// business-logic services stay generic over `Context` (mirroring how the
/// rest of this workspace keeps `Context` an opaque associated type and
/// delegates every authorization decision to this trait).
#[automock(type Context = ();)]
#[async_trait]
pub trait PermissionService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    /// `Authentication::Full` has no tenant of its own; callers that need a
    /// tenant scope must not be reachable with it (background jobs loop over
    /// tenants explicitly instead).
    async fn tenant_id(&self, context: &Authentication<Self::Context>) -> Result<Uuid, ServiceError>;
    async fn current_user_id(
        &self,
        context: &Authentication<Self::Context>,
    ) -> Result<Uuid, ServiceError>;
    async fn current_employee_id(
        &self,
        context: &Authentication<Self::Context>,
    ) -> Result<Option<Uuid>, ServiceError>;
    async fn role(&self, context: &Authentication<Self::Context>) -> Result<Role, ServiceError>;
    /// `Authentication::Full` always passes.
    async fn check_role_at_least(
        &self,
        required: Role,
        context: &Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;
}

use async_trait::async_trait;
use service::permission::{Authentication, PermissionService, Role, UserContext};
use service::ServiceError;
use uuid::Uuid;

pub struct PermissionServiceImpl;

#[async_trait]
impl PermissionService for PermissionServiceImpl {
    type Context = UserContext;

    async fn tenant_id(&self, context: &Authentication<Self::Context>) -> Result<Uuid, ServiceError> {
        match context {
            Authentication::Full => Err(ServiceError::Forbidden),
            Authentication::Context(ctx) => Ok(ctx.tenant_id),
        }
    }

    async fn current_user_id(
        &self,
        context: &Authentication<Self::Context>,
    ) -> Result<Uuid, ServiceError> {
        match context {
            Authentication::Full => Err(ServiceError::Forbidden),
            Authentication::Context(ctx) => Ok(ctx.user_id),
        }
    }

    async fn current_employee_id(
        &self,
        context: &Authentication<Self::Context>,
    ) -> Result<Option<Uuid>, ServiceError> {
        match context {
            Authentication::Full => Ok(None),
            Authentication::Context(ctx) => Ok(ctx.employee_id),
        }
    }

    async fn role(&self, context: &Authentication<Self::Context>) -> Result<Role, ServiceError> {
        match context {
            Authentication::Full => Ok(Role::Admin),
            Authentication::Context(ctx) => Ok(ctx.role),
        }
    }

    async fn check_role_at_least(
        &self,
        required: Role,
        context: &Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        match context {
            Authentication::Full => Ok(()),
            Authentication::Context(ctx) if ctx.role.at_least(required) => Ok(()),
            Authentication::Context(_) => Err(ServiceError::Forbidden),
        }
    }
}

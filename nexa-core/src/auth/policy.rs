use nexa_contracts::error::{CoreError, CoreResult};
use nexa_model::user::{AuthorizationPolicy, User};

/// Raises `CoreError::forbidden` when `policy` does not permit `user`.
/// Request handlers call this after `AuthService::authenticate` succeeds.
pub fn authorize(policy: AuthorizationPolicy, user: &User) -> CoreResult<()> {
    if policy.permits(user) {
        Ok(())
    } else {
        Err(CoreError::forbidden("administrator role required"))
    }
}

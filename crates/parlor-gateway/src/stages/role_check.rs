//! Role gate: protected path prefixes require a privileged role.

use crate::domain::config::RoleGateConfig;
use crate::domain::error::Rejection;
use crate::pipeline::{Stage, StageOutcome};
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use shared_types::Role;
use tracing::warn;

/// Enforces role-based access on configured path prefixes.
///
/// Paths outside the protected prefixes always pass. On a protected path a
/// missing identity and an insufficient role are distinct rejections with
/// distinct reasons.
pub struct RoleCheckStage {
    protected_prefixes: Vec<String>,
    allowed_roles: Vec<Role>,
}

impl RoleCheckStage {
    /// Create a gate with explicit prefixes and roles.
    #[must_use]
    pub fn new(protected_prefixes: Vec<String>, allowed_roles: Vec<Role>) -> Self {
        Self {
            protected_prefixes,
            allowed_roles,
        }
    }

    /// Create the gate from configuration.
    #[must_use]
    pub fn from_config(config: &RoleGateConfig) -> Self {
        Self::new(
            config.protected_prefixes.clone(),
            config.allowed_roles.clone(),
        )
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[async_trait]
impl Stage for RoleCheckStage {
    fn name(&self) -> &'static str {
        "role_check"
    }

    async fn apply(&self, request: &RequestDescriptor) -> StageOutcome {
        if !self.is_protected(&request.path) {
            return StageOutcome::Continue;
        }

        match &request.identity {
            None => StageOutcome::Reject(Rejection::auth_required()),
            Some(user) if !self.allowed_roles.contains(&user.role) => {
                warn!(
                    user = %user.username,
                    role = user.role.as_str(),
                    path = %request.path,
                    "insufficient role for protected path"
                );
                StageOutcome::Reject(Rejection::insufficient_role(
                    &self.allowed_roles,
                    Some(user.role),
                ))
            }
            Some(_) => StageOutcome::Continue,
        }
    }
}

use {
    crate::domain::error::AuditError,
    crate::domain::policy::{AccessPolicy, AuditabilityPolicy, UserProvider},
    std::sync::Arc,
};

/// Auditability and role checks run before any audit table is touched.
#[derive(Clone)]
pub struct AccessGate {
    auditability: Arc<dyn AuditabilityPolicy>,
    access: Option<Arc<dyn AccessPolicy>>,
    users: Option<Arc<dyn UserProvider>>,
}

impl AccessGate {
    pub fn new(
        auditability: Arc<dyn AuditabilityPolicy>,
        access: Option<Arc<dyn AccessPolicy>>,
        users: Option<Arc<dyn UserProvider>>,
    ) -> Self {
        Self {
            auditability,
            access,
            users,
        }
    }

    pub fn auditability(&self) -> &dyn AuditabilityPolicy {
        &*self.auditability
    }

    pub fn check(&self, entity: &str, scope: &str) -> Result<(), AuditError> {
        self.check_auditable(entity)?;
        self.check_roles(entity, scope)
    }

    pub fn check_auditable(&self, entity: &str) -> Result<(), AuditError> {
        if self.auditability.is_auditable(entity) {
            Ok(())
        } else {
            Err(AuditError::NotAuditable(entity.to_string()))
        }
    }

    /// Allows when no policy or user provider is wired, when the entity has no
    /// requirement for `scope`, or when nobody is logged in.
    pub fn check_roles(&self, entity: &str, scope: &str) -> Result<(), AuditError> {
        let (Some(access), Some(users)) = (&self.access, &self.users) else {
            return Ok(());
        };
        let Some(required) = access.roles_for(entity, scope) else {
            return Ok(());
        };
        let Some(held) = users.current_user_roles() else {
            return Ok(());
        };

        if required.iter().any(|role| held.contains(role)) {
            Ok(())
        } else {
            tracing::debug!(entity, scope, "role check failed");
            Err(AuditError::AccessDenied {
                entity: entity.to_string(),
                scope: scope.to_string(),
            })
        }
    }
}

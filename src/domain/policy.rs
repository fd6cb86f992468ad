use {
    serde::{Deserialize, Serialize},
    std::collections::{BTreeMap, BTreeSet},
};

/// Role scope checked before reading an entity's history.
pub const VIEW_SCOPE: &str = "view";

/// Per-entity audit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOptions {
    /// Scope name to the roles allowed in that scope. `None` means unrestricted.
    #[serde(default)]
    pub roles: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub ignored_columns: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for EntityOptions {
    fn default() -> Self {
        Self {
            roles: None,
            ignored_columns: Vec::new(),
            enabled: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Decides which entities have audit tables at all.
pub trait AuditabilityPolicy: Send + Sync {
    fn is_auditable(&self, entity: &str) -> bool;

    fn entities(&self) -> BTreeMap<String, EntityOptions>;
}

/// Roles required to act on an entity within a scope.
pub trait AccessPolicy: Send + Sync {
    /// `None` when the entity has no requirement for this scope.
    fn roles_for(&self, entity: &str, scope: &str) -> Option<BTreeSet<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub roles: BTreeSet<String>,
}

pub trait UserProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;

    fn current_user_roles(&self) -> Option<BTreeSet<String>> {
        self.current_user().map(|user| user.roles)
    }
}

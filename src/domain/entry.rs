use {
    super::error::AuditError,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Insert,
    Update,
    Remove,
    Associate,
    Dissociate,
}

impl OperationType {
    pub const ALL: [OperationType; 5] = [
        Self::Insert,
        Self::Update,
        Self::Remove,
        Self::Associate,
        Self::Dissociate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Associate => "associate",
            Self::Dissociate => "dissociate",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for OperationType {
    type Error = AuditError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "remove" => Ok(Self::Remove),
            "associate" => Ok(Self::Associate),
            "dissociate" => Ok(Self::Dissociate),
            other => Err(AuditError::InvalidArgument(format!(
                "unknown operation type: {other}"
            ))),
        }
    }
}

/// Who performed the change, as captured at flush time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blame {
    pub id: Option<String>,
    pub user: Option<String>,
    pub user_fqdn: Option<String>,
    pub user_firewall: Option<String>,
}

/// One row of an audit table. Entries are never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub operation: OperationType,
    pub object_id: Option<String>,
    pub discriminator: Option<String>,
    pub transaction_hash: Option<String>,
    pub diffs: Option<serde_json::Value>,
    pub blame: Blame,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

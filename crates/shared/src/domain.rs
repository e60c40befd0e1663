use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(OrganizationId);

/// Display name of an organization. Carries no identity beyond its text.
pub type OrganizationName = String;

/// Names in the order the server returned them, duplicates included.
pub type OrganizationList = Vec<OrganizationName>;

/// Column width of `organizations.name`.
pub const MAX_ORGANIZATION_NAME_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub organization_id: OrganizationId,
    pub name: OrganizationName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_organization_name(name: &str) -> Result<&str, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("organization name must not be empty".into());
    }
    let chars = trimmed.chars().count();
    if chars > MAX_ORGANIZATION_NAME_CHARS {
        return Err(format!(
            "organization name is {chars} characters, limit is {MAX_ORGANIZATION_NAME_CHARS}"
        ));
    }
    Ok(trimmed)
}

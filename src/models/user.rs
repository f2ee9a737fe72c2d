//! User entity model
//!
//! Accounts allowed to authenticate against the API. The credential is
//! stored as a salted one-way hash, never in clear.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// User entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub last_name: String,

    pub first_name: String,

    /// Login identifier, unique across users
    #[sea_orm(unique)]
    pub email: String,

    /// `pbkdf2:sha256:<iterations>$<salt>$<hash>`
    pub password_hash: String,

    pub role: Role,

    /// Set on every successful login
    pub last_login_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Display name as `"<last> <first>"`
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// Closed set of account roles
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,

    #[sea_orm(string_value = "enseignant")]
    #[serde(rename = "enseignant")]
    #[default]
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "enseignant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Role::Admin),
            "enseignant" => Ok(Role::Teacher),
            other => Err(format!(
                "unknown role '{other}'; expected one of: admin, enseignant"
            )),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("enseignant".parse::<Role>().unwrap(), Role::Teacher);
        assert!("student".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Teacher);
    }
}

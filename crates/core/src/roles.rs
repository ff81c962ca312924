//! Well-known roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_FIELD_AGENT: &str = "fieldAgent";

/// The role a user acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Sees and manages everything.
    #[serde(rename = "admin")]
    Admin,
    /// Builds forms, assigns them, and reviews their submissions.
    #[serde(rename = "manager")]
    Manager,
    /// Fills in the forms assigned to them.
    #[serde(rename = "fieldAgent")]
    FieldAgent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::FieldAgent => ROLE_FIELD_AGENT,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_FIELD_AGENT => Ok(Role::FieldAgent),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

//! Login roles and the collections backing them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// A login role. Each role's credentials live in their own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Staff,
}

impl Role {
    /// Every role, in display order
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Staff => "staff",
        }
    }

    /// Collection holding this role's credential records
    pub fn collection(&self) -> &'static str {
        self.as_str()
    }

    /// Role-specific attribute copied into the user profile
    pub fn profile_attribute(&self) -> Option<&'static str> {
        match self {
            Role::Admin => None,
            Role::Teacher => Some("subject"),
            Role::Student => Some("class"),
            Role::Staff => Some("department"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AuthError::InvalidRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Admin".parse::<Role>().is_err());
        assert!("parent".parse::<Role>().is_err());
    }

    #[test]
    fn test_profile_attributes() {
        assert_eq!(Role::Admin.profile_attribute(), None);
        assert_eq!(Role::Teacher.profile_attribute(), Some("subject"));
        assert_eq!(Role::Student.profile_attribute(), Some("class"));
        assert_eq!(Role::Staff.profile_attribute(), Some("department"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
        let role: Role = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, Role::Teacher);
    }
}

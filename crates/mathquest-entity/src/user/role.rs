//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two account roles on the platform.
///
/// Tokens and the database carry the uppercase form (`TEACHER`); the web
/// client receives the lowercase form from [`UserRole::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Defines goals and lessons, chats with assigned students.
    Teacher,
    /// Works through lessons, chats with assigned teachers.
    Student,
}

impl UserRole {
    /// The role on the other side of a teacher/student pairing.
    pub fn counterpart(&self) -> Self {
        match self {
            Self::Teacher => Self::Student,
            Self::Student => Self::Teacher,
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = mathquest_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(mathquest_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: teacher, student"
            ))),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = mathquest_core::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("TEACHER".parse::<UserRole>().unwrap(), UserRole::Teacher);
        assert_eq!("student".parse::<UserRole>().unwrap(), UserRole::Student);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase() {
        let json = serde_json::to_string(&UserRole::Teacher).unwrap();
        assert_eq!(json, "\"TEACHER\"");
        let parsed: UserRole = serde_json::from_str("\"STUDENT\"").unwrap();
        assert_eq!(parsed, UserRole::Student);
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(UserRole::Teacher.counterpart(), UserRole::Student);
        assert_eq!(UserRole::Student.counterpart(), UserRole::Teacher);
    }
}

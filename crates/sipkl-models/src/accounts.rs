//! Login accounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::schema::{CellText, accounts as col, marked, normalize_identifier, text_at};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// Anything other than `ADMIN` is a student, including the legacy `SISWA`.
    pub fn from_cell(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("ADMIN") {
            Self::Admin
        } else {
            Self::Student
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A department code, which is also the name of its profile sheet.
///
/// The `-` sentinel marks an account that belongs to no department; for an
/// admin it means access to every department.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Department(String);

impl Department {
    pub const ALL: &'static str = "-";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn all() -> Self {
        Self(Self::ALL.to_string())
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Department {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// One row of the accounts sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub identifier: String,
    pub password_hash: String,
    pub role: Role,
    pub department: Department,
    pub name: String,
    /// Current session token; empty when never logged in.
    pub token: String,
}

impl Account {
    pub fn from_row<C: CellText>(row: &[C]) -> Self {
        Self {
            identifier: normalize_identifier(&text_at(row, col::IDENTIFIER)),
            password_hash: text_at(row, col::PASSWORD_HASH),
            role: Role::from_cell(&text_at(row, col::ROLE)),
            department: Department::new(text_at(row, col::DEPARTMENT)),
            name: text_at(row, col::NAME),
            token: text_at(row, col::TOKEN),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            marked(&self.identifier),
            marked(&self.password_hash),
            self.role.as_str().to_string(),
            self.department.as_str().to_string(),
            marked(&self.name),
            marked(&self.token),
        ]
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            identifier: self.identifier.clone(),
            role: self.role,
            department: self.department.clone(),
            name: self.name.clone(),
        }
    }
}

/// The validated caller of an action, and the account listing entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub identifier: String,
    pub role: Role,
    pub department: Department,
    pub name: String,
}

impl AccountSummary {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin without a department, allowed to act on all of them.
    pub fn is_super_admin(&self) -> bool {
        self.is_admin() && self.department.is_all()
    }
}

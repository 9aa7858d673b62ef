//! User accounts and practitioner profiles.

use serde::{Deserialize, Serialize};

/// Role flag distinguishing the three kinds of users.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    Practitioner,
    Patient,
}

impl Role {
    /// Stable code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Practitioner => "NUTRI",
            Role::Patient => "PATIENT",
        }
    }

    /// Parse a stored role code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ADMIN" => Some(Role::Admin),
            "NUTRI" => Some(Role::Practitioner),
            "PATIENT" => Some(Role::Patient),
            _ => None,
        }
    }
}

/// A login account. Credentials live with the external auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Account UUID
    pub account_id: String,
    /// Unique login email (stored lowercased)
    pub email: String,
    /// Display name
    pub name: String,
    /// Role flag
    pub role: Role,
    /// Whether the account may log in
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl Account {
    /// Create a new active account.
    pub fn new(email: &str, name: String, role: Role) -> Self {
        Self {
            account_id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            name,
            role,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_practitioner(&self) -> bool {
        self.role == Role::Practitioner
    }
}

/// Professional details for a practitioner account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PractitionerProfile {
    /// Owning account ID (one profile per account)
    pub account_id: String,
    /// Professional registration number (CRN), unique
    pub registration: String,
    /// Street address
    pub address: String,
    /// Street number
    pub number: String,
    /// Address complement
    pub complement: Option<String>,
    /// City
    pub city: String,
    /// Two-letter state code (UF)
    pub state: String,
    /// Mobile phone
    pub phone: String,
}

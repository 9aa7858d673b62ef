//! Patient models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A patient record owned by a single practitioner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID - always present, generated locally
    pub local_id: String,
    /// Account ID of the practitioner who registered the patient
    pub practitioner_id: String,
    /// Login account for the patient portal, if one was created
    pub account_id: Option<String>,
    /// Full name
    pub name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Street address
    pub address: String,
    /// Street number
    pub address_number: String,
    /// Address complement (apartment, block, ...)
    pub complement: Option<String>,
    /// City
    pub city: String,
    /// Two-letter state code (UF)
    pub state: String,
    /// Postal code (CEP)
    pub postal_code: String,
    /// Mobile phone
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Why the patient is seeking care
    pub visit_reason: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    ///
    /// Contact and address fields start empty and are filled in by the
    /// registration workflow.
    pub fn new(practitioner_id: String, name: String, birth_date: NaiveDate) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            practitioner_id,
            account_id: None,
            name,
            birth_date,
            address: String::new(),
            address_number: String::new(),
            complement: None,
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            phone: String::new(),
            email: String::new(),
            visit_reason: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Age in whole years on the given day.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let birthday_pending =
            (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day());
        let years = today.year() - self.birth_date.year() - i32::from(birthday_pending);
        years.max(0) as u32
    }

    /// Age in whole years as of today (UTC).
    pub fn age(&self) -> u32 {
        self.age_on(chrono::Utc::now().date_naive())
    }
}

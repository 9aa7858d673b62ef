//! NutriApp Core Library
//!
//! Clinical records for nutrition practitioners: patients, questionnaires,
//! anthropometric visits, daily intake logs and visit-to-visit comparison.
//!
//! # Architecture
//!
//! ```text
//!  Practitioner workflow (mobile / desktop shell)
//!                  │
//!                  ▼
//!         NutriCore (FFI object, explicit patient_id)
//!                  │
//!     ┌────────────┼──────────────┬─────────────────┐
//!     │            │              │                 │
//!     ▼            ▼              ▼                 ▼
//!  Registration  Questionnaires  Visits          Intake submission
//!  (accounts,    (lifestyle,     (measurements)       │
//!   patients)     history, ...)       │           accumulate (pure)
//!     │            │                  │               │
//!     └────────────┴────────┬─────────┴───────────────┘
//!                           ▼
//!                    SQLite (rusqlite)
//!                           │
//!                           ▼
//!              Visit Comparison Engine (pure, read-only)
//!                           │
//!                           ▼
//!           per-field trends + weight trend report
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Visit, questionnaires, intake logs)
//! - [`comparison`]: Visit comparison engine and measurement catalog
//! - [`intake`]: Daily intake accumulation and per-day upsert
//! - [`config`]: Environment configuration and tracing setup

pub mod comparison;
pub mod config;
pub mod db;
pub mod intake;
pub mod models;

// Re-export commonly used types
pub use comparison::{
    compare_visits, ComparisonReport, ComparisonSpan, FieldTrend, MeasurementField, Polarity,
    TrendClass, VisitComparator, WeightTrend, DEFAULT_CATALOG,
};
pub use db::Database;
pub use intake::{IntakeLog, IntakeSubmission, SubmittedEntry};
pub use models::{
    Account, ClinicalHistory, DailyIntakeLog, FoodFrequency, IntakeEntry, LifestyleAssessment,
    MealSlot, Measurement, Medication, Patient, PractitionerProfile, Role, Visit,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use models::{Food, FoodFrequencyItem, Frequency, HistoryAnswer, Servings};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum NutriError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for NutriError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => NutriError::NotFound(what),
            db::DbError::Constraint(msg) => NutriError::InvalidInput(msg),
            other => NutriError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for NutriError {
    fn from(e: serde_json::Error) -> Self {
        NutriError::SerializationError(e.to_string())
    }
}

impl From<rust_decimal::Error> for NutriError {
    fn from(e: rust_decimal::Error) -> Self {
        NutriError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for NutriError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        NutriError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<NutriCore>, NutriError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(NutriCore::new(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<NutriCore>, NutriError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(NutriCore::new(db)))
}

/// Initialise logging and open the database named by `NUTRI_DB_PATH`.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<NutriCore>, NutriError> {
    let settings = config::CoreConfig::from_env();
    config::init_tracing(settings.log_filter.as_deref());
    let db = Database::open(&settings.database_path)?;
    Ok(Arc::new(NutriCore::new(db)))
}

/// Install the tracing subscriber. Returns `false` if one was already set.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    config::init_tracing(filter.as_deref())
}

/// Library version.
#[uniffi::export]
pub fn core_version() -> String {
    config::APP_VERSION.to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct NutriCore {
    db: Arc<Mutex<Database>>,
}

impl NutriCore {
    fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

#[uniffi::export]
impl NutriCore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Create a login account. `role` is one of `ADMIN`, `NUTRI`, `PATIENT`.
    pub fn create_account(
        &self,
        email: String,
        name: String,
        role: String,
    ) -> Result<FfiAccount, NutriError> {
        let role = Role::from_code(&role)
            .ok_or_else(|| NutriError::InvalidInput(format!("Unknown role: {role}")))?;
        let email = require_text("email", &email)?;

        let db = self.db.lock()?;
        let account = Account::new(&email, name, role);
        db.insert_account(&account)?;
        Ok(account.into())
    }

    /// Create a practitioner account and its professional profile.
    pub fn register_practitioner(
        &self,
        email: String,
        name: String,
        profile: FfiPractitionerProfile,
    ) -> Result<FfiAccount, NutriError> {
        let email = require_text("email", &email)?;
        require_text("registration", &profile.registration)?;
        if profile.state.trim().chars().count() != 2 {
            return Err(NutriError::InvalidInput(format!(
                "State must be a 2-letter code: {}",
                profile.state
            )));
        }

        let db = self.db.lock()?;
        let account = Account::new(&email, name, Role::Practitioner);
        let profile = profile.into_model(account.account_id.clone());
        db.register_practitioner(&account, &profile)?;
        Ok(account.into())
    }

    /// Get a practitioner's profile.
    pub fn get_practitioner_profile(
        &self,
        account_id: String,
    ) -> Result<Option<FfiPractitionerProfile>, NutriError> {
        let db = self.db.lock()?;
        let profile = db.get_practitioner_profile(&account_id)?;
        Ok(profile.map(|p| p.into()))
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient under a practitioner.
    pub fn create_patient(
        &self,
        practitioner_id: String,
        details: FfiPatientDetails,
    ) -> Result<FfiPatient, NutriError> {
        let name = require_text("name", &details.name)?;
        let birth_date = parse_date("birth_date", &details.birth_date)?;

        let db = self.db.lock()?;
        require_practitioner(&db, &practitioner_id)?;
        let mut patient = Patient::new(practitioner_id, name, birth_date);
        details.apply_to(&mut patient);
        db.insert_patient(&patient)?;
        Ok(patient.into())
    }

    /// Replace a patient's registration details.
    pub fn update_patient(
        &self,
        patient_id: String,
        details: FfiPatientDetails,
    ) -> Result<FfiPatient, NutriError> {
        let name = require_text("name", &details.name)?;
        let birth_date = parse_date("birth_date", &details.birth_date)?;

        let db = self.db.lock()?;
        let mut patient = require_patient(&db, &patient_id)?;
        patient.name = name;
        patient.birth_date = birth_date;
        details.apply_to(&mut patient);
        db.update_patient(&patient)?;
        Ok(patient.into())
    }

    /// Get a patient by local ID.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, NutriError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List a practitioner's patients by name.
    pub fn list_patients_for_practitioner(
        &self,
        practitioner_id: String,
    ) -> Result<Vec<FfiPatient>, NutriError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_for_practitioner(&practitioner_id)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Search a practitioner's patients by name, tolerating typos.
    pub fn search_patients(
        &self,
        practitioner_id: String,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatient>, NutriError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&practitioner_id, &query, limit as usize)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Delete a patient and all of their records.
    pub fn delete_patient(&self, patient_id: String) -> Result<bool, NutriError> {
        let db = self.db.lock()?;
        Ok(db.delete_patient(&patient_id)?)
    }

    // =========================================================================
    // Questionnaire Operations
    // =========================================================================

    /// Save (or replace) the patient's lifestyle assessment.
    pub fn save_lifestyle(&self, lifestyle: FfiLifestyle) -> Result<(), NutriError> {
        let db = self.db.lock()?;
        require_patient(&db, &lifestyle.patient_id)?;
        db.upsert_lifestyle(&lifestyle.into())?;
        Ok(())
    }

    /// Get the patient's lifestyle assessment.
    pub fn get_lifestyle(&self, patient_id: String) -> Result<Option<FfiLifestyle>, NutriError> {
        let db = self.db.lock()?;
        let lifestyle = db.get_lifestyle(&patient_id)?;
        Ok(lifestyle.map(|l| l.into()))
    }

    /// Save (or replace) the patient's clinical history.
    ///
    /// Answers are `yes`, `no` or `family`.
    pub fn save_clinical_history(&self, history: FfiClinicalHistory) -> Result<(), NutriError> {
        let history = ClinicalHistory::try_from(history)?;
        let db = self.db.lock()?;
        require_patient(&db, &history.patient_id)?;
        db.upsert_clinical_history(&history)?;
        Ok(())
    }

    /// Get the patient's clinical history.
    pub fn get_clinical_history(
        &self,
        patient_id: String,
    ) -> Result<Option<FfiClinicalHistory>, NutriError> {
        let db = self.db.lock()?;
        let history = db.get_clinical_history(&patient_id)?;
        Ok(history.map(|h| h.into()))
    }

    /// Record a medication the patient takes.
    pub fn add_medication(
        &self,
        patient_id: String,
        name: String,
        dose: String,
        times_per_day: String,
    ) -> Result<FfiMedication, NutriError> {
        let name = require_text("name", &name)?;

        let db = self.db.lock()?;
        require_patient(&db, &patient_id)?;
        let mut medication = Medication::new(patient_id, name, dose, times_per_day);
        medication.id = db.insert_medication(&medication)?;
        Ok(medication.into())
    }

    /// List the patient's medications.
    pub fn list_medications(&self, patient_id: String) -> Result<Vec<FfiMedication>, NutriError> {
        let db = self.db.lock()?;
        let medications = db.list_medications(&patient_id)?;
        Ok(medications.into_iter().map(|m| m.into()).collect())
    }

    /// Save (or replace) the food-frequency questionnaire for a day.
    ///
    /// Returns the stored questionnaire, with unanswered foods dropped.
    pub fn save_food_frequency(
        &self,
        patient_id: String,
        recorded_on: String,
        answers: Vec<FfiFoodAnswer>,
    ) -> Result<FfiFoodFrequency, NutriError> {
        let recorded_on = parse_date("recorded_on", &recorded_on)?;
        let answers = answers
            .into_iter()
            .map(FoodFrequencyItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let db = self.db.lock()?;
        require_patient(&db, &patient_id)?;
        let frequency = FoodFrequency::from_answers(patient_id, recorded_on, &answers);
        db.upsert_food_frequency(&frequency)?;
        FfiFoodFrequency::try_from(frequency)
    }

    /// Get the food-frequency questionnaire recorded on a day.
    pub fn get_food_frequency(
        &self,
        patient_id: String,
        recorded_on: String,
    ) -> Result<Option<FfiFoodFrequency>, NutriError> {
        let recorded_on = parse_date("recorded_on", &recorded_on)?;
        let db = self.db.lock()?;
        db.get_food_frequency(&patient_id, recorded_on)?
            .map(FfiFoodFrequency::try_from)
            .transpose()
    }

    // =========================================================================
    // Visit Operations
    // =========================================================================

    /// Record a visit. Measurements are decimal strings (`,` or `.`);
    /// blank means not measured. The returned visit carries its new ID.
    pub fn record_visit(&self, visit: FfiVisit) -> Result<FfiVisit, NutriError> {
        let mut visit = Visit::try_from(visit)?;

        let db = self.db.lock()?;
        let patient = require_patient(&db, &visit.patient_id)?;
        if visit.practitioner_id != patient.practitioner_id {
            return Err(NutriError::InvalidInput(format!(
                "Practitioner {} does not attend patient {}",
                visit.practitioner_id, patient.local_id
            )));
        }
        visit.id = db.insert_visit(&visit)?;
        Ok(visit.into())
    }

    /// List a patient's visits, oldest first.
    pub fn list_visits(&self, patient_id: String) -> Result<Vec<FfiVisit>, NutriError> {
        let db = self.db.lock()?;
        let visits = db.list_visits_for_patient(&patient_id)?;
        Ok(visits.into_iter().map(|v| v.into()).collect())
    }

    // =========================================================================
    // Comparison Operations
    // =========================================================================

    /// Compare the patient's visits.
    pub fn compare_visits(
        &self,
        patient_id: String,
        span: FfiComparisonSpan,
    ) -> Result<FfiComparisonReport, NutriError> {
        Ok(self.comparison_report(&patient_id, span.into())?.into())
    }

    /// Comparison report serialized as JSON.
    pub fn comparison_report_json(
        &self,
        patient_id: String,
        span: FfiComparisonSpan,
    ) -> Result<String, NutriError> {
        let report = self.comparison_report(&patient_id, span.into())?;
        Ok(report.to_json()?)
    }

    // =========================================================================
    // Daily Intake Operations
    // =========================================================================

    /// Save the day's intake, replacing anything saved for that day.
    pub fn save_daily_intake(
        &self,
        patient_id: String,
        log_date: String,
        entries: Vec<FfiSubmittedEntry>,
    ) -> Result<FfiDailyIntake, NutriError> {
        let log_date = parse_date("log_date", &log_date)?;
        let mut submission = IntakeSubmission::new();
        for entry in entries {
            let meal = MealSlot::from_code(&entry.meal)
                .ok_or_else(|| NutriError::InvalidInput(format!("Unknown meal: {}", entry.meal)))?;
            submission.push(meal, entry.into());
        }

        let db = self.db.lock()?;
        require_patient(&db, &patient_id)?;
        let log = IntakeLog::new(&db).save_day(&patient_id, log_date, &submission)?;
        Ok(log.into())
    }

    /// Get the intake log for a day.
    pub fn get_daily_intake(
        &self,
        patient_id: String,
        log_date: String,
    ) -> Result<Option<FfiDailyIntake>, NutriError> {
        let log_date = parse_date("log_date", &log_date)?;
        let db = self.db.lock()?;
        let log = IntakeLog::new(&db).day(&patient_id, log_date)?;
        Ok(log.map(|l| l.into()))
    }

    /// All intake logs for a patient, most recent first.
    pub fn list_daily_intake(&self, patient_id: String) -> Result<Vec<FfiDailyIntake>, NutriError> {
        let db = self.db.lock()?;
        let logs = IntakeLog::new(&db).history(&patient_id)?;
        Ok(logs.into_iter().map(|l| l.into()).collect())
    }
}

impl NutriCore {
    fn comparison_report(
        &self,
        patient_id: &str,
        span: ComparisonSpan,
    ) -> Result<ComparisonReport, NutriError> {
        let visits = {
            let db = self.db.lock()?;
            require_patient(&db, patient_id)?;
            db.list_visits_for_patient(patient_id)?
        };
        Ok(VisitComparator::new().compare_span(&visits, span))
    }
}

// =========================================================================
// Input Helpers
// =========================================================================

fn require_patient(db: &Database, patient_id: &str) -> Result<Patient, NutriError> {
    db.get_patient(patient_id)?
        .ok_or_else(|| NutriError::NotFound(format!("patient {patient_id}")))
}

fn require_practitioner(db: &Database, account_id: &str) -> Result<Account, NutriError> {
    let account = db
        .get_account(account_id)?
        .ok_or_else(|| NutriError::NotFound(format!("practitioner {account_id}")))?;
    if !account.is_practitioner() {
        return Err(NutriError::InvalidInput(format!(
            "Account {account_id} is not a practitioner"
        )));
    }
    Ok(account)
}

fn require_text(field: &str, value: &str) -> Result<String, NutriError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NutriError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, NutriError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| NutriError::InvalidInput(format!("{field}: {e} ({raw})")))
}

/// Largest accepted value for any measurement (kg, cm or mm).
const MAX_MEASUREMENT: Decimal = Decimal::ONE_THOUSAND;

/// Blank is "not measured"; anything else must be a decimal in
/// `0..=MAX_MEASUREMENT`.
fn parse_measurement(measurement: Measurement, raw: Option<&str>) -> Result<Option<Decimal>, NutriError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    let value = Decimal::from_str(&raw.replace(',', "."))
        .map_err(|e| NutriError::InvalidInput(format!("{}: {e} ({raw})", measurement.column())))?;
    if value < Decimal::ZERO || value > MAX_MEASUREMENT {
        return Err(NutriError::InvalidInput(format!(
            "{}: out of range ({raw})",
            measurement.column()
        )));
    }
    Ok(Some(value))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Wire name of a serde unit variant.
fn wire_key<T: Serialize>(value: &T) -> Result<String, NutriError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(key) => Ok(key),
        other => Err(NutriError::SerializationError(format!(
            "Expected a string key, got {other}"
        ))),
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe account.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAccount {
    pub account_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub active: bool,
}

impl From<Account> for FfiAccount {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            email: account.email,
            name: account.name,
            role: account.role.code().to_string(),
            active: account.active,
        }
    }
}

/// FFI-safe practitioner profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPractitionerProfile {
    pub registration: String,
    pub address: String,
    pub number: String,
    pub complement: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
}

impl FfiPractitionerProfile {
    fn into_model(self, account_id: String) -> PractitionerProfile {
        PractitionerProfile {
            account_id,
            registration: self.registration.trim().to_string(),
            address: self.address,
            number: self.number,
            complement: non_blank(self.complement),
            city: self.city,
            state: self.state.trim().to_string(),
            phone: self.phone,
        }
    }
}

impl From<PractitionerProfile> for FfiPractitionerProfile {
    fn from(profile: PractitionerProfile) -> Self {
        Self {
            registration: profile.registration,
            address: profile.address,
            number: profile.number,
            complement: profile.complement,
            city: profile.city,
            state: profile.state,
            phone: profile.phone,
        }
    }
}

/// Editable patient registration fields. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientDetails {
    pub name: String,
    pub birth_date: String,
    pub address: String,
    pub address_number: String,
    pub complement: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub visit_reason: String,
}

impl FfiPatientDetails {
    /// Copy the free-form fields; name and birth date are validated by the caller.
    fn apply_to(self, patient: &mut Patient) {
        patient.address = self.address;
        patient.address_number = self.address_number;
        patient.complement = non_blank(self.complement);
        patient.city = self.city;
        patient.state = self.state.trim().to_uppercase();
        patient.postal_code = self.postal_code;
        patient.phone = self.phone;
        patient.email = self.email.trim().to_lowercase();
        patient.visit_reason = self.visit_reason;
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub local_id: String,
    pub practitioner_id: String,
    pub account_id: Option<String>,
    pub name: String,
    pub birth_date: String,
    pub age: u32,
    pub address: String,
    pub address_number: String,
    pub complement: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub visit_reason: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            age: patient.age(),
            birth_date: patient.birth_date.to_string(),
            local_id: patient.local_id,
            practitioner_id: patient.practitioner_id,
            account_id: patient.account_id,
            name: patient.name,
            address: patient.address,
            address_number: patient.address_number,
            complement: patient.complement,
            city: patient.city,
            state: patient.state,
            postal_code: patient.postal_code,
            phone: patient.phone,
            email: patient.email,
            visit_reason: patient.visit_reason,
        }
    }
}

/// FFI-safe lifestyle assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLifestyle {
    pub patient_id: String,
    pub occupation: String,
    pub lives_alone: bool,
    pub smokes: bool,
    pub drinks_alcohol: bool,
    pub physically_active: bool,
    pub activity_type: Option<String>,
    pub activity_frequency: Option<String>,
    pub activity_time: Option<String>,
    pub meal_location: String,
    pub eats_alone: bool,
    pub who_cooks: String,
    pub hungriest_time: String,
    pub who_shops: String,
    pub sleep_hours: f64,
    pub has_food_aversions: bool,
    pub food_preferences: String,
}

impl From<FfiLifestyle> for LifestyleAssessment {
    fn from(l: FfiLifestyle) -> Self {
        LifestyleAssessment {
            patient_id: l.patient_id,
            occupation: l.occupation,
            lives_alone: l.lives_alone,
            smokes: l.smokes,
            drinks_alcohol: l.drinks_alcohol,
            physically_active: l.physically_active,
            activity_type: non_blank(l.activity_type),
            activity_frequency: non_blank(l.activity_frequency),
            activity_time: non_blank(l.activity_time),
            meal_location: l.meal_location,
            eats_alone: l.eats_alone,
            who_cooks: l.who_cooks,
            hungriest_time: l.hungriest_time,
            who_shops: l.who_shops,
            sleep_hours: l.sleep_hours,
            has_food_aversions: l.has_food_aversions,
            food_preferences: l.food_preferences,
        }
    }
}

impl From<LifestyleAssessment> for FfiLifestyle {
    fn from(l: LifestyleAssessment) -> Self {
        Self {
            patient_id: l.patient_id,
            occupation: l.occupation,
            lives_alone: l.lives_alone,
            smokes: l.smokes,
            drinks_alcohol: l.drinks_alcohol,
            physically_active: l.physically_active,
            activity_type: l.activity_type,
            activity_frequency: l.activity_frequency,
            activity_time: l.activity_time,
            meal_location: l.meal_location,
            eats_alone: l.eats_alone,
            who_cooks: l.who_cooks,
            hungriest_time: l.hungriest_time,
            who_shops: l.who_shops,
            sleep_hours: l.sleep_hours,
            has_food_aversions: l.has_food_aversions,
            food_preferences: l.food_preferences,
        }
    }
}

/// FFI-safe clinical history. Answers are `yes`, `no` or `family`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicalHistory {
    pub patient_id: String,
    pub surgeries: String,
    pub hypertension: String,
    pub diabetes: String,
    pub cardiovascular: String,
    pub hypercholesterolemia: String,
    pub cancer: String,
    pub anemia: String,
    pub hypothyroidism: String,
}

impl TryFrom<FfiClinicalHistory> for ClinicalHistory {
    type Error = NutriError;

    fn try_from(h: FfiClinicalHistory) -> Result<Self, Self::Error> {
        let answer = |field: &str, code: &str| {
            HistoryAnswer::from_code(code)
                .ok_or_else(|| NutriError::InvalidInput(format!("{field}: unknown answer {code}")))
        };

        Ok(ClinicalHistory {
            surgeries: answer("surgeries", &h.surgeries)?,
            hypertension: answer("hypertension", &h.hypertension)?,
            diabetes: answer("diabetes", &h.diabetes)?,
            cardiovascular: answer("cardiovascular", &h.cardiovascular)?,
            hypercholesterolemia: answer("hypercholesterolemia", &h.hypercholesterolemia)?,
            cancer: answer("cancer", &h.cancer)?,
            anemia: answer("anemia", &h.anemia)?,
            hypothyroidism: answer("hypothyroidism", &h.hypothyroidism)?,
            patient_id: h.patient_id,
        })
    }
}

impl From<ClinicalHistory> for FfiClinicalHistory {
    fn from(h: ClinicalHistory) -> Self {
        Self {
            patient_id: h.patient_id,
            surgeries: h.surgeries.code().to_string(),
            hypertension: h.hypertension.code().to_string(),
            diabetes: h.diabetes.code().to_string(),
            cardiovascular: h.cardiovascular.code().to_string(),
            hypercholesterolemia: h.hypercholesterolemia.code().to_string(),
            cancer: h.cancer.code().to_string(),
            anemia: h.anemia.code().to_string(),
            hypothyroidism: h.hypothyroidism.code().to_string(),
        }
    }
}

/// FFI-safe medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: i64,
    pub patient_id: String,
    pub name: String,
    pub dose: String,
    pub times_per_day: String,
}

impl From<Medication> for FfiMedication {
    fn from(m: Medication) -> Self {
        Self {
            id: m.id,
            patient_id: m.patient_id,
            name: m.name,
            dose: m.dose,
            times_per_day: m.times_per_day,
        }
    }
}

/// One food-frequency answer, keyed by food (e.g. `rice`, `soft_drinks`).
///
/// Frequency is one of `daily`, `weekly`, `monthly`, `occasionally`,
/// `never`; servings one of `1`..`5`, `+5`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFoodAnswer {
    pub food: String,
    pub frequency: Option<String>,
    pub servings: Option<String>,
}

impl TryFrom<FfiFoodAnswer> for FoodFrequencyItem {
    type Error = NutriError;

    fn try_from(answer: FfiFoodAnswer) -> Result<Self, Self::Error> {
        let food = Food::from_key(&answer.food)
            .ok_or_else(|| NutriError::InvalidInput(format!("Unknown food: {}", answer.food)))?;
        let frequency = non_blank(answer.frequency)
            .map(|f| {
                Frequency::from_key(&f)
                    .ok_or_else(|| NutriError::InvalidInput(format!("Unknown frequency: {f}")))
            })
            .transpose()?;
        let servings = non_blank(answer.servings)
            .map(|s| {
                Servings::from_key(&s)
                    .ok_or_else(|| NutriError::InvalidInput(format!("Unknown servings: {s}")))
            })
            .transpose()?;

        Ok(FoodFrequencyItem {
            food,
            frequency,
            servings,
        })
    }
}

/// FFI-safe food-frequency questionnaire.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFoodFrequency {
    pub patient_id: String,
    pub recorded_on: String,
    pub items: Vec<FfiFoodAnswer>,
}

impl TryFrom<FoodFrequency> for FfiFoodFrequency {
    type Error = NutriError;

    fn try_from(frequency: FoodFrequency) -> Result<Self, Self::Error> {
        let items = frequency
            .items
            .iter()
            .map(|item| {
                Ok(FfiFoodAnswer {
                    food: wire_key(&item.food)?,
                    frequency: item.frequency.as_ref().map(wire_key).transpose()?,
                    servings: item.servings.as_ref().map(wire_key).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, NutriError>>()?;

        Ok(Self {
            patient_id: frequency.patient_id,
            recorded_on: frequency.recorded_on.to_string(),
            items,
        })
    }
}

/// FFI-safe visit. Measurements are decimal strings; `None` means not measured.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiVisit {
    /// Assigned on insert; ignored by `record_visit`
    pub id: i64,
    pub patient_id: String,
    pub practitioner_id: String,
    pub visit_date: String,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub wrist: Option<String>,
    pub waist: Option<String>,
    pub hip: Option<String>,
    pub arm: Option<String>,
    pub abdomen: Option<String>,
    pub thigh: Option<String>,
    pub triceps_skinfold: Option<String>,
    pub subscapular_skinfold: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<FfiVisit> for Visit {
    type Error = NutriError;

    fn try_from(v: FfiVisit) -> Result<Self, Self::Error> {
        let visit_date = parse_date("visit_date", &v.visit_date)?;
        let raw = [
            v.weight,
            v.height,
            v.wrist,
            v.waist,
            v.hip,
            v.arm,
            v.abdomen,
            v.thigh,
            v.triceps_skinfold,
            v.subscapular_skinfold,
        ];

        let mut visit = Visit::new(v.patient_id, v.practitioner_id, visit_date);
        visit.id = v.id;
        visit.notes = non_blank(v.notes);
        for (measurement, text) in Measurement::ALL.into_iter().zip(raw) {
            visit.set(measurement, parse_measurement(measurement, text.as_deref())?);
        }
        Ok(visit)
    }
}

impl From<Visit> for FfiVisit {
    fn from(visit: Visit) -> Self {
        let [weight, height, wrist, waist, hip, arm, abdomen, thigh, triceps_skinfold, subscapular_skinfold] =
            Measurement::ALL.map(|m| visit.get(m).map(|d| d.to_string()));

        Self {
            id: visit.id,
            patient_id: visit.patient_id,
            practitioner_id: visit.practitioner_id,
            visit_date: visit.visit_date.to_string(),
            weight,
            height,
            wrist,
            waist,
            hip,
            arm,
            abdomen,
            thigh,
            triceps_skinfold,
            subscapular_skinfold,
            notes: visit.notes,
        }
    }
}

/// Which pair of visits per-field trends compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiComparisonSpan {
    /// Latest visit vs the one before it
    Recent,
    /// Latest visit vs the first one
    SinceFirst,
}

impl From<FfiComparisonSpan> for ComparisonSpan {
    fn from(span: FfiComparisonSpan) -> Self {
        match span {
            FfiComparisonSpan::Recent => ComparisonSpan::Recent,
            FfiComparisonSpan::SinceFirst => ComparisonSpan::SinceFirst,
        }
    }
}

/// FFI-safe per-field trend.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldTrend {
    pub measurement: String,
    pub label: String,
    pub previous: Option<String>,
    pub latest: Option<String>,
    pub delta: Option<String>,
    pub message: String,
    pub classification: String,
}

impl From<FieldTrend> for FfiFieldTrend {
    fn from(trend: FieldTrend) -> Self {
        Self {
            measurement: trend.measurement.column().to_string(),
            label: trend.label,
            previous: trend.previous.map(|d| d.to_string()),
            latest: trend.latest.map(|d| d.to_string()),
            delta: trend.delta.map(|d| d.to_string()),
            message: trend.message,
            classification: trend.class.as_str().to_string(),
        }
    }
}

/// FFI-safe weight trend.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWeightTrend {
    pub first: Option<String>,
    pub last: Option<String>,
    pub delta: Option<String>,
    pub message: String,
    pub classification: String,
}

impl From<WeightTrend> for FfiWeightTrend {
    fn from(trend: WeightTrend) -> Self {
        Self {
            first: trend.first.map(|d| d.to_string()),
            last: trend.last.map(|d| d.to_string()),
            delta: trend.delta.map(|d| d.to_string()),
            message: trend.message,
            classification: trend.class.as_str().to_string(),
        }
    }
}

/// FFI-safe comparison report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiComparisonReport {
    pub visit_count: u32,
    pub first_visit_date: Option<String>,
    pub previous_visit_date: Option<String>,
    pub latest_visit_date: Option<String>,
    pub per_field: Vec<FfiFieldTrend>,
    pub weight_trend: FfiWeightTrend,
}

impl From<ComparisonReport> for FfiComparisonReport {
    fn from(report: ComparisonReport) -> Self {
        Self {
            visit_count: report.visit_count as u32,
            first_visit_date: report.first_visit_date.map(|d| d.to_string()),
            previous_visit_date: report.previous_visit_date.map(|d| d.to_string()),
            latest_visit_date: report.latest_visit_date.map(|d| d.to_string()),
            per_field: report.per_field.into_iter().map(|f| f.into()).collect(),
            weight_trend: report.weight_trend.into(),
        }
    }
}

/// One submitted meal line. `meal` is a slot code (`CM`, `LM`, `AL`, `LT`,
/// `JA`, `LN`); the remaining fields are raw user input.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiSubmittedEntry {
    pub meal: String,
    pub time: Option<String>,
    pub description: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl From<FfiSubmittedEntry> for SubmittedEntry {
    fn from(entry: FfiSubmittedEntry) -> Self {
        SubmittedEntry {
            time: entry.time,
            description: entry.description,
            quantity: entry.quantity,
            unit: entry.unit,
        }
    }
}

/// FFI-safe stored intake entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIntakeEntry {
    pub meal: String,
    pub meal_label: String,
    pub time: Option<String>,
    pub description: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl From<IntakeEntry> for FfiIntakeEntry {
    fn from(entry: IntakeEntry) -> Self {
        Self {
            meal: entry.meal.code().to_string(),
            meal_label: entry.meal.label().to_string(),
            time: entry.time.map(|t: NaiveTime| t.format("%H:%M").to_string()),
            description: entry.description,
            quantity: entry.quantity.map(|q| q.to_string()),
            unit: entry.unit,
        }
    }
}

/// FFI-safe daily intake log.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDailyIntake {
    pub patient_id: String,
    pub log_date: String,
    pub recorded_at: String,
    pub entries: Vec<FfiIntakeEntry>,
}

impl From<DailyIntakeLog> for FfiDailyIntake {
    fn from(log: DailyIntakeLog) -> Self {
        Self {
            patient_id: log.patient_id,
            log_date: log.log_date.to_string(),
            recorded_at: log.recorded_at,
            entries: log.entries.into_iter().map(|e| e.into()).collect(),
        }
    }
}

//! SQLite schema definition.

/// Complete database schema for nutri-core.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS accounts (
    account_id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('ADMIN', 'NUTRI', 'PATIENT')),
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS practitioner_profiles (
    account_id TEXT PRIMARY KEY REFERENCES accounts(account_id) ON DELETE CASCADE,
    registration TEXT NOT NULL UNIQUE,           -- CRN
    address TEXT NOT NULL,
    number TEXT NOT NULL,
    complement TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    phone TEXT NOT NULL
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    local_id TEXT PRIMARY KEY,
    practitioner_id TEXT NOT NULL REFERENCES accounts(account_id),
    account_id TEXT REFERENCES accounts(account_id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    birth_date TEXT NOT NULL,                    -- YYYY-MM-DD
    address TEXT NOT NULL DEFAULT '',
    address_number TEXT NOT NULL DEFAULT '',
    complement TEXT,
    city TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT '',
    postal_code TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    visit_reason TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_practitioner ON patients(practitioner_id);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Questionnaires
-- ============================================================================

CREATE TABLE IF NOT EXISTS lifestyle_assessments (
    patient_id TEXT PRIMARY KEY REFERENCES patients(local_id) ON DELETE CASCADE,
    occupation TEXT NOT NULL,
    lives_alone INTEGER NOT NULL,
    smokes INTEGER NOT NULL,
    drinks_alcohol INTEGER NOT NULL,
    physically_active INTEGER NOT NULL,
    activity_type TEXT,
    activity_frequency TEXT,
    activity_time TEXT,
    meal_location TEXT NOT NULL,
    eats_alone INTEGER NOT NULL,
    who_cooks TEXT NOT NULL,
    hungriest_time TEXT NOT NULL,
    who_shops TEXT NOT NULL,
    sleep_hours REAL NOT NULL,
    has_food_aversions INTEGER NOT NULL,
    food_preferences TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS clinical_histories (
    patient_id TEXT PRIMARY KEY REFERENCES patients(local_id) ON DELETE CASCADE,
    surgeries TEXT NOT NULL CHECK (surgeries IN ('yes', 'no', 'family')),
    hypertension TEXT NOT NULL CHECK (hypertension IN ('yes', 'no', 'family')),
    diabetes TEXT NOT NULL CHECK (diabetes IN ('yes', 'no', 'family')),
    cardiovascular TEXT NOT NULL CHECK (cardiovascular IN ('yes', 'no', 'family')),
    hypercholesterolemia TEXT NOT NULL CHECK (hypercholesterolemia IN ('yes', 'no', 'family')),
    cancer TEXT NOT NULL CHECK (cancer IN ('yes', 'no', 'family')),
    anemia TEXT NOT NULL CHECK (anemia IN ('yes', 'no', 'family')),
    hypothyroidism TEXT NOT NULL CHECK (hypothyroidism IN ('yes', 'no', 'family')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    dose TEXT NOT NULL,
    times_per_day TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_medications_patient ON medications(patient_id);

-- One questionnaire per patient per day; re-saving replaces it
CREATE TABLE IF NOT EXISTS food_frequencies (
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    recorded_on TEXT NOT NULL,                   -- YYYY-MM-DD
    items TEXT NOT NULL DEFAULT '[]',            -- JSON array of FoodFrequencyItem
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (patient_id, recorded_on)
);

-- ============================================================================
-- Visits (anthropometry)
-- ============================================================================

-- Measurements are stored as TEXT decimals to keep exact 2-place precision.
-- id is the insertion-order tiebreaker for visits on the same date.
CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    practitioner_id TEXT NOT NULL REFERENCES accounts(account_id),
    visit_date TEXT NOT NULL,                    -- YYYY-MM-DD
    weight TEXT,
    height TEXT,
    wrist TEXT,
    waist TEXT,
    hip TEXT,
    arm TEXT,
    abdomen TEXT,
    thigh TEXT,
    triceps_skinfold TEXT,
    subscapular_skinfold TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_visits_patient_date ON visits(patient_id, visit_date, id);

-- ============================================================================
-- Daily intake logs
-- ============================================================================

CREATE TABLE IF NOT EXISTS daily_intake_logs (
    patient_id TEXT NOT NULL REFERENCES patients(local_id) ON DELETE CASCADE,
    log_date TEXT NOT NULL,                      -- YYYY-MM-DD
    recorded_at TEXT NOT NULL,
    entries TEXT NOT NULL DEFAULT '[]',          -- JSON array of IntakeEntry
    PRIMARY KEY (patient_id, log_date)
);
"#;

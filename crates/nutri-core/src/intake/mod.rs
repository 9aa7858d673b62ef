//! Daily food-intake log.
//!
//! Pipeline: Submission → Accumulate (pure) → Upsert by (patient, date)

mod accumulator;

pub use accumulator::*;

use chrono::NaiveDate;

use crate::db::{Database, DbResult};
use crate::models::DailyIntakeLog;

/// Saves and loads per-day intake logs.
pub struct IntakeLog<'a> {
    db: &'a Database,
}

impl<'a> IntakeLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Replace the patient's log for `date` with the given submission.
    pub fn save_day(
        &self,
        patient_id: &str,
        date: NaiveDate,
        submission: &IntakeSubmission,
    ) -> DbResult<DailyIntakeLog> {
        let entries = accumulate(submission);
        let log = DailyIntakeLog::new(patient_id.to_string(), date, entries);
        self.db.upsert_daily_log(&log)?;

        tracing::info!(
            patient_id = %patient_id,
            date = %date,
            entries = log.entries.len(),
            "Saved daily intake log"
        );
        Ok(log)
    }

    /// Log for a given day, if one was saved.
    pub fn day(&self, patient_id: &str, date: NaiveDate) -> DbResult<Option<DailyIntakeLog>> {
        self.db.get_daily_log(patient_id, date)
    }

    /// All logs for a patient, most recent first.
    pub fn history(&self, patient_id: &str) -> DbResult<Vec<DailyIntakeLog>> {
        self.db.list_daily_logs(patient_id)
    }
}

//! Daily intake log database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{DailyIntakeLog, IntakeEntry};

impl Database {
    /// Insert the day's log, replacing any log already saved for that
    /// patient and date.
    pub fn upsert_daily_log(&self, log: &DailyIntakeLog) -> DbResult<()> {
        let entries = serde_json::to_string(&log.entries)?;
        self.conn.execute(
            r#"
            INSERT INTO daily_intake_logs (patient_id, log_date, recorded_at, entries)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(patient_id, log_date) DO UPDATE SET
                recorded_at = excluded.recorded_at,
                entries = excluded.entries
            "#,
            params![log.patient_id, log.log_date, log.recorded_at, entries],
        )?;
        Ok(())
    }

    /// Get the log for one day.
    pub fn get_daily_log(
        &self,
        patient_id: &str,
        log_date: NaiveDate,
    ) -> DbResult<Option<DailyIntakeLog>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, log_date, recorded_at, entries
                FROM daily_intake_logs
                WHERE patient_id = ?1 AND log_date = ?2
                "#,
                params![patient_id, log_date],
                DailyLogRow::from_row,
            )
            .optional()?
            .map(DailyIntakeLog::try_from)
            .transpose()
    }

    /// All logs for a patient, most recent day first.
    pub fn list_daily_logs(&self, patient_id: &str) -> DbResult<Vec<DailyIntakeLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT patient_id, log_date, recorded_at, entries
            FROM daily_intake_logs
            WHERE patient_id = ?
            ORDER BY log_date DESC
            "#,
        )?;
        let rows = stmt.query_map([patient_id], DailyLogRow::from_row)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.try_into()?);
        }
        Ok(logs)
    }
}

/// Intermediate row struct for database mapping.
struct DailyLogRow {
    patient_id: String,
    log_date: NaiveDate,
    recorded_at: String,
    entries: String,
}

impl DailyLogRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            patient_id: row.get(0)?,
            log_date: row.get(1)?,
            recorded_at: row.get(2)?,
            entries: row.get(3)?,
        })
    }
}

impl TryFrom<DailyLogRow> for DailyIntakeLog {
    type Error = DbError;

    fn try_from(row: DailyLogRow) -> Result<Self, Self::Error> {
        let entries: Vec<IntakeEntry> = serde_json::from_str(&row.entries)?;
        Ok(DailyIntakeLog {
            patient_id: row.patient_id,
            log_date: row.log_date,
            recorded_at: row.recorded_at,
            entries,
        })
    }
}

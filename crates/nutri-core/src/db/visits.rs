//! Visit database operations.
//!
//! Measurements are persisted as TEXT decimals and parsed back on read, so
//! a stored `85.10` comes back as exactly `85.10`.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{Database, DbError, DbResult};
use crate::models::{Measurement, Visit};

const VISIT_COLUMNS: &str = r#"
    id, patient_id, practitioner_id, visit_date,
    weight, height, wrist, waist, hip, arm, abdomen, thigh,
    triceps_skinfold, subscapular_skinfold, notes
"#;

impl Database {
    /// Insert a visit. Returns the new row ID; `visit.id` is ignored.
    pub fn insert_visit(&self, visit: &Visit) -> DbResult<i64> {
        let [weight, height, wrist, waist, hip, arm, abdomen, thigh, triceps, subscapular] =
            measurement_texts(visit);

        self.conn.execute(
            r#"
            INSERT INTO visits (
                patient_id, practitioner_id, visit_date,
                weight, height, wrist, waist, hip, arm, abdomen, thigh,
                triceps_skinfold, subscapular_skinfold, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                visit.patient_id,
                visit.practitioner_id,
                visit.visit_date,
                weight,
                height,
                wrist,
                waist,
                hip,
                arm,
                abdomen,
                thigh,
                triceps,
                subscapular,
                visit.notes,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        tracing::info!(
            visit_id = id,
            patient_id = %visit.patient_id,
            date = %visit.visit_date,
            measurements = visit.recorded_count(),
            "Recorded visit"
        );
        Ok(id)
    }

    /// Replace a stored visit's date, measurements and notes.
    pub fn update_visit(&self, visit: &Visit) -> DbResult<bool> {
        let [weight, height, wrist, waist, hip, arm, abdomen, thigh, triceps, subscapular] =
            measurement_texts(visit);

        let rows_affected = self.conn.execute(
            r#"
            UPDATE visits SET
                visit_date = ?2,
                weight = ?3,
                height = ?4,
                wrist = ?5,
                waist = ?6,
                hip = ?7,
                arm = ?8,
                abdomen = ?9,
                thigh = ?10,
                triceps_skinfold = ?11,
                subscapular_skinfold = ?12,
                notes = ?13
            WHERE id = ?1
            "#,
            params![
                visit.id,
                visit.visit_date,
                weight,
                height,
                wrist,
                waist,
                hip,
                arm,
                abdomen,
                thigh,
                triceps,
                subscapular,
                visit.notes,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a visit by ID.
    pub fn get_visit(&self, id: i64) -> DbResult<Option<Visit>> {
        let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE id = ?");
        self.conn
            .query_row(&sql, [id], VisitRow::from_row)
            .optional()?
            .map(Visit::try_from)
            .transpose()
    }

    /// All visits of one patient, oldest first (date, then insertion order).
    pub fn list_visits_for_patient(&self, patient_id: &str) -> DbResult<Vec<Visit>> {
        let sql = format!(
            "SELECT {VISIT_COLUMNS} FROM visits WHERE patient_id = ? ORDER BY visit_date, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([patient_id], VisitRow::from_row)?;

        let mut visits = Vec::new();
        for row in rows {
            visits.push(row?.try_into()?);
        }
        Ok(visits)
    }

    /// Delete a visit.
    pub fn delete_visit(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM visits WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Measurements as stored text, in [`Measurement::ALL`] order.
fn measurement_texts(visit: &Visit) -> [Option<String>; 10] {
    Measurement::ALL.map(|m| visit.get(m).map(|v| v.round_dp(2).to_string()))
}

/// Intermediate row struct for database mapping.
struct VisitRow {
    id: i64,
    patient_id: String,
    practitioner_id: String,
    visit_date: NaiveDate,
    measurements: [Option<String>; 10],
    notes: Option<String>,
}

impl VisitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            practitioner_id: row.get(2)?,
            visit_date: row.get(3)?,
            measurements: [
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
                row.get(10)?,
                row.get(11)?,
                row.get(12)?,
                row.get(13)?,
            ],
            notes: row.get(14)?,
        })
    }
}

impl TryFrom<VisitRow> for Visit {
    type Error = DbError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        let mut visit = Visit::new(row.patient_id, row.practitioner_id, row.visit_date);
        visit.id = row.id;
        visit.notes = row.notes;

        for (measurement, text) in Measurement::ALL.into_iter().zip(row.measurements) {
            let value = text.as_deref().map(Decimal::from_str).transpose()?;
            visit.set(measurement, value);
        }
        Ok(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        crate::db::seed_practitioner(&db, "nutri-1");
        let patient = Patient::new(
            "nutri-1".into(),
            "Ana".into(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        );
        db.insert_patient(&patient).unwrap();
        (db, patient.local_id)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_insert_and_get_preserves_precision() {
        let (db, patient_id) = setup();
        let mut visit = Visit::new(patient_id, "nutri-1".into(), date(1))
            .with(Measurement::Weight, Decimal::new(8510, 2))
            .with(Measurement::Waist, Decimal::new(9000, 2));
        visit.notes = Some("First consultation".into());

        let id = db.insert_visit(&visit).unwrap();
        let stored = db.get_visit(id).unwrap().unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.weight, Some(Decimal::new(8510, 2)));
        assert_eq!(stored.weight.unwrap().to_string(), "85.10");
        assert_eq!(stored.waist, Some(Decimal::new(90, 0)));
        assert!(stored.hip.is_none());
        assert_eq!(stored.notes.as_deref(), Some("First consultation"));
    }

    #[test]
    fn test_list_orders_by_date_then_insertion() {
        let (db, patient_id) = setup();
        let later = db
            .insert_visit(&Visit::new(patient_id.clone(), "nutri-1".into(), date(20)))
            .unwrap();
        let same_day_first = db
            .insert_visit(&Visit::new(patient_id.clone(), "nutri-1".into(), date(3)))
            .unwrap();
        let same_day_second = db
            .insert_visit(&Visit::new(patient_id.clone(), "nutri-1".into(), date(3)))
            .unwrap();

        let ids: Vec<i64> = db
            .list_visits_for_patient(&patient_id)
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![same_day_first, same_day_second, later]);
    }

    #[test]
    fn test_list_is_scoped_to_patient() {
        let (db, patient_id) = setup();
        let other = Patient::new(
            "nutri-1".into(),
            "Bruno".into(),
            NaiveDate::from_ymd_opt(1985, 2, 2).unwrap(),
        );
        db.insert_patient(&other).unwrap();

        db.insert_visit(&Visit::new(patient_id.clone(), "nutri-1".into(), date(1)))
            .unwrap();
        db.insert_visit(&Visit::new(other.local_id.clone(), "nutri-1".into(), date(2)))
            .unwrap();

        let visits = db.list_visits_for_patient(&patient_id).unwrap();
        assert_eq!(visits.len(), 1);
        assert!(visits.iter().all(|v| v.patient_id == patient_id));
    }

    #[test]
    fn test_update_and_delete() {
        let (db, patient_id) = setup();
        let id = db
            .insert_visit(
                &Visit::new(patient_id, "nutri-1".into(), date(1))
                    .with(Measurement::Arm, Decimal::new(30, 0)),
            )
            .unwrap();

        let mut visit = db.get_visit(id).unwrap().unwrap();
        visit.set(Measurement::Arm, None);
        visit.set(Measurement::Thigh, Some(Decimal::new(5525, 2)));
        assert!(db.update_visit(&visit).unwrap());

        let stored = db.get_visit(id).unwrap().unwrap();
        assert!(stored.arm.is_none());
        assert_eq!(stored.thigh, Some(Decimal::new(5525, 2)));

        assert!(db.delete_visit(id).unwrap());
        assert!(db.get_visit(id).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_decimal_is_reported() {
        let (db, patient_id) = setup();
        let id = db
            .insert_visit(&Visit::new(patient_id, "nutri-1".into(), date(1)))
            .unwrap();
        db.conn()
            .execute("UPDATE visits SET hip = 'abc' WHERE id = ?", [id])
            .unwrap();

        assert!(matches!(db.get_visit(id), Err(DbError::Decimal(_))));
    }
}

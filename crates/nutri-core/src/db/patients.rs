//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};
use strsim::{jaro_winkler, normalized_levenshtein};

use super::{Database, DbResult};
use crate::models::Patient;

/// Minimum similarity for a fuzzy (non-substring) name match.
const MIN_SEARCH_SCORE: f64 = 0.75;

const PATIENT_COLUMNS: &str = r#"
    local_id, practitioner_id, account_id, name, birth_date,
    address, address_number, complement, city, state, postal_code,
    phone, email, visit_reason, created_at, updated_at
"#;

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                local_id, practitioner_id, account_id, name, birth_date,
                address, address_number, complement, city, state, postal_code,
                phone, email, visit_reason, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                patient.local_id,
                patient.practitioner_id,
                patient.account_id,
                patient.name,
                patient.birth_date,
                patient.address,
                patient.address_number,
                patient.complement,
                patient.city,
                patient.state,
                patient.postal_code,
                patient.phone,
                patient.email,
                patient.visit_reason,
                patient.created_at,
                patient.updated_at,
            ],
        )?;

        tracing::info!(
            patient_id = %patient.local_id,
            practitioner_id = %patient.practitioner_id,
            "Registered patient"
        );
        Ok(())
    }

    /// Update an existing patient's registration data.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                birth_date = ?3,
                address = ?4,
                address_number = ?5,
                complement = ?6,
                city = ?7,
                state = ?8,
                postal_code = ?9,
                phone = ?10,
                email = ?11,
                visit_reason = ?12,
                updated_at = datetime('now')
            WHERE local_id = ?1
            "#,
            params![
                patient.local_id,
                patient.name,
                patient.birth_date,
                patient.address,
                patient.address_number,
                patient.complement,
                patient.city,
                patient.state,
                patient.postal_code,
                patient.phone,
                patient.email,
                patient.visit_reason,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by local ID.
    pub fn get_patient(&self, local_id: &str) -> DbResult<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE local_id = ?");
        self.conn
            .query_row(&sql, [local_id], patient_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List a practitioner's patients by name.
    pub fn list_patients_for_practitioner(&self, practitioner_id: &str) -> DbResult<Vec<Patient>> {
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE practitioner_id = ? ORDER BY name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([practitioner_id], patient_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search a practitioner's patients by name.
    ///
    /// Substring matches rank first; the rest are ranked by similarity of
    /// the query to each word of the name, so typos still find the patient.
    pub fn search_patients(
        &self,
        practitioner_id: &str,
        query: &str,
        limit: usize,
    ) -> DbResult<Vec<Patient>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, Patient)> = self
            .list_patients_for_practitioner(practitioner_id)?
            .into_iter()
            .filter_map(|patient| {
                let score = name_score(&query, &patient.name);
                (score >= MIN_SEARCH_SCORE).then_some((score, patient))
            })
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, patient)| patient)
            .collect())
    }

    /// Delete a patient and, by cascade, their clinical records.
    pub fn delete_patient(&self, local_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE local_id = ?", [local_id])?;
        Ok(rows_affected > 0)
    }

    /// Link a patient to their portal login account.
    pub fn link_patient_account(&self, local_id: &str, account_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET account_id = ?, updated_at = datetime('now') WHERE local_id = ?",
            [account_id, local_id],
        )?;
        Ok(rows_affected > 0)
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        local_id: row.get(0)?,
        practitioner_id: row.get(1)?,
        account_id: row.get(2)?,
        name: row.get(3)?,
        birth_date: row.get(4)?,
        address: row.get(5)?,
        address_number: row.get(6)?,
        complement: row.get(7)?,
        city: row.get(8)?,
        state: row.get(9)?,
        postal_code: row.get(10)?,
        phone: row.get(11)?,
        email: row.get(12)?,
        visit_reason: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// Score a lowercase query against a patient name in [0, 1].
fn name_score(query: &str, name: &str) -> f64 {
    let name = name.to_lowercase();
    if name.contains(query) {
        return 1.0;
    }

    name.split_whitespace()
        .chain(std::iter::once(name.as_str()))
        .map(|word| fuzzy_match(query, word))
        .fold(0.0, f64::max)
}

/// Combined Jaro-Winkler and Levenshtein similarity.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Role};
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        crate::db::seed_practitioner(&db, "nutri-1");
        crate::db::seed_practitioner(&db, "nutri-2");
        db
    }

    fn patient(practitioner_id: &str, name: &str) -> Patient {
        Patient::new(
            practitioner_id.into(),
            name.into(),
            NaiveDate::from_ymd_opt(1988, 6, 15).unwrap(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut ana = patient("nutri-1", "Ana Souza");
        ana.city = "Campinas".into();
        ana.complement = Some("Apto 12".into());
        db.insert_patient(&ana).unwrap();

        let retrieved = db.get_patient(&ana.local_id).unwrap().unwrap();
        assert_eq!(retrieved, ana);
        assert!(db.get_patient("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let mut ana = patient("nutri-1", "Ana Souza");
        db.insert_patient(&ana).unwrap();

        ana.phone = "19988887777".into();
        ana.visit_reason = "Weight loss".into();
        assert!(db.update_patient(&ana).unwrap());

        let retrieved = db.get_patient(&ana.local_id).unwrap().unwrap();
        assert_eq!(retrieved.phone, "19988887777");
        assert_eq!(retrieved.visit_reason, "Weight loss");
    }

    #[test]
    fn test_list_is_scoped_to_practitioner() {
        let db = setup_db();
        db.insert_patient(&patient("nutri-1", "Bruno")).unwrap();
        db.insert_patient(&patient("nutri-1", "Ana")).unwrap();
        db.insert_patient(&patient("nutri-2", "Carla")).unwrap();

        let names: Vec<String> = db
            .list_patients_for_practitioner("nutri-1")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    #[test]
    fn test_search_patients() {
        let db = setup_db();
        db.insert_patient(&patient("nutri-1", "Ana Souza")).unwrap();
        db.insert_patient(&patient("nutri-1", "Anna Lima")).unwrap();
        db.insert_patient(&patient("nutri-1", "Bruno Costa")).unwrap();
        db.insert_patient(&patient("nutri-2", "Ana Paula")).unwrap();

        let results = db.search_patients("nutri-1", "ana", 10).unwrap();
        let names: Vec<&str> = results.iter().map(|p| p.name.as_str()).collect();
        // Exact substring first, typo match second, other practitioner excluded
        assert_eq!(names, vec!["Ana Souza", "Anna Lima"]);

        assert_eq!(db.search_patients("nutri-1", "ana", 1).unwrap().len(), 1);
        assert!(db.search_patients("nutri-1", "  ", 10).unwrap().is_empty());
    }

    #[test]
    fn test_link_account_and_delete() {
        let db = setup_db();
        let ana = patient("nutri-1", "Ana");
        db.insert_patient(&ana).unwrap();

        let account = Account::new("ana@example.com", "Ana".into(), Role::Patient);
        db.insert_account(&account).unwrap();
        assert!(db.link_patient_account(&ana.local_id, &account.account_id).unwrap());
        assert_eq!(
            db.get_patient(&ana.local_id).unwrap().unwrap().account_id,
            Some(account.account_id)
        );

        assert!(db.delete_patient(&ana.local_id).unwrap());
        assert!(!db.delete_patient(&ana.local_id).unwrap());
    }

    #[test]
    fn test_name_score() {
        assert_eq!(name_score("sou", "Ana Souza"), 1.0);
        assert!(name_score("ana", "Anna Lima") >= MIN_SEARCH_SCORE);
        assert!(name_score("ana", "Bruno Costa") < MIN_SEARCH_SCORE);
    }
}

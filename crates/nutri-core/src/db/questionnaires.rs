//! Clinical questionnaire database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{
    ClinicalHistory, FoodFrequency, FoodFrequencyItem, HistoryAnswer, LifestyleAssessment,
    Medication,
};

impl Database {
    // ========================================================================
    // Lifestyle
    // ========================================================================

    /// Insert or replace a patient's lifestyle assessment.
    pub fn upsert_lifestyle(&self, lifestyle: &LifestyleAssessment) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO lifestyle_assessments (
                patient_id, occupation, lives_alone, smokes, drinks_alcohol,
                physically_active, activity_type, activity_frequency, activity_time,
                meal_location, eats_alone, who_cooks, hungriest_time, who_shops,
                sleep_hours, has_food_aversions, food_preferences, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, datetime('now'))
            ON CONFLICT(patient_id) DO UPDATE SET
                occupation = excluded.occupation,
                lives_alone = excluded.lives_alone,
                smokes = excluded.smokes,
                drinks_alcohol = excluded.drinks_alcohol,
                physically_active = excluded.physically_active,
                activity_type = excluded.activity_type,
                activity_frequency = excluded.activity_frequency,
                activity_time = excluded.activity_time,
                meal_location = excluded.meal_location,
                eats_alone = excluded.eats_alone,
                who_cooks = excluded.who_cooks,
                hungriest_time = excluded.hungriest_time,
                who_shops = excluded.who_shops,
                sleep_hours = excluded.sleep_hours,
                has_food_aversions = excluded.has_food_aversions,
                food_preferences = excluded.food_preferences,
                updated_at = datetime('now')
            "#,
            params![
                lifestyle.patient_id,
                lifestyle.occupation,
                lifestyle.lives_alone,
                lifestyle.smokes,
                lifestyle.drinks_alcohol,
                lifestyle.physically_active,
                lifestyle.activity_type,
                lifestyle.activity_frequency,
                lifestyle.activity_time,
                lifestyle.meal_location,
                lifestyle.eats_alone,
                lifestyle.who_cooks,
                lifestyle.hungriest_time,
                lifestyle.who_shops,
                lifestyle.sleep_hours,
                lifestyle.has_food_aversions,
                lifestyle.food_preferences,
            ],
        )?;
        Ok(())
    }

    /// Get a patient's lifestyle assessment.
    pub fn get_lifestyle(&self, patient_id: &str) -> DbResult<Option<LifestyleAssessment>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, occupation, lives_alone, smokes, drinks_alcohol,
                       physically_active, activity_type, activity_frequency, activity_time,
                       meal_location, eats_alone, who_cooks, hungriest_time, who_shops,
                       sleep_hours, has_food_aversions, food_preferences
                FROM lifestyle_assessments
                WHERE patient_id = ?
                "#,
                [patient_id],
                |row| {
                    Ok(LifestyleAssessment {
                        patient_id: row.get(0)?,
                        occupation: row.get(1)?,
                        lives_alone: row.get(2)?,
                        smokes: row.get(3)?,
                        drinks_alcohol: row.get(4)?,
                        physically_active: row.get(5)?,
                        activity_type: row.get(6)?,
                        activity_frequency: row.get(7)?,
                        activity_time: row.get(8)?,
                        meal_location: row.get(9)?,
                        eats_alone: row.get(10)?,
                        who_cooks: row.get(11)?,
                        hungriest_time: row.get(12)?,
                        who_shops: row.get(13)?,
                        sleep_hours: row.get(14)?,
                        has_food_aversions: row.get(15)?,
                        food_preferences: row.get(16)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    // ========================================================================
    // Clinical history
    // ========================================================================

    /// Insert or replace a patient's clinical history.
    pub fn upsert_clinical_history(&self, history: &ClinicalHistory) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clinical_histories (
                patient_id, surgeries, hypertension, diabetes, cardiovascular,
                hypercholesterolemia, cancer, anemia, hypothyroidism, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
            ON CONFLICT(patient_id) DO UPDATE SET
                surgeries = excluded.surgeries,
                hypertension = excluded.hypertension,
                diabetes = excluded.diabetes,
                cardiovascular = excluded.cardiovascular,
                hypercholesterolemia = excluded.hypercholesterolemia,
                cancer = excluded.cancer,
                anemia = excluded.anemia,
                hypothyroidism = excluded.hypothyroidism,
                updated_at = datetime('now')
            "#,
            params![
                history.patient_id,
                history.surgeries.code(),
                history.hypertension.code(),
                history.diabetes.code(),
                history.cardiovascular.code(),
                history.hypercholesterolemia.code(),
                history.cancer.code(),
                history.anemia.code(),
                history.hypothyroidism.code(),
            ],
        )?;
        Ok(())
    }

    /// Get a patient's clinical history.
    pub fn get_clinical_history(&self, patient_id: &str) -> DbResult<Option<ClinicalHistory>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, surgeries, hypertension, diabetes, cardiovascular,
                       hypercholesterolemia, cancer, anemia, hypothyroidism
                FROM clinical_histories
                WHERE patient_id = ?
                "#,
                [patient_id],
                |row| {
                    Ok(ClinicalHistoryRow {
                        patient_id: row.get(0)?,
                        answers: [
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                            row.get(6)?,
                            row.get(7)?,
                            row.get(8)?,
                        ],
                    })
                },
            )
            .optional()?
            .map(ClinicalHistory::try_from)
            .transpose()
    }

    // ========================================================================
    // Medications
    // ========================================================================

    /// Record a medication in use. Returns the new row ID.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO medications (patient_id, name, dose, times_per_day)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                medication.patient_id,
                medication.name,
                medication.dose,
                medication.times_per_day,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List a patient's medications in the order they were recorded.
    pub fn list_medications(&self, patient_id: &str) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, name, dose, times_per_day
            FROM medications
            WHERE patient_id = ?
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(Medication {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                name: row.get(2)?,
                dose: row.get(3)?,
                times_per_day: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Remove a medication.
    pub fn delete_medication(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    // ========================================================================
    // Food frequency
    // ========================================================================

    /// Insert or replace the food-frequency questionnaire for its day.
    pub fn upsert_food_frequency(&self, frequency: &FoodFrequency) -> DbResult<()> {
        let items = serde_json::to_string(&frequency.items)?;
        self.conn.execute(
            r#"
            INSERT INTO food_frequencies (patient_id, recorded_on, items, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(patient_id, recorded_on) DO UPDATE SET
                items = excluded.items,
                updated_at = datetime('now')
            "#,
            params![frequency.patient_id, frequency.recorded_on, items],
        )?;
        Ok(())
    }

    /// Get the food-frequency questionnaire recorded on a given day.
    pub fn get_food_frequency(
        &self,
        patient_id: &str,
        recorded_on: NaiveDate,
    ) -> DbResult<Option<FoodFrequency>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, recorded_on, items
                FROM food_frequencies
                WHERE patient_id = ?1 AND recorded_on = ?2
                "#,
                params![patient_id, recorded_on],
                |row| {
                    Ok(FoodFrequencyRow {
                        patient_id: row.get(0)?,
                        recorded_on: row.get(1)?,
                        items: row.get(2)?,
                    })
                },
            )
            .optional()?
            .map(FoodFrequency::try_from)
            .transpose()
    }
}

/// Intermediate row struct for database mapping.
struct ClinicalHistoryRow {
    patient_id: String,
    answers: [String; 8],
}

impl TryFrom<ClinicalHistoryRow> for ClinicalHistory {
    type Error = DbError;

    fn try_from(row: ClinicalHistoryRow) -> Result<Self, Self::Error> {
        let mut answers = [HistoryAnswer::No; 8];
        for (slot, code) in answers.iter_mut().zip(&row.answers) {
            *slot = HistoryAnswer::from_code(code)
                .ok_or_else(|| DbError::Constraint(format!("Unknown history answer: {code}")))?;
        }
        let [surgeries, hypertension, diabetes, cardiovascular, hypercholesterolemia, cancer, anemia, hypothyroidism] =
            answers;

        Ok(ClinicalHistory {
            patient_id: row.patient_id,
            surgeries,
            hypertension,
            diabetes,
            cardiovascular,
            hypercholesterolemia,
            cancer,
            anemia,
            hypothyroidism,
        })
    }
}

/// Intermediate row struct for database mapping.
struct FoodFrequencyRow {
    patient_id: String,
    recorded_on: NaiveDate,
    items: String,
}

impl TryFrom<FoodFrequencyRow> for FoodFrequency {
    type Error = DbError;

    fn try_from(row: FoodFrequencyRow) -> Result<Self, Self::Error> {
        let items: Vec<FoodFrequencyItem> = serde_json::from_str(&row.items)?;
        Ok(FoodFrequency {
            patient_id: row.patient_id,
            recorded_on: row.recorded_on,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Food, Frequency, Patient, Servings};

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

    fn lifestyle(patient_id: &str) -> LifestyleAssessment {
        LifestyleAssessment {
            patient_id: patient_id.to_string(),
            occupation: "Teacher".into(),
            lives_alone: false,
            smokes: false,
            drinks_alcohol: true,
            physically_active: true,
            activity_type: Some("Running".into()),
            activity_frequency: Some("3x/week".into()),
            activity_time: Some("45 min".into()),
            meal_location: "Home".into(),
            eats_alone: false,
            who_cooks: "Self".into(),
            hungriest_time: "Evening".into(),
            who_shops: "Self".into(),
            sleep_hours: 7.5,
            has_food_aversions: false,
            food_preferences: "Pasta".into(),
        }
    }

    #[test]
    fn test_lifestyle_upsert() {
        let (db, patient_id) = setup();
        db.upsert_lifestyle(&lifestyle(&patient_id)).unwrap();

        let mut changed = lifestyle(&patient_id);
        changed.smokes = true;
        changed.activity_type = None;
        db.upsert_lifestyle(&changed).unwrap();

        assert_eq!(db.get_lifestyle(&patient_id).unwrap(), Some(changed));
        assert!(db.get_lifestyle("missing").unwrap().is_none());
    }

    #[test]
    fn test_clinical_history_round_trip() {
        let (db, patient_id) = setup();
        let history = ClinicalHistory {
            patient_id: patient_id.clone(),
            surgeries: HistoryAnswer::No,
            hypertension: HistoryAnswer::Family,
            diabetes: HistoryAnswer::Yes,
            cardiovascular: HistoryAnswer::No,
            hypercholesterolemia: HistoryAnswer::Family,
            cancer: HistoryAnswer::No,
            anemia: HistoryAnswer::Yes,
            hypothyroidism: HistoryAnswer::No,
        };
        db.upsert_clinical_history(&history).unwrap();

        assert_eq!(db.get_clinical_history(&patient_id).unwrap(), Some(history));
    }

    #[test]
    fn test_medications_keep_order() {
        let (db, patient_id) = setup();
        let first = db
            .insert_medication(&Medication::new(
                patient_id.clone(),
                "Metformin".into(),
                "500mg".into(),
                "2".into(),
            ))
            .unwrap();
        db.insert_medication(&Medication::new(
            patient_id.clone(),
            "Levothyroxine".into(),
            "50mcg".into(),
            "1".into(),
        ))
        .unwrap();

        let meds = db.list_medications(&patient_id).unwrap();
        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].id, first);
        assert_eq!(meds[0].name, "Metformin");

        assert!(db.delete_medication(first).unwrap());
        assert_eq!(db.list_medications(&patient_id).unwrap().len(), 1);
    }

    #[test]
    fn test_medication_requires_patient() {
        let (db, _) = setup();
        let result = db.insert_medication(&Medication::new(
            "missing".into(),
            "Aspirin".into(),
            "100mg".into(),
            "1".into(),
        ));
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }

    #[test]
    fn test_food_frequency_per_day() {
        let (db, patient_id) = setup();
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let answers = vec![FoodFrequencyItem {
            food: Food::Coffee,
            frequency: Some(Frequency::Daily),
            servings: Some(Servings::Three),
        }];
        db.upsert_food_frequency(&FoodFrequency::from_answers(patient_id.clone(), day, &answers))
            .unwrap();

        let replacement = vec![FoodFrequencyItem {
            food: Food::Rice,
            frequency: Some(Frequency::Weekly),
            servings: None,
        }];
        db.upsert_food_frequency(&FoodFrequency::from_answers(
            patient_id.clone(),
            day,
            &replacement,
        ))
        .unwrap();

        let stored = db.get_food_frequency(&patient_id, day).unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert!(stored.item(Food::Coffee).is_none());
        assert_eq!(stored.item(Food::Rice).unwrap().frequency, Some(Frequency::Weekly));

        let other_day = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert!(db.get_food_frequency(&patient_id, other_day).unwrap().is_none());
    }
}

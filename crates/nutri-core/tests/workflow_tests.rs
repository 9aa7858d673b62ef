//! End-to-end practitioner workflow through the FFI surface.

use std::sync::Arc;

use nutri_core::{
    open_database, open_database_in_memory, FfiClinicalHistory, FfiComparisonSpan, FfiFoodAnswer,
    FfiPatientDetails, FfiPractitionerProfile, FfiSubmittedEntry, FfiVisit, NutriCore,
    NutriError,
};

fn profile(registration: &str) -> FfiPractitionerProfile {
    FfiPractitionerProfile {
        registration: registration.into(),
        address: "Av. Brasil".into(),
        number: "1200".into(),
        complement: None,
        city: "Campinas".into(),
        state: "SP".into(),
        phone: "19999990000".into(),
    }
}

fn setup() -> (Arc<NutriCore>, String, String) {
    let core = open_database_in_memory().unwrap();
    let practitioner = core
        .register_practitioner(
            "paula@example.com".into(),
            "Paula Nunes".into(),
            profile("CRN-3 45678"),
        )
        .unwrap();

    let patient = core
        .create_patient(
            practitioner.account_id.clone(),
            FfiPatientDetails {
                name: "Ana Souza".into(),
                birth_date: "1990-04-12".into(),
                city: "Campinas".into(),
                state: "sp".into(),
                email: "Ana@Example.com".into(),
                visit_reason: "Weight loss".into(),
                ..Default::default()
            },
        )
        .unwrap();

    (core, practitioner.account_id, patient.local_id)
}

fn visit(patient_id: &str, practitioner_id: &str, date: &str) -> FfiVisit {
    FfiVisit {
        patient_id: patient_id.into(),
        practitioner_id: practitioner_id.into(),
        visit_date: date.into(),
        ..Default::default()
    }
}

fn entry(meal: &str, description: &str) -> FfiSubmittedEntry {
    FfiSubmittedEntry {
        meal: meal.into(),
        description: description.into(),
        ..Default::default()
    }
}

#[test]
fn test_registration_and_lookup() {
    let (core, practitioner_id, patient_id) = setup();

    let patient = core.get_patient(patient_id.clone()).unwrap().unwrap();
    assert_eq!(patient.state, "SP");
    assert_eq!(patient.email, "ana@example.com");
    assert_eq!(patient.birth_date, "1990-04-12");

    let profile = core
        .get_practitioner_profile(practitioner_id.clone())
        .unwrap()
        .unwrap();
    assert_eq!(profile.registration, "CRN-3 45678");

    let listed = core
        .list_patients_for_practitioner(practitioner_id.clone())
        .unwrap();
    assert_eq!(listed.len(), 1);

    let found = core
        .search_patients(practitioner_id, "Sousa".into(), 5)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].local_id, patient_id);
}

#[test]
fn test_visits_and_comparison() {
    let (core, practitioner_id, patient_id) = setup();

    let mut first = visit(&patient_id, &practitioner_id, "2024-01-15");
    first.weight = Some("80,00".into());
    first.waist = Some("90".into());
    first.arm = Some("30.00".into());
    core.record_visit(first).unwrap();

    let mut second = visit(&patient_id, &practitioner_id, "2024-02-15");
    second.weight = Some("80.00".into());
    second.waist = Some("85.00".into());
    second.arm = Some("32.00".into());
    second.hip = Some("101.00".into());
    let stored = core.record_visit(second).unwrap();
    assert!(stored.id > 0);
    assert_eq!(stored.waist.as_deref(), Some("85.00"));

    let visits = core.list_visits(patient_id.clone()).unwrap();
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].visit_date, "2024-01-15");

    let report = core
        .compare_visits(patient_id.clone(), FfiComparisonSpan::Recent)
        .unwrap();
    assert_eq!(report.visit_count, 2);

    let waist = report.per_field.iter().find(|f| f.measurement == "waist").unwrap();
    assert_eq!(waist.classification, "favorable");
    assert_eq!(waist.delta.as_deref(), Some("-5.00"));

    let arm = report.per_field.iter().find(|f| f.measurement == "arm").unwrap();
    assert_eq!(arm.classification, "favorable");
    assert_eq!(arm.message, "Gained mass (+2.00)");

    let hip = report.per_field.iter().find(|f| f.measurement == "hip").unwrap();
    assert_eq!(hip.classification, "insufficient_data");

    assert_eq!(report.weight_trend.classification, "neutral");

    let json = core
        .comparison_report_json(patient_id, FfiComparisonSpan::SinceFirst)
        .unwrap();
    assert!(json.contains("\"per_field\""));
}

#[test]
fn test_invalid_measurement_rejected() {
    let (core, practitioner_id, patient_id) = setup();

    let mut bad = visit(&patient_id, &practitioner_id, "2024-01-15");
    bad.weight = Some("eighty".into());
    assert!(matches!(core.record_visit(bad), Err(NutriError::InvalidInput(_))));

    let bad_date = visit(&patient_id, &practitioner_id, "15/01/2024");
    assert!(matches!(core.record_visit(bad_date), Err(NutriError::InvalidInput(_))));

    assert!(core.list_visits(patient_id).unwrap().is_empty());
}

#[test]
fn test_out_of_range_measurement_rejected() {
    let (core, practitioner_id, patient_id) = setup();

    for raw in ["-80", "-79228162514264337593543950335", "79228162514264337593543950335"] {
        let mut bad = visit(&patient_id, &practitioner_id, "2024-01-15");
        bad.weight = Some(raw.into());
        bad.waist = Some("90".into());
        assert!(
            matches!(core.record_visit(bad), Err(NutriError::InvalidInput(_))),
            "{raw} should be rejected"
        );
    }
    assert!(core.list_visits(patient_id.clone()).unwrap().is_empty());

    // The handle is still healthy
    let report = core
        .compare_visits(patient_id.clone(), FfiComparisonSpan::Recent)
        .unwrap();
    assert_eq!(report.visit_count, 0);
    assert!(core.get_patient(patient_id).unwrap().is_some());
}

#[test]
fn test_visit_must_be_recorded_by_patients_practitioner() {
    let (core, _, patient_id) = setup();
    let other = core
        .register_practitioner(
            "rita@example.com".into(),
            "Rita".into(),
            profile("CRN-3 99999"),
        )
        .unwrap();

    let foreign = visit(&patient_id, &other.account_id, "2024-01-15");
    assert!(matches!(core.record_visit(foreign), Err(NutriError::InvalidInput(_))));
    assert!(core.list_visits(patient_id).unwrap().is_empty());
}

#[test]
fn test_patient_requires_practitioner_account() {
    let (core, _, _) = setup();
    let details = || FfiPatientDetails {
        name: "Bruno".into(),
        birth_date: "1980-01-01".into(),
        ..Default::default()
    };

    assert!(matches!(
        core.create_patient("no-such-practitioner".into(), details()),
        Err(NutriError::NotFound(_))
    ));

    let admin = core
        .create_account("admin@example.com".into(), "Admin".into(), "ADMIN".into())
        .unwrap();
    assert!(matches!(
        core.create_patient(admin.account_id.clone(), details()),
        Err(NutriError::InvalidInput(_))
    ));
    assert!(core
        .list_patients_for_practitioner(admin.account_id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_unknown_patient_is_not_found() {
    let core = open_database_in_memory().unwrap();

    assert!(matches!(
        core.compare_visits("nobody".into(), FfiComparisonSpan::Recent),
        Err(NutriError::NotFound(_))
    ));
    assert!(matches!(
        core.save_daily_intake("nobody".into(), "2024-01-01".into(), vec![]),
        Err(NutriError::NotFound(_))
    ));
}

#[test]
fn test_daily_intake_workflow() {
    let (core, _, patient_id) = setup();

    let mut bread = entry("CM", "  Bread ");
    bread.time = Some("07:30".into());
    bread.quantity = Some("1,5".into());
    bread.unit = Some("slice".into());
    let mut juice = entry("CM", "Juice");
    juice.quantity = Some("a glass".into());

    let saved = core
        .save_daily_intake(
            patient_id.clone(),
            "2024-04-02".into(),
            vec![entry("JA", "Soup"), bread, entry("AL", ""), juice],
        )
        .unwrap();

    let descriptions: Vec<&str> = saved.entries.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Bread", "Juice", "Soup"]);
    assert_eq!(saved.entries[0].quantity.as_deref(), Some("1.5"));
    assert_eq!(saved.entries[0].time.as_deref(), Some("07:30"));
    assert!(saved.entries[1].quantity.is_none());

    // Saving the same day again replaces it
    core.save_daily_intake(
        patient_id.clone(),
        "2024-04-02".into(),
        vec![entry("LN", "Tea")],
    )
    .unwrap();
    let day = core
        .get_daily_intake(patient_id.clone(), "2024-04-02".into())
        .unwrap()
        .unwrap();
    assert_eq!(day.entries.len(), 1);
    assert_eq!(day.entries[0].meal, "LN");
    assert_eq!(core.list_daily_intake(patient_id.clone()).unwrap().len(), 1);

    assert!(matches!(
        core.save_daily_intake(patient_id, "2024-04-03".into(), vec![entry("XX", "Cake")]),
        Err(NutriError::InvalidInput(_))
    ));
}

#[test]
fn test_questionnaires() {
    let (core, _, patient_id) = setup();

    core.save_clinical_history(FfiClinicalHistory {
        patient_id: patient_id.clone(),
        surgeries: "no".into(),
        hypertension: "family".into(),
        diabetes: "yes".into(),
        cardiovascular: "no".into(),
        hypercholesterolemia: "no".into(),
        cancer: "family".into(),
        anemia: "no".into(),
        hypothyroidism: "no".into(),
    })
    .unwrap();
    let history = core.get_clinical_history(patient_id.clone()).unwrap().unwrap();
    assert_eq!(history.hypertension, "family");

    core.add_medication(
        patient_id.clone(),
        "Metformin".into(),
        "500mg".into(),
        "2".into(),
    )
    .unwrap();
    assert_eq!(core.list_medications(patient_id.clone()).unwrap().len(), 1);

    let frequency = core
        .save_food_frequency(
            patient_id.clone(),
            "2024-03-01".into(),
            vec![
                FfiFoodAnswer {
                    food: "coffee".into(),
                    frequency: Some("daily".into()),
                    servings: Some("+5".into()),
                },
                FfiFoodAnswer {
                    food: "rice".into(),
                    frequency: None,
                    servings: None,
                },
            ],
        )
        .unwrap();
    assert_eq!(frequency.items.len(), 1);
    assert_eq!(frequency.items[0].food, "coffee");
    assert_eq!(frequency.items[0].servings.as_deref(), Some("+5"));

    let stored = core
        .get_food_frequency(patient_id.clone(), "2024-03-01".into())
        .unwrap()
        .unwrap();
    assert_eq!(stored.items.len(), 1);

    assert!(matches!(
        core.save_food_frequency(
            patient_id,
            "2024-03-01".into(),
            vec![FfiFoodAnswer {
                food: "pizza".into(),
                frequency: None,
                servings: None,
            }],
        ),
        Err(NutriError::InvalidInput(_))
    ));
}

#[test]
fn test_duplicate_email_is_invalid_input() {
    let (core, _, _) = setup();
    let result = core.create_account("PAULA@example.com".into(), "Other".into(), "ADMIN".into());
    assert!(matches!(result, Err(NutriError::InvalidInput(_))));

    let result = core.create_account("x@example.com".into(), "X".into(), "ROOT".into());
    assert!(matches!(result, Err(NutriError::InvalidInput(_))));
}

#[test]
fn test_duplicate_registration_is_invalid_input() {
    let (core, _, _) = setup();
    let result = core.register_practitioner(
        "carla@example.com".into(),
        "Carla".into(),
        profile("CRN-3 45678"),
    );
    assert!(matches!(result, Err(NutriError::InvalidInput(_))));

    // Nothing from the rejected registration was kept
    let retry = core.register_practitioner(
        "carla@example.com".into(),
        "Carla".into(),
        profile("CRN-3 11111"),
    );
    assert!(retry.is_ok());
}

#[test]
fn test_on_disk_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db").to_string_lossy().to_string();

    let account_id = {
        let core = open_database(path.clone()).unwrap();
        core.register_practitioner(
            "paula@example.com".into(),
            "Paula Nunes".into(),
            profile("CRN-3 45678"),
        )
        .unwrap()
        .account_id
    };

    let core = open_database(path).unwrap();
    let patient = core.create_patient(
        account_id.clone(),
        FfiPatientDetails {
            name: "Bruno".into(),
            birth_date: "1980-01-01".into(),
            ..Default::default()
        },
    );
    assert!(patient.is_ok());
    assert!(core.get_practitioner_profile(account_id).unwrap().is_some());
}

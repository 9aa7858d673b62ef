//! Clinical visits and their anthropometric measurements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A numeric attribute recorded at a visit.
///
/// Every variant maps to one optional column on [`Visit`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    /// Body weight (kg)
    Weight,
    /// Height (m)
    Height,
    /// Wrist circumference (cm)
    Wrist,
    /// Waist circumference (cm)
    Waist,
    /// Hip circumference (cm)
    Hip,
    /// Arm circumference (cm)
    Arm,
    /// Abdomen circumference (cm)
    Abdomen,
    /// Thigh circumference (cm)
    Thigh,
    /// Triceps skinfold (mm)
    TricepsSkinfold,
    /// Subscapular skinfold (mm)
    SubscapularSkinfold,
}

impl Measurement {
    pub const ALL: [Measurement; 10] = [
        Measurement::Weight,
        Measurement::Height,
        Measurement::Wrist,
        Measurement::Waist,
        Measurement::Hip,
        Measurement::Arm,
        Measurement::Abdomen,
        Measurement::Thigh,
        Measurement::TricepsSkinfold,
        Measurement::SubscapularSkinfold,
    ];

    /// Column name in the `visits` table.
    pub fn column(&self) -> &'static str {
        match self {
            Measurement::Weight => "weight",
            Measurement::Height => "height",
            Measurement::Wrist => "wrist",
            Measurement::Waist => "waist",
            Measurement::Hip => "hip",
            Measurement::Arm => "arm",
            Measurement::Abdomen => "abdomen",
            Measurement::Thigh => "thigh",
            Measurement::TricepsSkinfold => "triceps_skinfold",
            Measurement::SubscapularSkinfold => "subscapular_skinfold",
        }
    }
}

/// One clinical encounter with optional anthropometric measurements.
///
/// Values are fixed-precision decimals (2 places); any subset may be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Insertion-order row ID (0 until stored)
    pub id: i64,
    /// Patient local ID
    pub patient_id: String,
    /// Practitioner account ID
    pub practitioner_id: String,
    /// Date of the visit
    pub visit_date: NaiveDate,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub wrist: Option<Decimal>,
    pub waist: Option<Decimal>,
    pub hip: Option<Decimal>,
    pub arm: Option<Decimal>,
    pub abdomen: Option<Decimal>,
    pub thigh: Option<Decimal>,
    pub triceps_skinfold: Option<Decimal>,
    pub subscapular_skinfold: Option<Decimal>,
    /// Free-text observations
    pub notes: Option<String>,
}

impl Visit {
    /// Create an empty visit for a patient on the given date.
    pub fn new(patient_id: String, practitioner_id: String, visit_date: NaiveDate) -> Self {
        Self {
            id: 0,
            patient_id,
            practitioner_id,
            visit_date,
            weight: None,
            height: None,
            wrist: None,
            waist: None,
            hip: None,
            arm: None,
            abdomen: None,
            thigh: None,
            triceps_skinfold: None,
            subscapular_skinfold: None,
            notes: None,
        }
    }

    /// Read a measurement.
    pub fn get(&self, measurement: Measurement) -> Option<Decimal> {
        match measurement {
            Measurement::Weight => self.weight,
            Measurement::Height => self.height,
            Measurement::Wrist => self.wrist,
            Measurement::Waist => self.waist,
            Measurement::Hip => self.hip,
            Measurement::Arm => self.arm,
            Measurement::Abdomen => self.abdomen,
            Measurement::Thigh => self.thigh,
            Measurement::TricepsSkinfold => self.triceps_skinfold,
            Measurement::SubscapularSkinfold => self.subscapular_skinfold,
        }
    }

    /// Set a measurement, normalising it to 2 decimal places.
    pub fn set(&mut self, measurement: Measurement, value: Option<Decimal>) {
        let value = value.map(|v| v.round_dp(2));
        let slot = match measurement {
            Measurement::Weight => &mut self.weight,
            Measurement::Height => &mut self.height,
            Measurement::Wrist => &mut self.wrist,
            Measurement::Waist => &mut self.waist,
            Measurement::Hip => &mut self.hip,
            Measurement::Arm => &mut self.arm,
            Measurement::Abdomen => &mut self.abdomen,
            Measurement::Thigh => &mut self.thigh,
            Measurement::TricepsSkinfold => &mut self.triceps_skinfold,
            Measurement::SubscapularSkinfold => &mut self.subscapular_skinfold,
        };
        *slot = value;
    }

    /// Builder-style variant of [`Visit::set`].
    pub fn with(mut self, measurement: Measurement, value: Decimal) -> Self {
        self.set(measurement, Some(value));
        self
    }

    /// Number of measurements actually recorded.
    pub fn recorded_count(&self) -> usize {
        Measurement::ALL
            .iter()
            .filter(|m| self.get(**m).is_some())
            .count()
    }
}

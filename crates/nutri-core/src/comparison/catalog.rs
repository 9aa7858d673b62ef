//! Measurement catalog with trend polarity.

use serde::Serialize;

use crate::models::Measurement;

/// Which direction of change counts as progress for a measurement.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// More is better (limb circumference: muscle gain)
    IncreaseIsPositive,
    /// Less is better (waist, skinfolds: fat loss)
    DecreaseIsPositive,
}

/// A measurement the comparison engine reports on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MeasurementField {
    pub measurement: Measurement,
    pub label: &'static str,
    pub polarity: Polarity,
}

impl MeasurementField {
    pub const fn new(measurement: Measurement, label: &'static str, polarity: Polarity) -> Self {
        Self {
            measurement,
            label,
            polarity,
        }
    }
}

/// Circumferences and skinfolds compared between consecutive visits.
///
/// Weight is reported separately as a first-vs-latest trend.
pub const DEFAULT_CATALOG: [MeasurementField; 8] = [
    MeasurementField::new(Measurement::Wrist, "Wrist", Polarity::IncreaseIsPositive),
    MeasurementField::new(Measurement::Arm, "Arm", Polarity::IncreaseIsPositive),
    MeasurementField::new(Measurement::Thigh, "Thigh", Polarity::IncreaseIsPositive),
    MeasurementField::new(Measurement::Waist, "Waist", Polarity::DecreaseIsPositive),
    MeasurementField::new(Measurement::Hip, "Hip", Polarity::DecreaseIsPositive),
    MeasurementField::new(Measurement::Abdomen, "Abdomen", Polarity::DecreaseIsPositive),
    MeasurementField::new(
        Measurement::TricepsSkinfold,
        "Triceps skinfold",
        Polarity::DecreaseIsPositive,
    ),
    MeasurementField::new(
        Measurement::SubscapularSkinfold,
        "Subscapular skinfold",
        Polarity::DecreaseIsPositive,
    ),
];

/// Look up the default catalog entry for a measurement.
pub fn field_for(measurement: Measurement) -> Option<&'static MeasurementField> {
    DEFAULT_CATALOG.iter().find(|f| f.measurement == measurement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limb_circumferences_increase_is_positive() {
        for m in [Measurement::Wrist, Measurement::Arm, Measurement::Thigh] {
            assert_eq!(field_for(m).unwrap().polarity, Polarity::IncreaseIsPositive);
        }
    }

    #[test]
    fn test_central_measures_decrease_is_positive() {
        for m in [
            Measurement::Waist,
            Measurement::Hip,
            Measurement::Abdomen,
            Measurement::TricepsSkinfold,
            Measurement::SubscapularSkinfold,
        ] {
            assert_eq!(field_for(m).unwrap().polarity, Polarity::DecreaseIsPositive);
        }
    }

    #[test]
    fn test_weight_not_in_per_field_catalog() {
        assert!(field_for(Measurement::Weight).is_none());
        assert!(field_for(Measurement::Height).is_none());
    }
}

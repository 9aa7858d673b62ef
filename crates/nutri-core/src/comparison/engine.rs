//! Visit comparison engine.
//!
//! Produces, from one patient's visit history:
//! - a per-field trend between two visits (latest vs previous by default)
//! - an overall weight trend between the earliest and latest visits
//!
//! Missing measurements are excluded from comparison, never treated as zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Measurement, Visit};

use super::catalog::{MeasurementField, Polarity, DEFAULT_CATALOG};

/// Outcome classification for a compared attribute.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendClass {
    Favorable,
    Unfavorable,
    Neutral,
    InsufficientData,
}

impl TrendClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendClass::Favorable => "favorable",
            TrendClass::Unfavorable => "unfavorable",
            TrendClass::Neutral => "neutral",
            TrendClass::InsufficientData => "insufficient_data",
        }
    }
}

/// Which pair of visits the per-field trend compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonSpan {
    /// Latest visit vs the one before it
    #[default]
    Recent,
    /// Latest visit vs the earliest one
    SinceFirst,
}

/// Trend for a single catalog field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldTrend {
    pub measurement: Measurement,
    pub label: String,
    pub previous: Option<Decimal>,
    pub latest: Option<Decimal>,
    /// Signed `latest - previous`, when both sides are present and differ
    pub delta: Option<Decimal>,
    pub message: String,
    pub class: TrendClass,
}

/// Weight change from the first visit to the latest one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeightTrend {
    pub first: Option<Decimal>,
    pub last: Option<Decimal>,
    /// Signed `last - first`, when both endpoints carry a weight
    pub delta: Option<Decimal>,
    pub message: String,
    pub class: TrendClass,
}

/// Full comparison output for one patient.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonReport {
    pub visit_count: usize,
    pub first_visit_date: Option<NaiveDate>,
    pub previous_visit_date: Option<NaiveDate>,
    pub latest_visit_date: Option<NaiveDate>,
    pub per_field: Vec<FieldTrend>,
    pub weight_trend: WeightTrend,
}

impl ComparisonReport {
    /// Serialize the report for display layers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Trend for a given measurement, if it is in the catalog used.
    pub fn field(&self, measurement: Measurement) -> Option<&FieldTrend> {
        self.per_field.iter().find(|f| f.measurement == measurement)
    }
}

const MSG_INSUFFICIENT: &str = "Insufficient data";
const MSG_AWAITING: &str = "Awaiting next visit";
const MSG_NO_CHANGE: &str = "No change";
const MSG_WEIGHT_INSUFFICIENT: &str = "Not enough weight data for comparison";

/// Compare a patient's visits against a measurement catalog.
pub fn compare_visits(visits: &[Visit], catalog: &[MeasurementField]) -> ComparisonReport {
    VisitComparator::with_catalog(catalog.to_vec()).compare(visits)
}

/// Comparison engine bound to a measurement catalog.
#[derive(Debug, Clone)]
pub struct VisitComparator {
    catalog: Vec<MeasurementField>,
}

impl Default for VisitComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitComparator {
    /// Create a comparator over [`DEFAULT_CATALOG`].
    pub fn new() -> Self {
        Self::with_catalog(DEFAULT_CATALOG.to_vec())
    }

    pub fn with_catalog(catalog: Vec<MeasurementField>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &[MeasurementField] {
        &self.catalog
    }

    /// Latest-vs-previous field trends plus the first-vs-latest weight trend.
    pub fn compare(&self, visits: &[Visit]) -> ComparisonReport {
        self.compare_span(visits, ComparisonSpan::Recent)
    }

    /// Same as [`VisitComparator::compare`], choosing which pair the field
    /// trends are computed over.
    pub fn compare_span(&self, visits: &[Visit], span: ComparisonSpan) -> ComparisonReport {
        let ordered = newest_first(visits);
        let latest = ordered.first().copied();
        let earliest = ordered.last().copied();
        let previous = match span {
            ComparisonSpan::Recent => ordered.get(1).copied(),
            ComparisonSpan::SinceFirst if ordered.len() >= 2 => earliest,
            ComparisonSpan::SinceFirst => None,
        };

        tracing::debug!(
            visits = ordered.len(),
            fields = self.catalog.len(),
            ?span,
            "Comparing visit history"
        );

        let per_field = self
            .catalog
            .iter()
            .map(|field| field_trend(field, previous, latest))
            .collect();

        ComparisonReport {
            visit_count: ordered.len(),
            first_visit_date: earliest.map(|v| v.visit_date),
            previous_visit_date: previous.map(|v| v.visit_date),
            latest_visit_date: latest.map(|v| v.visit_date),
            per_field,
            weight_trend: weight_trend(&ordered),
        }
    }
}

/// Visits of the latest visit's patient, sorted by (date, id) descending.
fn newest_first(visits: &[Visit]) -> Vec<&Visit> {
    let mut ordered: Vec<&Visit> = visits.iter().collect();
    ordered.sort_by(|a, b| (b.visit_date, b.id).cmp(&(a.visit_date, a.id)));

    if let Some(patient_id) = ordered.first().map(|v| v.patient_id.clone()) {
        let before = ordered.len();
        ordered.retain(|v| v.patient_id == patient_id);
        if ordered.len() != before {
            tracing::warn!(
                patient_id = %patient_id,
                dropped = before - ordered.len(),
                "Ignoring visits belonging to other patients"
            );
        }
    }

    ordered
}

fn field_trend(
    field: &MeasurementField,
    previous: Option<&Visit>,
    latest: Option<&Visit>,
) -> FieldTrend {
    let latest_value = latest.and_then(|v| v.get(field.measurement));
    let previous_value = previous.and_then(|v| v.get(field.measurement));

    let (delta, message, class) = match (previous, previous_value, latest_value) {
        (None, _, _) => (None, MSG_INSUFFICIENT.to_string(), TrendClass::InsufficientData),
        (Some(_), None, _) | (Some(_), _, None) => {
            (None, MSG_AWAITING.to_string(), TrendClass::InsufficientData)
        }
        (Some(_), Some(prev), Some(last)) if prev == last => {
            (None, MSG_NO_CHANGE.to_string(), TrendClass::Neutral)
        }
        (Some(_), Some(prev), Some(last)) => match last.checked_sub(prev) {
            Some(delta) => {
                let (message, class) = directional_message(field.polarity, delta);
                (Some(delta.round_dp(2)), message, class)
            }
            None => {
                tracing::warn!(field = field.label, "Measurement delta out of range");
                (None, MSG_INSUFFICIENT.to_string(), TrendClass::InsufficientData)
            }
        },
    };

    FieldTrend {
        measurement: field.measurement,
        label: field.label.to_string(),
        previous: previous_value,
        latest: latest_value,
        delta,
        message,
        class,
    }
}

fn directional_message(polarity: Polarity, delta: Decimal) -> (String, TrendClass) {
    let magnitude = two_places(delta.abs());
    let gained = delta.is_sign_positive();

    match (polarity, gained) {
        (Polarity::IncreaseIsPositive, true) => {
            (format!("Gained mass (+{magnitude})"), TrendClass::Favorable)
        }
        (Polarity::IncreaseIsPositive, false) => {
            (format!("Lost mass (-{magnitude})"), TrendClass::Unfavorable)
        }
        (Polarity::DecreaseIsPositive, false) => {
            (format!("Lost size (-{magnitude})"), TrendClass::Favorable)
        }
        (Polarity::DecreaseIsPositive, true) => {
            (format!("Gained size (+{magnitude})"), TrendClass::Unfavorable)
        }
    }
}

fn weight_trend(ordered: &[&Visit]) -> WeightTrend {
    let last = ordered.first().and_then(|v| v.weight);

    // A lone visit is reported as the latest one, matching the per-field trends
    if ordered.len() < 2 {
        return WeightTrend {
            first: None,
            last,
            delta: None,
            message: MSG_WEIGHT_INSUFFICIENT.to_string(),
            class: TrendClass::InsufficientData,
        };
    }

    let first = ordered.last().and_then(|v| v.weight);
    let raw = match (first, last) {
        (Some(first), Some(last)) => last.checked_sub(first),
        _ => None,
    };

    let (delta, message, class) = match (first, raw) {
        (Some(first), Some(raw)) => {
            let delta = raw.round_dp(2);
            let magnitude = two_places(raw.abs());
            if raw.is_zero() {
                (
                    Some(delta),
                    format!("Weight stable ({} kg)", two_places(first)),
                    TrendClass::Neutral,
                )
            } else if raw.is_sign_negative() {
                (
                    Some(delta),
                    format!("Lost {magnitude} kg since the first visit"),
                    TrendClass::Favorable,
                )
            } else {
                (
                    Some(delta),
                    format!("Gained {magnitude} kg since the first visit"),
                    TrendClass::Unfavorable,
                )
            }
        }
        _ => (
            None,
            MSG_WEIGHT_INSUFFICIENT.to_string(),
            TrendClass::InsufficientData,
        ),
    };

    WeightTrend {
        first,
        last,
        delta,
        message,
        class,
    }
}

/// Render a decimal with exactly two fractional digits.
fn two_places(value: Decimal) -> String {
    let mut value = value.round_dp(2);
    value.rescale(2);
    value.to_string()
}

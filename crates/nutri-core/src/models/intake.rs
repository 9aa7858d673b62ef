//! Daily food-intake log models.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Meal slot within a day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MealSlot {
    #[serde(rename = "CM")]
    Breakfast,
    #[serde(rename = "LM")]
    MorningSnack,
    #[serde(rename = "AL")]
    Lunch,
    #[serde(rename = "LT")]
    AfternoonSnack,
    #[serde(rename = "JA")]
    Dinner,
    #[serde(rename = "LN")]
    EveningSnack,
}

impl MealSlot {
    /// Slots in the order they occur during the day.
    pub const ALL: [MealSlot; 6] = [
        MealSlot::Breakfast,
        MealSlot::MorningSnack,
        MealSlot::Lunch,
        MealSlot::AfternoonSnack,
        MealSlot::Dinner,
        MealSlot::EveningSnack,
    ];

    /// Two-letter code used in stored logs.
    pub fn code(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "CM",
            MealSlot::MorningSnack => "LM",
            MealSlot::Lunch => "AL",
            MealSlot::AfternoonSnack => "LT",
            MealSlot::Dinner => "JA",
            MealSlot::EveningSnack => "LN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        Self::ALL.into_iter().find(|slot| slot.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::MorningSnack => "Morning snack",
            MealSlot::Lunch => "Lunch",
            MealSlot::AfternoonSnack => "Afternoon snack",
            MealSlot::Dinner => "Dinner",
            MealSlot::EveningSnack => "Evening snack",
        }
    }
}

/// A stored food-intake entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntakeEntry {
    pub meal: MealSlot,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
}

/// All intake entries for one patient on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyIntakeLog {
    pub patient_id: String,
    pub log_date: NaiveDate,
    /// When the log was last saved
    pub recorded_at: String,
    pub entries: Vec<IntakeEntry>,
}

impl DailyIntakeLog {
    pub fn new(patient_id: String, log_date: NaiveDate, entries: Vec<IntakeEntry>) -> Self {
        Self {
            patient_id,
            log_date,
            recorded_at: chrono::Utc::now().to_rfc3339(),
            entries,
        }
    }

    /// Entries belonging to one meal slot, in submission order.
    pub fn entries_for(&self, meal: MealSlot) -> impl Iterator<Item = &IntakeEntry> {
        self.entries.iter().filter(move |e| e.meal == meal)
    }
}

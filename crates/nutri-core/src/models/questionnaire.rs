//! Intake questionnaires captured during the first consultation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifestyle assessment (one per patient).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LifestyleAssessment {
    pub patient_id: String,
    pub occupation: String,
    pub lives_alone: bool,
    pub smokes: bool,
    pub drinks_alcohol: bool,
    pub physically_active: bool,
    /// Kind of physical activity, when active
    pub activity_type: Option<String>,
    pub activity_frequency: Option<String>,
    pub activity_time: Option<String>,
    /// Where meals are usually eaten
    pub meal_location: String,
    pub eats_alone: bool,
    pub who_cooks: String,
    /// Time of day when hunger peaks
    pub hungriest_time: String,
    pub who_shops: String,
    pub sleep_hours: f64,
    pub has_food_aversions: bool,
    pub food_preferences: String,
}

/// Answer to a clinical-history question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HistoryAnswer {
    Yes,
    No,
    /// Condition present in the family, not the patient
    Family,
}

impl HistoryAnswer {
    pub fn code(&self) -> &'static str {
        match self {
            HistoryAnswer::Yes => "yes",
            HistoryAnswer::No => "no",
            HistoryAnswer::Family => "family",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "yes" | "sim" => Some(HistoryAnswer::Yes),
            "no" | "não" | "nao" => Some(HistoryAnswer::No),
            "family" | "familiares" => Some(HistoryAnswer::Family),
            _ => None,
        }
    }
}

/// Clinical history (one per patient).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalHistory {
    pub patient_id: String,
    pub surgeries: HistoryAnswer,
    pub hypertension: HistoryAnswer,
    pub diabetes: HistoryAnswer,
    pub cardiovascular: HistoryAnswer,
    pub hypercholesterolemia: HistoryAnswer,
    pub cancer: HistoryAnswer,
    pub anemia: HistoryAnswer,
    pub hypothyroidism: HistoryAnswer,
}

/// A medication or supplement in use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Row ID (0 until stored)
    pub id: i64,
    pub patient_id: String,
    pub name: String,
    pub dose: String,
    pub times_per_day: String,
}

impl Medication {
    pub fn new(patient_id: String, name: String, dose: String, times_per_day: String) -> Self {
        Self {
            id: 0,
            patient_id,
            name,
            dose,
            times_per_day,
        }
    }
}

/// Foods covered by the consumption-frequency questionnaire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Food {
    Milk,
    Cheese,
    FriedFood,
    Rice,
    Pasta,
    BeansGrains,
    Beef,
    Chicken,
    Fish,
    ProcessedMeat,
    CannedFood,
    Vegetables,
    LeafyGreens,
    SoftDrinks,
    Fruit,
    Eggs,
    Sweets,
    Sweetener,
    Coffee,
    Tea,
    Biscuits,
}

impl Food {
    /// Every food, in questionnaire order.
    pub const ALL: [Food; 21] = [
        Food::Milk,
        Food::Cheese,
        Food::FriedFood,
        Food::Rice,
        Food::Pasta,
        Food::BeansGrains,
        Food::Beef,
        Food::Chicken,
        Food::Fish,
        Food::ProcessedMeat,
        Food::CannedFood,
        Food::Vegetables,
        Food::LeafyGreens,
        Food::SoftDrinks,
        Food::Fruit,
        Food::Eggs,
        Food::Sweets,
        Food::Sweetener,
        Food::Coffee,
        Food::Tea,
        Food::Biscuits,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Food::Milk => "Milk",
            Food::Cheese => "Cheese",
            Food::FriedFood => "Fried food",
            Food::Rice => "Rice",
            Food::Pasta => "Pasta",
            Food::BeansGrains => "Beans/Grains",
            Food::Beef => "Beef",
            Food::Chicken => "Chicken",
            Food::Fish => "Fish",
            Food::ProcessedMeat => "Processed meat",
            Food::CannedFood => "Canned food",
            Food::Vegetables => "Vegetables",
            Food::LeafyGreens => "Leafy greens",
            Food::SoftDrinks => "Soft drinks",
            Food::Fruit => "Fruit",
            Food::Eggs => "Eggs",
            Food::Sweets => "Sweets",
            Food::Sweetener => "Sweetener",
            Food::Coffee => "Coffee",
            Food::Tea => "Tea",
            Food::Biscuits => "Biscuits",
        }
    }

    /// Look up a food by its snake_case key.
    pub fn from_key(key: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(key.to_string())).ok()
    }
}

/// How often a food is eaten.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Occasionally,
    Never,
}

impl Frequency {
    pub fn from_key(key: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(key.trim().to_lowercase())).ok()
    }
}

/// Servings per occurrence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Servings {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "+5")]
    MoreThanFive,
}

impl Servings {
    pub fn from_key(key: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(key.trim().to_string())).ok()
    }
}

/// One answered line of the frequency questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodFrequencyItem {
    pub food: Food,
    pub frequency: Option<Frequency>,
    pub servings: Option<Servings>,
}

/// Consumption-frequency questionnaire (one per patient per day).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodFrequency {
    pub patient_id: String,
    pub recorded_on: NaiveDate,
    pub items: Vec<FoodFrequencyItem>,
}

impl FoodFrequency {
    /// Build a questionnaire from raw answers.
    ///
    /// Foods with neither a frequency nor a servings answer are dropped; the
    /// remaining items follow the catalogue order of [`Food::ALL`].
    pub fn from_answers(
        patient_id: String,
        recorded_on: NaiveDate,
        answers: &[FoodFrequencyItem],
    ) -> Self {
        let items = Food::ALL
            .iter()
            .filter_map(|food| answers.iter().rev().find(|a| a.food == *food))
            .filter(|a| a.frequency.is_some() || a.servings.is_some())
            .cloned()
            .collect();

        Self {
            patient_id,
            recorded_on,
            items,
        }
    }

    /// Answer recorded for a given food, if any.
    pub fn item(&self, food: Food) -> Option<&FoodFrequencyItem> {
        self.items.iter().find(|i| i.food == food)
    }
}

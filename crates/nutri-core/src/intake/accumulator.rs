//! Submitted meal entries → stored intake entries.
//!
//! Handles:
//! - Bounded per-slot entry lists (no open-ended field probing)
//! - Quantity parsing with comma or dot decimals
//! - Dropping blank descriptions while preserving submission order

use std::str::FromStr;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{IntakeEntry, MealSlot};

/// Maximum entries accepted for a single meal slot in one submission.
pub const MAX_ENTRIES_PER_SLOT: usize = 100;

/// One meal line as typed by the user, before any parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubmittedEntry {
    pub time: Option<String>,
    pub description: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl SubmittedEntry {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..Default::default()
        }
    }

    pub fn at(mut self, time: &str) -> Self {
        self.time = Some(time.to_string());
        self
    }

    pub fn amount(mut self, quantity: &str, unit: &str) -> Self {
        self.quantity = Some(quantity.to_string());
        self.unit = Some(unit.to_string());
        self
    }
}

/// A day's worth of submitted entries grouped by meal slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntakeSubmission {
    slots: Vec<(MealSlot, Vec<SubmittedEntry>)>,
}

impl IntakeSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a meal slot.
    pub fn push(&mut self, meal: MealSlot, entry: SubmittedEntry) {
        match self.slots.iter_mut().find(|(slot, _)| *slot == meal) {
            Some((_, entries)) => entries.push(entry),
            None => self.slots.push((meal, vec![entry])),
        }
    }

    /// Builder-style variant of [`IntakeSubmission::push`].
    pub fn with(mut self, meal: MealSlot, entry: SubmittedEntry) -> Self {
        self.push(meal, entry);
        self
    }

    /// Submitted entries for a slot, in submission order.
    pub fn entries(&self, meal: MealSlot) -> &[SubmittedEntry] {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == meal)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|(_, entries)| entries.is_empty())
    }
}

/// Parse a quantity, accepting `,` or `.` as decimal separator.
///
/// Returns `None` for blank or unparsable input.
pub fn parse_quantity(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace(',', ".");
    match Decimal::from_str(&normalized) {
        Ok(value) => Some(value.round_dp(2)),
        Err(e) => {
            tracing::warn!(quantity = %trimmed, error = %e, "Unparsable quantity stored as empty");
            None
        }
    }
}

/// Parse a time of day in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Convert a submission into stored entries.
///
/// Slots are visited in [`MealSlot::ALL`] order; entries keep their order
/// within each slot. At most [`MAX_ENTRIES_PER_SLOT`] entries are read per
/// slot.
pub fn accumulate(submission: &IntakeSubmission) -> Vec<IntakeEntry> {
    let mut entries = Vec::new();

    for meal in MealSlot::ALL {
        let submitted = submission.entries(meal);
        if submitted.len() > MAX_ENTRIES_PER_SLOT {
            tracing::warn!(
                meal = meal.code(),
                submitted = submitted.len(),
                limit = MAX_ENTRIES_PER_SLOT,
                "Meal slot over capacity; extra entries ignored"
            );
        }

        for entry in submitted.iter().take(MAX_ENTRIES_PER_SLOT) {
            if let Some(stored) = to_stored(meal, entry) {
                entries.push(stored);
            }
        }
    }

    entries
}

fn to_stored(meal: MealSlot, entry: &SubmittedEntry) -> Option<IntakeEntry> {
    let description = entry.description.trim();
    if description.is_empty() {
        return None;
    }

    Some(IntakeEntry {
        meal,
        time: entry.time.as_deref().and_then(parse_time),
        description: description.to_string(),
        quantity: entry.quantity.as_deref().and_then(parse_quantity),
        unit: entry
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
    })
}

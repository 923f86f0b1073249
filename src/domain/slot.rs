//! Meal slots and facility closures.

use serde::{Deserialize, Serialize};
use time::macros::time;
use time::{Date, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

/// One serving of one meal on one facility-local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSlot {
    pub date: Date,
    pub meal: Meal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealWindow {
    pub start: Time,
    pub end: Time,
}

impl MealWindow {
    pub fn contains(&self, t: Time) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Serving hours for each meal. Informational for scanner displays; the
/// policy itself takes the slot as given and never consults the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealWindows {
    pub breakfast: MealWindow,
    pub lunch: MealWindow,
    pub dinner: MealWindow,
}

impl MealWindows {
    pub fn window_for(&self, meal: Meal) -> MealWindow {
        match meal {
            Meal::Breakfast => self.breakfast,
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
        }
    }

    /// The meal whose serving window contains the given local time, if any.
    pub fn current(&self, t: Time) -> Option<Meal> {
        [Meal::Breakfast, Meal::Lunch, Meal::Dinner]
            .into_iter()
            .find(|m| self.window_for(*m).contains(t))
    }
}

impl Default for MealWindows {
    fn default() -> Self {
        Self {
            breakfast: MealWindow {
                start: time!(07:00),
                end: time!(09:30),
            },
            lunch: MealWindow {
                start: time!(12:00),
                end: time!(14:30),
            },
            dinner: MealWindow {
                start: time!(19:00),
                end: time!(21:30),
            },
        }
    }
}

/// A facility closure over an inclusive date range. `meals: None` closes
/// the whole day; otherwise only the listed meals are affected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureEntry {
    pub from: Date,
    pub to: Date,
    pub meals: Option<Vec<Meal>>,
    pub reason: Option<String>,
}

impl ClosureEntry {
    pub fn applies_to(&self, slot: MealSlot) -> bool {
        if slot.date < self.from || slot.date > self.to {
            return false;
        }
        match &self.meals {
            None => true,
            Some(meals) => meals.contains(&slot.meal),
        }
    }
}

use serde::{Deserialize, Serialize};

/// One calendar day of the canteen plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MealPlanDay {
    /// ISO-8601, UTC
    pub timestamp: String,
    pub meals: Vec<MealEntry>,
}

/// A single dish. Allergen codes are stripped out of the display name and
/// collected separately; the three prices are the student/staff/guest tiers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MealEntry {
    pub name: String,
    pub prices: [f64; 3],
    // spelling as served on the wire
    pub allergenes: Vec<String>,
}

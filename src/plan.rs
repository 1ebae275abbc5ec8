//! Dietary and fitness plan records.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanKind {
    Dietary,
    Fitness,
}

/// One labeled plan: a fixed rationale, the generated body and fixed notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub kind: PlanKind,
    pub title: &'static str,
    pub rationale_label: &'static str,
    pub rationale: &'static str,
    pub body_label: &'static str,
    pub body: String,
    pub notes_label: &'static str,
    /// Newline-separated; see [`Plan::note_items`].
    pub notes: &'static str,
}

const DIETARY_NOTES: &str = "
    - Hydration: Drink plenty of water throughout the day
    - Electrolytes: Monitor sodium, potassium, and magnesium levels
    - Fiber: Ensure adequate intake through vegetables and fruits
    - Listen to your body: Adjust portion sizes as needed
";

const FITNESS_NOTES: &str = "
    - Track your progress regularly
    - Allow proper rest between workouts
    - Focus on proper form
    - Stay consistent with your routine
";

impl Plan {
    pub fn dietary(meal_plan: String) -> Self {
        Self {
            kind: PlanKind::Dietary,
            title: "Your Personalized Dietary Plan",
            rationale_label: "Why this plan works",
            rationale: "High Protein, Healthy Fats, Moderate Carbohydrates, and Caloric Balance",
            body_label: "Meal Plan",
            body: meal_plan,
            notes_label: "Important Considerations",
            notes: DIETARY_NOTES,
        }
    }

    pub fn fitness(routine: String) -> Self {
        Self {
            kind: PlanKind::Fitness,
            title: "Your Personalized Fitness Plan",
            rationale_label: "Goals",
            rationale: "Build strength, improve endurance, and maintain overall fitness",
            body_label: "Exercise Routine",
            body: routine,
            notes_label: "Pro Tips",
            notes: FITNESS_NOTES,
        }
    }

    /// Notes split on newline, trimmed, blank lines dropped.
    pub fn note_items(&self) -> Vec<&str> {
        self.notes
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

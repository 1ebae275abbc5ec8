//! The health profile collected by the form.
//!
//! A [`Profile`] only lives for one submission: it is validated from a
//! [`ProfileForm`], turned into prompt text and dropped. The form values
//! themselves are kept by the session so the inputs re-render as entered.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

pub const AGE_RANGE: RangeInclusive<u32> = 10..=100;
pub const HEIGHT_CM_RANGE: RangeInclusive<f64> = 100.0..=250.0;
pub const WEIGHT_KG_RANGE: RangeInclusive<f64> = 20.0..=300.0;

/// Declares a closed set of form choices whose serialized form is the label
/// shown to the user and embedded in prompts.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum!(Sex {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

choice_enum!(ActivityLevel {
    Sedentary => "Sedentary",
    LightlyActive => "Lightly Active",
    ModeratelyActive => "Moderately Active",
    VeryActive => "Very Active",
    ExtremelyActive => "Extremely Active",
});

choice_enum!(DietaryPreference {
    Vegetarian => "Vegetarian",
    Keto => "Keto",
    GlutenFree => "Gluten Free",
    LowCarb => "Low Carb",
    DairyFree => "Dairy Free",
});

choice_enum!(FitnessGoal {
    LoseWeight => "Lose Weight",
    GainMuscle => "Gain Muscle",
    Endurance => "Endurance",
    StayFit => "Stay Fit",
    StrengthTraining => "Strength Training",
});

/// Raw form submission. Numbers stay as text until [`Profile::from_form`]
/// so a bad value can be reported instead of rejected by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub age: String,
    pub height: String,
    pub weight: String,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub dietary_preference: DietaryPreference,
    pub fitness_goal: FitnessGoal,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            age: AGE_RANGE.start().to_string(),
            height: format_decimal(*HEIGHT_CM_RANGE.start()),
            weight: format_decimal(*WEIGHT_KG_RANGE.start()),
            sex: Sex::default(),
            activity_level: ActivityLevel::default(),
            dietary_preference: DietaryPreference::default(),
            fitness_goal: FitnessGoal::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub dietary_preference: DietaryPreference,
    pub fitness_goal: FitnessGoal,
}

impl Profile {
    /// Validates the numeric bounds the form widgets advertise.
    pub fn from_form(form: &ProfileForm) -> Result<Self, ProfileError> {
        let age: u32 = form
            .age
            .trim()
            .parse()
            .map_err(|_| ProfileError::NotANumber { field: "Age" })?;
        if !AGE_RANGE.contains(&age) {
            return Err(ProfileError::OutOfRange {
                field: "Age",
                min: f64::from(*AGE_RANGE.start()),
                max: f64::from(*AGE_RANGE.end()),
            });
        }

        let height_cm = parse_bounded("Height (cm)", &form.height, &HEIGHT_CM_RANGE)?;
        let weight_kg = parse_bounded("Weight (kg)", &form.weight, &WEIGHT_KG_RANGE)?;

        Ok(Self {
            age,
            height_cm,
            weight_kg,
            sex: form.sex,
            activity_level: form.activity_level,
            dietary_preference: form.dietary_preference,
            fitness_goal: form.fitness_goal,
        })
    }

    /// The prompt handed to both plan agents, one field per line.
    pub fn prompt(&self) -> String {
        format!(
            "Age: {}\nWeight: {}kg\nHeight: {}cm\nSex: {}\nActivity Level: {}\nDietary Preferences: {}\nFitness Goals: {}",
            self.age,
            format_decimal(self.weight_kg),
            format_decimal(self.height_cm),
            self.sex,
            self.activity_level,
            self.dietary_preference,
            self.fitness_goal,
        )
    }
}

fn parse_bounded(
    field: &'static str,
    raw: &str,
    range: &RangeInclusive<f64>,
) -> Result<f64, ProfileError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ProfileError::NotANumber { field })?;
    // NaN fails `contains`, so it is reported as out of range.
    if !range.contains(&value) {
        return Err(ProfileError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(value)
}

/// Whole numbers keep one decimal place (`70.0`), others print as entered.
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

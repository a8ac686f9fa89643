//! # Nutrition Module
//!
//! KBJU (calories, protein, fat, carbohydrates) estimation based on the
//! Mifflin-St Jeor basal metabolic rate formula.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::NutritionError;
use crate::profile::ProfileParams;

/// Protein target in grams per kilogram of body weight
pub const PROTEIN_G_PER_KG: f64 = 1.8;
/// Fat target in grams per kilogram of body weight
pub const FAT_G_PER_KG: f64 = 1.0;
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

pub const LOSS_MULTIPLIER: f64 = 0.85;
pub const GAIN_MULTIPLIER: f64 = 1.15;

lazy_static! {
    static ref NUMBER_REGEX: Regex =
        Regex::new(r"\d+(?:[.,]\d+)?").expect("Number pattern should be valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Recognise a free-text gender answer (English or Russian)
    pub fn parse(text: &str) -> Option<Self> {
        let lower = text.trim().to_lowercase();
        // "female" contains "male", so the female cues are checked first
        if lower.contains("female") || lower.contains("жен") || lower == "ж" || lower == "f" {
            Some(Gender::Female)
        } else if lower.contains("male") || lower.contains("муж") || lower == "м" || lower == "m" {
            Some(Gender::Male)
        } else {
            None
        }
    }

    /// Additive constant of the Mifflin-St Jeor formula
    fn bmr_constant(&self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    Loss,
    Maintain,
    Gain,
}

impl GoalKind {
    /// Classify a free-text goal by keyword
    pub fn classify(goal: &str) -> Self {
        let lower = goal.to_lowercase();
        const LOSS_CUES: &[&str] = &["loss", "lose", "slim", "похуд", "сниж", "сброс", "сушк"];
        const GAIN_CUES: &[&str] = &["gain", "bulk", "mass", "muscle", "набор", "набрать", "масс"];

        if LOSS_CUES.iter().any(|cue| lower.contains(cue)) {
            GoalKind::Loss
        } else if GAIN_CUES.iter().any(|cue| lower.contains(cue)) {
            GoalKind::Gain
        } else {
            GoalKind::Maintain
        }
    }

    pub fn calorie_multiplier(&self) -> f64 {
        match self {
            GoalKind::Loss => LOSS_MULTIPLIER,
            GoalKind::Maintain => 1.0,
            GoalKind::Gain => GAIN_MULTIPLIER,
        }
    }
}

/// Numeric inputs of the calculator
#[derive(Debug, Clone, PartialEq)]
pub struct KbjuInput {
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    pub activity_factor: f64,
    pub goal: GoalKind,
}

/// Daily energy and macronutrient targets
#[derive(Debug, Clone, PartialEq)]
pub struct KbjuEstimate {
    pub bmr: f64,
    pub tdee: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
}

/// Compute BMR, TDEE and goal-adjusted macronutrient targets
pub fn calculate_kbju(input: &KbjuInput) -> KbjuEstimate {
    let bmr = 9.99 * input.weight_kg + 6.25 * input.height_cm - 4.92 * input.age_years
        + input.gender.bmr_constant();
    let tdee = bmr * input.activity_factor;
    let calories = tdee * input.goal.calorie_multiplier();

    let protein_g = PROTEIN_G_PER_KG * input.weight_kg;
    let fat_g = FAT_G_PER_KG * input.weight_kg;
    let carbs_g = ((calories - protein_g * KCAL_PER_G_PROTEIN - fat_g * KCAL_PER_G_FAT)
        / KCAL_PER_G_CARBS)
        .max(0.0);

    KbjuEstimate {
        bmr,
        tdee,
        calories,
        protein_g,
        fat_g,
        carbs_g,
    }
}

/// Extract the first number of a free-text answer ("70", "70 kg", "70,5")
pub fn parse_number(field: &'static str, text: &str) -> Result<f64, NutritionError> {
    let invalid = || NutritionError::InvalidNumber {
        field,
        value: text.to_string(),
    };

    let value: f64 = NUMBER_REGEX
        .find(text)
        .ok_or_else(invalid)?
        .as_str()
        .replace(',', ".")
        .parse()
        .map_err(|_| invalid())?;

    if value <= 0.0 {
        return Err(NutritionError::NonPositive { field, value });
    }
    Ok(value)
}

/// Build calculator input from stored profile parameters
pub fn input_from_params(params: &ProfileParams) -> Result<KbjuInput, NutritionError> {
    let gender =
        Gender::parse(&params.gender).ok_or_else(|| NutritionError::UnknownGender(params.gender.clone()))?;

    if params.activity_factor <= 0.0 {
        return Err(NutritionError::NonPositive {
            field: "activity",
            value: params.activity_factor,
        });
    }

    Ok(KbjuInput {
        gender,
        weight_kg: parse_number("weight", &params.weight)?,
        height_cm: parse_number("height", &params.height)?,
        age_years: parse_number("age", &params.age)?,
        activity_factor: params.activity_factor,
        goal: GoalKind::classify(&params.goal),
    })
}

/// Estimate KBJU straight from stored profile parameters
pub fn estimate_from_params(params: &ProfileParams) -> Result<KbjuEstimate, NutritionError> {
    input_from_params(params).map(|input| calculate_kbju(&input))
}

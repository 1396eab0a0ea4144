//! Canonical record types for one day of reported health activity.
//!
//! A `DailyRecord` is the validated output of the extraction pipeline. It is
//! built exactly once per request, is immutable after validation, and carries
//! no identifier or date — those are attached by the persistence layer.

use serde::{Deserialize, Serialize};

/// One day of structured health data extracted from free text.
///
/// Units are fixed: water in milliliters, distance in kilometers, weight in
/// kilograms, nutrient amounts per their declared unit. Every list defaults
/// to empty rather than absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub water_intake_ml: u32,
    pub food: Vec<FoodItem>,
    pub activities: Vec<Activity>,
    pub skincare: Vec<SkincareStep>,
    pub haircare: Vec<HaircareStep>,
    pub diy: Vec<DiyTreatment>,
}

/// A single food item with its estimated nutrition label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub nutrition_facts: NutritionFacts,
}

/// A full nutrition label. The nutrient set is closed — these fifteen keys
/// and no others. Wire keys are the label-style names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(rename = "Calories")]
    pub calories: u32,
    #[serde(rename = "Total Fat")]
    pub total_fat: GramAmount,
    #[serde(rename = "Saturated Fat")]
    pub saturated_fat: GramAmount,
    #[serde(rename = "Trans Fat")]
    pub trans_fat: GramAmount,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: MilligramAmount,
    #[serde(rename = "Sodium")]
    pub sodium: MilligramAmount,
    #[serde(rename = "Total Carbohydrates")]
    pub total_carbohydrates: GramAmount,
    #[serde(rename = "Dietary Fiber")]
    pub dietary_fiber: GramAmount,
    #[serde(rename = "Total Sugars")]
    pub total_sugars: GramAmount,
    #[serde(rename = "Added Sugars")]
    pub added_sugars: GramAmount,
    #[serde(rename = "Protein")]
    pub protein: GramAmount,
    #[serde(rename = "Vitamin D")]
    pub vitamin_d: MicrogramAmount,
    #[serde(rename = "Calcium")]
    pub calcium: MilligramAmount,
    #[serde(rename = "Iron")]
    pub iron: MilligramAmount,
    #[serde(rename = "Potassium")]
    pub potassium: MilligramAmount,
}

/// A nutrient measured in grams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GramAmount {
    pub amount_g: f64,
    pub daily_value_percent: Option<f64>,
}

/// A nutrient measured in milligrams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilligramAmount {
    pub amount_mg: f64,
    pub daily_value_percent: Option<f64>,
}

/// A nutrient measured in micrograms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MicrogramAmount {
    pub amount_mcg: f64,
    pub daily_value_percent: Option<f64>,
}

/// Self-reported intensity of a physical activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Low,
    Moderate,
    High,
    /// Not stated by the user; serialized as the empty string.
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

/// A physical activity (cardio, strength, sports, flexibility work).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub category: String,
    pub duration_minutes: u32,
    pub distance_km: f64,
    pub intensity_level: IntensityLevel,
    pub calories_burned: u32,
    pub heart_rate: Option<HeartRate>,
    pub sets: Vec<SetDetail>,
    pub notes: String,
    pub location: String,
    pub equipment_used: Vec<String>,
    pub mood_after: String,
    pub progress_metrics: Option<ProgressMetrics>,
}

/// Heart-rate summary for an activity, in beats per minute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRate {
    pub average: u32,
    pub peak: u32,
}

/// One set of a strength exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetDetail {
    pub reps: u32,
    pub weight_kg: f64,
    pub rest_seconds: u32,
}

/// Activity-specific measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub flexibility_cm: f64,
    pub max_speed_kmh: f64,
    pub average_speed_kmh: f64,
}

/// One step of a skincare routine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkincareStep {
    pub product_name: String,
    pub category: String,
    pub brand: String,
    pub time_of_day: String,
    pub ingredients: Vec<String>,
    pub concerns_targeted: Vec<String>,
    pub application_area: String,
    pub quantity_used: String,
    pub duration_minutes: u32,
    pub steps_followed: Vec<String>,
    pub skin_reaction: String,
    /// 0 (unrated) through 5.
    pub effectiveness_rating: u8,
    pub notes: String,
}

/// One haircare treatment or routine step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HaircareStep {
    pub treatment_type: String,
    pub product_name: String,
    pub brand: String,
    pub ingredients: Vec<String>,
    pub hair_concerns: Vec<String>,
    pub duration_minutes: u32,
    pub technique_used: String,
    pub tools_used: Vec<String>,
    pub water_temperature: String,
    pub scalp_condition: String,
    pub hair_texture_after: String,
    /// 0 (unrated) through 5.
    pub effectiveness_rating: u8,
    pub notes: String,
}

/// A home-made remedy or treatment (face mask, hair mask, scrub, pack).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiyTreatment {
    pub recipe_name: String,
    pub category: String,
    pub ingredients: Vec<DiyIngredient>,
    pub preparation_time_minutes: u32,
    pub application_time_minutes: u32,
    pub target_area: String,
    pub preparation_steps: Vec<String>,
    pub storage_info: String,
    pub shelf_life_hours: u32,
    /// 0 (unrated) through 5.
    pub effectiveness_rating: u8,
    pub side_effects_noticed: String,
    pub notes: String,
}

/// One ingredient of a DIY treatment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiyIngredient {
    pub name: String,
    pub quantity: String,
    pub benefits: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrition_facts_serializes_with_label_keys() {
        let facts = NutritionFacts {
            calories: 155,
            protein: GramAmount {
                amount_g: 12.6,
                daily_value_percent: Some(25.0),
            },
            ..NutritionFacts::default()
        };
        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json["Calories"], 155);
        assert!((json["Protein"]["amount_g"].as_f64().unwrap() - 12.6).abs() < f64::EPSILON);
        assert!(json.get("calories").is_none());
        assert!(json.get("Vitamin D").is_some());
    }

    #[test]
    fn test_intensity_level_unspecified_is_empty_string() {
        let json = serde_json::to_string(&IntensityLevel::Unspecified).unwrap();
        assert_eq!(json, r#""""#);
        let parsed: IntensityLevel = serde_json::from_str(r#""""#).unwrap();
        assert_eq!(parsed, IntensityLevel::Unspecified);
    }

    #[test]
    fn test_intensity_level_roundtrip() {
        for (level, wire) in [
            (IntensityLevel::Low, r#""low""#),
            (IntensityLevel::Moderate, r#""moderate""#),
            (IntensityLevel::High, r#""high""#),
        ] {
            assert_eq!(serde_json::to_string(&level).unwrap(), wire);
            let parsed: IntensityLevel = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, level);
        }
    }

    #[test]
    fn test_activity_type_renames_to_type() {
        let activity = Activity {
            activity_type: "running".to_string(),
            ..Activity::default()
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "running");
        assert_eq!(json["intensity_level"], "");
    }

    #[test]
    fn test_daily_record_default_has_empty_lists() {
        let record = DailyRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["water_intake_ml"], 0);
        for field in ["food", "activities", "skincare", "haircare", "diy"] {
            assert!(json[field].as_array().unwrap().is_empty(), "{field}");
        }
    }
}

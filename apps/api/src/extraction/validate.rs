//! Total schema validation and coercion of parsed model output.
//!
//! The model is an untrusted transducer: every field of the record shape is
//! checked here, never assumed present or well-typed. Missing optional fields
//! get their documented defaults, numeric strings are coerced, negative
//! numerics are clamped to zero with a warning, and anything that cannot be
//! made safe fails with a `SchemaViolation` naming the field path.

use serde_json::{Map, Value};
use tracing::warn;

use crate::extraction::ExtractError;
use crate::models::daily_record::{
    Activity, DailyRecord, DiyIngredient, DiyTreatment, FoodItem, GramAmount, HaircareStep,
    HeartRate, IntensityLevel, MicrogramAmount, MilligramAmount, NutritionFacts, ProgressMetrics,
    SetDetail, SkincareStep,
};

type JsonObject = Map<String, Value>;

const GRAM: &str = "amount_g";
const MILLIGRAM: &str = "amount_mg";
const MICROGRAM: &str = "amount_mcg";

/// Unit convention per nutrient. Together with `Calories` this is the full
/// closed set: nothing else is accepted, nothing is dropped silently.
const NUTRIENT_UNITS: &[(&str, &str)] = &[
    ("Total Fat", GRAM),
    ("Saturated Fat", GRAM),
    ("Trans Fat", GRAM),
    ("Cholesterol", MILLIGRAM),
    ("Sodium", MILLIGRAM),
    ("Total Carbohydrates", GRAM),
    ("Dietary Fiber", GRAM),
    ("Total Sugars", GRAM),
    ("Added Sugars", GRAM),
    ("Protein", GRAM),
    ("Vitamin D", MICROGRAM),
    ("Calcium", MILLIGRAM),
    ("Iron", MILLIGRAM),
    ("Potassium", MILLIGRAM),
];

/// Walks a parsed JSON value against the `DailyRecord` shape and returns a
/// fully-populated record, or the first `SchemaViolation` encountered.
pub fn validate_daily_record(value: &Value) -> Result<DailyRecord, ExtractError> {
    let obj = require_object(value, "$")?;

    let food = object_list(obj.get("food"), "food")?
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_food_item(item, &format!("food[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let activities = object_list(obj.get("activities"), "activities")?
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_activity(item, &format!("activities[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let skincare = object_list(obj.get("skincare"), "skincare")?
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_skincare_step(item, &format!("skincare[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let haircare = object_list(obj.get("haircare"), "haircare")?
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_haircare_step(item, &format!("haircare[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let diy = object_list(obj.get("diy"), "diy")?
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_diy_treatment(item, &format!("diy[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DailyRecord {
        water_intake_ml: u32_field(obj.get("water_intake_ml"), "water_intake_ml")?,
        food,
        activities,
        skincare,
        haircare,
        diy,
    })
}

fn validate_food_item(value: &Value, path: &str) -> Result<FoodItem, ExtractError> {
    let obj = require_object(value, path)?;
    let name = required_string(obj.get("name"), &format!("{path}.name"))?;
    let facts_path = format!("{path}.nutrition_facts");
    let facts_value = obj
        .get("nutrition_facts")
        .ok_or_else(|| violation(&facts_path, "missing required object"))?;
    let nutrition_facts = validate_nutrition_facts(facts_value, &facts_path)?;
    Ok(FoodItem {
        name,
        nutrition_facts,
    })
}

fn validate_nutrition_facts(value: &Value, path: &str) -> Result<NutritionFacts, ExtractError> {
    let obj = require_object(value, path)?;

    for key in obj.keys() {
        let known = key == "Calories" || NUTRIENT_UNITS.iter().any(|(name, _)| name == key);
        if !known {
            return Err(violation(
                format!("{path}.{key}"),
                "unexpected nutrient key; the nutrient set is closed",
            ));
        }
    }

    let calories_path = format!("{path}.Calories");
    let calories_value = obj
        .get("Calories")
        .ok_or_else(|| violation(&calories_path, "missing required nutrient"))?;
    let calories = u32_field(Some(calories_value), &calories_path)?;

    Ok(NutritionFacts {
        calories,
        total_fat: gram(obj, "Total Fat", path)?,
        saturated_fat: gram(obj, "Saturated Fat", path)?,
        trans_fat: gram(obj, "Trans Fat", path)?,
        cholesterol: milligram(obj, "Cholesterol", path)?,
        sodium: milligram(obj, "Sodium", path)?,
        total_carbohydrates: gram(obj, "Total Carbohydrates", path)?,
        dietary_fiber: gram(obj, "Dietary Fiber", path)?,
        total_sugars: gram(obj, "Total Sugars", path)?,
        added_sugars: gram(obj, "Added Sugars", path)?,
        protein: gram(obj, "Protein", path)?,
        vitamin_d: microgram(obj, "Vitamin D", path)?,
        calcium: milligram(obj, "Calcium", path)?,
        iron: milligram(obj, "Iron", path)?,
        potassium: milligram(obj, "Potassium", path)?,
    })
}

fn gram(obj: &JsonObject, name: &str, path: &str) -> Result<GramAmount, ExtractError> {
    let (amount_g, daily_value_percent) = nutrient_entry(obj, name, GRAM, path)?;
    Ok(GramAmount {
        amount_g,
        daily_value_percent,
    })
}

fn milligram(obj: &JsonObject, name: &str, path: &str) -> Result<MilligramAmount, ExtractError> {
    let (amount_mg, daily_value_percent) = nutrient_entry(obj, name, MILLIGRAM, path)?;
    Ok(MilligramAmount {
        amount_mg,
        daily_value_percent,
    })
}

fn microgram(obj: &JsonObject, name: &str, path: &str) -> Result<MicrogramAmount, ExtractError> {
    let (amount_mcg, daily_value_percent) = nutrient_entry(obj, name, MICROGRAM, path)?;
    Ok(MicrogramAmount {
        amount_mcg,
        daily_value_percent,
    })
}

/// Reads one nutrient entry. Accepts the canonical `{amount_*, optional
/// daily_value_percent}` object, or a bare number coerced to an amount with
/// no daily value. A wrong unit key is a violation, not a silent drop.
fn nutrient_entry(
    obj: &JsonObject,
    name: &str,
    unit_key: &str,
    path: &str,
) -> Result<(f64, Option<f64>), ExtractError> {
    let field = format!("{path}.{name}");
    let value = obj
        .get(name)
        .ok_or_else(|| violation(&field, "missing required nutrient"))?;

    match value {
        Value::Number(_) | Value::String(_) => Ok((f64_field(Some(value), &field)?, None)),
        Value::Object(entry) => {
            for key in entry.keys() {
                if key != unit_key && key != "daily_value_percent" {
                    return Err(violation(
                        format!("{field}.{key}"),
                        format!("unexpected key; expected `{unit_key}` and optional `daily_value_percent`"),
                    ));
                }
            }
            let amount = f64_field(entry.get(unit_key), &format!("{field}.{unit_key}"))?;
            let daily_value_percent = match entry.get("daily_value_percent") {
                None | Some(Value::Null) => None,
                some => Some(f64_field(some, &format!("{field}.daily_value_percent"))?),
            };
            Ok((amount, daily_value_percent))
        }
        other => Err(violation(
            &field,
            format!("expected an object with `{unit_key}`, got {}", type_name(other)),
        )),
    }
}

fn validate_activity(value: &Value, path: &str) -> Result<Activity, ExtractError> {
    let obj = require_object(value, path)?;

    let sets = object_list(obj.get("sets"), &format!("{path}.sets"))?
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_set(item, &format!("{path}.sets[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Activity {
        activity_type: string_field(obj.get("type"), &format!("{path}.type"))?,
        category: string_field(obj.get("category"), &format!("{path}.category"))?,
        duration_minutes: u32_field(
            obj.get("duration_minutes"),
            &format!("{path}.duration_minutes"),
        )?,
        distance_km: f64_field(obj.get("distance_km"), &format!("{path}.distance_km"))?,
        intensity_level: intensity_field(
            obj.get("intensity_level"),
            &format!("{path}.intensity_level"),
        )?,
        calories_burned: u32_field(
            obj.get("calories_burned"),
            &format!("{path}.calories_burned"),
        )?,
        heart_rate: optional_heart_rate(obj.get("heart_rate"), &format!("{path}.heart_rate"))?,
        sets,
        notes: string_field(obj.get("notes"), &format!("{path}.notes"))?,
        location: string_field(obj.get("location"), &format!("{path}.location"))?,
        equipment_used: string_list(
            obj.get("equipment_used"),
            &format!("{path}.equipment_used"),
        )?,
        mood_after: string_field(obj.get("mood_after"), &format!("{path}.mood_after"))?,
        progress_metrics: optional_progress_metrics(
            obj.get("progress_metrics"),
            &format!("{path}.progress_metrics"),
        )?,
    })
}

fn validate_set(value: &Value, path: &str) -> Result<SetDetail, ExtractError> {
    let obj = require_object(value, path)?;
    Ok(SetDetail {
        reps: u32_field(obj.get("reps"), &format!("{path}.reps"))?,
        weight_kg: f64_field(obj.get("weight_kg"), &format!("{path}.weight_kg"))?,
        rest_seconds: u32_field(obj.get("rest_seconds"), &format!("{path}.rest_seconds"))?,
    })
}

/// The prompt template always renders a `heart_rate` placeholder, so an
/// all-zero entry is the model echoing the template, not data.
fn optional_heart_rate(
    value: Option<&Value>,
    path: &str,
) -> Result<Option<HeartRate>, ExtractError> {
    let obj = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => require_object(v, path)?,
    };
    let heart_rate = HeartRate {
        average: u32_field(obj.get("average"), &format!("{path}.average"))?,
        peak: u32_field(obj.get("peak"), &format!("{path}.peak"))?,
    };
    if heart_rate == HeartRate::default() {
        return Ok(None);
    }
    Ok(Some(heart_rate))
}

fn optional_progress_metrics(
    value: Option<&Value>,
    path: &str,
) -> Result<Option<ProgressMetrics>, ExtractError> {
    let obj = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => require_object(v, path)?,
    };
    let metrics = ProgressMetrics {
        flexibility_cm: f64_field(obj.get("flexibility_cm"), &format!("{path}.flexibility_cm"))?,
        max_speed_kmh: f64_field(obj.get("max_speed_kmh"), &format!("{path}.max_speed_kmh"))?,
        average_speed_kmh: f64_field(
            obj.get("average_speed_kmh"),
            &format!("{path}.average_speed_kmh"),
        )?,
    };
    if metrics == ProgressMetrics::default() {
        return Ok(None);
    }
    Ok(Some(metrics))
}

fn validate_skincare_step(value: &Value, path: &str) -> Result<SkincareStep, ExtractError> {
    let obj = require_object(value, path)?;
    Ok(SkincareStep {
        product_name: required_string(obj.get("product_name"), &format!("{path}.product_name"))?,
        category: required_string(obj.get("category"), &format!("{path}.category"))?,
        brand: string_field(obj.get("brand"), &format!("{path}.brand"))?,
        time_of_day: string_field(obj.get("time_of_day"), &format!("{path}.time_of_day"))?,
        ingredients: string_list(obj.get("ingredients"), &format!("{path}.ingredients"))?,
        concerns_targeted: string_list(
            obj.get("concerns_targeted"),
            &format!("{path}.concerns_targeted"),
        )?,
        application_area: string_field(
            obj.get("application_area"),
            &format!("{path}.application_area"),
        )?,
        quantity_used: string_field(obj.get("quantity_used"), &format!("{path}.quantity_used"))?,
        duration_minutes: u32_field(
            obj.get("duration_minutes"),
            &format!("{path}.duration_minutes"),
        )?,
        steps_followed: string_list(
            obj.get("steps_followed"),
            &format!("{path}.steps_followed"),
        )?,
        skin_reaction: string_field(obj.get("skin_reaction"), &format!("{path}.skin_reaction"))?,
        effectiveness_rating: rating_field(
            obj.get("effectiveness_rating"),
            &format!("{path}.effectiveness_rating"),
        )?,
        notes: string_field(obj.get("notes"), &format!("{path}.notes"))?,
    })
}

fn validate_haircare_step(value: &Value, path: &str) -> Result<HaircareStep, ExtractError> {
    let obj = require_object(value, path)?;
    Ok(HaircareStep {
        treatment_type: required_string(
            obj.get("treatment_type"),
            &format!("{path}.treatment_type"),
        )?,
        product_name: string_field(obj.get("product_name"), &format!("{path}.product_name"))?,
        brand: string_field(obj.get("brand"), &format!("{path}.brand"))?,
        ingredients: string_list(obj.get("ingredients"), &format!("{path}.ingredients"))?,
        hair_concerns: string_list(obj.get("hair_concerns"), &format!("{path}.hair_concerns"))?,
        duration_minutes: u32_field(
            obj.get("duration_minutes"),
            &format!("{path}.duration_minutes"),
        )?,
        technique_used: string_field(
            obj.get("technique_used"),
            &format!("{path}.technique_used"),
        )?,
        tools_used: string_list(obj.get("tools_used"), &format!("{path}.tools_used"))?,
        water_temperature: string_field(
            obj.get("water_temperature"),
            &format!("{path}.water_temperature"),
        )?,
        scalp_condition: string_field(
            obj.get("scalp_condition"),
            &format!("{path}.scalp_condition"),
        )?,
        hair_texture_after: string_field(
            obj.get("hair_texture_after"),
            &format!("{path}.hair_texture_after"),
        )?,
        effectiveness_rating: rating_field(
            obj.get("effectiveness_rating"),
            &format!("{path}.effectiveness_rating"),
        )?,
        notes: string_field(obj.get("notes"), &format!("{path}.notes"))?,
    })
}

fn validate_diy_treatment(value: &Value, path: &str) -> Result<DiyTreatment, ExtractError> {
    let obj = require_object(value, path)?;

    let ingredients_path = format!("{path}.ingredients");
    let ingredient_values = object_list(obj.get("ingredients"), &ingredients_path)?;
    if ingredient_values.is_empty() {
        return Err(violation(
            &ingredients_path,
            "a DIY treatment requires at least one ingredient",
        ));
    }
    let ingredients = ingredient_values
        .into_iter()
        .enumerate()
        .map(|(i, item)| validate_diy_ingredient(item, &format!("{ingredients_path}[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DiyTreatment {
        recipe_name: required_string(obj.get("recipe_name"), &format!("{path}.recipe_name"))?,
        category: required_string(obj.get("category"), &format!("{path}.category"))?,
        ingredients,
        preparation_time_minutes: u32_field(
            obj.get("preparation_time_minutes"),
            &format!("{path}.preparation_time_minutes"),
        )?,
        application_time_minutes: u32_field(
            obj.get("application_time_minutes"),
            &format!("{path}.application_time_minutes"),
        )?,
        target_area: string_field(obj.get("target_area"), &format!("{path}.target_area"))?,
        preparation_steps: string_list(
            obj.get("preparation_steps"),
            &format!("{path}.preparation_steps"),
        )?,
        storage_info: string_field(obj.get("storage_info"), &format!("{path}.storage_info"))?,
        shelf_life_hours: u32_field(
            obj.get("shelf_life_hours"),
            &format!("{path}.shelf_life_hours"),
        )?,
        effectiveness_rating: rating_field(
            obj.get("effectiveness_rating"),
            &format!("{path}.effectiveness_rating"),
        )?,
        side_effects_noticed: string_field(
            obj.get("side_effects_noticed"),
            &format!("{path}.side_effects_noticed"),
        )?,
        notes: string_field(obj.get("notes"), &format!("{path}.notes"))?,
    })
}

fn validate_diy_ingredient(value: &Value, path: &str) -> Result<DiyIngredient, ExtractError> {
    let obj = require_object(value, path)?;
    Ok(DiyIngredient {
        name: required_string(obj.get("name"), &format!("{path}.name"))?,
        quantity: string_field(obj.get("quantity"), &format!("{path}.quantity"))?,
        benefits: string_list(obj.get("benefits"), &format!("{path}.benefits"))?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Field-level helpers
// ────────────────────────────────────────────────────────────────────────────

fn violation(field: impl Into<String>, detail: impl Into<String>) -> ExtractError {
    ExtractError::SchemaViolation {
        field: field.into(),
        detail: detail.into(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn require_object<'a>(value: &'a Value, path: &str) -> Result<&'a JsonObject, ExtractError> {
    value
        .as_object()
        .ok_or_else(|| violation(path, format!("expected an object, got {}", type_name(value))))
}

/// Missing and null become an empty list; a non-array value is a violation.
fn object_list<'a>(value: Option<&'a Value>, path: &str) -> Result<Vec<&'a Value>, ExtractError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(other) => Err(violation(
            path,
            format!("expected an array, got {}", type_name(other)),
        )),
    }
}

/// Non-negative float with coercion: missing/null defaults to 0, numeric
/// strings parse, negatives clamp to 0 with a warning.
fn f64_field(value: Option<&Value>, path: &str) -> Result<f64, ExtractError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| violation(path, "number out of representable range"))?,
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            violation(path, format!("expected a number, got non-numeric string \"{s}\""))
        })?,
        Some(other) => {
            return Err(violation(
                path,
                format!("expected a number, got {}", type_name(other)),
            ))
        }
    };
    if !raw.is_finite() {
        return Err(violation(path, "expected a finite number"));
    }
    if raw < 0.0 {
        warn!("clamping negative value {raw} at `{path}` to 0");
        return Ok(0.0);
    }
    Ok(raw)
}

/// Non-negative integer on top of `f64_field`; fractional values round.
fn u32_field(value: Option<&Value>, path: &str) -> Result<u32, ExtractError> {
    let raw = f64_field(value, path)?;
    Ok(raw.round().min(f64::from(u32::MAX)) as u32)
}

/// Effectiveness ratings live on a 0 (unrated) to 5 scale.
fn rating_field(value: Option<&Value>, path: &str) -> Result<u8, ExtractError> {
    let raw = u32_field(value, path)?;
    if raw > 5 {
        warn!("clamping out-of-range rating {raw} at `{path}` to 5");
        return Ok(5);
    }
    Ok(raw as u8)
}

/// Free-text field: missing/null defaults to empty, numbers coerce to their
/// decimal rendering.
fn string_field(value: Option<&Value>, path: &str) -> Result<String, ExtractError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(violation(
            path,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

fn required_string(value: Option<&Value>, path: &str) -> Result<String, ExtractError> {
    let s = string_field(value, path)?;
    if s.trim().is_empty() {
        return Err(violation(path, "required non-empty string is missing or empty"));
    }
    Ok(s)
}

fn string_list(value: Option<&Value>, path: &str) -> Result<Vec<String>, ExtractError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(violation(
                path,
                format!("expected an array, got {}", type_name(other)),
            ))
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| string_field(Some(item), &format!("{path}[{i}]")))
        .collect()
}

fn intensity_field(value: Option<&Value>, path: &str) -> Result<IntensityLevel, ExtractError> {
    let s = string_field(value, path)?;
    match s.trim().to_lowercase().as_str() {
        "" => Ok(IntensityLevel::Unspecified),
        "low" => Ok(IntensityLevel::Low),
        "moderate" => Ok(IntensityLevel::Moderate),
        "high" => Ok(IntensityLevel::High),
        other => Err(violation(
            path,
            format!("expected one of \"low\", \"moderate\", \"high\" or empty, got \"{other}\""),
        )),
    }
}

// Prompt construction for daily-log extraction. The template renders the
// unit rules, the one-entry-per-mention rule, and the exact target JSON shape
// the validator enforces. Keep the shape here and the checks in validate.rs
// in lockstep.

/// Extraction prompt template. Replace `{user_input}` before sending.
const EXTRACTION_PROMPT_TEMPLATE: &str = r#"You are a health and nutrition assistant.

Given a user's input, extract and estimate structured daily health data including:
- Water intake (in ml)
- Activities (type, duration, distance)
- Skincare, haircare, and DIY routines
- Food items (with name and full detailed nutrition facts)

Each food item must have:
- `name` (string)
- `nutrition_facts` (object) with all standard nutrition label values

Important rules:
- If multiple food items, skincare steps, activities, or DIY routines are mentioned, log each separately in its respective list.
- Standardize all units:
  - Distance -> kilometers
  - Weight -> kilograms
  - Water intake -> milliliters
- If quantities are not provided, intelligently estimate (e.g. 1 glass = 250 ml).
- For food items, estimate nutrition facts using general knowledge.
- If the user mentions emotions after activities (e.g. "felt great after yoga"), capture that under `mood_after`.
- DIY treatments like "haldi pack" or "ice pack" belong under `diy`.
- Skincare entries should note product name, category (e.g. moisturizer, cleanser) and time of day (morning/evening).
- Haircare routines (e.g. oil massage, hair mask) should include products used and techniques.
- All numeric values must be non-negative.

Return the full result in this JSON structure:
{
    "water_intake_ml": 0,
    "food": [
        {
            "name": "",
            "nutrition_facts": {
                "Calories": 0,
                "Total Fat": {"amount_g": 0.0, "daily_value_percent": 0},
                "Saturated Fat": {"amount_g": 0.0, "daily_value_percent": 0},
                "Trans Fat": {"amount_g": 0.0},
                "Cholesterol": {"amount_mg": 0, "daily_value_percent": 0},
                "Sodium": {"amount_mg": 0.0, "daily_value_percent": 0},
                "Total Carbohydrates": {"amount_g": 0.0, "daily_value_percent": 0},
                "Dietary Fiber": {"amount_g": 0.0, "daily_value_percent": 0},
                "Total Sugars": {"amount_g": 0.0},
                "Added Sugars": {"amount_g": 0.0},
                "Protein": {"amount_g": 0.0, "daily_value_percent": 0},
                "Vitamin D": {"amount_mcg": 0, "daily_value_percent": 0},
                "Calcium": {"amount_mg": 0.0, "daily_value_percent": 0},
                "Iron": {"amount_mg": 0.0, "daily_value_percent": 0},
                "Potassium": {"amount_mg": 0.0, "daily_value_percent": 0}
            }
        }
    ],
    "activities": [
        {
            "type": "",
            "category": "",  // e.g. "cardio", "strength", "flexibility", "sports"
            "duration_minutes": 0,
            "distance_km": 0,
            "intensity_level": "",  // "low", "moderate", "high"
            "calories_burned": 0,
            "heart_rate": {
                "average": 0,
                "peak": 0
            },
            "sets": [  // for strength training
                {
                    "reps": 0,
                    "weight_kg": 0,
                    "rest_seconds": 0
                }
            ],
            "notes": "",  // for additional details
            "location": "",  // "indoor", "outdoor", specific location
            "equipment_used": [],  // list of equipment
            "mood_after": "",  // how the user felt after the activity
            "progress_metrics": {  // activity-specific measurements
                "flexibility_cm": 0,
                "max_speed_kmh": 0,
                "average_speed_kmh": 0
            }
        }
    ],
    "skincare": [
        {
            "product_name": "",
            "category": "",  // "cleanser", "toner", "serum", "moisturizer", "sunscreen", "mask"
            "brand": "",
            "time_of_day": "",  // "morning", "evening", "both"
            "ingredients": [],
            "concerns_targeted": [],  // "acne", "aging", "pigmentation", etc.
            "application_area": "",  // "face", "neck", "full_body"
            "quantity_used": "",
            "duration_minutes": 0,
            "steps_followed": [],
            "skin_reaction": "",  // immediate skin response
            "effectiveness_rating": 0,  // 1-5 scale
            "notes": ""
        }
    ],
    "haircare": [
        {
            "treatment_type": "",  // "wash", "mask", "oil", "styling", "treatment"
            "product_name": "",
            "brand": "",
            "ingredients": [],
            "hair_concerns": [],  // "dandruff", "hair_fall", "frizz", etc.
            "duration_minutes": 0,
            "technique_used": "",
            "tools_used": [],  // "hair_dryer", "straightener", etc.
            "water_temperature": "",  // "cold", "lukewarm", "hot"
            "scalp_condition": "",
            "hair_texture_after": "",
            "effectiveness_rating": 0,
            "notes": ""
        }
    ],
    "diy": [
        {
            "recipe_name": "",
            "category": "",  // "face_mask", "hair_mask", "scrub", "pack"
            "ingredients": [
                {
                    "name": "",
                    "quantity": "",
                    "benefits": []
                }
            ],
            "preparation_time_minutes": 0,
            "application_time_minutes": 0,
            "target_area": "",
            "preparation_steps": [],
            "storage_info": "",
            "shelf_life_hours": 0,
            "effectiveness_rating": 0,
            "side_effects_noticed": "",
            "notes": ""
        }
    ]
}

Only respond with valid JSON, no extra explanation.

User input: {user_input}"#;

/// Renders the extraction prompt for one user message. Pure and
/// deterministic: the same text always produces a byte-identical prompt.
pub fn build_prompt(user_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{user_input}", user_text)
}

use crate::models::ChatRequest;

/// Prompt templates for the chat layer, one per client action.

pub fn general_nutrition_prompt() -> String {
    "You are \"EatRight Assistant\", a friendly, witty, and supportive diet and nutrition chatbot.\n\
     You always answer in a short, clear, and encouraging way.\n\
     You give responses based on the user's profile (age, health conditions, dietary preferences) if available.\n\
     When giving calorie or nutrient info, always include a fun, relatable comparison (e.g., \"That's like 5 bananas 🍌\").\n\
     Avoid medical claims; instead, give educational, friendly advice."
        .to_string()
}

pub fn scan_result_prompt(
    dish_name: &str,
    nutrition_info: &str,
    health_conditions: &str,
    diet_preferences: &str,
) -> String {
    format!(
        "You are my food health guide. I just scanned this dish: {}.\n\
         Here's the nutrition info: {}.\n\
         My health conditions: {}.\n\
         My dietary preferences: {}.\n\
         \n\
         Explain in 3-4 sentences:\n\
         1. Is it good for me? Why or why not?\n\
         2. Healthier ways to prepare it or eat it.\n\
         3. Any fun fact about the dish or ingredients.",
        dish_name, nutrition_info, health_conditions, diet_preferences
    )
}

pub fn search_dish_prompt(
    dish_name: &str,
    nutrition_info: &str,
    health_conditions: &str,
    diet_preferences: &str,
) -> String {
    format!(
        "I searched for this dish: {}.\n\
         Here's its nutrition: {}.\n\
         Given my health profile ({}, {}),\n\
         give me:\n\
         1. A short verdict (\"Good for you\", \"Eat in moderation\", etc.).\n\
         2. 1-2 quick healthier alternatives.\n\
         3. A friendly closing tip in a fun tone.",
        dish_name, nutrition_info, health_conditions, diet_preferences
    )
}

pub fn meal_plan_prompt(
    days: u32,
    calorie_limit: u32,
    diet_preferences: &str,
    health_conditions: &str,
) -> String {
    format!(
        "Create a {}-day meal plan under {} calories per day.\n\
         Include breakfast, lunch, dinner, and 1 snack.\n\
         Make it suitable for: {}, with these health conditions: {}.\n\
         Reply in a clear, bullet-point list with calorie counts per meal.",
        days, calorie_limit, diet_preferences, health_conditions
    )
}

pub fn recipe_helper_prompt(dish_name: &str, health_conditions: &str, diet_preferences: &str) -> String {
    format!(
        "I want to make {}.\n\
         Suggest a step-by-step recipe.\n\
         For each step, add a healthier alternative if possible, keeping my profile in mind:\n\
         Health: {}\n\
         Diet: {}.",
        dish_name, health_conditions, diet_preferences
    )
}

pub fn fun_fact_prompt(ingredient_name: &str) -> String {
    format!(
        "Tell me one surprising or fun health fact about {}, in 2-3 sentences, \
         and make it engaging for a young audience.",
        ingredient_name
    )
}

/// Selects the template matching the request's action; unknown or missing
/// actions get the general persona with the raw query appended.
pub fn chatbot_prompt(request: &ChatRequest) -> String {
    let dish_name = request.dish_name.as_deref().unwrap_or("");
    let nutrition_info = request.nutrition_info.as_deref().unwrap_or("");
    let health_conditions = request.health_conditions.as_deref().unwrap_or("");
    let diet_preferences = request.diet_preferences.as_deref().unwrap_or("");

    match request.action.as_deref() {
        Some("scan") => scan_result_prompt(dish_name, nutrition_info, health_conditions, diet_preferences),
        Some("search") => search_dish_prompt(dish_name, nutrition_info, health_conditions, diet_preferences),
        Some("meal_plan") => meal_plan_prompt(
            request.days.unwrap_or(3),
            request.calorie_limit.unwrap_or(2000),
            diet_preferences,
            health_conditions,
        ),
        Some("recipe") => recipe_helper_prompt(dish_name, health_conditions, diet_preferences),
        Some("fun_fact") => fun_fact_prompt(request.ingredient_name.as_deref().unwrap_or("")),
        _ => format!("{}\n\n{}", general_nutrition_prompt(), request.query),
    }
}

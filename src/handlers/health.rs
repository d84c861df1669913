use crate::models::{HealthAdvice, HealthVerdict, NutritionProfile};

/// Threshold-based health verdict: a dish is flagged when it is a biryani,
/// or fat exceeds 12g, or sodium exceeds 500mg per 100g. Incomplete
/// nutrition data gets a plain "no verdict" message instead.
pub fn health_verdict(dish_name: &str, nutrition: &NutritionProfile) -> HealthAdvice {
    if !nutrition.is_complete() {
        return HealthAdvice::Unavailable(
            "No health verdict available due to missing nutrition data.".to_string(),
        );
    }

    let fats = nutrition.fats.unwrap_or(0.0);
    let sodium = nutrition.sodium.unwrap_or(0.0);
    let dish_lower = dish_name.to_lowercase();

    let verdict = if dish_lower.contains("biryani") || fats > 12.0 || sodium > 500.0 {
        HealthVerdict {
            warning: "⚠️ High cholesterol: Avoid biryanis or oily dishes".to_string(),
            suggested: "✅ Suggested Alternative: Grilled chicken with steamed rice".to_string(),
        }
    } else {
        HealthVerdict {
            warning: "👍 This dish seems okay in moderation.".to_string(),
            suggested: "Try grilled or steamed versions for best health.".to_string(),
        }
    };

    HealthAdvice::Verdict(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile(fats: f64, sodium: Option<f64>) -> NutritionProfile {
        NutritionProfile {
            calories: Some(300.0),
            protein: Some(20.0),
            fats: Some(fats),
            carbs: Some(30.0),
            sodium,
            healthier_substitute: Some("Steam it".to_string()),
            ..Default::default()
        }
    }

    fn warning_of(advice: HealthAdvice) -> String {
        match advice {
            HealthAdvice::Verdict(v) => v.warning,
            HealthAdvice::Unavailable(msg) => panic!("expected a verdict, got: {}", msg),
        }
    }

    #[test]
    fn test_biryani_is_always_flagged() {
        let advice = health_verdict("Chicken Biryani", &complete_profile(5.0, Some(100.0)));
        assert!(warning_of(advice).contains("High cholesterol"));
    }

    #[test]
    fn test_high_fat_is_flagged() {
        let advice = health_verdict("grilled fish", &complete_profile(12.5, Some(100.0)));
        assert!(warning_of(advice).contains("High cholesterol"));
    }

    #[test]
    fn test_high_sodium_is_flagged() {
        let advice = health_verdict("grilled fish", &complete_profile(5.0, Some(650.0)));
        assert!(warning_of(advice).contains("High cholesterol"));
    }

    #[test]
    fn test_moderate_dish_is_okay() {
        let advice = health_verdict("grilled fish", &complete_profile(5.0, Some(100.0)));
        assert!(warning_of(advice).contains("okay in moderation"));
    }

    #[test]
    fn test_missing_sodium_reads_as_zero() {
        let advice = health_verdict("grilled fish", &complete_profile(5.0, None));
        assert!(warning_of(advice).contains("okay in moderation"));
    }

    #[test]
    fn test_incomplete_nutrition_has_no_verdict() {
        let mut profile = complete_profile(5.0, Some(100.0));
        profile.protein = None;

        match health_verdict("grilled fish", &profile) {
            HealthAdvice::Unavailable(msg) => {
                assert!(msg.contains("missing nutrition data"));
            }
            HealthAdvice::Verdict(_) => panic!("expected no verdict"),
        }
    }
}

//! Nutrition Targets
//!
//! Mifflin-St Jeor BMR and the daily calorie / macro targets derived from a profile.
//!
//! ```text
//! BMR (M) = 10·kg + 6.25·cm − 5·age + 5
//! BMR (F) = 10·kg + 6.25·cm − 5·age − 161
//! daily   = BMR · activity + 500 · goal
//! ```

use serde::{Deserialize, Serialize};

use crate::db::{FoodLogEntry, Nutrients, ProfileFields};
use crate::types::Gender;

/// 허용되는 활동 계수
pub const ACTIVITY_LEVELS: [f64; 5] = [1.2, 1.375, 1.55, 1.725, 1.9];

/// -1 감량, 0 유지, 1 증량
pub const WEIGHT_GOALS: [i32; 3] = [-1, 0, 1];

/// 체중 목표 1단계당 하루 칼로리 증감
const GOAL_CALORIE_STEP: f64 = 500.0;

// 칼로리 대비 매크로 비율
const PROTEIN_SHARE: f64 = 0.25;
const CARB_SHARE: f64 = 0.45;
const FAT_SHARE: f64 = 0.30;

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARB: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// 프로필 기반 하루 권장량
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub bmr: f64,
    pub daily_calories: f64,
    /// grams
    pub proteins: f64,
    pub carbohydrates: f64,
    pub fats: f64,
}

pub fn bmr(profile: &ProfileFields) -> f64 {
    let base = 10.0 * profile.weight + 6.25 * profile.height - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

pub fn daily_calories(profile: &ProfileFields) -> f64 {
    bmr(profile) * profile.activity_level + GOAL_CALORIE_STEP * f64::from(profile.weight_goal)
}

pub fn targets(profile: &ProfileFields) -> NutritionTargets {
    let calories = daily_calories(profile);
    NutritionTargets {
        bmr: bmr(profile),
        daily_calories: calories,
        proteins: calories * PROTEIN_SHARE / KCAL_PER_GRAM_PROTEIN,
        carbohydrates: calories * CARB_SHARE / KCAL_PER_GRAM_CARB,
        fats: calories * FAT_SHARE / KCAL_PER_GRAM_FAT,
    }
}

/// 여러 기록의 영양소 합계
pub fn sum_totals<'a>(entries: impl IntoIterator<Item = &'a FoodLogEntry>) -> Nutrients {
    entries
        .into_iter()
        .fold(Nutrients::default(), |acc, entry| acc + entry.totals())
}

pub fn is_valid_activity_level(level: f64) -> bool {
    ACTIVITY_LEVELS.iter().any(|l| (l - level).abs() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::db::FoodItem;

    fn profile(gender: Gender) -> ProfileFields {
        ProfileFields {
            height: 180.0,
            weight: 80.0,
            age: 30,
            gender,
            activity_level: 1.2,
            weight_goal: 0,
        }
    }

    #[test]
    fn test_bmr_mifflin_st_jeor() {
        // 800 + 1125 - 150
        assert!((bmr(&profile(Gender::Male)) - 1780.0).abs() < 1e-9);
        assert!((bmr(&profile(Gender::Female)) - 1614.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_calories_apply_activity_and_goal() {
        let mut p = profile(Gender::Male);
        assert!((daily_calories(&p) - 2136.0).abs() < 1e-9);

        p.weight_goal = -1;
        assert!((daily_calories(&p) - 1636.0).abs() < 1e-9);

        p.weight_goal = 1;
        p.activity_level = 1.55;
        assert!((daily_calories(&p) - (1780.0 * 1.55 + 500.0)).abs() < 1e-9);
    }

    #[test]
    fn test_macro_targets_split_calories() {
        let t = targets(&profile(Gender::Male));
        let from_macros = t.proteins * 4.0 + t.carbohydrates * 4.0 + t.fats * 9.0;
        assert!((from_macros - t.daily_calories).abs() < 1e-6);
        assert!((t.proteins - 2136.0 * 0.25 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_profile_targets() {
        // 170cm / 70kg / 25 / M / 1.375
        let t = targets(&ProfileFields::default());
        assert!((t.bmr - 1642.5).abs() < 1e-9);
        assert!((t.daily_calories - 1642.5 * 1.375).abs() < 1e-9);
    }

    #[test]
    fn test_sum_totals() {
        let food = FoodItem {
            id: 1,
            name: "Oats".into(),
            manufacturer: "Mill".into(),
            category: "grains".into(),
            calories_per_100g: 380.0,
            proteins_per_100g: 13.0,
            carbohydrates_per_100g: 67.0,
            fats_per_100g: 7.0,
        };
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let entries = vec![
            FoodLogEntry { id: 1, user_id: 1, date, quantity_in_grams: 50.0, food_item: food.clone() },
            FoodLogEntry { id: 2, user_id: 1, date, quantity_in_grams: 150.0, food_item: food },
        ];

        let totals = sum_totals(&entries);
        assert!((totals.calories - 760.0).abs() < 1e-9);
        assert!((totals.proteins - 26.0).abs() < 1e-9);
        assert_eq!(sum_totals(&Vec::new()), Nutrients::default());
    }

    #[test]
    fn test_activity_levels() {
        assert!(is_valid_activity_level(1.375));
        assert!(!is_valid_activity_level(0.0));
        assert!(!is_valid_activity_level(1.3));
    }
}

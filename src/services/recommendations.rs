//! Eating-habit recommendations
//!
//! Looks at the last few days of logs, groups them by food category and applies a
//! small rule table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::FoodLogEntry;
use crate::types::FoodCategory;

/// 분석 기간 (오늘 포함, 오늘 - 3일부터)
pub const WINDOW_DAYS: i64 = 3;

const FAST_FOOD_CALORIE_LIMIT: f64 = 500.0;
const SWEETS_CALORIE_LIMIT: f64 = 300.0;
const MIN_VEGETABLE_ENTRIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Warning,
    Suggestion,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub counts: BTreeMap<FoodCategory, usize>,
    pub calories: BTreeMap<FoodCategory, f64>,
}

impl CategoryStats {
    pub fn from_entries(entries: &[FoodLogEntry]) -> Self {
        let mut stats = CategoryStats::default();
        for entry in entries {
            let category = entry.food_item.category();
            *stats.counts.entry(category).or_default() += 1;
            *stats.calories.entry(category).or_default() += entry.total_calories();
        }
        stats
    }

    pub fn count(&self, category: FoodCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn calories(&self, category: FoodCategory) -> f64 {
        self.calories.get(&category).copied().unwrap_or(0.0)
    }
}

fn suggestions(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn recommend(stats: &CategoryStats) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if stats.calories(FoodCategory::FastFood) > FAST_FOOD_CALORIE_LIMIT {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Warning,
            message: "You are eating too much fast food. Try replacing it with healthier meals."
                .to_string(),
            suggestions: suggestions(&["vegetables", "fruits", "whole grains"]),
        });
    }

    if stats.count(FoodCategory::Vegetables) < MIN_VEGETABLE_ENTRIES {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Suggestion,
            message: "Add more vegetables to your diet for balanced nutrition.".to_string(),
            suggestions: suggestions(&["salad", "broccoli", "carrots"]),
        });
    }

    if stats.calories(FoodCategory::Sweets) > SWEETS_CALORIE_LIMIT {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Warning,
            message: "High intake of sweets. Try replacing them with fruit.".to_string(),
            suggestions: suggestions(&["apples", "pears", "berries"]),
        });
    }

    recommendations
}

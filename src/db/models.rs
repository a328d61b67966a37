//! Database Models
//!
//! Rows for accounts, the food catalogue, per-user food logs, profiles and the
//! crowd-sourced submission queue. Nutrient values are stored per 100 g.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{FoodCategory, Gender};

/// 사용자 계정
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// bcrypt 해시 문자열
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 100 g 기준 영양 정보
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub proteins: f64,
    pub carbohydrates: f64,
    pub fats: f64,
}

impl Nutrients {
    /// `grams`만큼 먹었을 때의 양
    pub fn scaled(&self, grams: f64) -> Nutrients {
        let factor = grams / 100.0;
        Nutrients {
            calories: self.calories * factor,
            proteins: self.proteins * factor,
            carbohydrates: self.carbohydrates * factor,
            fats: self.fats * factor,
        }
    }
}

impl std::ops::Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            proteins: self.proteins + rhs.proteins,
            carbohydrates: self.carbohydrates + rhs.carbohydrates,
            fats: self.fats + rhs.fats,
        }
    }
}

/// 승인된 음식 (검색/기록 대상)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub category: String,
    pub calories_per_100g: f64,
    pub proteins_per_100g: f64,
    pub carbohydrates_per_100g: f64,
    pub fats_per_100g: f64,
}

impl FoodItem {
    pub fn category(&self) -> FoodCategory {
        FoodCategory::from_column(&self.category)
    }

    pub fn per_100g(&self) -> Nutrients {
        Nutrients {
            calories: self.calories_per_100g,
            proteins: self.proteins_per_100g,
            carbohydrates: self.carbohydrates_per_100g,
            fats: self.fats_per_100g,
        }
    }

    /// "name (manufacturer)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.manufacturer)
    }
}

/// 새 음식 데이터 (제출 또는 승인 시 사용)
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodItem {
    pub name: String,
    pub manufacturer: String,
    pub category: FoodCategory,
    pub per_100g: Nutrients,
}

/// 음식 섭취 기록 + 해당 음식
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub quantity_in_grams: f64,
    pub food_item: FoodItem,
}

impl FoodLogEntry {
    pub fn totals(&self) -> Nutrients {
        self.food_item.per_100g().scaled(self.quantity_in_grams)
    }

    pub fn total_calories(&self) -> f64 {
        self.totals().calories
    }
}

/// food_item_logs JOIN food_items 결과 행
#[derive(Debug, FromRow)]
pub(crate) struct FoodLogRow {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub quantity_in_grams: f64,
    pub food_item_id: i64,
    pub food_name: String,
    pub food_manufacturer: String,
    pub food_category: String,
    pub calories_per_100g: f64,
    pub proteins_per_100g: f64,
    pub carbohydrates_per_100g: f64,
    pub fats_per_100g: f64,
}

impl From<FoodLogRow> for FoodLogEntry {
    fn from(row: FoodLogRow) -> Self {
        FoodLogEntry {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            quantity_in_grams: row.quantity_in_grams,
            food_item: FoodItem {
                id: row.food_item_id,
                name: row.food_name,
                manufacturer: row.food_manufacturer,
                category: row.food_category,
                calories_per_100g: row.calories_per_100g,
                proteins_per_100g: row.proteins_per_100g,
                carbohydrates_per_100g: row.carbohydrates_per_100g,
                fats_per_100g: row.fats_per_100g,
            },
        }
    }
}

/// 새 섭취 기록
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub user_id: i64,
    pub food_item_id: i64,
    pub date: NaiveDate,
    pub quantity_in_grams: f64,
}

/// 사용자 신체 정보 (1:1)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    /// cm
    pub height: f64,
    /// kg
    pub weight: f64,
    pub age: i32,
    /// "M" | "F"
    pub gender: String,
    /// 활동 계수 (1.2 ~ 1.9)
    pub activity_level: f64,
    /// -1 감량, 0 유지, 1 증량
    pub weight_goal: i32,
}

/// 사용자가 수정할 수 있는 프로필 필드
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    pub height: f64,
    pub weight: f64,
    pub age: i32,
    pub gender: Gender,
    pub activity_level: f64,
    pub weight_goal: i32,
}

impl Default for ProfileFields {
    fn default() -> Self {
        Self {
            height: 170.0,
            weight: 70.0,
            age: 25,
            gender: Gender::Male,
            activity_level: 1.375,
            weight_goal: 0,
        }
    }
}

impl Profile {
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            height: self.height,
            weight: self.weight,
            age: self.age,
            gender: Gender::parse(self.gender.trim()).unwrap_or(Gender::Male),
            activity_level: self.activity_level,
            weight_goal: self.weight_goal,
        }
    }
}

pub const STATUS_PENDING: &str = "pending";

/// pending_food_items 행 (투표 제외)
#[derive(Debug, FromRow)]
pub(crate) struct PendingFoodRow {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub category: String,
    pub calories_per_100g: f64,
    pub proteins_per_100g: f64,
    pub carbohydrates_per_100g: f64,
    pub fats_per_100g: f64,
    pub submitted_by: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 검토 대기 중인 음식 + 찬반 투표자
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingFoodItem {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub category: String,
    pub calories_per_100g: f64,
    pub proteins_per_100g: f64,
    pub carbohydrates_per_100g: f64,
    pub fats_per_100g: f64,
    pub submitted_by: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub votes_to_approve: Vec<i64>,
    pub votes_to_reject: Vec<i64>,
}

impl PendingFoodItem {
    pub(crate) fn from_row(row: PendingFoodRow, approve: Vec<i64>, reject: Vec<i64>) -> Self {
        PendingFoodItem {
            id: row.id,
            name: row.name,
            manufacturer: row.manufacturer,
            category: row.category,
            calories_per_100g: row.calories_per_100g,
            proteins_per_100g: row.proteins_per_100g,
            carbohydrates_per_100g: row.carbohydrates_per_100g,
            fats_per_100g: row.fats_per_100g,
            submitted_by: row.submitted_by,
            status: row.status,
            created_at: row.created_at,
            votes_to_approve: approve,
            votes_to_reject: reject,
        }
    }

    /// 승인 시 food_items에 들어갈 데이터
    pub fn to_new_food_item(&self) -> NewFoodItem {
        NewFoodItem {
            name: self.name.clone(),
            manufacturer: self.manufacturer.clone(),
            category: FoodCategory::from_column(&self.category),
            per_100g: Nutrients {
                calories: self.calories_per_100g,
                proteins: self.proteins_per_100g,
                carbohydrates: self.carbohydrates_per_100g,
                fats: self.fats_per_100g,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> FoodItem {
        FoodItem {
            id: 1,
            name: "Apple".into(),
            manufacturer: "Nature".into(),
            category: "fruits".into(),
            calories_per_100g: 52.0,
            proteins_per_100g: 0.3,
            carbohydrates_per_100g: 14.0,
            fats_per_100g: 0.2,
        }
    }

    #[test]
    fn test_log_totals_scale_by_quantity() {
        let entry = FoodLogEntry {
            id: 1,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quantity_in_grams: 250.0,
            food_item: apple(),
        };

        let totals = entry.totals();
        assert!((totals.calories - 130.0).abs() < 1e-9);
        assert!((totals.carbohydrates - 35.0).abs() < 1e-9);
        assert!((totals.fats - 0.5).abs() < 1e-9);
        assert_eq!(entry.total_calories(), totals.calories);
    }

    #[test]
    fn test_food_item_label_and_category() {
        let item = apple();
        assert_eq!(item.label(), "Apple (Nature)");
        assert_eq!(item.category(), FoodCategory::Fruits);
    }

    #[test]
    fn test_profile_fields_parse_gender() {
        let profile = Profile {
            id: 1,
            user_id: 1,
            height: 165.0,
            weight: 60.0,
            age: 30,
            gender: "F".into(),
            activity_level: 1.2,
            weight_goal: -1,
        };
        assert_eq!(profile.fields().gender, Gender::Female);
    }
}

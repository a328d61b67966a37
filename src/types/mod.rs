//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ApiError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 폼 필드별 검증 에러 (field → messages)
///
/// `__all__`은 특정 필드에 속하지 않는 에러 (예: 로그인 실패)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// 에러가 하나라도 있으면 422로 변환
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Form(self))
        }
    }
}

/// 사용자 피드백 메시지 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }
}

/// 음식 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    FastFood,
    Fruits,
    Vegetables,
    Meat,
    Dairy,
    Grains,
    Sweets,
    Drinks,
    Other,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 9] = [
        FoodCategory::FastFood,
        FoodCategory::Fruits,
        FoodCategory::Vegetables,
        FoodCategory::Meat,
        FoodCategory::Dairy,
        FoodCategory::Grains,
        FoodCategory::Sweets,
        FoodCategory::Drinks,
        FoodCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::FastFood => "fast_food",
            FoodCategory::Fruits => "fruits",
            FoodCategory::Vegetables => "vegetables",
            FoodCategory::Meat => "meat",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grains => "grains",
            FoodCategory::Sweets => "sweets",
            FoodCategory::Drinks => "drinks",
            FoodCategory::Other => "other",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }

    /// 화면 표시용 이름
    pub fn display_name(&self) -> &'static str {
        match self {
            FoodCategory::FastFood => "Fast food",
            FoodCategory::Fruits => "Fruits",
            FoodCategory::Vegetables => "Vegetables",
            FoodCategory::Meat => "Meat",
            FoodCategory::Dairy => "Dairy products",
            FoodCategory::Grains => "Grains",
            FoodCategory::Sweets => "Sweets",
            FoodCategory::Drinks => "Drinks",
            FoodCategory::Other => "Other",
        }
    }

    /// DB에 저장된 값 → 분류. 알 수 없는 값은 Other
    pub fn from_column(key: &str) -> Self {
        Self::parse(key).unwrap_or(FoodCategory::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// `?date=YYYY-MM-DD` 파싱. 없으면 `default`
pub fn parse_date(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, ApiError> {
    match raw {
        None | Some("") => Ok(default),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|_| ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

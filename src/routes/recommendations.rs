//! Recommendations Endpoint

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::{
    error::ApiError,
    services::{
        recommendations::{self, CategoryStats, Recommendation, WINDOW_DAYS},
        AuthUser,
    },
    AppState,
};

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub name: &'static str,
    pub count: usize,
    pub calories: f64,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub no_data: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_message: Option<String>,
    pub recommendations: Vec<Recommendation>,
    /// 분류 키 → 건수/칼로리
    pub categories: BTreeMap<&'static str, CategorySummary>,
}

/// GET /recommendations/
///
/// 오늘 포함 최근 기록을 분류별로 집계해 조언을 만든다.
pub async fn get_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let end_date = chrono::Local::now().date_naive();
    let start_date = end_date - Duration::days(WINDOW_DAYS);

    let entries = state.repo.logs_between(user.id, start_date, end_date).await?;

    if entries.is_empty() {
        return Ok(Json(RecommendationsResponse {
            no_data: true,
            start_date,
            end_date,
            message: Some("Not enough data for recommendations.".to_string()),
            sub_message: Some(
                "Add your meals for a few days to receive personalised advice.".to_string(),
            ),
            recommendations: Vec::new(),
            categories: BTreeMap::new(),
        }));
    }

    let stats = CategoryStats::from_entries(&entries);
    let categories = stats
        .counts
        .keys()
        .map(|category| {
            (
                category.as_str(),
                CategorySummary {
                    name: category.display_name(),
                    count: stats.count(*category),
                    calories: stats.calories(*category),
                },
            )
        })
        .collect();

    Ok(Json(RecommendationsResponse {
        no_data: false,
        start_date,
        end_date,
        message: None,
        sub_message: None,
        recommendations: recommendations::recommend(&stats),
        categories,
    }))
}

//! Food Log Endpoints
//!
//! 하루 단위 섭취 기록. 목록 응답에는 하루 합계, 권장량, 남은 칼로리가 포함된다.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    db::{FoodItem, FoodLogEntry, NewFoodLog},
    error::ApiError,
    routes::{profile::targets_for, JsonBody},
    services::{nutrition::sum_totals, AuthUser},
    types::{format_date, parse_date, FieldErrors},
    AppState,
};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// YYYY-MM-DD (기본: 오늘)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogFoodRequest {
    pub food_item: Option<i64>,
    pub quantity_in_grams: Option<f64>,
}

/// 기록 한 건 + 섭취량 기준 영양소
#[derive(Debug, Serialize)]
pub struct LogEntryView {
    pub id: i64,
    pub date: NaiveDate,
    pub food_item: FoodItem,
    pub quantity_in_grams: f64,
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_carbohydrates: f64,
    pub total_fats: f64,
}

impl From<FoodLogEntry> for LogEntryView {
    fn from(entry: FoodLogEntry) -> Self {
        let totals = entry.totals();
        LogEntryView {
            id: entry.id,
            date: entry.date,
            food_item: entry.food_item,
            quantity_in_grams: entry.quantity_in_grams,
            total_calories: totals.calories,
            total_proteins: totals.proteins,
            total_carbohydrates: totals.carbohydrates,
            total_fats: totals.fats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub selected_date: NaiveDate,
    pub previous_date: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
    pub food_item_logs: Vec<LogEntryView>,
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_carbohydrates: f64,
    pub total_fats: f64,
    pub recommended_calories: f64,
    pub recommended_proteins: f64,
    pub recommended_carbs: f64,
    pub recommended_fats: f64,
    pub remaining_calories: f64,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub log_entry: LogEntryView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: i64,
    pub redirect: String,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn day_redirect(date: NaiveDate) -> String {
    format!("/log_food/?date={}", format_date(date))
}

/// 음식 존재 여부 + 양 > 0
async fn validate_log(state: &AppState, req: LogFoodRequest) -> Result<(FoodItem, f64), ApiError> {
    let mut errors = FieldErrors::default();

    let food_item = match req.food_item {
        Some(id) => {
            let found = state.repo.find_food_item(id).await?;
            if found.is_none() {
                errors.add(
                    "food_item",
                    "Select a valid choice. That choice is not one of the available choices.",
                );
            }
            found
        }
        None => {
            errors.add("food_item", "This field is required.");
            None
        }
    };

    let quantity = match req.quantity_in_grams {
        Some(q) if q > 0.0 && q.is_finite() => Some(q),
        Some(_) => {
            errors.add("quantity_in_grams", "Quantity in grams must be greater than 0.");
            None
        }
        None => {
            errors.add("quantity_in_grams", "This field is required.");
            None
        }
    };

    errors.into_result()?;
    food_item.zip(quantity).ok_or(ApiError::InternalError)
}

// ============ Handlers ============

/// GET / , GET /log_food/?date=YYYY-MM-DD
pub async fn day_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> Result<Json<DaySummary>, ApiError> {
    let date = parse_date(query.date.as_deref(), today())?;

    // 프로필이 없으면 기본값으로 생성됨
    let targets = targets_for(&state, user.id).await?;
    let entries = state.repo.logs_between(user.id, date, date).await?;
    let totals = sum_totals(&entries);

    Ok(Json(DaySummary {
        selected_date: date,
        previous_date: date.pred_opt(),
        next_date: date.succ_opt(),
        food_item_logs: entries.into_iter().map(LogEntryView::from).collect(),
        total_calories: totals.calories,
        total_proteins: totals.proteins,
        total_carbohydrates: totals.carbohydrates,
        total_fats: totals.fats,
        recommended_calories: targets.daily_calories,
        recommended_proteins: targets.proteins,
        recommended_carbs: targets.carbohydrates,
        recommended_fats: targets.fats,
        remaining_calories: targets.daily_calories - totals.calories,
    }))
}

/// POST / , POST /log_food/?date=YYYY-MM-DD
///
/// # Request
///
/// ```json
/// { "food_item": 12, "quantity_in_grams": 150 }
/// ```
pub async fn create_log(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
    JsonBody(req): JsonBody<LogFoodRequest>,
) -> Result<(StatusCode, Json<LogResponse>), ApiError> {
    let date = parse_date(query.date.as_deref(), today())?;
    let (food_item, quantity_in_grams) = validate_log(&state, req).await?;

    let entry = state
        .repo
        .insert_log(&NewFoodLog {
            user_id: user.id,
            food_item_id: food_item.id,
            date,
            quantity_in_grams,
        })
        .await?;
    state.cache.on_food_log_changed(user.id, date).await;

    tracing::debug!(user_id = user.id, log_id = entry.id, %date, "food logged");

    Ok((
        StatusCode::CREATED,
        Json(LogResponse {
            log_entry: entry.into(),
            redirect: Some(day_redirect(date)),
        }),
    ))
}

/// GET /edit_food_log/:id/
pub async fn get_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(log_id): Path<i64>,
) -> Result<Json<LogResponse>, ApiError> {
    let entry = state
        .repo
        .find_log(user.id, log_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food log"))?;

    Ok(Json(LogResponse {
        log_entry: entry.into(),
        redirect: None,
    }))
}

/// POST /edit_food_log/:id/
///
/// 음식과 양만 변경 (날짜는 유지)
pub async fn update_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(log_id): Path<i64>,
    JsonBody(req): JsonBody<LogFoodRequest>,
) -> Result<Json<LogResponse>, ApiError> {
    // 남의 기록이면 검증 전에 404
    state
        .repo
        .find_log(user.id, log_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food log"))?;

    let (food_item, quantity_in_grams) = validate_log(&state, req).await?;

    let entry = state
        .repo
        .update_log(user.id, log_id, food_item.id, quantity_in_grams)
        .await?
        .ok_or_else(|| ApiError::not_found("Food log"))?;
    state.cache.on_food_log_changed(user.id, entry.date).await;

    let redirect = day_redirect(entry.date);
    Ok(Json(LogResponse {
        log_entry: entry.into(),
        redirect: Some(redirect),
    }))
}

/// POST /delete_food_log/:id/
pub async fn delete_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(log_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let entry = state
        .repo
        .delete_log(user.id, log_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food log"))?;
    state.cache.on_food_log_changed(user.id, entry.date).await;

    tracing::debug!(user_id = user.id, log_id, "food log deleted");

    Ok(Json(DeleteResponse {
        deleted: entry.id,
        redirect: day_redirect(entry.date),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    use crate::db::FoodLogRepository;
    use crate::routes::test_support::TestApp;
    use crate::types::FoodCategory;

    #[tokio::test]
    async fn test_log_food_authenticated() {
        let app = TestApp::new();
        let user = app.user("testuser").await;

        let (status, body) = app.get("/log_food/", Some(user.token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected_date"], format_date(today()));
        assert_eq!(body["food_item_logs"].as_array().unwrap().len(), 0);
        assert!(body["recommended_calories"].as_f64().unwrap() > 0.0);

        // 루트 경로도 같은 화면
        let (status, _) = app.get("/", Some(user.token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_log_food_unauthenticated() {
        let app = TestApp::new();
        let (status, body) = app.get("/log_food/", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["login_url"], "/login/?next=/log_food/");

        // 쿼리 문자열도 유지
        let (_, body) = app.get("/log_food/?date=2024-03-10", None).await;
        assert_eq!(body["login_url"], "/login/?next=/log_food/?date=2024-03-10");
    }

    #[tokio::test]
    async fn test_food_log_create() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let apple = app.food("Apple", FoodCategory::Fruits, 52.0).await;

        let (status, body) = app
            .post(
                "/log_food/?date=2024-03-10",
                Some(user.token),
                json!({"food_item": apple.id, "quantity_in_grams": 200}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["redirect"], "/log_food/?date=2024-03-10");
        assert_eq!(body["log_entry"]["total_calories"], 104.0);

        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let logs = app.repo.logs_between(user.id, day, day).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].food_item.id, apple.id);
    }

    #[tokio::test]
    async fn test_food_log_create_invalid_data() {
        let app = TestApp::new();
        let user = app.user("testuser").await;

        let (status, body) = app
            .post(
                "/log_food/",
                Some(user.token),
                json!({"food_item": 999, "quantity_in_grams": -100}),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["food_item"].is_array());
        assert_eq!(
            body["fields"]["quantity_in_grams"][0],
            "Quantity in grams must be greater than 0."
        );
    }

    #[tokio::test]
    async fn test_non_numeric_quantity_is_a_field_error() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let apple = app.food("Apple", FoodCategory::Fruits, 52.0).await;

        let (status, body) = app
            .post(
                "/log_food/?date=2024-03-10",
                Some(user.token),
                json!({"food_item": apple.id, "quantity_in_grams": "abc"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["quantity_in_grams"][0], "Enter a valid value.");

        // 최상위 타입 불일치는 __all__
        let (status, body) = app.post("/log_food/", Some(user.token), json!("apple")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["__all__"].is_array());

        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(app.repo.logs_between(user.id, day, day).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_body_is_bad_request() {
        let app = TestApp::new();
        let user = app.user("testuser").await;

        let (status, body) = app
            .send_raw(
                Method::POST,
                "/log_food/",
                Some(user.token),
                Some("application/json"),
                "{\"food_item\": ".to_string(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, body) = app
            .send_raw(
                Method::POST,
                "/log_food/",
                Some(user.token),
                None,
                "{\"food_item\": 1, \"quantity_in_grams\": 10}".to_string(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let (status, _) = app.get("/log_food/?date=2024-13-45", Some(user.token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_day_summary_is_date_scoped() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let rice = app.food("Rice", FoodCategory::Grains, 130.0).await;

        for (date, grams) in [("2024-03-10", 100), ("2024-03-10", 50), ("2024-03-11", 300)] {
            app.post(
                &format!("/log_food/?date={}", date),
                Some(user.token),
                json!({"food_item": rice.id, "quantity_in_grams": grams}),
            )
            .await;
        }

        let (status, body) = app.get("/log_food/?date=2024-03-10", Some(user.token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["food_item_logs"].as_array().unwrap().len(), 2);
        assert_eq!(body["total_calories"], 195.0);
        assert_eq!(body["previous_date"], "2024-03-09");
        assert_eq!(body["next_date"], "2024-03-11");

        let remaining = body["remaining_calories"].as_f64().unwrap();
        let recommended = body["recommended_calories"].as_f64().unwrap();
        assert!((recommended - remaining - 195.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_edit_food_log() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let food = app.food("Initial Food", FoodCategory::Other, 100.0).await;

        let (_, created) = app
            .post(
                "/log_food/?date=2024-03-10",
                Some(user.token),
                json!({"food_item": food.id, "quantity_in_grams": 100}),
            )
            .await;
        let log_id = created["log_entry"]["id"].as_i64().unwrap();

        let (status, body) = app.get(&format!("/edit_food_log/{}/", log_id), Some(user.token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["log_entry"]["quantity_in_grams"], 100.0);

        let (status, body) = app
            .post(
                &format!("/edit_food_log/{}/", log_id),
                Some(user.token),
                json!({"food_item": food.id, "quantity_in_grams": 200}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect"], "/log_food/?date=2024-03-10");

        let updated = app.repo.find_log(user.id, log_id).await.unwrap().unwrap();
        assert_eq!(updated.quantity_in_grams, 200.0);
    }

    #[tokio::test]
    async fn test_edit_food_log_invalid_data() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let food = app.food("Initial Food", FoodCategory::Other, 100.0).await;

        let (_, created) = app
            .post(
                "/log_food/?date=2024-03-10",
                Some(user.token),
                json!({"food_item": food.id, "quantity_in_grams": 100}),
            )
            .await;
        let log_id = created["log_entry"]["id"].as_i64().unwrap();
        let uri = format!("/edit_food_log/{}/", log_id);

        let (status, body) = app
            .post(&uri, Some(user.token), json!({"food_item": food.id, "quantity_in_grams": 0}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["fields"]["quantity_in_grams"][0],
            "Quantity in grams must be greater than 0."
        );

        let (status, body) = app
            .post(&uri, Some(user.token), json!({"food_item": 999, "quantity_in_grams": 50}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["food_item"].is_array());

        let unchanged = app.repo.find_log(user.id, log_id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity_in_grams, 100.0);
        assert_eq!(unchanged.food_item.id, food.id);
    }

    #[tokio::test]
    async fn test_delete_food_log() {
        let app = TestApp::new();
        let user = app.user("testuser").await;
        let food = app.food("Bread", FoodCategory::Grains, 250.0).await;

        let (_, created) = app
            .post(
                "/log_food/",
                Some(user.token),
                json!({"food_item": food.id, "quantity_in_grams": 80}),
            )
            .await;
        let log_id = created["log_entry"]["id"].as_i64().unwrap();

        let (status, body) = app
            .post_empty(&format!("/delete_food_log/{}/", log_id), Some(user.token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], log_id);
        assert!(app.repo.find_log(user.id, log_id).await.unwrap().is_none());

        // 두 번째 삭제는 404
        let (status, _) = app
            .post_empty(&format!("/delete_food_log/{}/", log_id), Some(user.token))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_users_log_is_not_found() {
        let app = TestApp::new();
        let owner = app.user("owner").await;
        let intruder = app.user("intruder").await;
        let food = app.food("Cheese", FoodCategory::Dairy, 400.0).await;

        let (_, created) = app
            .post(
                "/log_food/",
                Some(owner.token),
                json!({"food_item": food.id, "quantity_in_grams": 30}),
            )
            .await;
        let log_id = created["log_entry"]["id"].as_i64().unwrap();
        let uri = format!("/edit_food_log/{}/", log_id);

        let (status, _) = app.get(&uri, Some(intruder.token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .post(&uri, Some(intruder.token), json!({"food_item": food.id, "quantity_in_grams": 1}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .post_empty(&format!("/delete_food_log/{}/", log_id), Some(intruder.token))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert!(app.repo.find_log(owner.id, log_id).await.unwrap().is_some());
    }
}

//! Food Catalogue Endpoints
//!
//! 승인된 음식 검색, 새 음식 제출, 그리고 사용자 투표로 진행되는 검토.
//!
//! ```text
//! submit-food ──▶ pending ──(3 approve)──▶ food_items
//!                    │
//!                    └──(3 reject)──▶ 삭제
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{FoodItem, NewFoodItem, Nutrients, PendingFoodItem, STATUS_PENDING},
    error::ApiError,
    routes::JsonBody,
    services::{
        cache::keys,
        search,
        voting::{self, VoteKind, VOTE_THRESHOLD},
        AuthUser,
    },
    types::{FieldErrors, FoodCategory, Message, MessageLevel},
    AppState,
};

const NAME_MAX_LEN: usize = 100;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResult {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub results: Vec<AutocompleteResult>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitFoodRequest {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub calories_per_100g: Option<f64>,
    pub proteins_per_100g: Option<f64>,
    pub carbohydrates_per_100g: Option<f64>,
    pub fats_per_100g: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitFoodResponse {
    pub pending: PendingFoodItem,
    pub message: Message,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct PendingListResponse {
    pub pending_items: Vec<PendingFoodItem>,
}

/// 검토 화면의 항목 한 줄
#[derive(Debug, Serialize)]
pub struct ReviewItem {
    #[serde(flatten)]
    pub item: PendingFoodItem,
    pub approve_count: usize,
    pub reject_count: usize,
    pub votes_needed: usize,
    /// 요청한 사용자의 기존 투표
    pub your_vote: Option<VoteKind>,
    pub is_own: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub pending_items: Vec<ReviewItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    Refused,
    Recorded,
    Promoted,
    Discarded,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub status: VoteStatus,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_item: Option<FoodItem>,
    pub redirect: String,
}

impl SubmitFoodRequest {
    pub fn validate(self) -> Result<NewFoodItem, ApiError> {
        let mut errors = FieldErrors::default();

        let mut text = |field: &str, value: Option<String>| -> String {
            let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
            if value.is_empty() {
                errors.add(field, "This field is required.");
            } else if value.chars().count() > NAME_MAX_LEN {
                errors.add(
                    field,
                    format!("Ensure this value has at most {} characters.", NAME_MAX_LEN),
                );
            }
            value
        };
        let name = text("name", self.name);
        let manufacturer = text("manufacturer", self.manufacturer);

        let category = match self.category.as_deref() {
            None | Some("") => FoodCategory::Other,
            Some(key) => FoodCategory::parse(key).unwrap_or_else(|| {
                errors.add(
                    "category",
                    format!("Select a valid choice. {} is not one of the available choices.", key),
                );
                FoodCategory::Other
            }),
        };

        let mut amount = |field: &str, value: Option<f64>, required: bool| -> f64 {
            match value {
                Some(v) if v >= 0.0 && v.is_finite() => v,
                Some(_) => {
                    errors.add(field, "Ensure this value is greater than or equal to 0.");
                    0.0
                }
                None if required => {
                    errors.add(field, "This field is required.");
                    0.0
                }
                None => 0.0,
            }
        };
        let per_100g = Nutrients {
            calories: amount("calories_per_100g", self.calories_per_100g, true),
            proteins: amount("proteins_per_100g", self.proteins_per_100g, false),
            carbohydrates: amount("carbohydrates_per_100g", self.carbohydrates_per_100g, false),
            fats: amount("fats_per_100g", self.fats_per_100g, false),
        };

        errors.into_result()?;
        Ok(NewFoodItem {
            name,
            manufacturer,
            category,
            per_100g,
        })
    }
}

// ============ Handlers ============

/// GET /fooditem-autocomplete/?q=
///
/// 이름은 접두사, 제조사는 부분 일치 (NFKC + 소문자 비교)
pub async fn autocomplete(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<AutocompleteResponse>, ApiError> {
    let repo = &state.repo;
    let catalogue: Vec<FoodItem> = state
        .cache
        .get_or_load(keys::FOOD_ITEMS_ALL, move || async move {
            repo.list_food_items().await.map_err(ApiError::from)
        })
        .await?;

    let results = search::filter_items(catalogue, query.q.as_deref())
        .into_iter()
        .map(|item| AutocompleteResult {
            id: item.id,
            text: item.label(),
        })
        .collect();

    Ok(Json(AutocompleteResponse { results }))
}

/// POST /submit-food/
///
/// # Request
///
/// ```json
/// { "name": "Kefir", "manufacturer": "Farm", "category": "dairy",
///   "calories_per_100g": 56, "proteins_per_100g": 3,
///   "carbohydrates_per_100g": 4, "fats_per_100g": 3.2 }
/// ```
pub async fn submit_food(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<SubmitFoodRequest>,
) -> Result<(StatusCode, Json<SubmitFoodResponse>), ApiError> {
    let item = req.validate()?;
    let pending = state.repo.create_pending(&item, user.id).await?;

    tracing::info!(user_id = user.id, pending_id = pending.id, name = %pending.name, "food submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitFoodResponse {
            pending,
            message: Message::new(
                MessageLevel::Success,
                "Food submitted for review. Thank you for contributing!",
            ),
            redirect: "/log_food/".to_string(),
        }),
    ))
}

/// GET /pending-foods/
pub async fn pending_foods(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<PendingListResponse>, ApiError> {
    let pending_items = state.repo.list_pending(Some(STATUS_PENDING)).await?;
    Ok(Json(PendingListResponse { pending_items }))
}

/// GET /review-foods/
///
/// 상태와 무관하게 전체 목록 + 투표 현황
pub async fn review_foods(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let items = state.repo.list_pending(None).await?;

    let pending_items = items
        .into_iter()
        .map(|item| {
            let your_vote = if item.votes_to_approve.contains(&user.id) {
                Some(VoteKind::Approve)
            } else if item.votes_to_reject.contains(&user.id) {
                Some(VoteKind::Reject)
            } else {
                None
            };
            ReviewItem {
                approve_count: item.votes_to_approve.len(),
                reject_count: item.votes_to_reject.len(),
                votes_needed: VOTE_THRESHOLD,
                is_own: item.submitted_by == user.id,
                your_vote,
                item,
            }
        })
        .collect();

    Ok(Json(ReviewListResponse { pending_items }))
}

async fn vote(state: AppState, user: AuthUser, pending_id: i64, kind: VoteKind) -> Result<Json<VoteResponse>, ApiError> {
    let outcome = voting::cast_vote(state.repo.as_ref(), &state.cache, pending_id, user.id, kind).await?;
    let message = outcome.message();

    let (status, food_item) = match outcome {
        voting::VoteOutcome::Refused { .. } => (VoteStatus::Refused, None),
        voting::VoteOutcome::Recorded { .. } => (VoteStatus::Recorded, None),
        voting::VoteOutcome::Promoted(food) => (VoteStatus::Promoted, Some(food)),
        voting::VoteOutcome::Discarded { .. } => (VoteStatus::Discarded, None),
    };

    Ok(Json(VoteResponse {
        status,
        message,
        food_item,
        redirect: "/review-foods/".to_string(),
    }))
}

/// POST /approve-food/:id/
pub async fn approve_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pending_id): Path<i64>,
) -> Result<Json<VoteResponse>, ApiError> {
    vote(state, user, pending_id, VoteKind::Approve).await
}

/// POST /reject-food/:id/
pub async fn reject_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pending_id): Path<i64>,
) -> Result<Json<VoteResponse>, ApiError> {
    vote(state, user, pending_id, VoteKind::Reject).await
}

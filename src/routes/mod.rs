//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health/` - 헬스 체크
//! - `/register/`, `/login/`, `/logout/` - 계정, 세션
//! - `/`, `/log_food/`, `/edit_food_log/:id/`, `/delete_food_log/:id/` - 섭취 기록
//! - `/fooditem-autocomplete/` - 음식 검색
//! - `/calendar/` - 월별 칼로리
//! - `/profile/` - 신체 정보 + 권장량
//! - `/submit-food/`, `/pending-foods/`, `/review-foods/`,
//!   `/approve-food/:id/`, `/reject-food/:id/` - 음식 제출 및 투표
//! - `/recommendations/` - 식습관 조언

use axum::{
    extract::FromRequest,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, AppState};

pub mod accounts;
pub mod calendar;
pub mod food_log;
pub mod foods;
pub mod health;
pub mod profile;
pub mod recommendations;

#[cfg(test)]
pub(crate) mod test_support;

/// JSON 요청 본문
///
/// 본문 거부도 `ApiError` 응답으로 나간다: 필드 타입 오류는 422 + `fields`,
/// 문법 오류나 Content-Type 누락은 400.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// 라우터 생성 (CORS는 `main`에서 환경별로 추가)
///
/// ```text
/// GET       /health/
/// GET|POST  /register/
/// POST      /login/
/// POST      /logout/
/// GET|POST  /  /log_food/          ?date=YYYY-MM-DD
/// GET|POST  /edit_food_log/:id/
/// POST      /delete_food_log/:id/
/// GET       /fooditem-autocomplete/ ?q=
/// GET       /calendar/             ?year=&month=
/// GET|POST  /profile/
/// POST      /submit-food/
/// GET       /pending-foods/
/// GET       /review-foods/
/// POST      /approve-food/:id/
/// POST      /reject-food/:id/
/// GET       /recommendations/
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health/", get(health::health_check))

        // Accounts
        .route("/register/", get(accounts::register_form).post(accounts::register))
        .route("/login/", post(accounts::login))
        .route("/logout/", post(accounts::logout))

        // Food log
        .route("/", get(food_log::day_summary).post(food_log::create_log))
        .route("/log_food/", get(food_log::day_summary).post(food_log::create_log))
        .route(
            "/edit_food_log/:id/",
            get(food_log::get_log).post(food_log::update_log),
        )
        .route("/delete_food_log/:id/", post(food_log::delete_log))

        // Food catalogue & crowd review
        .route("/fooditem-autocomplete/", get(foods::autocomplete))
        .route("/submit-food/", post(foods::submit_food))
        .route("/pending-foods/", get(foods::pending_foods))
        .route("/review-foods/", get(foods::review_foods))
        .route("/approve-food/:id/", post(foods::approve_food))
        .route("/reject-food/:id/", post(foods::reject_food))

        // Calendar / profile / advice
        .route("/calendar/", get(calendar::month_view))
        .route("/profile/", get(profile::get_profile).post(profile::update_profile))
        .route("/recommendations/", get(recommendations::get_recommendations))

        // 미들웨어
        .layer(TraceLayer::new_for_http())

        // 상태 주입
        .with_state(state)
}

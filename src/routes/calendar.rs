//! Calendar Endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Datelike;
use serde::Deserialize;

use crate::{
    error::ApiError,
    services::{
        cache::keys,
        calendar::{self, CalendarMonth},
        AuthUser,
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /calendar/?year=2024&month=3
///
/// 기본값은 이번 달. 월 단위로 캐시되고 기록 변경 시 무효화된다.
pub async fn month_view(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CalendarMonth>, ApiError> {
    let now = chrono::Local::now().date_naive();
    let year = query.year.unwrap_or(now.year());
    let month = query.month.unwrap_or(now.month());

    let (Some(first), Some(last)) = (calendar::first_day(year, month), calendar::last_day(year, month))
    else {
        return Err(ApiError::BadRequest(format!("Invalid month {}-{}", year, month)));
    };

    let user_id = user.id;
    let repo = &state.repo;
    let view = state
        .cache
        .get_or_load(&keys::calendar(user_id, year, month), move || async move {
            let entries = repo.logs_between(user_id, first, last).await?;
            calendar::build_month(year, month, &entries).ok_or(ApiError::InternalError)
        })
        .await?;

    Ok(Json(view))
}

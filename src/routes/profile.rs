//! Profile Endpoints
//!
//! 신체 정보 조회/수정과 그로부터 계산한 하루 권장량.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    db::{Profile, ProfileFields},
    error::ApiError,
    routes::JsonBody,
    services::{
        cache::keys,
        nutrition::{self, NutritionTargets, WEIGHT_GOALS},
        AuthUser,
    },
    types::{FieldErrors, Gender, Message, MessageLevel},
    AppState,
};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub activity_level: Option<f64>,
    pub weight_goal: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub targets: NutritionTargets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// 캐시된 권장량 (없으면 프로필에서 계산)
pub(crate) async fn targets_for(state: &AppState, user_id: i64) -> Result<NutritionTargets, ApiError> {
    state
        .cache
        .get_or_load(&keys::profile(user_id), move || async move {
            let profile = state.repo.get_or_create_profile(user_id).await?;
            Ok::<_, ApiError>(nutrition::targets(&profile.fields()))
        })
        .await
}

fn range_error(errors: &mut FieldErrors, field: &str, min: f64, max: f64) {
    errors.add(field, format!("Ensure this value is between {} and {}.", min, max));
}

fn choice_error(errors: &mut FieldErrors, field: &str, value: impl std::fmt::Display) {
    errors.add(
        field,
        format!("Select a valid choice. {} is not one of the available choices.", value),
    );
}

impl ProfileRequest {
    /// 범위/선택지 검증
    pub fn validate(self) -> Result<ProfileFields, ApiError> {
        let mut errors = FieldErrors::default();
        let required = "This field is required.";

        let height = match self.height {
            Some(h) if (50.0..=300.0).contains(&h) => Some(h),
            Some(_) => {
                range_error(&mut errors, "height", 50.0, 300.0);
                None
            }
            None => {
                errors.add("height", required);
                None
            }
        };

        let weight = match self.weight {
            Some(w) if (20.0..=500.0).contains(&w) => Some(w),
            Some(_) => {
                range_error(&mut errors, "weight", 20.0, 500.0);
                None
            }
            None => {
                errors.add("weight", required);
                None
            }
        };

        let age = match self.age {
            Some(a) if (1..=120).contains(&a) => i32::try_from(a).ok(),
            Some(_) => {
                errors.add("age", "Ensure this value is between 1 and 120.");
                None
            }
            None => {
                errors.add("age", required);
                None
            }
        };

        let gender = match self.gender.as_deref() {
            Some(code) => {
                let parsed = Gender::parse(code);
                if parsed.is_none() {
                    choice_error(&mut errors, "gender", code);
                }
                parsed
            }
            None => {
                errors.add("gender", required);
                None
            }
        };

        let activity_level = match self.activity_level {
            Some(level) if nutrition::is_valid_activity_level(level) => Some(level),
            Some(level) => {
                choice_error(&mut errors, "activity_level", level);
                None
            }
            None => {
                errors.add("activity_level", required);
                None
            }
        };

        let weight_goal = match self.weight_goal {
            Some(goal) => {
                let parsed = i32::try_from(goal).ok().filter(|g| WEIGHT_GOALS.contains(g));
                if parsed.is_none() {
                    choice_error(&mut errors, "weight_goal", goal);
                }
                parsed
            }
            None => {
                errors.add("weight_goal", required);
                None
            }
        };

        errors.into_result()?;

        match (height, weight, age, gender, activity_level, weight_goal) {
            (Some(height), Some(weight), Some(age), Some(gender), Some(activity_level), Some(weight_goal)) => {
                Ok(ProfileFields {
                    height,
                    weight,
                    age,
                    gender,
                    activity_level,
                    weight_goal,
                })
            }
            _ => Err(ApiError::InternalError),
        }
    }
}

// ============ Handlers ============

/// GET /profile/
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.repo.get_or_create_profile(user.id).await?;
    let targets = targets_for(&state, user.id).await?;

    Ok(Json(ProfileResponse {
        profile,
        targets,
        message: None,
        redirect: None,
    }))
}

/// POST /profile/
///
/// # Request
///
/// ```json
/// { "height": 180, "weight": 75, "age": 30, "gender": "M",
///   "activity_level": 1.55, "weight_goal": 0 }
/// ```
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<ProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let fields = req.validate()?;

    let profile = state.repo.update_profile(user.id, &fields).await?;
    state.cache.on_profile_saved(user.id).await;
    tracing::info!(user_id = user.id, "profile updated");

    Ok(Json(ProfileResponse {
        targets: nutrition::targets(&profile.fields()),
        profile,
        message: Some(Message::new(MessageLevel::Success, "Profile updated.")),
        redirect: Some("/profile/".to_string()),
    }))
}

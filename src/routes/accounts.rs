//! Account Endpoints
//!
//! 가입, 로그인, 로그아웃. 로그인/가입 성공 시 세션 토큰을 발급하고
//! 클라이언트는 이후 요청에 `Authorization: Bearer <token>`을 붙인다.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    routes::JsonBody,
    services::auth::{bearer_token, hash_password, verify_password},
    types::FieldErrors,
    AppState,
};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

const REQUIRED: &str = "This field is required.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// 로그인/가입 응답
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: Uuid,
    pub username: String,
    pub redirect: String,
}

/// GET /register/ 응답 (폼 요구사항)
#[derive(Debug, Serialize)]
pub struct RegisterFormInfo {
    pub title: &'static str,
    pub fields: [&'static str; 3],
    pub username_max_length: usize,
    pub password_min_length: usize,
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

/// 글자, 숫자, `@ . + - _` 만 허용
fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// 로그인 후 이동 경로. 외부 URL은 무시
fn safe_next(next: Option<String>) -> String {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}

// ============ Handlers ============

/// GET /register/
pub async fn register_form() -> Json<RegisterFormInfo> {
    Json(RegisterFormInfo {
        title: "Register",
        fields: ["username", "password1", "password2"],
        username_max_length: USERNAME_MAX_LEN,
        password_min_length: PASSWORD_MIN_LEN,
    })
}

/// POST /register/
///
/// 계정 + 기본 프로필 생성 후 바로 로그인 상태로 만든다.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let mut errors = FieldErrors::default();

    let username = required(&mut errors, "username", req.username.map(|u| u.trim().to_string()));
    let password1 = required(&mut errors, "password1", req.password1);
    let password2 = required(&mut errors, "password2", req.password2);

    if let Some(username) = &username {
        if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("Ensure this value has at most {} characters.", USERNAME_MAX_LEN),
            );
        } else if !valid_username(username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else if state.repo.find_user_by_username(username).await?.is_some() {
            errors.add("username", USERNAME_TAKEN);
        }
    }

    if let (Some(p1), Some(p2)) = (&password1, &password2) {
        if p1 != p2 {
            errors.add("password2", "The two password fields didn't match.");
        } else if p1.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "password2",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    PASSWORD_MIN_LEN
                ),
            );
        }
    }

    errors.into_result()?;
    let (Some(username), Some(password)) = (username, password1) else {
        return Err(ApiError::InternalError);
    };

    let password_hash = hash_password(&password).await?;
    let Some((user, token)) = state.repo.register_user(&username, &password_hash).await? else {
        // 확인 이후 같은 이름으로 먼저 가입된 경우
        let mut errors = FieldErrors::default();
        errors.add("username", USERNAME_TAKEN);
        return Err(ApiError::Form(errors));
    };

    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            username: user.username,
            redirect: "/".to_string(),
        }),
    ))
}

/// POST /login/?next=/path
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut errors = FieldErrors::default();
    let username = required(&mut errors, "username", req.username);
    let password = required(&mut errors, "password", req.password);
    errors.into_result()?;

    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::InternalError);
    };

    let user = match state.repo.find_user_by_username(&username).await? {
        Some(user) => verify_password(&password, &user.password_hash).await.then_some(user),
        None => None,
    };

    let Some(user) = user else {
        tracing::debug!(%username, "login rejected");
        let mut errors = FieldErrors::default();
        errors.add(
            FieldErrors::NON_FIELD,
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
        return Err(ApiError::Form(errors));
    };

    let token = state.repo.create_session(user.id).await?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(SessionResponse {
        token,
        username: user.username,
        redirect: safe_next(query.next),
    }))
}

/// POST /logout/
///
/// 세션이 없거나 이미 만료돼도 204
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.repo.delete_session(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

//! Accounts: password hashing and bearer-session extraction
//!
//! 비밀번호는 bcrypt 해시 문자열(`$2b$<cost>$<salt+hash>`)로 저장한다.
//! 해시/검증은 CPU를 오래 쓰므로 blocking 스레드에서 실행.
//!
//! 세션은 UUID v4 토큰으로 `sessions` 테이블에 저장되고 클라이언트는
//! `Authorization: Bearer <token>` 헤더로 보낸다.

use anyhow::Context;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{db::User, error::ApiError, AppState};

/// 테스트에서는 최소 cost
const COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

pub async fn hash_password(password: &str) -> anyhow::Result<String> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, COST))
        .await
        .context("password hashing task failed")??;
    Ok(hashed)
}

/// 형식이 깨진 해시는 항상 불일치
pub async fn verify_password(password: &str, stored: &str) -> bool {
    let (password, stored) = (password.to_string(), stored.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// `Authorization: Bearer <uuid>`
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// 로그인된 사용자 (핸들러 인자로 쓰면 로그인 필수)
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub token: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized {
            next: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string()),
        };

        let token = bearer_token(&parts.headers).ok_or_else(unauthorized)?;
        let user: User = state
            .repo
            .find_session_user(token)
            .await?
            .ok_or_else(unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_hash_roundtrip() {
        let stored = hash_password("testpass123").await.unwrap();
        assert!(stored.starts_with("$2b$"));
        assert!(verify_password("testpass123", &stored).await);
        assert!(!verify_password("testpass124", &stored).await);
    }

    #[tokio::test]
    async fn test_salts_differ() {
        let first = hash_password("same").await.unwrap();
        let second = hash_password("same").await.unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &second).await);
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        assert!(!verify_password("x", "").await);
        assert!(!verify_password("x", "md5$00$00").await);
        assert!(!verify_password("x", "sha3$00$00").await);
        assert!(!verify_password("x", "$2b$04$short").await);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
        assert_eq!(bearer_token(&headers), Some(token));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);
    }
}

//! 핸들러 테스트용 헬퍼: MockRepository 위에 전체 라우터를 올리고 `oneshot`으로 요청

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::{Config, Environment};
use crate::db::mock::MockRepository;
use crate::db::{FoodItem, FoodRepository, NewFoodItem, Nutrients, UserRepository};
use crate::services::auth::hash_password;
use crate::types::FoodCategory;
use crate::AppState;

pub const PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: i64,
    pub token: Uuid,
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MockRepository>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(MockRepository::new());
        let config = Config {
            port: 0,
            database_url: String::new(),
            cache_capacity: 64,
            allowed_origins: Vec::new(),
            environment: Environment::Development,
        };
        let state = AppState::new(repo.clone(), config);
        Self {
            router: super::router(state.clone()),
            repo,
            state,
        }
    }

    /// 프로필과 세션까지 만든 사용자
    pub async fn user(&self, username: &str) -> TestUser {
        let password_hash = hash_password(PASSWORD).await.unwrap();
        let (user, token) = self
            .repo
            .register_user(username, &password_hash)
            .await
            .unwrap()
            .unwrap();
        TestUser { id: user.id, token }
    }

    pub async fn food(&self, name: &str, category: FoodCategory, calories: f64) -> FoodItem {
        self.repo
            .create_food_item(&NewFoodItem {
                name: name.to_string(),
                manufacturer: "Test".to_string(),
                category,
                per_100g: Nutrients {
                    calories,
                    proteins: 1.0,
                    carbohydrates: 10.0,
                    fats: 0.5,
                },
            })
            .await
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(json) => {
                self.send_raw(method, uri, token, Some("application/json"), json.to_string())
                    .await
            }
            None => self.send_raw(method, uri, token, None, String::new()).await,
        }
    }

    /// 본문과 Content-Type을 그대로 전송
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<Uuid>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<Uuid>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<Uuid>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, token: Option<Uuid>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, None).await
    }
}

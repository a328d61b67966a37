//! Repository Traits
//!
//! 데이터 접근 인터페이스. 핸들러는 `Arc<dyn Repository>`만 알고,
//! PostgreSQL 구현은 `db/mod.rs`의 `Database`, 테스트용 구현은 아래 `mock`.

use async_trait::async_trait;
use anyhow::Result;
use chrono::NaiveDate;
use uuid::Uuid;

use super::models::{
    FoodItem, FoodLogEntry, NewFoodItem, NewFoodLog, PendingFoodItem, Profile, ProfileFields, User,
};

/// 계정 / 세션
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 사용자 + 기본 프로필 + 세션을 한 번에 생성. 이미 있는 이름이면 None
    async fn register_user(&self, username: &str, password_hash: &str) -> Result<Option<(User, Uuid)>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn create_session(&self, user_id: i64) -> Result<Uuid>;
    async fn find_session_user(&self, token: Uuid) -> Result<Option<User>>;
    async fn delete_session(&self, token: Uuid) -> Result<()>;
}

/// 승인된 음식 목록
#[async_trait]
pub trait FoodRepository: Send + Sync {
    async fn list_food_items(&self) -> Result<Vec<FoodItem>>;
    async fn find_food_item(&self, id: i64) -> Result<Option<FoodItem>>;
    async fn create_food_item(&self, item: &NewFoodItem) -> Result<FoodItem>;
}

/// 섭취 기록. 모든 조회/수정은 소유자(user_id) 기준
#[async_trait]
pub trait FoodLogRepository: Send + Sync {
    async fn insert_log(&self, log: &NewFoodLog) -> Result<FoodLogEntry>;
    async fn find_log(&self, user_id: i64, log_id: i64) -> Result<Option<FoodLogEntry>>;
    async fn update_log(
        &self,
        user_id: i64,
        log_id: i64,
        food_item_id: i64,
        quantity_in_grams: f64,
    ) -> Result<Option<FoodLogEntry>>;
    /// 삭제된 기록을 반환 (캐시 무효화용)
    async fn delete_log(&self, user_id: i64, log_id: i64) -> Result<Option<FoodLogEntry>>;
    /// `start..=end` 기간의 기록, 날짜/ID 순
    async fn logs_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FoodLogEntry>>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// 없으면 기본값으로 생성
    async fn get_or_create_profile(&self, user_id: i64) -> Result<Profile>;
    async fn update_profile(&self, user_id: i64, fields: &ProfileFields) -> Result<Profile>;
}

/// 제출된 음식 + 투표
#[async_trait]
pub trait PendingFoodRepository: Send + Sync {
    async fn create_pending(&self, item: &NewFoodItem, submitted_by: i64) -> Result<PendingFoodItem>;
    /// `status`가 None이면 전체
    async fn list_pending(&self, status: Option<&str>) -> Result<Vec<PendingFoodItem>>;
    async fn find_pending(&self, id: i64) -> Result<Option<PendingFoodItem>>;
    /// 이미 투표한 사용자의 중복 투표는 무시
    async fn add_vote(&self, pending_id: i64, user_id: i64, approve: bool) -> Result<()>;
    /// food_items 생성 + pending 삭제 (한 트랜잭션). 이미 없으면 None
    async fn promote_pending(&self, id: i64) -> Result<Option<FoodItem>>;
    async fn delete_pending(&self, id: i64) -> Result<bool>;
}

/// 전체 저장소
#[async_trait]
pub trait Repository:
    UserRepository + FoodRepository + FoodLogRepository + ProfileRepository + PendingFoodRepository
{
    async fn health_check(&self) -> Result<()>;
}

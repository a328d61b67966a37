//! Database Module
//!
//! PostgreSQL access through an SQLx `PgPool`.
//!
//! - `models`: row types and derived nutrient math
//! - `repository`: traits the handlers depend on (+ in-memory mock for tests)
//!
//! 커넥션 풀 설정은 `Database::connect` 참고. 스키마는 `migrations/`에 있고
//! 서버 시작 시 `run_migrations`로 적용된다.

mod models;
mod repository;

pub use models::*;
pub use repository::*;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// food_item_logs JOIN food_items 공통 SELECT 절
const FOOD_LOG_SELECT: &str = r#"
    SELECT
        l.id,
        l.user_id,
        l.date,
        l.quantity_in_grams,
        f.id AS food_item_id,
        f.name AS food_name,
        f.manufacturer AS food_manufacturer,
        f.category AS food_category,
        f.calories_per_100g,
        f.proteins_per_100g,
        f.carbohydrates_per_100g,
        f.fats_per_100g
    FROM food_item_logs l
    JOIN food_items f ON f.id = l.food_item_id
"#;

const PENDING_SELECT: &str = r#"
    SELECT
        id, name, manufacturer, category,
        calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g,
        submitted_by, status, created_at
    FROM pending_food_items
"#;

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10
    /// - min_connections: 1
    /// - acquire_timeout: 3초
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_log(&self, user_id: i64, log_id: i64) -> Result<Option<FoodLogEntry>> {
        let row = sqlx::query_as::<_, FoodLogRow>(&format!(
            "{FOOD_LOG_SELECT} WHERE l.id = $1 AND l.user_id = $2"
        ))
        .bind(log_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(FoodLogEntry::from))
    }

    /// pending 행들에 투표자 목록을 붙임
    async fn attach_votes(&self, rows: Vec<PendingFoodRow>) -> Result<Vec<PendingFoodItem>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let votes: Vec<(i64, i64, bool)> = sqlx::query_as(
            r#"
            SELECT pending_food_id, user_id, approve
            FROM pending_food_votes
            WHERE pending_food_id = ANY($1)
            ORDER BY user_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_item: HashMap<i64, (Vec<i64>, Vec<i64>)> = HashMap::new();
        for (pending_id, user_id, approve) in votes {
            let entry = by_item.entry(pending_id).or_default();
            if approve {
                entry.0.push(user_id);
            } else {
                entry.1.push(user_id);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let (approve, reject) = by_item.remove(&row.id).unwrap_or_default();
                PendingFoodItem::from_row(row, approve, reject)
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn register_user(&self, username: &str, password_hash: &str) -> Result<Option<(User, Uuid)>> {
        let mut tx = self.pool.begin().await?;

        // username UNIQUE: 동시 가입이면 한쪽만 행을 받는다
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        let token = Uuid::new_v4();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, NOW())")
            .bind(token)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((user, token)))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_session(&self, user_id: i64) -> Result<Uuid> {
        let token = Uuid::new_v4();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, NOW())")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    async fn find_session_user(&self, token: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_session(&self, token: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FoodRepository for Database {
    async fn list_food_items(&self) -> Result<Vec<FoodItem>> {
        let items = sqlx::query_as::<_, FoodItem>(
            r#"
            SELECT id, name, manufacturer, category,
                   calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g
            FROM food_items
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn find_food_item(&self, id: i64) -> Result<Option<FoodItem>> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            SELECT id, name, manufacturer, category,
                   calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g
            FROM food_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn create_food_item(&self, item: &NewFoodItem) -> Result<FoodItem> {
        let food = sqlx::query_as::<_, FoodItem>(
            r#"
            INSERT INTO food_items (
                name, manufacturer, category,
                calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, manufacturer, category,
                      calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g
            "#,
        )
        .bind(&item.name)
        .bind(&item.manufacturer)
        .bind(item.category.as_str())
        .bind(item.per_100g.calories)
        .bind(item.per_100g.proteins)
        .bind(item.per_100g.carbohydrates)
        .bind(item.per_100g.fats)
        .fetch_one(&self.pool)
        .await?;

        Ok(food)
    }
}

#[async_trait]
impl FoodLogRepository for Database {
    async fn insert_log(&self, log: &NewFoodLog) -> Result<FoodLogEntry> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO food_item_logs (user_id, food_item_id, date, quantity_in_grams)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(log.user_id)
        .bind(log.food_item_id)
        .bind(log.date)
        .bind(log.quantity_in_grams)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_log(log.user_id, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("food log {} vanished after insert", id))
    }

    async fn find_log(&self, user_id: i64, log_id: i64) -> Result<Option<FoodLogEntry>> {
        self.fetch_log(user_id, log_id).await
    }

    async fn update_log(
        &self,
        user_id: i64,
        log_id: i64,
        food_item_id: i64,
        quantity_in_grams: f64,
    ) -> Result<Option<FoodLogEntry>> {
        let updated = sqlx::query(
            r#"
            UPDATE food_item_logs
            SET food_item_id = $1, quantity_in_grams = $2
            WHERE id = $3 AND user_id = $4
            "#,
        )
        .bind(food_item_id)
        .bind(quantity_in_grams)
        .bind(log_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_log(user_id, log_id).await
    }

    async fn delete_log(&self, user_id: i64, log_id: i64) -> Result<Option<FoodLogEntry>> {
        let Some(entry) = self.fetch_log(user_id, log_id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM food_item_logs WHERE id = $1 AND user_id = $2")
            .bind(log_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(Some(entry))
    }

    async fn logs_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FoodLogEntry>> {
        let rows = sqlx::query_as::<_, FoodLogRow>(&format!(
            "{FOOD_LOG_SELECT} WHERE l.user_id = $1 AND l.date BETWEEN $2 AND $3 ORDER BY l.date, l.id"
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FoodLogEntry::from).collect())
    }
}

#[async_trait]
impl ProfileRepository for Database {
    async fn get_or_create_profile(&self, user_id: i64) -> Result<Profile> {
        // 동시 요청에도 1:1 보장 (user_id UNIQUE)
        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, height, weight, age, gender, activity_level, weight_goal
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update_profile(&self, user_id: i64, fields: &ProfileFields) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, height, weight, age, gender, activity_level, weight_goal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id)
            DO UPDATE SET
                height = EXCLUDED.height,
                weight = EXCLUDED.weight,
                age = EXCLUDED.age,
                gender = EXCLUDED.gender,
                activity_level = EXCLUDED.activity_level,
                weight_goal = EXCLUDED.weight_goal
            RETURNING id, user_id, height, weight, age, gender, activity_level, weight_goal
            "#,
        )
        .bind(user_id)
        .bind(fields.height)
        .bind(fields.weight)
        .bind(fields.age)
        .bind(fields.gender.code())
        .bind(fields.activity_level)
        .bind(fields.weight_goal)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[async_trait]
impl PendingFoodRepository for Database {
    async fn create_pending(&self, item: &NewFoodItem, submitted_by: i64) -> Result<PendingFoodItem> {
        let row = sqlx::query_as::<_, PendingFoodRow>(
            r#"
            INSERT INTO pending_food_items (
                name, manufacturer, category,
                calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g,
                submitted_by, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING id, name, manufacturer, category,
                      calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g,
                      submitted_by, status, created_at
            "#,
        )
        .bind(&item.name)
        .bind(&item.manufacturer)
        .bind(item.category.as_str())
        .bind(item.per_100g.calories)
        .bind(item.per_100g.proteins)
        .bind(item.per_100g.carbohydrates)
        .bind(item.per_100g.fats)
        .bind(submitted_by)
        .bind(STATUS_PENDING)
        .fetch_one(&self.pool)
        .await?;

        Ok(PendingFoodItem::from_row(row, Vec::new(), Vec::new()))
    }

    async fn list_pending(&self, status: Option<&str>) -> Result<Vec<PendingFoodItem>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, PendingFoodRow>(&format!(
                    "{PENDING_SELECT} WHERE status = $1 ORDER BY created_at, id"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PendingFoodRow>(&format!("{PENDING_SELECT} ORDER BY created_at, id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        self.attach_votes(rows).await
    }

    async fn find_pending(&self, id: i64) -> Result<Option<PendingFoodItem>> {
        let row = sqlx::query_as::<_, PendingFoodRow>(&format!("{PENDING_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_votes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn add_vote(&self, pending_id: i64, user_id: i64, approve: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_food_votes (pending_food_id, user_id, approve)
            VALUES ($1, $2, $3)
            ON CONFLICT (pending_food_id, user_id) DO NOTHING
            "#,
        )
        .bind(pending_id)
        .bind(user_id)
        .bind(approve)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn promote_pending(&self, id: i64) -> Result<Option<FoodItem>> {
        let mut tx = self.pool.begin().await?;

        // 행 잠금: 동시에 3번째 찬성표가 들어와도 한 번만 승격
        let row = sqlx::query_as::<_, PendingFoodRow>(&format!("{PENDING_SELECT} WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let food = sqlx::query_as::<_, FoodItem>(
            r#"
            INSERT INTO food_items (
                name, manufacturer, category,
                calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, manufacturer, category,
                      calories_per_100g, proteins_per_100g, carbohydrates_per_100g, fats_per_100g
            "#,
        )
        .bind(&row.name)
        .bind(&row.manufacturer)
        .bind(&row.category)
        .bind(row.calories_per_100g)
        .bind(row.proteins_per_100g)
        .bind(row.carbohydrates_per_100g)
        .bind(row.fats_per_100g)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pending_food_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(food))
    }

    async fn delete_pending(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM pending_food_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository for Database {
    /// Health check
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

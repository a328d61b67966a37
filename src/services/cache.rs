//! Derived-value cache
//!
//! Process-local LRU of JSON values keyed by string. Values are recomputed on miss
//! and dropped by key whenever a row they were derived from is saved or deleted
//! (`on_*` hooks below, called right after the corresponding repository write).
//! A load that overlaps any invalidation is returned to its caller but not stored.
//!
//! | key                          | value                          |
//! |------------------------------|--------------------------------|
//! | `profile:<user>`             | `NutritionTargets`             |
//! | `calendar:<user>:<yyyy-mm>`  | `CalendarMonth`                |
//! | `food_items:all`             | `Vec<FoodItem>`                |

use std::future::Future;
use std::num::NonZeroUsize;

use chrono::{Datelike, NaiveDate};
use lru::LruCache;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

pub mod keys {
    pub const FOOD_ITEMS_ALL: &str = "food_items:all";

    pub fn profile(user_id: i64) -> String {
        format!("profile:{}", user_id)
    }

    pub fn calendar(user_id: i64, year: i32, month: u32) -> String {
        format!("calendar:{}:{:04}-{:02}", user_id, year, month)
    }
}

struct Inner {
    entries: LruCache<String, serde_json::Value>,
    /// 무효화마다 증가. 로드 중에 바뀌었으면 결과를 저장하지 않는다
    version: u64,
}

pub struct Cache {
    inner: Mutex<Inner>,
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                version: 0,
            }),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.inner.lock().await.entries.get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                self.inner.lock().await.entries.pop(key);
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        if let Some(v) = to_cached(key, value) {
            self.inner.lock().await.entries.put(key.to_string(), v);
        }
    }

    /// 캐시에 있으면 반환, 없으면 `load` 실행 후 저장
    ///
    /// `load` 도중 무효화가 있었으면 값은 반환하되 저장하지 않는다.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            tracing::trace!(key, "cache hit");
            return Ok(hit);
        }

        let version = self.inner.lock().await.version;
        let value = load().await?;

        if let Some(v) = to_cached(key, &value) {
            let mut inner = self.inner.lock().await;
            if inner.version == version {
                inner.entries.put(key.to_string(), v);
            } else {
                tracing::debug!(key, "invalidated while loading, not cached");
            }
        }
        Ok(value)
    }

    pub async fn invalidate(&self, key: &str) {
        let mut inner = self.inner.lock().await;
        inner.version += 1;
        if inner.entries.pop(key).is_some() {
            tracing::debug!(key, "cache invalidated");
        }
    }

    #[cfg(test)]
    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.entries.contains(key)
    }

    // ============ invalidation hooks ============

    /// 섭취 기록 저장/삭제 → 해당 월 달력
    pub async fn on_food_log_changed(&self, user_id: i64, date: NaiveDate) {
        self.invalidate(&keys::calendar(user_id, date.year(), date.month())).await;
    }

    pub async fn on_profile_saved(&self, user_id: i64) {
        self.invalidate(&keys::profile(user_id)).await;
    }

    pub async fn on_food_item_created(&self) {
        self.invalidate(keys::FOOD_ITEMS_ALL).await;
    }
}

fn to_cached<T: Serialize>(key: &str, value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| tracing::warn!(key, error = %e, "value not cacheable"))
        .ok()
}

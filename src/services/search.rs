//! Food autocomplete matching
//!
//! 비교 전 양쪽 문자열을 NFKC 정규화 + 소문자화한다 (전각 문자, 합자 등 통일).

use unicode_normalization::UnicodeNormalization;

use crate::db::FoodItem;

pub fn normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

/// 이름은 접두사, 제조사는 부분 문자열 일치
pub fn matches(item: &FoodItem, normalized_query: &str) -> bool {
    normalize(&item.name).starts_with(normalized_query)
        || normalize(&item.manufacturer).contains(normalized_query)
}

/// 빈 질의면 전체 목록. 공백만 있는 질의도 그대로 비교한다
pub fn filter_items(items: Vec<FoodItem>, query: Option<&str>) -> Vec<FoodItem> {
    let query = query.filter(|q| !q.is_empty()).map(normalize);
    match query {
        None => items,
        Some(q) => items.into_iter().filter(|item| matches(item, &q)).collect(),
    }
}

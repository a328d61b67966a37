//! Services Module
//!
//! 핸들러에서 분리한 비즈니스 로직
//!
//! # Services
//! - `nutrition`: BMR, 하루 권장 칼로리/매크로
//! - `voting`: 제출 음식 찬반 투표 및 승격
//! - `recommendations`: 최근 섭취 기록 기반 조언
//! - `calendar`: 월별 칼로리 달력
//! - `search`: 음식 자동완성 매칭
//! - `auth`: 비밀번호 해시, 세션 추출
//! - `cache`: 파생 값 캐시 + 키 단위 무효화

pub mod auth;
pub mod cache;
pub mod calendar;
pub mod nutrition;
pub mod recommendations;
pub mod search;
pub mod voting;

pub use auth::AuthUser;
pub use cache::Cache;
pub use nutrition::NutritionTargets;
pub use voting::{VoteKind, VoteOutcome};

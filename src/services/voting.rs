//! Pending Food Voting
//!
//! Crowd review of submitted food items. A submission is promoted into the
//! catalogue after `VOTE_THRESHOLD` approvals and discarded after the same number
//! of rejections.
//!
//! Rules, checked in order:
//! 1. 제출자는 자기 항목에 투표 불가
//! 2. 반대 방향으로 이미 투표한 사용자는 투표 불가
//! 3. 같은 방향 중복 투표는 무시 (경고)

use serde::Serialize;

use crate::db::{FoodItem, PendingFoodItem, Repository};
use crate::error::ApiError;
use crate::services::cache::Cache;
use crate::types::{Message, MessageLevel};

pub const VOTE_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Approve,
    Reject,
}

impl VoteKind {
    fn is_approve(self) -> bool {
        self == VoteKind::Approve
    }
}

/// 투표 거부 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    OwnSubmission,
    VotedOpposite,
    AlreadyVoted,
}

/// 투표 처리 결과
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    Refused { kind: VoteKind, reason: Refusal },
    /// 기록됨, 임계값까지 남은 표 수
    Recorded { kind: VoteKind, remaining: usize },
    Promoted(FoodItem),
    Discarded { name: String },
}

pub fn check_vote(item: &PendingFoodItem, voter: i64, kind: VoteKind) -> Result<(), Refusal> {
    if item.submitted_by == voter {
        return Err(Refusal::OwnSubmission);
    }

    let (same, opposite) = match kind {
        VoteKind::Approve => (&item.votes_to_approve, &item.votes_to_reject),
        VoteKind::Reject => (&item.votes_to_reject, &item.votes_to_approve),
    };

    if opposite.contains(&voter) {
        Err(Refusal::VotedOpposite)
    } else if same.contains(&voter) {
        Err(Refusal::AlreadyVoted)
    } else {
        Ok(())
    }
}

/// 투표 기록 후 임계값 도달 시 승격/폐기
pub async fn cast_vote(
    repo: &dyn Repository,
    cache: &Cache,
    pending_id: i64,
    voter: i64,
    kind: VoteKind,
) -> Result<VoteOutcome, ApiError> {
    let item = repo
        .find_pending(pending_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Pending food item"))?;

    if let Err(reason) = check_vote(&item, voter, kind) {
        tracing::debug!(pending_id, voter, ?reason, "vote refused");
        return Ok(VoteOutcome::Refused { kind, reason });
    }

    repo.add_vote(pending_id, voter, kind.is_approve()).await?;

    let item = repo
        .find_pending(pending_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Pending food item"))?;

    let count = match kind {
        VoteKind::Approve => item.votes_to_approve.len(),
        VoteKind::Reject => item.votes_to_reject.len(),
    };

    if count < VOTE_THRESHOLD {
        return Ok(VoteOutcome::Recorded { kind, remaining: VOTE_THRESHOLD - count });
    }

    match kind {
        VoteKind::Approve => {
            let food = repo
                .promote_pending(pending_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Pending food item"))?;
            cache.on_food_item_created().await;
            tracing::info!(pending_id, food_id = food.id, "pending food promoted");
            Ok(VoteOutcome::Promoted(food))
        }
        VoteKind::Reject => {
            repo.delete_pending(pending_id).await?;
            tracing::info!(pending_id, "pending food discarded");
            Ok(VoteOutcome::Discarded { name: item.name })
        }
    }
}

impl VoteOutcome {
    /// 사용자에게 보여줄 메시지
    pub fn message(&self) -> Message {
        match self {
            VoteOutcome::Refused { reason: Refusal::OwnSubmission, .. } => {
                Message::new(MessageLevel::Warning, "You cannot vote on your own submission.")
            }
            VoteOutcome::Refused { kind, reason } => {
                // 이미 던진 표의 방향 기준으로 안내
                let voted_for = (*reason == Refusal::AlreadyVoted) == kind.is_approve();
                let text = if voted_for {
                    "You have already voted for this item."
                } else {
                    "You have already voted against this item."
                };
                Message::new(MessageLevel::Warning, text)
            }
            VoteOutcome::Recorded { kind, remaining } => {
                let side = match kind {
                    VoteKind::Approve => "for",
                    VoteKind::Reject => "against",
                };
                Message::new(
                    MessageLevel::Info,
                    format!("Your vote {} was counted. {} more votes needed.", side, remaining),
                )
            }
            VoteOutcome::Promoted(food) => Message::new(
                MessageLevel::Success,
                format!("\"{}\" was added to the food database.", food.name),
            ),
            VoteOutcome::Discarded { name } => {
                Message::new(MessageLevel::Warning, format!("\"{}\" was rejected.", name))
            }
        }
    }
}

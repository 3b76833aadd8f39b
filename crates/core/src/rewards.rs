//! Reward affordability.
//!
//! A user's spendable balance is the sum of `points_earned` over their
//! completed achievements. Redemption only previews the deduction; no
//! redemption record is written.

use serde::Serialize;

use crate::error::CoreError;

pub const REWARD_TYPE_BADGE: &str = "badge";
pub const REWARD_TYPE_POINTS: &str = "points";
pub const REWARD_TYPE_FEATURE_UNLOCK: &str = "feature_unlock";
pub const REWARD_TYPE_VIRTUAL_ITEM: &str = "virtual_item";

pub const VALID_REWARD_TYPES: &[&str] = &[
    REWARD_TYPE_BADGE,
    REWARD_TYPE_POINTS,
    REWARD_TYPE_FEATURE_UNLOCK,
    REWARD_TYPE_VIRTUAL_ITEM,
];

/// Outcome of a successful redemption check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedemptionQuote {
    pub points_deducted: i64,
    pub remaining_points: i64,
}

pub fn is_affordable(user_points: i64, requirement_points: i32) -> bool {
    user_points >= i64::from(requirement_points)
}

/// Check that a reward can be redeemed with the user's current balance.
pub fn quote_redemption(
    user_points: i64,
    requirement_points: i32,
    is_available: bool,
) -> Result<RedemptionQuote, CoreError> {
    if !is_available {
        return Err(CoreError::Validation("Reward is not available".to_string()));
    }
    if !is_affordable(user_points, requirement_points) {
        return Err(CoreError::Validation(format!(
            "Insufficient points to redeem this reward: requires {requirement_points}, user has {user_points}"
        )));
    }
    let points_deducted = i64::from(requirement_points);
    Ok(RedemptionQuote {
        points_deducted,
        remaining_points: user_points - points_deducted,
    })
}

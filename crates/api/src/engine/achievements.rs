use std::collections::HashSet;
use std::sync::Arc;

use engagement_core::criteria::{evaluate_stored, LevelTier, UserStats};
use engagement_core::error::CoreError;
use engagement_core::progress::{is_complete, validate_progress};
use engagement_core::types::{DbId, Timestamp};
use engagement_db::models::achievement::Achievement;
use engagement_db::models::user_achievement::{UserAchievement, UserAchievementDetail};
use engagement_db::repositories::{AchievementRepo, UserAchievementRepo};
use engagement_db::DbPool;
use engagement_events::{AchievementUnlocked, NotificationQueue};
use engagement_tracking::StatsSource;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// An achievement unlocked by a batch check.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockedAchievement {
    pub user_achievement_id: DbId,
    pub achievement_id: DbId,
    pub achievement_name: String,
    pub description: Option<String>,
    pub badge_icon: Option<String>,
    pub badge_color: Option<String>,
    pub rarity_level: String,
    pub points_value: i32,
    pub points_earned: i32,
    pub earned_at: Option<Timestamp>,
}

impl UnlockedAchievement {
    fn new(achievement: &Achievement, record: &UserAchievement) -> Self {
        Self {
            user_achievement_id: record.user_achievement_id,
            achievement_id: achievement.achievement_id,
            achievement_name: achievement.achievement_name.clone(),
            description: achievement.description.clone(),
            badge_icon: achievement.badge_icon.clone(),
            badge_color: achievement.badge_color.clone(),
            rarity_level: achievement.rarity_level.clone(),
            points_value: achievement.points_value,
            points_earned: record.points_earned,
            earned_at: record.earned_at,
        }
    }
}

/// Result of a batch check. Already-completed achievements never appear.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub newly_unlocked: Vec<UnlockedAchievement>,
    pub total_unlocked: usize,
}

/// Result of a direct unlock or progress update.
#[derive(Debug, Clone)]
pub struct LedgerWrite {
    pub record: UserAchievementDetail,
    /// True only if this call moved the record into the completed state.
    pub newly_completed: bool,
}

/// Result of a level-achievement unlock.
#[derive(Debug, Clone)]
pub enum LevelUnlock {
    Unlocked {
        achievement: Achievement,
        record: UserAchievement,
    },
    AlreadyUnlocked {
        achievement: Achievement,
    },
}

/// Coordinates the catalog, ledger, tracking stats and notification queue.
pub struct AchievementEngine {
    pool: DbPool,
    stats: Arc<dyn StatsSource>,
    notifications: NotificationQueue,
}

impl AchievementEngine {
    pub fn new(pool: DbPool, stats: Arc<dyn StatsSource>, notifications: NotificationQueue) -> Self {
        Self {
            pool,
            stats,
            notifications,
        }
    }

    // -----------------------------------------------------------------------
    // Batch check
    // -----------------------------------------------------------------------

    /// Evaluate every active, not yet completed achievement against a fresh
    /// stats snapshot and complete the ones whose criteria are met.
    pub async fn check_achievements(
        &self,
        user_id: DbId,
        auth_token: Option<&str>,
    ) -> AppResult<CheckOutcome> {
        let catalog = AchievementRepo::list_active(&self.pool).await?;
        let completed: HashSet<DbId> =
            UserAchievementRepo::completed_achievement_ids(&self.pool, user_id)
                .await?
                .into_iter()
                .collect();
        let stats = self.fetch_stats(user_id).await;

        let mut newly_unlocked = Vec::new();
        for achievement in catalog
            .iter()
            .filter(|a| !completed.contains(&a.achievement_id))
        {
            if !evaluate_stored(&achievement.achievement_type, &achievement.criteria_json, &stats) {
                continue;
            }

            let written = UserAchievementRepo::complete(
                &self.pool,
                user_id,
                achievement.achievement_id,
                achievement.points_value,
            )
            .await?;

            match written {
                Some(record) => {
                    tracing::info!(
                        user_id,
                        achievement_id = achievement.achievement_id,
                        points = record.points_earned,
                        "Achievement unlocked"
                    );
                    self.notify(user_id, achievement.achievement_id, auth_token);
                    newly_unlocked.push(UnlockedAchievement::new(achievement, &record));
                }
                // A concurrent request completed it between our read and write.
                None => tracing::debug!(
                    user_id,
                    achievement_id = achievement.achievement_id,
                    "Achievement already completed by a concurrent request"
                ),
            }
        }

        let total_unlocked = newly_unlocked.len();
        Ok(CheckOutcome {
            newly_unlocked,
            total_unlocked,
        })
    }

    /// Fetch stats, degrading to an all-zero snapshot on collaborator failure.
    async fn fetch_stats(&self, user_id: DbId) -> UserStats {
        match self.stats.fetch_stats(user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to fetch user stats from tracking, using zeroed stats");
                UserStats::default()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Explicit unlocks
    // -----------------------------------------------------------------------

    /// Complete an achievement for a user now.
    ///
    /// `progress`, when given, must be 100: a completed record always has
    /// full progress. `points` overrides the catalog value. Completing an
    /// already completed record changes nothing and sends no notification.
    pub async fn unlock_achievement(
        &self,
        user_id: DbId,
        achievement_id: DbId,
        progress: Option<f64>,
        points: Option<i32>,
        auth_token: Option<&str>,
    ) -> AppResult<LedgerWrite> {
        if let Some(progress) = progress {
            let progress = validate_progress(progress)?;
            if !is_complete(progress) {
                return Err(AppError::Core(CoreError::Validation(
                    "progress_percentage must be 100 to unlock an achievement; use the progress endpoint for partial progress".to_string(),
                )));
            }
        }

        let achievement = self.find_achievement(achievement_id).await?;
        let points = points.unwrap_or(achievement.points_value);

        let written =
            UserAchievementRepo::complete(&self.pool, user_id, achievement_id, points).await?;
        let newly_completed = written.is_some();
        if newly_completed {
            tracing::info!(user_id, achievement_id, points, "Achievement unlocked directly");
            self.notify(user_id, achievement_id, auth_token);
        }

        let record = self.load_detail(user_id, achievement_id).await?;
        Ok(LedgerWrite {
            record,
            newly_completed,
        })
    }

    /// Record progress towards an achievement.
    ///
    /// Completed records are terminal: later updates leave them untouched.
    /// Reaching 100 awards the catalog points and notifies once.
    pub async fn update_progress(
        &self,
        user_id: DbId,
        achievement_id: DbId,
        percentage: f64,
        auth_token: Option<&str>,
    ) -> AppResult<LedgerWrite> {
        let percentage = validate_progress(percentage)?;
        let achievement = self.find_achievement(achievement_id).await?;

        let written = UserAchievementRepo::upsert_progress(
            &self.pool,
            user_id,
            achievement_id,
            percentage,
            achievement.points_value,
        )
        .await?;

        let newly_completed = written.as_ref().is_some_and(|r| r.is_completed);
        match &written {
            Some(_) if newly_completed => {
                tracing::info!(user_id, achievement_id, "Achievement completed through progress");
                self.notify(user_id, achievement_id, auth_token);
            }
            Some(_) => tracing::debug!(user_id, achievement_id, percentage, "Progress recorded"),
            None => tracing::debug!(
                user_id,
                achievement_id,
                "Progress update ignored for completed achievement"
            ),
        }

        let record = self.load_detail(user_id, achievement_id).await?;
        Ok(LedgerWrite {
            record,
            newly_completed,
        })
    }

    /// Unlock the level-progression achievement for `level`.
    ///
    /// Reports [`LevelUnlock::AlreadyUnlocked`] without writing when the user
    /// already has a record for it.
    pub async fn unlock_level_achievement(
        &self,
        user_id: DbId,
        level: LevelTier,
        auth_token: Option<&str>,
    ) -> AppResult<LevelUnlock> {
        let achievement = AchievementRepo::find_level_entry(&self.pool, level.as_str())
            .await?
            .ok_or_else(|| CoreError::NotFoundByKey {
                entity: "Level achievement",
                key: level.as_str().to_string(),
            })?;

        if UserAchievementRepo::find(&self.pool, user_id, achievement.achievement_id)
            .await?
            .is_some()
        {
            return Ok(LevelUnlock::AlreadyUnlocked { achievement });
        }

        let inserted = UserAchievementRepo::insert_completed_if_absent(
            &self.pool,
            user_id,
            achievement.achievement_id,
            achievement.points_value,
        )
        .await?;

        match inserted {
            Some(record) => {
                tracing::info!(
                    user_id,
                    level = level.as_str(),
                    achievement_id = achievement.achievement_id,
                    "Level achievement unlocked"
                );
                self.notify(user_id, achievement.achievement_id, auth_token);
                Ok(LevelUnlock::Unlocked {
                    achievement,
                    record,
                })
            }
            None => Ok(LevelUnlock::AlreadyUnlocked { achievement }),
        }
    }

    /// Make sure the beginner tier is unlocked. A catalog without a beginner
    /// entry is not an error.
    pub async fn ensure_beginner_unlocked(
        &self,
        user_id: DbId,
        auth_token: Option<&str>,
    ) -> AppResult<()> {
        match self
            .unlock_level_achievement(user_id, LevelTier::Beginner, auth_token)
            .await
        {
            Ok(_) => Ok(()),
            Err(AppError::Core(CoreError::NotFoundByKey { .. })) => {
                tracing::debug!(user_id, "No beginner level achievement in catalog");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn find_achievement(&self, achievement_id: DbId) -> AppResult<Achievement> {
        AchievementRepo::find_by_id(&self.pool, achievement_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Achievement",
                id: achievement_id,
            }))
    }

    async fn load_detail(&self, user_id: DbId, achievement_id: DbId) -> AppResult<UserAchievementDetail> {
        UserAchievementRepo::find_detail(&self.pool, user_id, achievement_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Ledger row for user {user_id} and achievement {achievement_id} missing after write"
                ))
            })
    }

    fn notify(&self, user_id: DbId, achievement_id: DbId, auth_token: Option<&str>) {
        self.notifications.enqueue(
            AchievementUnlocked::new(user_id, achievement_id)
                .with_auth_token(auth_token.map(str::to_owned)),
        );
    }
}

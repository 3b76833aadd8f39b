//! Repository for the `achievements` catalog table.

use engagement_core::criteria::LEVEL_PROGRESSION;
use engagement_core::types::DbId;
use sqlx::PgPool;

use crate::models::achievement::{Achievement, CreateAchievement, UpdateAchievement};

/// Column list for `achievements` queries.
const COLUMNS: &str = "achievement_id, achievement_name, description, achievement_type, \
     criteria_json, points_value, badge_icon, badge_color, rarity_level, is_active, \
     created_at, updated_at";

/// Read access to the catalog plus the admin write path.
pub struct AchievementRepo;

impl AchievementRepo {
    /// All active catalog entries, ordered by id.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Achievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievements \
             WHERE is_active \
             ORDER BY achievement_id"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a catalog entry by id, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM achievements WHERE achievement_id = $1");
        sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the active level-progression entry for a level tier
    /// (`beginner`, `intermediate`, `advanced`).
    pub async fn find_level_entry(
        pool: &PgPool,
        level: &str,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievements \
             WHERE achievement_type = 'special' \
               AND is_active \
               AND criteria_json->>'type' = $1 \
               AND criteria_json->>'level' = $2 \
             ORDER BY achievement_id \
             LIMIT 1"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(LEVEL_PROGRESSION)
            .bind(level)
            .fetch_optional(pool)
            .await
    }

    /// Insert a catalog entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAchievement,
    ) -> Result<Achievement, sqlx::Error> {
        let query = format!(
            "INSERT INTO achievements \
                 (achievement_name, description, achievement_type, criteria_json, points_value, \
                  badge_icon, badge_color, rarity_level, is_active) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7, COALESCE($8, 'common'), COALESCE($9, TRUE)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(&input.achievement_name)
            .bind(&input.description)
            .bind(&input.achievement_type)
            .bind(&input.criteria_json)
            .bind(input.points_value)
            .bind(&input.badge_icon)
            .bind(&input.badge_color)
            .bind(&input.rarity_level)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Patch a catalog entry. Returns `None` if the id does not exist.
    ///
    /// Changing `points_value` does not touch `points_earned` on ledger rows.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAchievement,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!(
            "UPDATE achievements SET \
                 achievement_name = COALESCE($2, achievement_name), \
                 description = COALESCE($3, description), \
                 criteria_json = COALESCE($4, criteria_json), \
                 points_value = COALESCE($5, points_value), \
                 badge_icon = COALESCE($6, badge_icon), \
                 badge_color = COALESCE($7, badge_color), \
                 rarity_level = COALESCE($8, rarity_level), \
                 is_active = COALESCE($9, is_active), \
                 updated_at = NOW() \
             WHERE achievement_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .bind(&input.achievement_name)
            .bind(&input.description)
            .bind(&input.criteria_json)
            .bind(input.points_value)
            .bind(&input.badge_icon)
            .bind(&input.badge_color)
            .bind(&input.rarity_level)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}

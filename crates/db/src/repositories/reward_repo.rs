//! Repository for the `rewards` table.

use engagement_core::types::DbId;
use sqlx::PgPool;

use crate::models::reward::{CreateReward, Reward};

const COLUMNS: &str = "reward_id, reward_name, description, reward_type, requirement_points, \
     reward_value, reward_icon, is_available, created_at, updated_at";

pub struct RewardRepo;

impl RewardRepo {
    /// Available rewards, cheapest first.
    pub async fn list_available(pool: &PgPool) -> Result<Vec<Reward>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rewards \
             WHERE is_available \
             ORDER BY requirement_points ASC, reward_id ASC"
        );
        sqlx::query_as::<_, Reward>(&query).fetch_all(pool).await
    }

    /// Available rewards whose requirement is covered by `points`.
    pub async fn list_affordable(pool: &PgPool, points: i64) -> Result<Vec<Reward>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rewards \
             WHERE is_available AND requirement_points <= $1 \
             ORDER BY requirement_points ASC, reward_id ASC"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(points)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rewards WHERE reward_id = $1");
        sqlx::query_as::<_, Reward>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateReward) -> Result<Reward, sqlx::Error> {
        let query = format!(
            "INSERT INTO rewards \
                 (reward_name, description, reward_type, requirement_points, reward_value, \
                  reward_icon, is_available) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(&input.reward_name)
            .bind(&input.description)
            .bind(&input.reward_type)
            .bind(input.requirement_points)
            .bind(&input.reward_value)
            .bind(&input.reward_icon)
            .bind(input.is_available)
            .fetch_one(pool)
            .await
    }
}

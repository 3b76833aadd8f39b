//! HTTP-level tests for catalog administration.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json_auth, put_json_auth, seed_achievement, token_for};
use engagement_db::repositories::UserAchievementRepo;
use serde_json::json;
use sqlx::PgPool;

const ADMIN_URI: &str = "/api/engagement/admin/achievements";

fn admin_token() -> String {
    token_for(1, "admin")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admin_cannot_create(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "achievement_name": "Sneaky",
        "achievement_type": "workout_count",
        "criteria_json": {"target_count": 1},
    });

    let response = post_json_auth(app.app(), ADMIN_URI, body.clone(), &token_for(2, "user")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.app(), ADMIN_URI, body, &token_for(3, "service")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_normalizes_criteria(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        ADMIN_URI,
        json!({
            "achievement_name": "Ten Down",
            "description": "Complete ten workouts",
            "achievement_type": "workout_count",
            "criteria_json": {"workout_count": 10},
            "points_value": 25,
            "badge_color": "#00AAFF",
            "rarity_level": "rare",
        }),
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["criteria_json"], json!({"target_count": 10}));
    assert_eq!(json["data"]["rarity_level"], "rare");
    assert_eq!(json["data"]["points_value"], 25);
    assert_eq!(json["data"]["is_active"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_malformed_criteria(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        ADMIN_URI,
        json!({
            "achievement_name": "Broken",
            "achievement_type": "streak",
            "criteria_json": {},
        }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.app(),
        ADMIN_URI,
        json!({
            "achievement_name": "Unknown kind",
            "achievement_type": "karma",
            "criteria_json": {"target_count": 1},
        }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_reports_field_errors(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        ADMIN_URI,
        json!({
            "achievement_name": "   ",
            "achievement_type": "workout_count",
            "criteria_json": {"target_count": 1},
            "points_value": -1,
            "badge_color": "gold",
        }),
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["errors"]["achievement_name"].is_array());
    assert!(json["errors"]["points_value"].is_array());
    assert!(json["errors"]["badge_color"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_level_entry_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "achievement_name": "Beginner",
        "achievement_type": "special",
        "criteria_json": {"type": "level_progression", "level": "beginner"},
    });

    let response = post_json_auth(app.app(), ADMIN_URI, body.clone(), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app.app(), ADMIN_URI, body, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_keeps_earned_points(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Fifty", "workout_count", json!({"target_count": 5}), 50).await;
    UserAchievementRepo::complete(&pool, 9, achievement.achievement_id, 50)
        .await
        .unwrap();
    let app = common::build_test_app(pool.clone());

    let response = put_json_auth(
        app.app(),
        &format!("{ADMIN_URI}/{}", achievement.achievement_id),
        json!({"points_value": 100, "criteria_json": {"workout_count": 8}}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["points_value"], 100);
    assert_eq!(json["data"]["criteria_json"], json!({"target_count": 8}));
    assert_eq!(json["data"]["achievement_name"], "Fifty");

    let record = UserAchievementRepo::find(&pool, 9, achievement.achievement_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.points_earned, 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_revalidates_criteria_against_kind(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Streaky", "streak", json!({"target_streak": 3}), 10).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.app(),
        &format!("{ADMIN_URI}/{}", achievement.achievement_id),
        json!({"criteria_json": {"target_count": 3}}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_rejects_negative_points(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Pointy", "workout_count", json!({"target_count": 3}), 10).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.app(),
        &format!("{ADMIN_URI}/{}", achievement.achievement_id),
        json!({"points_value": -5}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"]["points_value"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_with_non_numeric_id_is_enveloped_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app.app(),
        &format!("{ADMIN_URI}/abc"),
        json!({"is_active": false}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_unknown_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app.app(),
        &format!("{ADMIN_URI}/4242"),
        json!({"is_active": false}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

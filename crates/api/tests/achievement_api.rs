//! HTTP-level tests for the achievement ledger and unlock flows.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get_auth, post_json_auth, put_json_auth, seed_achievement, seed_level_achievement,
    token_for,
};
use engagement_core::criteria::UserStats;
use serde_json::json;
use sqlx::PgPool;
use tokio::task::JoinSet;

fn stats_with_workouts(total_workouts: i64) -> UserStats {
    UserStats {
        total_workouts,
        ..UserStats::default()
    }
}

// ---------------------------------------------------------------------------
// Batch check
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_unlocks_once_and_is_idempotent(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Five Workouts", "workout_count", json!({"target_count": 5}), 20)
            .await;
    let mut app = common::build_test_app(pool);
    app.stats.set(stats_with_workouts(5));
    let token = token_for(1, "user");

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 1}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["total_unlocked"], 1);
    let unlocked = &json["data"]["newly_unlocked"][0];
    assert_eq!(unlocked["achievement_id"], achievement.achievement_id);
    assert_eq!(unlocked["points_earned"], 20);
    assert!(unlocked["earned_at"].is_string());

    let sent = app.drain_notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, 1);
    assert_eq!(sent[0].achievement_id, achievement.achievement_id);
    assert_eq!(sent[0].auth_token.as_deref(), Some(token.as_str()));

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 1}),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_unlocked"], 0);
    assert!(json["data"]["newly_unlocked"].as_array().unwrap().is_empty());
    assert!(app.drain_notifications().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_below_threshold_unlocks_nothing(pool: PgPool) {
    seed_achievement(&pool, "Ten Workouts", "workout_count", json!({"target_count": 10}), 20).await;
    let mut app = common::build_test_app(pool);
    app.stats.set(stats_with_workouts(9));

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 1}),
        &token_for(1, "user"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_unlocked"], 0);
    assert!(app.drain_notifications().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tracking_outage_unlocks_nothing(pool: PgPool) {
    seed_achievement(&pool, "First Steps", "workout_count", json!({"target_count": 1}), 10).await;
    seed_achievement(&pool, "Day One", "special", json!({"first_workout": true}), 10).await;
    let app = common::build_test_app(pool);
    app.stats.fail();

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 1}),
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_unlocked"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_skips_level_achievements(pool: PgPool) {
    seed_level_achievement(&pool, "beginner", 10).await;
    let app = common::build_test_app(pool);
    app.stats.set(stats_with_workouts(500));

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 1}),
        &token_for(1, "user"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_unlocked"], 0);
}

/// Parallel checks for one user race on the same ledger row. Exactly one
/// request wins the guarded upsert; the rest see it as already completed.
#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_checks_unlock_and_notify_once(pool: PgPool) {
    const CHECKS: usize = 16;

    let achievement =
        seed_achievement(&pool, "Five Workouts", "workout_count", json!({"target_count": 5}), 20)
            .await;
    let mut app = common::build_test_app(pool.clone());
    app.stats.set(stats_with_workouts(5));
    let token = token_for(1, "user");

    let mut checks = JoinSet::new();
    for _ in 0..CHECKS {
        let router = app.app();
        let token = token.clone();
        checks.spawn(async move {
            let response = post_json_auth(
                router,
                "/api/engagement/check-achievements",
                json!({"user_id": 1}),
                &token,
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            json["data"]["total_unlocked"].as_i64().unwrap()
        });
    }

    let mut total_unlocked = 0;
    while let Some(result) = checks.join_next().await {
        total_unlocked += result.unwrap();
    }
    assert_eq!(total_unlocked, 1);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_achievements WHERE user_id = $1 AND achievement_id = $2",
    )
    .bind(1_i64)
    .bind(achievement.achievement_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);

    let sent = app.drain_notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].achievement_id, achievement.achievement_id);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cross_user_access_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1, "user");

    let response = get_auth(app.app(), "/api/engagement/achievements/2", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Unauthorized access to user data.");

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 2}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn service_role_may_act_for_any_user(pool: PgPool) {
    seed_achievement(&pool, "Five Workouts", "workout_count", json!({"target_count": 5}), 20).await;
    let app = common::build_test_app(pool);
    app.stats.set(stats_with_workouts(5));

    let response = post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 42}),
        &token_for(900, "service"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_unlocked"], 1);
}

// ---------------------------------------------------------------------------
// Direct unlock
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn direct_unlock_uses_catalog_points_and_notifies_once(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Marathon", "time", json!({"target_minutes": 600}), 75).await;
    let mut app = common::build_test_app(pool);
    let token = token_for(1, "user");
    let body = json!({"user_id": 1, "achievement_id": achievement.achievement_id});

    let response =
        post_json_auth(app.app(), "/api/engagement/unlock-achievement", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Achievement unlocked successfully");
    assert_eq!(json["data"]["is_completed"], true);
    assert_eq!(json["data"]["progress_percentage"], 100.0);
    assert_eq!(json["data"]["points_earned"], 75);
    assert_eq!(json["data"]["achievement_name"], "Marathon");
    assert_eq!(app.drain_notifications().len(), 1);

    let response =
        post_json_auth(app.app(), "/api/engagement/unlock-achievement", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Achievement already unlocked");
    assert_eq!(json["data"]["points_earned"], 75);
    assert!(app.drain_notifications().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn direct_unlock_honours_points_override(pool: PgPool) {
    let achievement = seed_achievement(&pool, "Bonus", "special", json!({}), 10).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-achievement",
        json!({
            "user_id": 1,
            "achievement_id": achievement.achievement_id,
            "progress_percentage": 100,
            "points_earned": 250,
        }),
        &token_for(1, "user"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["points_earned"], 250);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn direct_unlock_unknown_achievement_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-achievement",
        json!({"user_id": 1, "achievement_id": 9999}),
        &token_for(1, "user"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn direct_unlock_with_partial_progress_rejected(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Marathon", "time", json!({"target_minutes": 600}), 75).await;
    let mut app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-achievement",
        json!({
            "user_id": 1,
            "achievement_id": achievement.achievement_id,
            "progress_percentage": 50,
        }),
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.drain_notifications().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_progress_reports_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-achievement",
        json!({"user_id": 1, "achievement_id": 1, "progress_percentage": 150}),
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"]["progress_percentage"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_required_field_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-achievement",
        json!({"user_id": 1}),
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_completes_at_full_and_never_regresses(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Burner", "calories", json!({"target_calories": 5000}), 40).await;
    let mut app = common::build_test_app(pool);
    let token = token_for(1, "user");
    let uri = "/api/engagement/achievement-progress/1";
    let id = achievement.achievement_id;

    let response = put_json_auth(
        app.app(),
        uri,
        json!({"achievement_id": id, "progress_percentage": 40}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Achievement progress updated");
    assert_eq!(json["data"]["progress_percentage"], 40.0);
    assert_eq!(json["data"]["is_completed"], false);
    assert_eq!(json["data"]["points_earned"], 0);
    assert!(json["data"]["earned_at"].is_null());

    let response = put_json_auth(
        app.app(),
        uri,
        json!({"achievement_id": id, "progress_percentage": 100}),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_completed"], true);
    assert_eq!(json["data"]["points_earned"], 40);
    let earned_at = json["data"]["earned_at"].clone();
    assert!(earned_at.is_string());
    assert_eq!(app.drain_notifications().len(), 1);

    let response = put_json_auth(
        app.app(),
        uri,
        json!({"achievement_id": id, "progress_percentage": 30}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_completed"], true);
    assert_eq!(json["data"]["progress_percentage"], 100.0);
    assert_eq!(json["data"]["earned_at"], earned_at);
    assert!(app.drain_notifications().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_overview_counts_states(pool: PgPool) {
    let done = seed_achievement(&pool, "Done", "streak", json!({"target_streak": 3}), 10).await;
    let partial = seed_achievement(&pool, "Partial", "streak", json!({"target_streak": 7}), 10).await;
    seed_achievement(&pool, "Untouched", "streak", json!({"target_streak": 30}), 10).await;
    let app = common::build_test_app(pool);
    let token = token_for(1, "user");
    let uri = "/api/engagement/achievement-progress/1";

    put_json_auth(
        app.app(),
        uri,
        json!({"achievement_id": done.achievement_id, "progress_percentage": 100}),
        &token,
    )
    .await;
    put_json_auth(
        app.app(),
        uri,
        json!({"achievement_id": partial.achievement_id, "progress_percentage": 50}),
        &token,
    )
    .await;

    let response = get_auth(app.app(), uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let stats = &json["data"]["stats"];
    assert_eq!(stats["total_achievements"], 3);
    assert_eq!(stats["completed_achievements"], 1);
    assert_eq!(stats["in_progress_achievements"], 1);
    assert_eq!(stats["completion_percentage"], 33.33);
    assert_eq!(json["data"]["achievements"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Level achievements, unseen and seen
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn level_unlock_is_idempotent(pool: PgPool) {
    let level = seed_level_achievement(&pool, "intermediate", 50).await;
    let mut app = common::build_test_app(pool);
    let token = token_for(1, "user");
    let body = json!({"user_id": 1, "level": "intermediate"});

    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-level-achievement",
        body.clone(),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["already_unlocked"], false);
    assert_eq!(json["data"]["achievement"]["achievement_id"], level.achievement_id);
    assert_eq!(json["data"]["user_achievement"]["points_earned"], 50);

    let response =
        post_json_auth(app.app(), "/api/engagement/unlock-level-achievement", body, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["already_unlocked"], true);
    assert!(json["data"].get("user_achievement").is_none());

    assert_eq!(app.drain_notifications().len(), 1);

    let response = get_auth(app.app(), "/api/engagement/achievements/1", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn level_unlock_validates_level(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-level-achievement",
        json!({"user_id": 1, "level": "expert"}),
        &token_for(1, "user"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["errors"]["level"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn level_unlock_without_catalog_entry_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app.app(),
        "/api/engagement/unlock-level-achievement",
        json!({"user_id": 1, "level": "advanced"}),
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unseen_auto_unlocks_beginner_then_seen_clears(pool: PgPool) {
    let beginner = seed_level_achievement(&pool, "beginner", 5).await;
    let mut app = common::build_test_app(pool);
    let token = token_for(1, "user");
    let uri = "/api/engagement/achievements/1/unseen";

    let response = get_auth(app.app(), uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let unseen = json["data"].as_array().unwrap();
    assert_eq!(unseen.len(), 1);
    assert_eq!(unseen[0]["achievement_id"], beginner.achievement_id);
    let record_id = unseen[0]["user_achievement_id"].clone();
    assert_eq!(app.drain_notifications().len(), 1);

    let response = post_json_auth(
        app.app(),
        "/api/engagement/achievements/seen",
        json!({"user_achievement_ids": [record_id]}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked"], 1);

    let response = get_auth(app.app(), uri, &token).await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
    assert!(app.drain_notifications().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unseen_without_beginner_entry_still_lists(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(
        app.app(),
        "/api/engagement/achievements/1/unseen",
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seen_for_other_user_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app.app(),
        "/api/engagement/achievements/seen",
        json!({"user_achievement_ids": [1], "user_id": 2}),
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recent_lists_fresh_completions(pool: PgPool) {
    let achievement =
        seed_achievement(&pool, "Five Workouts", "workout_count", json!({"target_count": 5}), 20)
            .await;
    let app = common::build_test_app(pool);
    app.stats.set(stats_with_workouts(5));
    let token = token_for(1, "user");

    post_json_auth(
        app.app(),
        "/api/engagement/check-achievements",
        json!({"user_id": 1}),
        &token,
    )
    .await;

    let response = get_auth(app.app(), "/api/engagement/achievements/1/recent", &token).await;
    let json = body_json(response).await;
    let recent = json["data"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["achievement_id"], achievement.achievement_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_points_broken_down_by_rarity(pool: PgPool) {
    let first = seed_achievement(&pool, "One", "special", json!({}), 30).await;
    let second = seed_achievement(&pool, "Two", "special", json!({}), 20).await;
    let app = common::build_test_app(pool);
    let token = token_for(1, "user");

    for id in [first.achievement_id, second.achievement_id] {
        post_json_auth(
            app.app(),
            "/api/engagement/unlock-achievement",
            json!({"user_id": 1, "achievement_id": id}),
            &token,
        )
        .await;
    }

    let response = get_auth(app.app(), "/api/engagement/user-points/1", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], 1);
    assert_eq!(json["data"]["total_points"], 50);
    assert_eq!(json["data"]["points_breakdown"]["common"], 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn available_lists_active_catalog(pool: PgPool) {
    seed_achievement(&pool, "Visible", "streak", json!({"target_streak": 3}), 10).await;
    let app = common::build_test_app(pool);

    let response = get_auth(
        app.app(),
        "/api/engagement/available-achievements",
        &token_for(7, "user"),
    )
    .await;
    let json = body_json(response).await;
    let catalog = json["data"].as_array().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0]["achievement_name"], "Visible");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_numeric_user_id_is_enveloped_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(
        app.app(),
        "/api/engagement/achievements/abc",
        &token_for(1, "user"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["message"].is_string());
}

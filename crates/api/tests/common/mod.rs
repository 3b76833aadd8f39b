#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use engagement_api::auth::jwt::{generate_access_token, JwtConfig};
use engagement_api::config::ServerConfig;
use engagement_api::engine::AchievementEngine;
use engagement_api::router::build_app_router;
use engagement_api::state::AppState;
use engagement_core::criteria::UserStats;
use engagement_core::types::DbId;
use engagement_db::models::achievement::{Achievement, CreateAchievement};
use engagement_db::repositories::AchievementRepo;
use engagement_events::{AchievementUnlocked, NotificationQueue};
use engagement_tracking::{StatsSource, TrackingError};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "engagement-test-secret";

/// Build a test `ServerConfig`. Collaborator URLs point nowhere; the tests
/// swap in fakes for both.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        tracking_service_url: "http://127.0.0.1:9".to_string(),
        comms_service_url: "http://127.0.0.1:9".to_string(),
        collaborator_timeout_secs: 1,
        tracking_max_attempts: 1,
        notification_queue_capacity: 64,
    }
}

// ---------------------------------------------------------------------------
// Fake tracking service
// ---------------------------------------------------------------------------

/// Stats source returning whatever the test sets. `None` simulates an
/// unreachable tracking service.
#[derive(Default)]
pub struct FakeStats {
    stats: Mutex<Option<UserStats>>,
}

impl FakeStats {
    pub fn set(&self, stats: UserStats) {
        *self.stats.lock().unwrap() = Some(stats);
    }

    pub fn fail(&self) {
        *self.stats.lock().unwrap() = None;
    }
}

#[async_trait]
impl StatsSource for FakeStats {
    async fn fetch_stats(&self, _user_id: DbId) -> Result<UserStats, TrackingError> {
        let stats = *self.stats.lock().unwrap();
        stats.ok_or_else(|| TrackingError::ApiError {
            status: 503,
            body: "tracking unavailable".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

/// The full router plus handles on its collaborators.
///
/// No dispatcher runs; queued notifications stay in `notifications` for the
/// test to inspect.
pub struct TestApp {
    pub router: Router,
    pub notifications: mpsc::Receiver<AchievementUnlocked>,
    pub stats: Arc<FakeStats>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Everything enqueued so far.
    pub fn drain_notifications(&mut self) -> Vec<AchievementUnlocked> {
        let mut out = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            out.push(n);
        }
        out
    }
}

/// Build the application with the production middleware stack, a fake
/// tracking service and an undrained notification queue.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let stats = Arc::new(FakeStats::default());
    let (queue, notifications) = NotificationQueue::channel(config.notification_queue_capacity);
    let engine = AchievementEngine::new(pool.clone(), stats.clone(), queue);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine: Arc::new(engine),
    };

    TestApp {
        router: build_app_router(state, &config),
        notifications,
        stats,
    }
}

pub fn token_for(user_id: DbId, role: &str) -> String {
    let config = test_config();
    generate_access_token(user_id, role, &config.jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_achievement(
    pool: &PgPool,
    name: &str,
    kind: &str,
    criteria: Value,
    points: i32,
) -> Achievement {
    let input = CreateAchievement {
        achievement_name: name.to_string(),
        description: Some(format!("{name} description")),
        achievement_type: kind.to_string(),
        criteria_json: criteria,
        points_value: Some(points),
        badge_icon: Some("trophy".to_string()),
        badge_color: Some("#FFD700".to_string()),
        rarity_level: None,
        is_active: None,
    };
    AchievementRepo::create(pool, &input)
        .await
        .expect("achievement seed should succeed")
}

pub async fn seed_level_achievement(pool: &PgPool, level: &str, points: i32) -> Achievement {
    seed_achievement(
        pool,
        &format!("Level {level}"),
        "special",
        serde_json::json!({ "type": "level_progression", "level": level }),
        points,
    )
    .await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should not fail")
}

fn json_request(method: Method, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, &body, None)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request(Method::POST, uri, &body, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, &body, Some(token))).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

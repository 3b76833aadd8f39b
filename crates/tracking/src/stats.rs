//! Lenient decoding of the tracking service's stats payload.
//!
//! The payload may be wrapped in a `data` object and numbers may arrive as
//! integers, floats, numeric strings or `null`. Anything that cannot be read
//! as a number counts as zero.

use engagement_core::criteria::UserStats;
use serde_json::Value;

/// Decode a stats response body into [`UserStats`].
pub fn decode_stats(body: &Value) -> UserStats {
    let stats = body
        .get("data")
        .filter(|data| data.is_object())
        .unwrap_or(body);

    UserStats {
        total_workouts: first_of(stats, &["completed_sessions", "total_sessions", "total_workouts"]),
        current_streak: first_of(stats, &["current_streak"]),
        longest_streak: first_of(stats, &["longest_streak"]),
        total_calories: first_of(stats, &["total_calories_burned", "total_calories"]),
        total_minutes: first_of(stats, &["total_exercise_time", "total_minutes"]),
        group_workouts: first_of(stats, &["group_sessions_count", "group_workouts"]),
        this_week_sessions: first_of(stats, &["this_week_sessions"]),
    }
}

/// Value of the first key that is present and numeric.
fn first_of(stats: &Value, keys: &[&str]) -> i64 {
    keys.iter()
        .find_map(|key| stats.get(*key).and_then(as_count))
        .unwrap_or(0)
}

fn as_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

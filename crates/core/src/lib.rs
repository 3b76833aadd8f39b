//! Domain logic for the engagement service.
//!
//! This crate has no database or network dependencies. Everything here is
//! evaluated against data the caller has already loaded.

pub mod achievement;
pub mod criteria;
pub mod engagement;
pub mod error;
pub mod leaderboard;
pub mod progress;
pub mod rewards;
pub mod roles;
pub mod types;

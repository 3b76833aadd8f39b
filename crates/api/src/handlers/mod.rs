pub mod achievements;
pub mod admin;
pub mod engagement;
pub mod health;
pub mod rewards;

//! Authentication primitives.
//!
//! - [`jwt`] -- validation of HS256 bearer tokens issued by the auth service.

pub mod jwt;

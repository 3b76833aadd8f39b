//! Well-known role names carried in the `role` claim of access tokens.
//!
//! Tokens are minted by the auth service; this service only reads them.

/// Platform administrators. May manage the achievement catalog and act on
/// behalf of any user.
pub const ROLE_ADMIN: &str = "admin";

/// Sibling microservices (tracking, comms, ML) calling server-to-server.
/// May act on behalf of any user.
pub const ROLE_SERVICE: &str = "service";

/// Regular end users. May only read and mutate their own records.
pub const ROLE_USER: &str = "user";

/// Whether a role may act on another user's records.
pub fn can_act_for_any_user(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_SERVICE
}

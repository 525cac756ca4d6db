//! Well-known role name constants.
//!
//! The role embedded in JWT claims is derived from the `is_admin` column on
//! the `users` table; these constants are the only two values it can take.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

// Admin-only endpoints. `require_admin` runs after `authenticate_user` on
// every route in this tier.

pub mod admin;

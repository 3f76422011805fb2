// Endpoints that need no authentication: service info, health, and
// token acquisition.

pub mod auth;
pub mod system;

pub use system::{health, root};

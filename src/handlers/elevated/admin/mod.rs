pub mod stats;
pub mod users;

pub use stats::stats_get;
pub use users::{user_delete, user_patch, users_get};

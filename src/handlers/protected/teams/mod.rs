pub mod members;
pub mod team;

pub use members::{member_delete, member_patch, member_post, members_get};
pub use team::{team_delete, team_get, team_patch, teams_get, teams_post};

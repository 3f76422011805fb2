pub mod goals;
pub mod messages;
pub mod project;

pub use goals::{project_goals_get, project_goals_post};
pub use messages::{messages_get, messages_post};
pub use project::{project_delete, project_get, project_patch, projects_get, projects_post};

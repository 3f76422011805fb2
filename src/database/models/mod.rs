pub mod goal;
pub mod message;
pub mod notification;
pub mod project;
pub mod task;
pub mod team;
pub mod user;

pub use goal::Goal;
pub use message::{ProjectMessage, TaskComment};
pub use notification::Notification;
pub use project::Project;
pub use task::Task;
pub use team::{Team, TeamMember};
pub use user::User;

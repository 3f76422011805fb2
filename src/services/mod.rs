// One service per aggregate. Each holds a pool handle and owns its SQL.

pub mod cascade;
pub mod dashboard_service;
pub mod goal_service;
pub mod message_service;
pub mod notification_service;
pub mod project_service;
pub mod task_service;
pub mod team_service;
pub mod user_service;

pub use cascade::CascadeSummary;
pub use dashboard_service::{AdminStats, DashboardService, UserDashboard};
pub use goal_service::{GoalChanges, GoalService};
pub use message_service::MessageService;
pub use notification_service::NotificationService;
pub use project_service::{NewProject, ProjectChanges, ProjectFilter, ProjectService};
pub use task_service::{NewTask, TaskChanges, TaskFilter, TaskService};
pub use team_service::TeamService;
pub use user_service::{NewUser, UserChanges, UserFilter, UserService};

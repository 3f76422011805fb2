pub mod goal;
pub mod tasks;

pub use goal::{goal_delete, goal_get, goal_patch};
pub use tasks::{goal_tasks_get, goal_tasks_post};

pub mod comments;
pub mod task;

pub use comments::{comments_get, comments_post};
pub use task::{task_delete, task_get, task_patch, tasks_get};

//! Per-resource permission checks shared by the protected handlers
//!
//! Manage access: admin, manager, or the project owner.
//! Contributor access: manage access, or membership in the project's team.

use uuid::Uuid;

use crate::database::models::{Project, Task};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::TeamRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAccess {
    pub can_manage: bool,
    pub can_contribute: bool,
}

impl ProjectAccess {
    pub fn require_manage(&self) -> Result<(), ApiError> {
        if self.can_manage {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only managers or the project owner can do this"))
        }
    }

    pub fn require_contribute(&self) -> Result<(), ApiError> {
        if self.can_contribute {
            Ok(())
        } else {
            Err(ApiError::forbidden("You do not have access to this project"))
        }
    }
}

pub fn can_manage(user: &AuthUser, project: &Project) -> bool {
    user.is_staff() || project.owner_id == user.id
}

pub async fn project_access(state: &AppState, user: &AuthUser, project: &Project) -> Result<ProjectAccess, ApiError> {
    let can_manage = can_manage(user, project);
    let is_member = match project.team_id {
        Some(team_id) if !can_manage => state.teams().member_role(team_id, user.id).await?.is_some(),
        _ => false,
    };
    Ok(ProjectAccess {
        can_manage,
        can_contribute: can_manage || is_member,
    })
}

/// Task access is project access, plus contribute rights for the assignee
pub async fn task_access(state: &AppState, user: &AuthUser, task: &Task) -> Result<(Project, ProjectAccess), ApiError> {
    let project_id = state.tasks().project_id(task).await?;
    let project = state.projects().get(project_id).await?;
    let mut access = project_access(state, user, &project).await?;
    if task.assignee_id == Some(user.id) {
        access.can_contribute = true;
    }
    Ok((project, access))
}

/// Staff and team leads may edit a team and its roster
pub async fn require_team_manager(state: &AppState, user: &AuthUser, team_id: Uuid) -> Result<(), ApiError> {
    if user.is_staff() {
        return Ok(());
    }
    match state.teams().member_role(team_id, user.id).await? {
        Some(TeamRole::Lead) => Ok(()),
        _ => {
            tracing::warn!("User {} is not allowed to manage team {}", user.email, team_id);
            Err(ApiError::forbidden("Only managers or the team lead can do this"))
        }
    }
}

/// Staff see every team; everyone else only the teams they belong to
pub async fn require_team_visible(state: &AppState, user: &AuthUser, team_id: Uuid) -> Result<(), ApiError> {
    if user.is_staff() || state.teams().member_role(team_id, user.id).await?.is_some() {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not a member of this team"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
        }
    }

    fn project(owner_id: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Apollo".to_string(),
            description: None,
            status: "active".to_string(),
            owner_id,
            team_id: None,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn staff_and_owner_can_manage() {
        let member = user(Role::Member);
        let owned = project(member.id);
        let foreign = project(Uuid::new_v4());

        assert!(can_manage(&member, &owned));
        assert!(!can_manage(&member, &foreign));
        assert!(can_manage(&user(Role::Manager), &foreign));
        assert!(can_manage(&user(Role::Admin), &foreign));
    }

    #[test]
    fn access_errors_are_forbidden() {
        let none = ProjectAccess {
            can_manage: false,
            can_contribute: false,
        };
        assert_eq!(none.require_manage().unwrap_err().status_code(), 403);
        assert_eq!(none.require_contribute().unwrap_err().status_code(), 403);
    }
}

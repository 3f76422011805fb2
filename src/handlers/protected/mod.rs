// Endpoints for any authenticated user. `authenticate_user` runs in front
// of every route here and puts an `AuthUser` into the request extensions.
// Finer-grained checks (staff role, team lead, project owner) happen in the
// handlers via `access`.

pub mod access;
pub mod auth;
pub mod dashboard;
pub mod goals;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod teams;

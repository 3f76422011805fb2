// Handlers grouped by security tier:
// public (no auth) → protected (JWT) → elevated (admin role)

pub mod elevated;
pub mod protected;
pub mod public;

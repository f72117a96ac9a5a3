// handlers/protected/mod.rs - Protected handlers (bearer session required)
//
// Every route here sits behind `middleware::require_session`, which puts the
// caller's `SessionContext` into request extensions. Handlers pass it on
// explicitly; every controller scopes reads and writes to its user.

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod interactions;
pub mod opportunities;
pub mod tasks;

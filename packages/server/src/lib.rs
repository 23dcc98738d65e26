// Meeting Registrations - Service Core
//
// Lets participants register for meetings of a participatory space and tells
// the space's admins when a meeting fills past half its capacity.
// Architecture follows domain-driven design: domain actions depend on kernel
// traits, with Postgres implementations wired in `ServerDeps::postgres`.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;

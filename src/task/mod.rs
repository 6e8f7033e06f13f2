//! Task tracking: entity, storage ports, backends, and lifecycle service.
//!
//! Tasks are created, fetched, re-prioritised, and cancelled through
//! [`services::TaskLifecycleService`], which applies the lifecycle
//! transition table on top of any [`ports::TaskRepository`]. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

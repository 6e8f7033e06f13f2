//! Task cluster: task tracking with optimistic-concurrency storage.
//!
//! This crate provides the core of a task-tracking service: the task
//! entity and its lifecycle rules, a repository abstraction with in-memory
//! and versioned-store backends, and the service that ties them together.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: Concrete implementations of ports (memory, versioned
//!   tables, `PostgreSQL`, the JSON command layer)
//!
//! # Modules
//!
//! - [`task`]: Task entity, repositories, and lifecycle service
//! - [`config`]: Environment configuration and backend selection
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod task;
pub mod telemetry;

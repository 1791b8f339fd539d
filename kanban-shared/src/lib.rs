//! # Kanban Shared Library
//!
//! Domain model, persistence and access control for the kanban service. The
//! HTTP server in `kanban-api` is a thin layer over [`services::Kanban`].
//!
//! ## Module Organization
//!
//! - `models`: row types and their SQL
//! - `store`: the [`store::KanbanStore`] seam with PostgreSQL and memory backends
//! - `auth`: passwords, tokens, caller identity and ownership checks
//! - `services`: the board, column and task operations
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

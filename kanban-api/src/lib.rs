//! # Kanban API Server Library
//!
//! HTTP surface of the kanban service. The binary in `main.rs` wires
//! configuration, storage and tracing around [`app::build_router`].
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error handling and HTTP response mapping
//! - `middleware`: caller resolution and security headers
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

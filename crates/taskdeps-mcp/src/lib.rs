//! MCP server for the taskdeps dependency graph engine.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! taskdeps' dependency API to AI assistants.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps the
//! `DependencyService` of each workspace it has loaded.
//!
//! # Tools
//!
//! ## Context Management
//! - `set_context` - Set the workspace root for all operations
//! - `where_am_i` - Show current workspace context
//!
//! ## Dependencies
//! - `create_dependency` - Record that one task depends on another
//! - `delete_dependency` - Delete a dependency by ID
//! - `dependency_view` - Project view with levels, flags and cycles
//!
//! Engine errors are returned as MCP `invalid_params` errors whose message
//! starts with the error code (for example `CYCLE_DETECTED: ...`) and whose
//! data carries `{"code": ...}`.

pub mod context;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::TaskdepsMcpServer;

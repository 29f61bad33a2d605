//! taskdeps - a task dependency graph engine.
//!
//! Models "task A depends on task B" relationships between project tasks,
//! refuses edges that would create cycles, and derives levels,
//! blocking/critical flags and cycle reports for project views.
//!
//! The crate provides both a library and the `taskdeps` CLI.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod service;
pub mod storage;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Terminal rendering for the CLI
pub mod output;

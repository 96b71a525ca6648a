//! Day Planner Library
//!
//! Task list with automatic classification. This module exports the core
//! components for the binary, tests and integration.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod repository;
pub mod store;
pub mod tasks;
pub mod types;

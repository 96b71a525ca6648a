//! CLI command definitions for day-planner
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod add;
pub mod list;

use crate::types::TaskId;
use add::AddArgs;
use clap::{Parser, Subcommand};
use list::ListArgs;

/// Personal task list with automatic priority, time and severity estimates
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Skip the classification request and use default estimates
    #[arg(long, global = true)]
    pub no_classify: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task and let the classifier estimate it
    Add(AddArgs),

    /// Show tasks, pending first (default if no subcommand given)
    List(ListArgs),

    /// Mark a task done, or not done again
    Toggle {
        /// Task id as shown by `list`
        id: TaskId,
    },

    /// Delete a task
    Delete {
        /// Task id as shown by `list`
        id: TaskId,
    },

    /// Delete every stored task
    Clear,

    /// List keys in the backing store
    Keys {
        /// Only show keys starting with this prefix
        #[arg(default_value = "")]
        prefix: String,
    },
}

//! List subcommand for day-planner CLI

use crate::format::OutputFormat;
use crate::tasks::CategoryFilter;
use clap::Args;

/// Arguments for the list subcommand
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Show only one category: all, work, selfcare, exercise, home
    #[arg(short, long, default_value = "all")]
    pub category: CategoryFilter,

    /// Output format: markdown or json
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,
}

//! Add subcommand for day-planner CLI

use crate::types::{Category, NewTask};
use clap::Args;

/// Arguments for the add subcommand
#[derive(Args, Debug)]
pub struct AddArgs {
    /// What needs to be done
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Optional details passed to the classifier
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// One of: work, selfcare, exercise, home
    #[arg(short, long, default_value = "work")]
    pub category: Category,
}

impl AddArgs {
    pub fn into_new_task(self) -> NewTask {
        NewTask::new(self.title, self.description, self.category)
    }
}

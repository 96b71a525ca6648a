//! Day Planner
//!
//! Command-line task list. New tasks are classified by a text-generation
//! service and stored locally in SQLite.

use anyhow::{Context, Result};
use clap::Parser;
use day_planner::classifier::{Classifier, MessagesClient};
use day_planner::cli::list::ListArgs;
use day_planner::cli::{Cli, Command};
use day_planner::config::{Config, ConfigLoader, ConfigPaths};
use day_planner::format::{format_task_short, format_tasks};
use day_planner::logging::{self, LogTarget};
use day_planner::pipeline::TaskPipeline;
use day_planner::repository::TaskRepository;
use day_planner::store::SqliteStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the store, classifier and pipeline from configuration.
fn build_pipeline(config: &Config) -> Result<TaskPipeline> {
    config.ensure_db_dir()?;
    let store = SqliteStore::open(&config.storage.db_path).with_context(|| {
        format!(
            "opening task database {}",
            config.storage.db_path.display()
        )
    })?;
    debug!("Database: {:?}", config.storage.db_path);

    let repository = TaskRepository::with_key(Arc::new(store), &config.storage.key);

    let classifier = if config.classifier.enabled {
        info!(
            endpoint = %config.classifier.endpoint,
            model = %config.classifier.model,
            "Classification enabled"
        );
        Classifier::new(Arc::new(MessagesClient::from_config(&config.classifier)))
            .with_timeout(config.classifier.timeout())
    } else {
        info!("Classification disabled, new tasks get default estimates");
        Classifier::disabled()
    };

    Ok(TaskPipeline::new(repository, classifier))
}

/// Print the current list.
async fn run_list(pipeline: &TaskPipeline, args: &ListArgs) -> Result<()> {
    let tasks = pipeline.tasks().await?;
    print!("{}", format_tasks(&tasks, args.category, args.format)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let target: LogTarget = cli.log.parse()?;
    logging::init(&target, cli.verbose)?;

    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(path, ConfigPaths::discover())?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = loader.config_path() {
        debug!("Config file: {}", path.display());
    }

    // CLI overrides
    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.storage.db_path = db_path.into();
    }
    if cli.no_classify {
        config.classifier.enabled = false;
    }
    let config = loader.into_config();

    let pipeline = build_pipeline(&config)?;

    match cli.command {
        Some(Command::Add(args)) => match pipeline.add_task(args.into_new_task()).await? {
            Some(added) => {
                print!("Added {}", format_task_short(&added.task));
            }
            None => {
                eprintln!("Task title cannot be empty; nothing added.");
            }
        },
        Some(Command::Toggle { id }) => {
            let result = pipeline.toggle_complete(id).await?;
            match result.tasks.get(id) {
                Some(task) if result.changed => print!("{}", format_task_short(task)),
                _ => eprintln!("No task with id {}", id),
            }
        }
        Some(Command::Delete { id }) => {
            let result = pipeline.delete_task(id).await?;
            if result.changed {
                println!("Deleted task {} ({} remaining)", id, result.tasks.len());
            } else {
                eprintln!("No task with id {}", id);
            }
        }
        Some(Command::Clear) => {
            pipeline.clear().await?;
            println!("All tasks cleared");
        }
        Some(Command::Keys { prefix }) => {
            let listing = pipeline.repository().store().list(&prefix).await?;
            for key in listing.keys {
                println!("{}", key);
            }
        }
        Some(Command::List(args)) => run_list(&pipeline, &args).await?,
        None => run_list(&pipeline, &ListArgs::default()).await?,
    }

    Ok(())
}

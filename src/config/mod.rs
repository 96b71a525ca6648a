//! Configuration system.
//!
//! Settings come from four tiers merged field by field:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/day-planner/config.yaml`
//! 3. **User** - `~/.day-planner/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! ## Environment Variables
//! - `DAY_PLANNER_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `DAY_PLANNER_DB_PATH` - Database path
//! - `DAY_PLANNER_STORAGE_KEY` - Store key for the task collection
//! - `DAY_PLANNER_ENDPOINT` - Classification endpoint URL
//! - `DAY_PLANNER_MODEL` - Classification model
//! - `DAY_PLANNER_USER_DIR` - User config dir (default: `~/.day-planner`)
//! - `DAY_PLANNER_PROJECT_DIR` - Project config dir (default: `./day-planner`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths};
pub use types::*;

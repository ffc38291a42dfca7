//! List command: discover and resolve without activating

use std::path::PathBuf;

use colored::Colorize;
use modhost_runtime::{ModuleSnapshot, ModuleState, Runtime, RuntimeConfig};
use serde::Serialize;

use crate::activator::builtin_factories;
use crate::commands::print_warnings;
use crate::error::Result;

/// One module as shown by `list` and `run`.
#[derive(Debug, Serialize)]
pub struct ModuleRow {
    pub symbolic_name: String,
    pub name: String,
    pub version: String,
    pub state: ModuleState,
    pub dependencies: Vec<String>,
    pub archive: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

impl From<&ModuleSnapshot> for ModuleRow {
    fn from(snapshot: &ModuleSnapshot) -> Self {
        let descriptor = snapshot.descriptor();
        Self {
            symbolic_name: descriptor.symbolic_name.clone(),
            name: descriptor.name.clone(),
            version: descriptor.version.to_string(),
            state: snapshot.state(),
            dependencies: descriptor.dependencies.clone(),
            archive: snapshot.archive().to_path_buf(),
            problem: snapshot.failure().map(ToString::to_string),
        }
    }
}

pub fn run_list(config: RuntimeConfig, json: bool) -> Result<()> {
    let config = RuntimeConfig {
        activate_on_startup: false,
        ..config
    };
    let runtime = Runtime::new(config, builtin_factories());
    let report = runtime.startup()?;

    let rows: Vec<ModuleRow> = runtime.modules().iter().map(ModuleRow::from).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_warnings(&report.errors);
        print_table(&rows);
        println!(
            "{} {} modules in {}",
            "Total:".dimmed(),
            rows.len(),
            runtime.config().modules_dir.display()
        );
    }
    Ok(())
}

pub(crate) fn print_table(rows: &[ModuleRow]) {
    if rows.is_empty() {
        println!("No modules found.");
        return;
    }
    for row in rows {
        let state = match row.state {
            ModuleState::Found => row.state.to_string().red(),
            ModuleState::Provided => row.state.to_string().cyan(),
            ModuleState::Activated => row.state.to_string().green(),
            ModuleState::Disposed => row.state.to_string().dimmed(),
        };
        println!(
            "  {:<32} {:<10} {}",
            row.symbolic_name.bold(),
            row.version,
            state
        );
        if let Some(problem) = &row.problem {
            println!("      {}", problem.dimmed());
        }
    }
}

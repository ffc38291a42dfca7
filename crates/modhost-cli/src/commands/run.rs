//! Run command: start the runtime, report, shut down

use colored::Colorize;
use modhost_runtime::{Runtime, RuntimeConfig};

use crate::activator::{ConsoleObserver, builtin_factories};
use crate::commands::list::{ModuleRow, print_table};
use crate::commands::print_warnings;
use crate::error::Result;

pub fn run_runtime(mut config: RuntimeConfig, start: &[String], stop: &[String]) -> Result<()> {
    if !start.is_empty() {
        config.auto_start = start.to_vec();
        config.activate_on_startup = true;
    }

    let runtime = Runtime::new(config, builtin_factories());
    runtime.add_observer(ConsoleObserver::shared());

    println!(
        "{} {}",
        "Starting modules from".bold(),
        runtime.config().modules_dir.display()
    );
    let report = runtime.startup()?;
    print_warnings(&report.errors);

    for name in stop {
        match runtime.stop(name) {
            Ok(outcome) if !outcome.orphaned.is_empty() => eprintln!(
                "{} {} stopped while {} still depend on it",
                "warning:".yellow().bold(),
                name,
                outcome.orphaned.join(", ")
            ),
            Ok(_) => {}
            Err(error) => print_warnings(&[error]),
        }
    }

    println!();
    let rows: Vec<ModuleRow> = runtime.modules().iter().map(ModuleRow::from).collect();
    print_table(&rows);
    println!(
        "{} {} discovered, {} activated, {} problems",
        "Summary:".dimmed(),
        report.discovered.len(),
        report.activated.len(),
        report.errors.len()
    );

    println!();
    let errors = runtime.shutdown();
    print_warnings(&errors);
    println!("{}", "Runtime stopped".bold());
    Ok(())
}

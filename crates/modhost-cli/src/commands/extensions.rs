//! Extensions command: show what modules contribute to an extension point

use colored::Colorize;
use modhost_runtime::{Runtime, RuntimeConfig};

use crate::activator::builtin_factories;
use crate::commands::print_warnings;
use crate::error::Result;

pub fn run_extensions(config: RuntimeConfig, point: &str, json: bool) -> Result<()> {
    let config = RuntimeConfig {
        activate_on_startup: false,
        ..config
    };
    let runtime = Runtime::new(config, builtin_factories());
    let report = runtime.startup()?;
    let elements = runtime.configuration_elements(point);

    if json {
        println!("{}", serde_json::to_string_pretty(&elements)?);
        return Ok(());
    }

    print_warnings(&report.errors);
    if elements.is_empty() {
        println!("No contributions to '{point}'.");
        return Ok(());
    }

    println!("{}", point.bold());
    for element in &elements {
        println!(
            "  {:<24} {:<12} {}",
            element.id().green(),
            element.prefix,
            element.contributor.dimmed()
        );
        for (key, value) in element.attributes.iter().filter(|(k, _)| *k != "id") {
            println!("      {key} = {value}");
        }
    }
    Ok(())
}

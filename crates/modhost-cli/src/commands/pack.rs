//! Pack command

use std::path::Path;

use colored::Colorize;

use crate::error::Result;

pub fn run_pack(project: &Path, artifact: &Path, output: &Path) -> Result<()> {
    let archive = modhost_package::pack(project, artifact, output)?;
    println!("{} {}", "Packed".green().bold(), archive.display());
    Ok(())
}

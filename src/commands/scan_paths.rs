use crate::commands::open_coordinator;
use crate::core::{print_info, print_section_header, print_success, Result};
use colored::*;

pub fn execute_path_add(path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    coordinator.add_scan_path(&path)?;
    print_success(&format!("Added scan path {path}"));
    Ok(())
}

pub fn execute_path_remove(path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    coordinator.remove_scan_path(&path)?;
    print_success(&format!("Removed scan path {path}"));
    Ok(())
}

pub fn execute_path_list() -> Result<()> {
    let coordinator = open_coordinator()?;
    let paths = coordinator.scan_paths();
    if paths.is_empty() {
        print_info("No scan paths configured. Add one with 'repo-scout path add <dir>'.");
        return Ok(());
    }

    print_section_header(&format!("Scan paths ({})", paths.len()));
    for sp in &paths {
        let scanned = sp
            .last_scanned
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never scanned".to_string());
        println!(
            "  {}  {}  {}",
            sp.path.white(),
            format!("{} repos", sp.repository_count).cyan(),
            scanned.bright_black()
        );
    }
    println!();
    Ok(())
}

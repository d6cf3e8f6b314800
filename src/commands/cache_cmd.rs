use crate::commands::open_coordinator;
use crate::core::{print_detail, print_section_header, print_success, Result};

pub fn execute_cache_info() -> Result<()> {
    let coordinator = open_coordinator()?;
    let info = coordinator.cache_info();

    print_section_header("Cache");
    print_detail("File", &coordinator.cache_file_path().display().to_string());
    print_detail("Size", &format!("{} bytes", info.cache_file_size));
    print_detail("Repositories", &info.total_repositories.to_string());
    print_detail("Valid", &info.valid_repositories.to_string());
    print_detail("Invalid", &info.invalid_repositories.to_string());
    print_detail(
        "Last updated",
        &info.last_updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    println!();
    Ok(())
}

pub fn execute_cache_clear() -> Result<()> {
    let mut coordinator = open_coordinator()?;
    coordinator.clear_cache()?;
    print_success("Cache cleared");
    Ok(())
}

/// Remove records whose repositories are confirmed gone from disk.
pub fn execute_cache_cleanup() -> Result<()> {
    let mut coordinator = open_coordinator()?;
    let removed = coordinator.cleanup_invalid()?;
    print_success(&format!("Removed {removed} invalid record(s)"));
    Ok(())
}

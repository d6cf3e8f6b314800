use crate::commands::open_coordinator;
use crate::core::{print_success, DirectoryWalker, Result};
use colored::*;
use std::sync::mpsc;

/// Run a scan over the given roots, or over all configured scan paths when
/// none are given. Progress streams to stdout while the walk runs.
pub fn execute_scan(paths: Vec<String>, force: bool, max_depth: Option<usize>) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    if let Some(depth) = max_depth {
        coordinator = coordinator.with_walker(DirectoryWalker::with_max_depth(depth));
    }

    let (tx, rx) = mpsc::channel::<crate::core::types::ScanProgress>();
    // Progress prints on its own thread so the scan never waits on stdout
    let printer = std::thread::spawn(move || {
        let mut last_count = 0;
        for event in rx {
            if event.completed {
                break;
            }
            if event.repos_found != last_count {
                last_count = event.repos_found;
                println!(
                    "  {} {}",
                    format!("[{last_count}]").green(),
                    event.current_path.bright_black()
                );
            }
        }
    });

    let paths = if paths.is_empty() { None } else { Some(paths) };
    let result = coordinator.scan(paths, force, Some(tx));
    let _ = printer.join();
    let repos = result?;

    let valid = repos.iter().filter(|r| r.is_valid).count();
    print_success(&format!(
        "{} repositories cached ({} valid)",
        repos.len(),
        valid
    ));
    Ok(())
}

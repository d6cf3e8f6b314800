use crate::commands::open_coordinator;
use crate::commands::query::format_size;
use crate::core::{print_error, print_success, Result};

/// Re-run inspection for a single cached repository.
pub fn execute_refresh(path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    let repo = coordinator.refresh_one(&path)?;
    print_success(&format!(
        "Refreshed {} ({}, {} commits)",
        repo.name,
        format_size(repo.size_mb),
        repo.commit_count
    ));
    Ok(())
}

/// Delete a repository's working tree and its cache record. Refuses to act
/// without the explicit confirmation flag.
pub fn execute_delete(path: String, yes: bool) -> Result<()> {
    if !yes {
        print_error(&format!(
            "This permanently deletes {path} from disk. Re-run with --yes to confirm."
        ));
        std::process::exit(1);
    }

    let mut coordinator = open_coordinator()?;
    coordinator.delete_one(&path)?;
    print_success(&format!("Deleted {path}"));
    Ok(())
}

/// Remove all node_modules directories under a cached repository.
pub fn execute_clean_node_modules(path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    let freed_mb = coordinator.delete_node_modules(&path)?;
    if freed_mb > 0.0 {
        print_success(&format!("Freed {}", format_size(freed_mb)));
    } else {
        print_success("No node_modules directories found");
    }
    Ok(())
}

/// Toggle the pin flag on a cached repository.
pub fn execute_pin(path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    let repo = coordinator.toggle_pin(&path)?;
    if repo.is_pinned {
        print_success(&format!("Pinned {}", repo.name));
    } else {
        print_success(&format!("Unpinned {}", repo.name));
    }
    Ok(())
}

use crate::commands::open_coordinator;
use crate::core::{print_info, print_section_header, GitRepository, Result, SearchFilters};
use colored::*;

/// Print every cached repository, pinned entries first. With `pinned_only`,
/// restrict the listing to pinned repositories.
pub fn execute_list(pinned_only: bool) -> Result<()> {
    let coordinator = open_coordinator()?;
    let mut repos = if pinned_only {
        coordinator.pinned()
    } else {
        coordinator.load_cached()
    };
    if repos.is_empty() {
        if pinned_only {
            print_info("No pinned repositories. Pin one with 'repo-scout pin <path>'.");
        } else {
            print_info("No repositories cached. Run 'repo-scout scan <path>' first.");
        }
        return Ok(());
    }

    sort_for_display(&mut repos);
    print_section_header(&format!("Repositories ({})", repos.len()));
    for repo in &repos {
        print_repository_line(repo);
    }
    println!();
    Ok(())
}

/// Search the cache with the given filters.
pub fn execute_search(filters: SearchFilters) -> Result<()> {
    let coordinator = open_coordinator()?;
    let mut repos = coordinator.search(&filters);
    if repos.is_empty() {
        print_info("No repositories match the given filters.");
        return Ok(());
    }

    sort_for_display(&mut repos);
    print_section_header(&format!("Matches ({})", repos.len()));
    for repo in &repos {
        print_repository_line(repo);
    }
    println!();
    Ok(())
}

fn sort_for_display(repos: &mut [GitRepository]) {
    repos.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

pub(crate) fn print_repository_line(repo: &GitRepository) {
    let pin = if repo.is_pinned { "★ " } else { "  " };
    let branch = repo.current_branch.as_deref().unwrap_or("-");
    let validity = if repo.is_valid {
        String::new()
    } else {
        format!(" {}", "[invalid]".red())
    };
    println!(
        "{}{}  {}  {}  {}{}",
        pin.yellow(),
        repo.name.white().bold(),
        format_size(repo.size_mb).cyan(),
        branch.green(),
        repo.path.bright_black(),
        validity
    );
}

pub(crate) fn format_size(size_mb: f64) -> String {
    if size_mb >= 1024.0 {
        format!("{:.1} GB", size_mb / 1024.0)
    } else {
        format!("{:.1} MB", size_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(12.34), "12.3 MB");
        assert_eq!(format_size(2048.0), "2.0 GB");
    }
}

use crate::commands::open_coordinator;
use crate::commands::query::print_repository_line;
use crate::core::{print_info, print_section_header, print_success, Result};
use colored::*;

const DEFAULT_COLOR: &str = "#6e7681";

pub fn execute_collection_create(name: String, color: Option<String>) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    let collection =
        coordinator.create_collection(name, color.unwrap_or_else(|| DEFAULT_COLOR.to_string()))?;
    print_success(&format!(
        "Created collection '{}' ({})",
        collection.name, collection.id
    ));
    Ok(())
}

pub fn execute_collection_delete(id: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    coordinator.delete_collection(&id)?;
    print_success("Collection deleted (repositories were not touched)");
    Ok(())
}

pub fn execute_collection_add(id: String, path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    coordinator.add_to_collection(&id, &path)?;
    print_success(&format!("Added {path} to collection"));
    Ok(())
}

pub fn execute_collection_remove(id: String, path: String) -> Result<()> {
    let mut coordinator = open_coordinator()?;
    coordinator.remove_from_collection(&id, &path)?;
    print_success(&format!("Removed {path} from collection"));
    Ok(())
}

/// List all collections, or the members of one collection when an id is given.
pub fn execute_collection_list(id: Option<String>) -> Result<()> {
    let coordinator = open_coordinator()?;

    if let Some(id) = id {
        let repos = coordinator.repositories_in_collection(&id)?;
        if repos.is_empty() {
            print_info("Collection is empty.");
            return Ok(());
        }
        print_section_header(&format!("Members ({})", repos.len()));
        for repo in &repos {
            print_repository_line(repo);
        }
        println!();
        return Ok(());
    }

    let collections = coordinator.collections();
    if collections.is_empty() {
        print_info("No collections. Create one with 'repo-scout collection create <name>'.");
        return Ok(());
    }
    print_section_header(&format!("Collections ({})", collections.len()));
    for collection in collections {
        println!(
            "  {}  {} {}  {}",
            collection.id.bright_black(),
            collection.name.white().bold(),
            collection.color.cyan(),
            format!("{} repos", collection.repository_paths.len()).bright_black()
        );
    }
    println!();
    Ok(())
}

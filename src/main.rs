use clap::{Parser, Subcommand};
use repo_scout::commands::*;
use repo_scout::core::{print_error, Result, SearchFilters};
use std::env;

#[derive(Parser)]
#[command(name = "repo-scout")]
#[command(about = "Discover, cache and search Git repositories on this machine")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for repositories under the given paths (or all configured scan paths)
    Scan {
        /// Root directories to scan; defaults to the configured scan paths
        paths: Vec<String>,
        /// Rescan even when the cache is already populated
        #[arg(long)]
        force: bool,
        /// Directory levels to descend below each root
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// List all cached repositories
    List {
        /// Show only pinned repositories
        #[arg(long)]
        pinned: bool,
    },
    /// Search cached repositories by name, size, file type or location
    Search {
        /// Case-insensitive name prefix
        #[arg(long)]
        name: Option<String>,
        /// Minimum size in MB (inclusive)
        #[arg(long)]
        min_size: Option<f64>,
        /// Maximum size in MB (inclusive)
        #[arg(long)]
        max_size: Option<f64>,
        /// File extension present in the repository (e.g. "rs")
        #[arg(long)]
        file_type: Option<String>,
        /// Only repositories under this absolute path
        #[arg(long)]
        path_prefix: Option<String>,
    },
    /// Re-inspect a single cached repository
    Refresh {
        /// Absolute path of the repository
        path: String,
    },
    /// Delete a repository from disk and from the cache
    Delete {
        /// Absolute path of the repository
        path: String,
        /// Confirm the permanent deletion
        #[arg(long)]
        yes: bool,
    },
    /// Remove node_modules directories under a cached repository
    CleanNodeModules {
        /// Absolute path of the repository
        path: String,
    },
    /// Pin or unpin a repository
    Pin {
        /// Absolute path of the repository
        path: String,
    },
    /// Manage repository collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage configured scan paths
    Path {
        #[command(subcommand)]
        action: PathAction,
    },
    /// Inspect or maintain the cache file
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CollectionAction {
    /// Create a new collection
    Create {
        name: String,
        /// Display color, e.g. "#3366ff"
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a collection (member repositories are kept)
    Delete { id: String },
    /// Add a cached repository to a collection
    Add { id: String, path: String },
    /// Remove a repository from a collection
    Remove { id: String, path: String },
    /// List collections, or the members of one collection
    List { id: Option<String> },
}

#[derive(Subcommand)]
enum PathAction {
    /// Register a directory as a scan root
    Add { path: String },
    /// Unregister a scan root
    Remove { path: String },
    /// List configured scan roots with repository counts
    List,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache statistics and file location
    Info,
    /// Drop all cached data
    Clear,
    /// Remove records whose repositories no longer exist on disk
    Cleanup,
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let result: Result<()> = match cli.command {
        Commands::Scan {
            paths,
            force,
            max_depth,
        } => execute_scan(paths, force, max_depth),
        Commands::List { pinned } => execute_list(pinned),
        Commands::Search {
            name,
            min_size,
            max_size,
            file_type,
            path_prefix,
        } => execute_search(SearchFilters {
            name_prefix: name,
            min_size_mb: min_size,
            max_size_mb: max_size,
            file_type,
            path_prefix,
        }),
        Commands::Refresh { path } => execute_refresh(path),
        Commands::Delete { path, yes } => execute_delete(path, yes),
        Commands::CleanNodeModules { path } => execute_clean_node_modules(path),
        Commands::Pin { path } => execute_pin(path),
        Commands::Collection { action } => match action {
            CollectionAction::Create { name, color } => execute_collection_create(name, color),
            CollectionAction::Delete { id } => execute_collection_delete(id),
            CollectionAction::Add { id, path } => execute_collection_add(id, path),
            CollectionAction::Remove { id, path } => execute_collection_remove(id, path),
            CollectionAction::List { id } => execute_collection_list(id),
        },
        Commands::Path { action } => match action {
            PathAction::Add { path } => execute_path_add(path),
            PathAction::Remove { path } => execute_path_remove(path),
            PathAction::List => execute_path_list(),
        },
        Commands::Cache { action } => match action {
            CacheAction::Info => execute_cache_info(),
            CacheAction::Clear => execute_cache_clear(),
            CacheAction::Cleanup => execute_cache_cleanup(),
        },
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

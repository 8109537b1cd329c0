//! `charter cache`

use anyhow::Result;

use super::common::emit_json;
use crate::cli::args::CacheCommands;
use crate::{CharterError, Config, ExitCode, ValidationCache};

pub fn execute_cache_command(config: &Config, command: CacheCommands) -> Result<ExitCode> {
    let mut cache = ValidationCache::new(config.root().to_path_buf(), &config.validate.cache_dir);

    match command {
        CacheCommands::Stats { json } => {
            let stats = cache.stats().map_err(CharterError::from)?;
            if json {
                println!("{}", emit_json(&stats)?);
                return Ok(ExitCode::SUCCESS);
            }
            println!("Cache directory: {}", cache.cache_dir());
            println!("Entries: {}", stats.file_count);
            println!("Size: {} bytes", stats.total_bytes);
            for (dir, count) in &stats.by_directory {
                println!("  {dir}: {count}");
            }
        }
        CacheCommands::Orphans { prune } => {
            let sources = &config.validate.source_dirs;
            let orphans = if prune {
                cache.prune_orphans(sources)
            } else {
                cache.orphaned_entries(sources)
            }
            .map_err(CharterError::from)?;

            for orphan in &orphans {
                println!("{} ({})", orphan.document, orphan.cache_path);
            }
            let verb = if prune { "Pruned" } else { "Found" };
            println!("{verb} {} orphaned entr{}", orphans.len(), if orphans.len() == 1 { "y" } else { "ies" });
        }
        CacheCommands::Clear => {
            let removed = cache.clear().map_err(CharterError::from)?;
            println!("Removed {removed} cache entr{}", if removed == 1 { "y" } else { "ies" });
        }
    }
    Ok(ExitCode::SUCCESS)
}

//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_seed` - Load an action catalog

use std::path::Path;

use anyhow::{Context, Result};
use tend_core::db::Database;
use tend_core::import::{
    ensure_default_focus_areas, import_catalog, import_catalog_file, DEFAULT_CATALOG,
};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    ensure_default_focus_areas(&db).context("Failed to create focus areas")?;
    println!("   Created focus areas: Independence, Emotion Skills");

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Load the action catalog: tend seed");
    println!("  2. See today's actions: tend suggest");

    Ok(())
}

pub fn cmd_seed(db_path: &Path, file: Option<&Path>, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    let stats = match file {
        Some(path) => {
            println!("📦 Importing catalog from {}...", path.display());
            import_catalog_file(&db, path).context("Failed to import catalog")?
        }
        None => {
            println!("📦 Loading built-in catalog...");
            import_catalog(&db, DEFAULT_CATALOG).context("Failed to load built-in catalog")?
        }
    };

    println!(
        "✅ Catalog loaded: {} imported, {} already current",
        stats.imported, stats.skipped
    );
    Ok(())
}

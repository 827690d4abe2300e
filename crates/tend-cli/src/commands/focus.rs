//! Focus area commands (list, pin, unpin)

use anyhow::{bail, Result};
use tend_core::db::Database;

pub fn cmd_focus_list(db: &Database) -> Result<()> {
    let areas = db.list_focus_areas()?;
    if areas.is_empty() {
        println!("No focus areas yet. Run: tend init");
        return Ok(());
    }

    println!();
    for area in areas {
        let marker = if area.active { "●" } else { "○" };
        println!("   {} {} ({})", marker, area.name, area.id);
        for title in &area.pinned_micro_skill_titles {
            println!("      📌 {}", title);
        }
    }
    Ok(())
}

pub fn cmd_focus_pin(db: &Database, focus: &str, title: &str, pin: bool) -> Result<()> {
    let Some(mut area) = db.get_focus_area(focus)? else {
        bail!("Unknown focus area '{}'. Run `tend focus list`.", focus);
    };

    if pin {
        if area.pinned_micro_skill_titles.iter().any(|t| t == title) {
            println!("   '{}' is already pinned", title);
            return Ok(());
        }
        area.pinned_micro_skill_titles.push(title.to_string());
        db.upsert_focus_area(&area)?;
        println!("📌 Pinned '{}' for {}", title, area.name);
    } else {
        let before = area.pinned_micro_skill_titles.len();
        area.pinned_micro_skill_titles.retain(|t| t != title);
        if area.pinned_micro_skill_titles.len() == before {
            println!("   '{}' was not pinned", title);
            return Ok(());
        }
        db.upsert_focus_area(&area)?;
        println!("✅ Unpinned '{}'", title);
    }
    Ok(())
}

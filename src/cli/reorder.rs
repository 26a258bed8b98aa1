//! Reorder and archive command implementations
//!
//! Both commands run the same pipeline: read the document, parse it into
//! blocks, optionally archive done tasks, serialize, then replace the file
//! in one atomic write. On any error the file is left untouched.

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{detect_sort, render, Document, Levels, SortMode};
use crate::storage::{Config, TodoFile};

/// Regroups the document by the requested (or configured) mode
pub fn reorder(
    output: &Output,
    file: &str,
    by: Option<SortMode>,
    levels: Option<u8>,
    dry_run: bool,
) -> Result<()> {
    let todo = TodoFile::new(file);
    let config = Config::load_for(todo.path())?;

    let mode = by.unwrap_or(config.default_mode);
    let levels = match levels {
        Some(n) => Levels::from_number(n)
            .with_context(|| format!("levels must be 1 or 2, got {}", n))?,
        None => config.levels(),
    };
    output.verbose_ctx(
        "reorder",
        &format!("effective mode={}, levels={}", mode.as_str(), levels.as_number()),
    );

    let text = todo.read()?;
    let doc = Document::parse(&text).context("Failed to parse todo document")?;
    let formatted = render(&doc, mode, levels).context("Failed to format todo document")?;

    apply(output, &todo, &formatted, dry_run)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "mode": mode.as_str(),
            "levels": levels.as_number(),
            "tasks": doc.task_count(),
            "groups": doc.group_count(mode),
            "dry_run": dry_run,
        }));
    } else if !dry_run {
        output.success(&format!(
            "Reordered {} task(s) into {} {} group(s)",
            doc.task_count(),
            doc.group_count(mode),
            mode.as_str(),
        ));
    }

    Ok(())
}

/// Moves done tasks into the archive block, then re-sorts the document in
/// its detected mode
pub fn archive(output: &Output, file: &str, dry_run: bool) -> Result<()> {
    let todo = TodoFile::new(file);

    let text = todo.read()?;
    let (mode, levels) =
        detect_sort(&text).context("Failed to detect how the document is sorted")?;
    output.verbose_ctx(
        "archive",
        &format!("detected mode={}, levels={}", mode.as_str(), levels.as_number()),
    );

    let mut doc = Document::parse(&text).context("Failed to parse todo document")?;
    let moved = doc.archive().context("Failed to archive done tasks")?;
    let formatted = render(&doc, mode, levels).context("Failed to format todo document")?;

    apply(output, &todo, &formatted, dry_run)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "archived": moved,
            "mode": mode.as_str(),
            "levels": levels.as_number(),
            "dry_run": dry_run,
        }));
    } else if !dry_run {
        output.success(&format!("Archived {} task(s)", moved));
    }

    Ok(())
}

fn apply(output: &Output, todo: &TodoFile, formatted: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("{}", formatted);
    } else {
        todo.replace(formatted)?;
        output.verbose_ctx("write", "document replaced atomically");
    }
    Ok(())
}

//! Document parsing and archiving
//!
//! A document is split on the literal archive separator line into blocks.
//! Reordering works on any number of blocks; archiving requires exactly
//! two (active, archive).

use thiserror::Error;

use super::block::{Block, TaskId};
use super::format::{Levels, SortMode};
use super::tag::TagError;

/// The literal line separating the active section from the archive
pub const ARCHIVE_SEPARATOR: &str =
    "------------------------------ archive ------------------------------";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document must contain exactly one archive separator (found {found})")]
    Malformed { found: usize },

    #[error("Cannot detect sort mode: no header line found")]
    UnknownSortMode,
}

/// A parsed document: one [`Block`] per separator-delimited section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Parses raw text, block-parsing each section independently
    pub fn parse(text: &str) -> Result<Self, TagError> {
        let blocks = text
            .split(ARCHIVE_SEPARATOR)
            .map(Block::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Total retained tasks across all blocks
    pub fn task_count(&self) -> usize {
        self.blocks.iter().map(Block::task_count).sum()
    }

    /// Number of named piles of the given mode across all blocks
    pub fn group_count(&self, mode: SortMode) -> usize {
        self.blocks
            .iter()
            .map(|block| match mode {
                SortMode::Project => block.projects().named_count(),
                SortMode::Context => block.contexts().named_count(),
            })
            .sum()
    }

    /// Moves every done task from the active block into the archive block.
    ///
    /// New archive ids continue past the highest existing archive id, and
    /// done tasks are processed in ascending id order, so newly archived
    /// tasks keep their relative order and never collide with existing
    /// entries. Returns the number of tasks moved.
    pub fn archive(&mut self) -> Result<usize, DocumentError> {
        let found = self.blocks.len() - 1;
        let [active, archive] = &mut self.blocks[..] else {
            return Err(DocumentError::Malformed { found });
        };

        let mut next_id: TaskId = archive.max_id().map_or(0, |max| max + 1);
        let mut moved = 0;

        for id in active.done_ids() {
            if let Some(entry) = active.take_task(id) {
                archive.insert_entry(next_id, entry);
                next_id += 1;
                moved += 1;
            }
        }

        Ok(moved)
    }
}

/// Detects how a document is currently sorted.
///
/// The first level-1 header decides the mode (`# @...` means context,
/// `# ...` means project); any level-2 header anywhere selects two-level
/// nesting. A document with no level-1 header has no detectable mode.
pub fn detect_sort(text: &str) -> Result<(SortMode, Levels), DocumentError> {
    let mut mode = None;
    let mut levels = Levels::One;

    for line in text.split('\n') {
        if line.starts_with("## ") {
            levels = Levels::Two;
        } else if mode.is_none() && line.starts_with("# @") {
            mode = Some(SortMode::Context);
        } else if mode.is_none() && line.starts_with("# ") {
            mode = Some(SortMode::Project);
        }
    }

    match mode {
        Some(mode) => Ok((mode, levels)),
        None => Err(DocumentError::UnknownSortMode),
    }
}

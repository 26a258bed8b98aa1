//! Deterministic document serialization
//!
//! Walks each block's pile index in sorted order, emitting section headers
//! and task lines with their remaining inline tags. The untagged pile is
//! rendered first and without a header, so its tasks stay untagged on
//! re-parse.

use serde::{Deserialize, Serialize};

use super::block::{Block, PileKey, TaskId};
use super::document::{Document, ARCHIVE_SEPARATOR};
use super::tag::{format_tag, TagError, TagForm, TagKind};

/// Primary grouping key for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Project,
    Context,
}

impl SortMode {
    pub fn kind(self) -> TagKind {
        match self {
            SortMode::Project => TagKind::Project,
            SortMode::Context => TagKind::Context,
        }
    }

    /// The other kind, used as the secondary grouping key
    pub fn secondary_kind(self) -> TagKind {
        match self {
            SortMode::Project => TagKind::Context,
            SortMode::Context => TagKind::Project,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Project => "project",
            SortMode::Context => "context",
        }
    }
}

/// Header nesting depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Levels {
    #[default]
    One,
    Two,
}

impl Levels {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Levels::One),
            2 => Some(Levels::Two),
            _ => None,
        }
    }

    pub fn as_number(self) -> u8 {
        match self {
            Levels::One => 1,
            Levels::Two => 2,
        }
    }
}

/// Serializes a document, grouping tasks under generated headers.
///
/// Blocks are joined by the archive separator followed by a blank line;
/// trailing newlines are trimmed from the final output.
pub fn render(doc: &Document, mode: SortMode, levels: Levels) -> Result<String, TagError> {
    let mut out = String::new();
    for (i, block) in doc.blocks().iter().enumerate() {
        if i > 0 {
            out.push_str(ARCHIVE_SEPARATOR);
            out.push_str("\n\n");
        }
        render_block(&mut out, block, mode, levels)?;
    }
    Ok(out.trim_end_matches('\n').to_string())
}

fn render_block(
    out: &mut String,
    block: &Block,
    mode: SortMode,
    levels: Levels,
) -> Result<(), TagError> {
    let (primary, secondary) = match mode {
        SortMode::Project => (block.projects(), block.contexts()),
        SortMode::Context => (block.contexts(), block.projects()),
    };

    for (key, ids) in primary.iter() {
        if let Some(name) = key.name() {
            out.push_str("# ");
            out.push_str(&format_tag(name, mode.kind(), TagForm::Header)?);
            out.push('\n');
        }

        match levels {
            Levels::One => {
                for &id in ids {
                    push_task_line(out, block, id, &[(mode.kind(), key)])?;
                }
            }
            Levels::Two => {
                for (sub_key, sub_ids) in secondary.iter() {
                    let shared: Vec<TaskId> = ids.intersection(sub_ids).copied().collect();
                    if shared.is_empty() {
                        continue;
                    }
                    if let Some(name) = sub_key.name() {
                        out.push_str("## ");
                        out.push_str(&format_tag(name, mode.secondary_kind(), TagForm::Header)?);
                        out.push('\n');
                    }
                    for id in shared {
                        push_task_line(
                            out,
                            block,
                            id,
                            &[(mode.kind(), key), (mode.secondary_kind(), sub_key)],
                        )?;
                    }
                }
            }
        }

        out.push('\n');
    }

    Ok(())
}

/// Emits one task line: display text plus every tag the task carries that
/// the current header path does not already imply.
fn push_task_line(
    out: &mut String,
    block: &Block,
    id: TaskId,
    implied: &[(TagKind, &PileKey)],
) -> Result<(), TagError> {
    let mut tags = Vec::new();
    for (kind, index) in [
        (TagKind::Project, block.projects()),
        (TagKind::Context, block.contexts()),
    ] {
        for key in index.piles_containing(id) {
            if implied.iter().any(|&(ik, ikey)| ik == kind && ikey == key) {
                continue;
            }
            let Some(name) = key.name() else {
                continue;
            };
            tags.push(format_tag(name, kind, TagForm::Tag)?);
        }
    }

    let text = block.text(id).unwrap_or_default();
    out.push_str(text.trim_end());
    if !tags.is_empty() {
        out.push(' ');
        out.push_str(&tags.join(" "));
    }
    out.push('\n');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reorder(input: &str, mode: SortMode, levels: Levels) -> String {
        render(&Document::parse(input).unwrap(), mode, levels).unwrap()
    }

    #[test]
    fn groups_by_project_with_remaining_tags() {
        let out = reorder(
            "# Work\ntask one @home\nx task two .proj",
            SortMode::Project,
            Levels::One,
        );
        assert_eq!(
            out,
            "# Proj\nx task two .work\n\n# Work\ntask one @home\nx task two .proj"
        );
    }

    #[test]
    fn untagged_tasks_come_first_without_a_header() {
        let out = reorder(
            "loose task\n# Work\ndesk task",
            SortMode::Project,
            Levels::One,
        );
        assert_eq!(out, "loose task\n\n# Work\ndesk task");
    }

    #[test]
    fn context_headers_carry_the_at_marker() {
        let out = reorder("errand @town", SortMode::Context, Levels::One);
        assert_eq!(out, "# @Town\nerrand");
    }

    #[test]
    fn multi_word_tags_render_as_capitalized_headers() {
        let out = reorder("plan trip .summer_holiday", SortMode::Project, Levels::One);
        assert_eq!(out, "# Summer Holiday\nplan trip");
    }

    #[test]
    fn two_level_nesting_by_project_then_context() {
        let out = reorder(
            "# Work\nreview notes @desk\ncall client @phone\nuntagged chore",
            SortMode::Project,
            Levels::Two,
        );
        assert_eq!(
            out,
            "# Work\nuntagged chore\n## @Desk\nreview notes\n## @Phone\ncall client"
        );
    }

    #[test]
    fn two_level_nesting_by_context_then_project() {
        let out = reorder(
            "# @Home\nfix fence .garden\nread book",
            SortMode::Context,
            Levels::Two,
        );
        assert_eq!(out, "# @Home\nread book\n## Garden\nfix fence");
    }

    #[test]
    fn nested_output_reparses_to_the_same_document() {
        let input = "# Work\nreview notes @desk\ncall client @phone\nx done thing\nloose end";
        let once = reorder(input, SortMode::Project, Levels::Two);
        let twice = reorder(&once, SortMode::Project, Levels::Two);
        assert_eq!(once, twice);
    }

    #[test]
    fn reorder_is_idempotent_across_modes() {
        let input = "buy milk @shop\n# Work\nwrite report\nx file taxes @desk";
        for mode in [SortMode::Project, SortMode::Context] {
            for levels in [Levels::One, Levels::Two] {
                let once = reorder(input, mode, levels);
                let twice = reorder(&once, mode, levels);
                assert_eq!(once, twice, "mode {:?} levels {:?}", mode, levels);
            }
        }
    }

    #[test]
    fn multi_pile_tasks_stabilize_after_one_pass() {
        // A task filed under two piles is rendered once per pile; on
        // re-parse its id becomes the position of the first rendition,
        // which can shuffle the first pass. The second pass is a fixed
        // point.
        let input = "# Work\nwrite report\nx file taxes .finance";
        let once = reorder(input, SortMode::Project, Levels::One);
        let twice = reorder(&once, SortMode::Project, Levels::One);
        let thrice = reorder(&twice, SortMode::Project, Levels::One);
        assert_eq!(twice, thrice);
    }

    #[test]
    fn task_with_two_projects_appears_under_both_headers() {
        let out = reorder("shared task .alpha .beta", SortMode::Project, Levels::One);
        assert_eq!(out, "# Alpha\nshared task .beta\n\n# Beta\nshared task .alpha");

        // Reparsing collapses the two renditions back into one task.
        let doc = Document::parse(&out).unwrap();
        assert_eq!(doc.task_count(), 1);
    }

    #[test]
    fn blocks_rejoin_around_the_archive_separator() {
        let input = format!("task one\n{}\nx old task", ARCHIVE_SEPARATOR);
        let out = reorder(&input, SortMode::Project, Levels::One);
        assert_eq!(
            out,
            format!("task one\n\n{}\n\nx old task", ARCHIVE_SEPARATOR)
        );
    }

    #[test]
    fn empty_active_block_renders_separator_first() {
        let input = format!("{}\nx old task", ARCHIVE_SEPARATOR);
        let out = reorder(&input, SortMode::Project, Levels::One);
        assert_eq!(out, format!("{}\n\nx old task", ARCHIVE_SEPARATOR));
    }

    #[test]
    fn separator_length_is_stable() {
        assert_eq!(ARCHIVE_SEPARATOR.len(), 69);
        assert!(ARCHIVE_SEPARATOR.starts_with("------------------------------ archive"));
    }
}

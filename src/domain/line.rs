//! Single-line classification
//!
//! Each source line is either blank, a section header, or a task line.
//! Headers do not produce tasks; they update the running [`HeaderState`]
//! that seeds the tag sets of the task lines below them.

use std::collections::BTreeSet;

use super::tag::{canonical, TagError, TagKind};

/// An active section header: its raw name and whether it groups by
/// project or context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub kind: TagKind,
}

/// The two active header slots while scanning a block.
///
/// Slot 1 holds the most recent `#` header, slot 2 the most recent `##`
/// header. A new `#` header clears slot 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderState {
    level1: Option<Header>,
    level2: Option<Header>,
}

impl HeaderState {
    fn set_level1(&mut self, name: &str, kind: TagKind) {
        self.level1 = Some(Header {
            name: name.to_string(),
            kind,
        });
        self.level2 = None;
    }

    fn set_level2(&mut self, name: &str, kind: TagKind) {
        self.level2 = Some(Header {
            name: name.to_string(),
            kind,
        });
    }

    fn active(&self) -> impl Iterator<Item = &Header> {
        self.level1.iter().chain(self.level2.iter())
    }
}

/// A task line parsed in isolation: display text with tag words removed,
/// canonical tag sets (header-derived tags included), and the done flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    pub text: String,
    pub projects: BTreeSet<String>,
    pub contexts: BTreeSet<String>,
    pub done: bool,
}

/// Classifies one line, updating the header state in place.
///
/// Returns `None` for blank lines and headers, `Some` for task lines.
pub fn parse_line(line: &str, state: &mut HeaderState) -> Result<Option<ParsedTask>, TagError> {
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(name) = line.strip_prefix("# @") {
        state.set_level1(name, TagKind::Context);
        return Ok(None);
    }
    if let Some(name) = line.strip_prefix("# ") {
        state.set_level1(name, TagKind::Project);
        return Ok(None);
    }
    if let Some(name) = line.strip_prefix("## @") {
        state.set_level2(name, TagKind::Context);
        return Ok(None);
    }
    if let Some(name) = line.strip_prefix("## ") {
        state.set_level2(name, TagKind::Project);
        return Ok(None);
    }

    let done = line.starts_with("x ");
    let mut projects = BTreeSet::new();
    let mut contexts = BTreeSet::new();

    // A header with an empty name contributes no tag.
    for header in state.active() {
        if header.name.is_empty() {
            continue;
        }
        match header.kind {
            TagKind::Project => projects.insert(canonical(&header.name)?),
            TagKind::Context => contexts.insert(canonical(&header.name)?),
        };
    }

    let mut kept = Vec::new();
    for word in line.split(' ') {
        if word.starts_with('.') {
            projects.insert(canonical(word)?);
        } else if word.starts_with('@') {
            contexts.insert(canonical(word)?);
        } else {
            kept.push(word);
        }
    }

    Ok(Some(ParsedTask {
        text: kept.join(" "),
        projects,
        contexts,
        done,
    }))
}

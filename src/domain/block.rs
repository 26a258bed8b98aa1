//! Block parsing and the pile indexes
//!
//! A block is one separator-delimited section of the document (active or
//! archive). Parsing assigns every task line a sequential id, suppresses
//! duplicates, and files each retained task into the project and context
//! pile indexes.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::line::{parse_line, HeaderState, ParsedTask};
use super::tag::TagError;

/// Task id, unique within one block
pub type TaskId = u64;

/// Key of one pile: a canonical tag name, or the untagged pile.
///
/// `Untagged` orders before every named pile, so sorted traversal emits
/// headerless tasks first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PileKey {
    Untagged,
    Named(String),
}

impl PileKey {
    /// Returns the tag name, or `None` for the untagged pile
    pub fn name(&self) -> Option<&str> {
        match self {
            PileKey::Untagged => None,
            PileKey::Named(name) => Some(name),
        }
    }
}

/// Multi-map from pile key to the ordered set of task ids filed under it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PileIndex {
    piles: BTreeMap<PileKey, BTreeSet<TaskId>>,
}

impl PileIndex {
    fn add(&mut self, key: PileKey, id: TaskId) {
        self.piles.entry(key).or_default().insert(id);
    }

    /// Removes a task from every pile it is filed under, dropping piles
    /// that become empty. Returns the keys the task was filed under, in
    /// ascending order.
    fn remove_task(&mut self, id: TaskId) -> Vec<PileKey> {
        let mut removed = Vec::new();
        self.piles.retain(|key, ids| {
            if ids.remove(&id) {
                removed.push(key.clone());
            }
            !ids.is_empty()
        });
        removed
    }

    /// Iterates piles in ascending key order (`Untagged` first)
    pub fn iter(&self) -> impl Iterator<Item = (&PileKey, &BTreeSet<TaskId>)> {
        self.piles.iter()
    }

    /// Keys of every pile containing the task, in ascending order
    pub fn piles_containing(&self, id: TaskId) -> impl Iterator<Item = &PileKey> {
        self.piles
            .iter()
            .filter(move |(_, ids)| ids.contains(&id))
            .map(|(key, _)| key)
    }

    /// Returns the ids filed under a key
    pub fn get(&self, key: &PileKey) -> Option<&BTreeSet<TaskId>> {
        self.piles.get(key)
    }

    /// Number of named piles (the untagged pile is not counted)
    pub fn named_count(&self) -> usize {
        self.piles
            .keys()
            .filter(|key| matches!(key, PileKey::Named(_)))
            .count()
    }
}

/// A task lifted out of one block, ready to be filed into another with a
/// fresh id
#[derive(Debug, Clone)]
pub(crate) struct TaskEntry {
    pub text: String,
    pub done: bool,
    pub projects: Vec<PileKey>,
    pub contexts: Vec<PileKey>,
}

/// One parsed document section: full-text and done indexes plus the two
/// pile indexes.
///
/// Invariant: every id in `texts` appears in both pile indexes under at
/// least one key (`Untagged` when the task carries no tag of that kind).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    texts: BTreeMap<TaskId, String>,
    done: BTreeMap<TaskId, bool>,
    projects: PileIndex,
    contexts: PileIndex,
}

impl Block {
    /// Parses a block of text.
    ///
    /// The id counter advances for every task line, including duplicates
    /// whose entries are suppressed; header and blank lines consume no id.
    pub fn parse(text: &str) -> Result<Self, TagError> {
        let mut block = Block::default();
        let mut state = HeaderState::default();
        let mut seen: HashSet<(String, Vec<String>, Vec<String>, bool)> = HashSet::new();
        let mut next_id: TaskId = 0;

        for line in text.split('\n') {
            let Some(task) = parse_line(line, &mut state)? else {
                continue;
            };
            let id = next_id;
            next_id += 1;

            let fingerprint = (
                task.text.clone(),
                task.projects.iter().cloned().collect(),
                task.contexts.iter().cloned().collect(),
                task.done,
            );
            if seen.insert(fingerprint) {
                block.insert_parsed(id, task);
            }
        }

        Ok(block)
    }

    fn insert_parsed(&mut self, id: TaskId, task: ParsedTask) {
        self.texts.insert(id, task.text);
        self.done.insert(id, task.done);

        if task.projects.is_empty() {
            self.projects.add(PileKey::Untagged, id);
        } else {
            for name in task.projects {
                self.projects.add(PileKey::Named(name), id);
            }
        }
        if task.contexts.is_empty() {
            self.contexts.add(PileKey::Untagged, id);
        } else {
            for name in task.contexts {
                self.contexts.add(PileKey::Named(name), id);
            }
        }
    }

    /// Number of retained tasks
    pub fn task_count(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Display text of a task
    pub fn text(&self, id: TaskId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    /// Done flag of a task
    pub fn is_done(&self, id: TaskId) -> bool {
        self.done.get(&id).copied().unwrap_or(false)
    }

    /// Highest task id present, if any
    pub fn max_id(&self) -> Option<TaskId> {
        self.texts.keys().next_back().copied()
    }

    /// Ids of all done tasks, ascending
    pub fn done_ids(&self) -> Vec<TaskId> {
        self.done
            .iter()
            .filter(|(_, &done)| done)
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn projects(&self) -> &PileIndex {
        &self.projects
    }

    pub fn contexts(&self) -> &PileIndex {
        &self.contexts
    }

    /// Removes a task and its pile memberships, returning them for
    /// re-insertion elsewhere
    pub(crate) fn take_task(&mut self, id: TaskId) -> Option<TaskEntry> {
        let text = self.texts.remove(&id)?;
        let done = self.done.remove(&id).unwrap_or(false);
        let projects = self.projects.remove_task(id);
        let contexts = self.contexts.remove_task(id);
        Some(TaskEntry {
            text,
            done,
            projects,
            contexts,
        })
    }

    /// Files a lifted task under a new id, preserving its pile memberships
    pub(crate) fn insert_entry(&mut self, id: TaskId, entry: TaskEntry) {
        self.texts.insert(id, entry.text);
        self.done.insert(id, entry.done);
        for key in entry.projects {
            self.projects.add(key, id);
        }
        for key in entry.contexts {
            self.contexts.add(key, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> PileKey {
        PileKey::Named(name.to_string())
    }

    fn ids(index: &PileIndex, key: &PileKey) -> Vec<TaskId> {
        index.get(key).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    #[test]
    fn header_tags_and_inline_tags_both_file() {
        let block = Block::parse("# Work\ntask one @home\nx task two .proj").unwrap();

        assert_eq!(block.task_count(), 2);
        assert_eq!(ids(block.projects(), &named("work")), vec![0, 1]);
        assert_eq!(ids(block.projects(), &named("proj")), vec![1]);
        assert_eq!(ids(block.contexts(), &named("home")), vec![0]);
        assert_eq!(ids(block.contexts(), &PileKey::Untagged), vec![1]);
        assert!(!block.is_done(0));
        assert!(block.is_done(1));
    }

    #[test]
    fn untagged_tasks_file_under_sentinel_pile() {
        let block = Block::parse("free floating task").unwrap();

        assert_eq!(ids(block.projects(), &PileKey::Untagged), vec![0]);
        assert_eq!(ids(block.contexts(), &PileKey::Untagged), vec![0]);
    }

    #[test]
    fn duplicate_task_is_suppressed_but_consumes_an_id() {
        let block = Block::parse("call mom\ncall mom\nwalk dog").unwrap();

        assert_eq!(block.task_count(), 2);
        assert_eq!(block.text(0), Some("call mom"));
        assert_eq!(block.text(1), None);
        assert_eq!(block.text(2), Some("walk dog"));
    }

    #[test]
    fn same_text_different_tags_is_not_a_duplicate() {
        let block = Block::parse("call mom @home\ncall mom @work").unwrap();
        assert_eq!(block.task_count(), 2);
    }

    #[test]
    fn done_prefix_makes_a_distinct_task() {
        let block = Block::parse("x call mom\ncall mom").unwrap();
        assert_eq!(block.task_count(), 2);
    }

    #[test]
    fn header_derived_tags_count_toward_duplicate_identity() {
        // The same text under two different headers is two distinct tasks.
        let block = Block::parse("# Work\nreview notes\n# Chores\nreview notes").unwrap();
        assert_eq!(block.task_count(), 2);

        // A header tag repeated inline is still one task.
        let block = Block::parse("# Work\nreview notes .work\nreview notes").unwrap();
        assert_eq!(block.task_count(), 1);
    }

    #[test]
    fn headers_and_blanks_consume_no_id() {
        let block = Block::parse("# Work\n\ntask one\n## @Desk\ntask two").unwrap();
        assert_eq!(block.text(0), Some("task one"));
        assert_eq!(block.text(1), Some("task two"));
    }

    #[test]
    fn membership_is_total_for_every_task() {
        let block = Block::parse("# Work\na\nb @home .side\nc").unwrap();

        for id in [0, 1, 2] {
            assert!(block.projects().piles_containing(id).next().is_some());
            assert!(block.contexts().piles_containing(id).next().is_some());
        }
    }

    #[test]
    fn take_task_drops_emptied_piles() {
        let mut block = Block::parse("only task .solo").unwrap();
        let entry = block.take_task(0).unwrap();

        assert_eq!(entry.projects, vec![named("solo")]);
        assert_eq!(entry.contexts, vec![PileKey::Untagged]);
        assert!(block.is_empty());
        assert!(block.projects().get(&named("solo")).is_none());
    }

    #[test]
    fn untagged_pile_orders_before_named_piles() {
        assert!(PileKey::Untagged < named("a"));
        assert!(PileKey::Untagged < named(""));
    }
}

//! Tag normalization
//!
//! A tag has two surface forms:
//! - *tag form*: lowercase words joined by `_`, written inline as `.proj`
//!   (project) or `@home` (context)
//! - *header form*: capitalized words joined by spaces, written as a section
//!   header (`# Proj`, `# @Home`)
//!
//! Form detection is heuristic: a token containing `_` or starting with a
//! lowercase character is already in tag form. Conversion is idempotent.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("Empty tag: a tag must contain at least one character after its prefix")]
    Empty,
}

/// Whether a tag names a project (`.`) or a context (`@`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Project,
    Context,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Project => write!(f, "project"),
            TagKind::Context => write!(f, "context"),
        }
    }
}

/// Target surface form for [`format_tag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagForm {
    Header,
    Tag,
}

/// Detects the surface form a (prefix-stripped) token is currently in
fn current_form(tag: &str) -> TagForm {
    if tag.contains('_') || tag.chars().next().is_some_and(char::is_lowercase) {
        TagForm::Tag
    } else {
        TagForm::Header
    }
}

fn strip_marker(raw: &str) -> &str {
    raw.strip_prefix('.')
        .or_else(|| raw.strip_prefix('@'))
        .unwrap_or(raw)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn to_tag_form(tag: &str) -> String {
    match current_form(tag) {
        TagForm::Tag => tag.to_string(),
        TagForm::Header => tag
            .split(' ')
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_"),
    }
}

fn to_header_form(tag: &str) -> String {
    match current_form(tag) {
        TagForm::Header => tag.to_string(),
        TagForm::Tag => tag
            .split('_')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Normalizes a raw tag token to the canonical pile-key name: tag form,
/// no prefix.
pub fn canonical(raw: &str) -> Result<String, TagError> {
    let tag = strip_marker(raw);
    if tag.is_empty() {
        return Err(TagError::Empty);
    }
    Ok(to_tag_form(tag))
}

/// Formats a raw tag token for rendering.
///
/// The output carries its marker: tag form prefixes projects with `.` and
/// contexts with `@`; header form prefixes contexts with `@` and projects
/// with nothing.
pub fn format_tag(raw: &str, kind: TagKind, target: TagForm) -> Result<String, TagError> {
    let tag = strip_marker(raw);
    if tag.is_empty() {
        return Err(TagError::Empty);
    }

    let body = match target {
        TagForm::Tag => to_tag_form(tag),
        TagForm::Header => to_header_form(tag),
    };

    let marker = match (target, kind) {
        (TagForm::Header, TagKind::Project) => "",
        (TagForm::Tag, TagKind::Project) => ".",
        (_, TagKind::Context) => "@",
    };

    Ok(format!("{}{}", marker, body))
}

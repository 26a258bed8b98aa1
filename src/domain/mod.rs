//! Domain model for todo documents
//!
//! Contains the parse → index → archive → format pipeline without any
//! I/O concerns.

mod tag;
mod line;
mod block;
mod document;
mod format;

pub use tag::{canonical, format_tag, TagError, TagForm, TagKind};
pub use block::{Block, PileIndex, PileKey, TaskId};
pub use document::{detect_sort, Document, DocumentError, ARCHIVE_SEPARATOR};
pub use format::{render, Levels, SortMode};

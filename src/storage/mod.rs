//! # Storage Layer
//!
//! The only persistent store is the todo document itself.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Todo document | Plain text | user-chosen path (or `-` for stdio) |
//! | Config | TOML | `.tidytodo.toml` next to the document, or the user config dir |
//!
//! ## Concurrency Safety
//!
//! - [`TodoFile`] replacement is atomic (temp file + rename) and holds an
//!   exclusive `fs2` lock while writing
//!
//! ## Key Types
//!
//! - [`TodoFile`] - Read the full document, replace it atomically
//! - [`Config`] - Optional defaults for sort mode and nesting

mod config;
mod todo_file;

pub use config::{Config, ConfigError};
pub use todo_file::TodoFile;

//! tidytodo - A plain-text todo-list reorganizer
//!
//! Tidytodo parses a todo document whose task lines carry inline project
//! (`.proj`) and context (`@home`) tags, regroups the tasks under generated
//! section headers, and can archive completed tasks below a separator line.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Block, Document, Levels, PileKey, SortMode, TaskId};

//! Buffer access for the todo document
//!
//! The document is read in full and replaced in full. Replacement writes a
//! locked temp file and renames it over the original, so a crash never
//! leaves a half-written document. The path `-` means stdin/stdout.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Handle to the todo document
pub struct TodoFile {
    path: PathBuf,
}

impl TodoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when the document flows through stdin/stdout
    pub fn is_stdio(&self) -> bool {
        self.path.as_os_str() == "-"
    }

    /// Reads the full document text
    pub fn read(&self) -> Result<String> {
        if self.is_stdio() {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read document from stdin")?;
            return Ok(text);
        }

        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read todo file: {}", self.path.display()))
    }

    /// Replaces the full document text atomically (temp file + rename).
    ///
    /// A trailing newline is appended if missing.
    pub fn replace(&self, text: &str) -> Result<()> {
        if self.is_stdio() {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writer
                .write_all(text.as_bytes())
                .context("Failed to write document to stdout")?;
            if !text.ends_with('\n') {
                writer.write_all(b"\n").context("Failed to write document to stdout")?;
            }
            return Ok(());
        }

        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on todo file")?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(text.as_bytes())
                .context("Failed to write todo file")?;
            if !text.ends_with('\n') {
                writer.write_all(b"\n").context("Failed to write todo file")?;
            }
            writer.flush().context("Failed to flush todo file")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "todo".to_string());
        self.path.with_file_name(format!("{}.tmp", name))
    }
}

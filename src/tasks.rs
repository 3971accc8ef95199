//! Task transcript store
//!
//! One Markdown file per calendar date under the tasks directory. The
//! AI-generated exercise is the initial content; each graded review is
//! appended to the same file under a timestamped `Review - Task N` heading.
//! Free-form Markdown is the durable artifact; nothing here parses the
//! exercise content back into structured data.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;

/// Flat-file store for daily task transcripts
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Create a store rooted at the given directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create tasks directory")?;
        Ok(Self { dir })
    }

    /// Path of the transcript for one date
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("task_{date}.md"))
    }

    /// Whether a transcript exists for the date
    pub fn exists(&self, date: NaiveDate) -> bool {
        self.path_for(date).exists()
    }

    /// Write a fresh task transcript, replacing any existing one for the date
    pub fn write_task(&self, date: NaiveDate, content: &str) -> Result<PathBuf> {
        let path = self.path_for(date);
        let body = format!("# Daily English Task - {date}\n\n{content}\n");
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read the full transcript for the date
    pub fn read_task(&self, date: NaiveDate) -> Result<String> {
        let path = self.path_for(date);
        std::fs::read_to_string(&path)
            .with_context(|| format!("No task found for {date} (expected {})", path.display()))
    }

    /// Append a graded review under its own timestamped heading
    pub fn append_review(&self, date: NaiveDate, task_number: u8, review: &str) -> Result<()> {
        let path = self.path_for(date);
        let existing = std::fs::read_to_string(&path)
            .with_context(|| format!("No task found for {date} (expected {})", path.display()))?;

        let stamped = format!(
            "{existing}\n---\n\n## Review - Task {task_number} ({})\n\n{review}\n",
            Local::now().format("%Y-%m-%d %H:%M")
        );
        std::fs::write(&path, stamped)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Extract one numbered exercise section (`## N. ...`) from the transcript.
    ///
    /// Returns the section body up to the next `## ` heading or a `---` rule,
    /// or None when the transcript has no such numbered heading.
    pub fn section(&self, date: NaiveDate, number: u8) -> Result<Option<String>> {
        let content = self.read_task(date)?;
        Ok(extract_section(&content, number))
    }
}

fn extract_section(content: &str, number: u8) -> Option<String> {
    let marker = format!("## {number}.");
    let mut collecting = false;
    let mut lines = Vec::new();

    for line in content.lines() {
        if line.trim_start().starts_with(&marker) {
            collecting = true;
            lines.push(line);
            continue;
        }
        if collecting {
            let trimmed = line.trim_start();
            if trimmed.starts_with("## ") || trimmed.starts_with("---") {
                break;
            }
            lines.push(line);
        }
    }

    if collecting {
        Some(lines.join("\n").trim_end().to_string())
    } else {
        None
    }
}

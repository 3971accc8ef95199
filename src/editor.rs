//! External-editor capture for free-text answers
//!
//! Answers to a graded task are written in the user's own editor rather than
//! on the command line. A scratch Markdown file is pre-filled with a
//! template, the editor runs to completion, and the saved content comes
//! back. An unchanged-empty submission is rejected.

use anyhow::{bail, Context, Result};
use std::process::Command;

/// Resolve the editor command: $VISUAL, then $EDITOR, then vi
fn editor_command() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string())
}

/// Open the user's editor on a scratch file seeded with `template` and
/// return what they saved. Fails on editor error or an empty submission.
pub fn capture_input(template: &str) -> Result<String> {
    let file = tempfile::Builder::new()
        .prefix("lingotutor-answer-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create scratch file")?;
    std::fs::write(file.path(), template).context("Failed to seed scratch file")?;

    let editor = editor_command();
    let status = Command::new(&editor)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    if !status.success() {
        bail!("Editor '{editor}' exited with {status}");
    }

    let content = std::fs::read_to_string(file.path())
        .context("Failed to read scratch file back")?;
    let answer = strip_template(&content, template);
    if answer.trim().is_empty() {
        bail!("Empty submission; nothing to grade");
    }
    Ok(answer)
}

/// Drop template comment lines so only the user's text remains
fn strip_template(content: &str, template: &str) -> String {
    let template_lines: Vec<&str> = template.lines().collect();
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.starts_with("<!--") && template_lines.contains(&line.trim_end()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Template shown when answering a numbered task
pub fn answer_template(task_number: u8) -> String {
    format!("<!-- Write your answers for task {task_number} below, then save and close. -->\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_comment_lines_are_stripped() {
        let template = answer_template(2);
        let content = format!("{template}My translation goes here.\n");
        let answer = strip_template(&content, &template);
        assert_eq!(answer.trim(), "My translation goes here.");
    }

    #[test]
    fn user_comments_survive_stripping() {
        let template = answer_template(1);
        let content = format!("{template}<!-- my own note -->\nanswer\n");
        let answer = strip_template(&content, &template);
        assert!(answer.contains("my own note"));
        assert!(answer.contains("answer"));
    }

    #[test]
    fn untouched_template_counts_as_empty() {
        let template = answer_template(3);
        assert!(strip_template(&template, &template).trim().is_empty());
    }
}

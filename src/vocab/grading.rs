//! Parse graded word-transformation reviews into mastery updates
//!
//! The review prompt asks for a fixed shape per word: a `### Word N: <word>`
//! heading followed by a Markdown table with one row per form,
//! `| Form | Correct Answer | Student's Answer | Status | Arti |`, where the
//! status cell carries ✓ (correct), ✗ (wrong) or + (filled in for the
//! student). Anything that does not fit that shape is skipped, so a
//! free-form review degrades to no mastery updates rather than an error.

use super::store::{MasteryUpdate, CANONICAL_FORMS};

/// Per-word grading parsed from a review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordGrade {
    pub word: String,
    pub forms_correct: Vec<String>,
    pub forms_weak: Vec<String>,
    pub forms_data: Vec<(String, String)>,
    pub forms_meanings: Vec<(String, String)>,
}

impl WordGrade {
    /// Percentage of the five form slots marked correct, capped at 100
    pub fn accuracy(&self) -> u32 {
        let pct = (self.forms_correct.len() as u32 * 100) / CANONICAL_FORMS.len() as u32;
        pct.min(100)
    }

    fn has_form(&self, form: &str) -> bool {
        self.forms_correct.iter().any(|f| f == form) || self.forms_weak.iter().any(|f| f == form)
    }

    /// Convert into the store's update record
    pub fn into_update(self) -> MasteryUpdate {
        let accuracy = self.accuracy();
        MasteryUpdate {
            word: self.word,
            accuracy,
            forms_correct: self.forms_correct,
            forms_weak: self.forms_weak,
            word_type: None,
            meaning: None,
            forms_data: self.forms_data,
            forms_meanings: self.forms_meanings,
        }
    }
}

/// Extract all per-word gradings from a task-1 review transcript
pub fn parse_word_grades(review: &str) -> Vec<WordGrade> {
    let mut grades: Vec<WordGrade> = Vec::new();
    let mut current: Option<WordGrade> = None;

    for line in review.lines() {
        let line = line.trim();

        if let Some(word) = parse_word_heading(line) {
            if let Some(grade) = current.take() {
                if !grade.word.is_empty() {
                    grades.push(grade);
                }
            }
            current = Some(WordGrade {
                word,
                ..Default::default()
            });
            continue;
        }

        let Some(grade) = current.as_mut() else {
            continue;
        };
        if let Some((form, value, meaning, status)) = parse_form_row(line) {
            // One verdict per canonical form; a repeated row keeps the first
            if grade.has_form(&form) {
                continue;
            }
            if status == FormStatus::Correct {
                grade.forms_correct.push(form.clone());
            } else {
                grade.forms_weak.push(form.clone());
            }
            if let Some(value) = value {
                grade.forms_data.push((form.clone(), value));
            }
            if let Some(meaning) = meaning {
                grade.forms_meanings.push((form, meaning));
            }
        }
    }

    if let Some(grade) = current {
        if !grade.word.is_empty() {
            grades.push(grade);
        }
    }

    grades.retain(|g| !g.forms_correct.is_empty() || !g.forms_weak.is_empty());
    grades
}

#[derive(PartialEq)]
enum FormStatus {
    Correct,
    Weak,
}

/// `### Word 3: Facilitate` (tolerating bold markers and brackets)
fn parse_word_heading(line: &str) -> Option<String> {
    let rest = line.strip_prefix("### Word")?;
    let (_, word) = rest.split_once(':')?;
    let word = word
        .trim()
        .trim_matches(|c| c == '*' || c == '[' || c == ']')
        .trim();
    if word.is_empty() {
        None
    } else {
        Some(word.to_lowercase())
    }
}

/// `| Verb | mitigate | mitigated | ✗ | mengurangi |`
fn parse_form_row(line: &str) -> Option<(String, Option<String>, Option<String>, FormStatus)> {
    if !line.starts_with('|') {
        return None;
    }

    let cells: Vec<&str> = line
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect();
    if cells.len() < 4 {
        return None;
    }

    let form = cells[0].to_lowercase();
    if !CANONICAL_FORMS.contains(&form.as_str()) {
        return None;
    }

    let status = if cells[3].contains('✓') {
        FormStatus::Correct
    } else {
        FormStatus::Weak
    };

    let cell_value = |i: usize| {
        cells
            .get(i)
            .filter(|c| !c.is_empty() && **c != "..." && **c != "-")
            .map(|c| c.to_string())
    };

    Some((form, cell_value(1), cell_value(4), status))
}

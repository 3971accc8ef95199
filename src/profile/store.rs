//! Learner profile store - JSON-backed weakness aggregate
//!
//! One profile per installation. Every graded review increments the per-tag
//! mistake counters, then the derived views (patterns, focus areas) are
//! recomputed from scratch over the full weakness history. The wholesale
//! recompute keeps the cheap derivation rules drift-free; do not make it
//! incremental.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::extractor::WeaknessReport;

const PROFILE_FILE: &str = "user_profile.json";

/// Focus-area thresholds: grammar tags
const GRAMMAR_URGENT_AT: u32 = 5;
const PRACTICE_AT: u32 = 2;
/// Focus-area thresholds: translation tags (never reach `maintain`)
const TRANSLATION_URGENT_AT: u32 = 3;

const URGENT_CAP: usize = 3;
const PRACTICE_CAP: usize = 5;
const MAINTAIN_CAP: usize = 3;
const PERSISTENT_AT: u32 = 3;

/// One dated mistake occurrence for a weakness tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakeEvent {
    pub date: NaiveDate,
    pub count: u32,
    pub task_type: String,
}

/// Running tally for a single weakness tag, in insertion order within the profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaknessRecord {
    pub tag: String,
    pub total_mistakes: u32,
    pub recent_mistakes: u32,
    pub trend: String,
    pub history: Vec<MistakeEvent>,
}

impl WeaknessRecord {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            total_mistakes: 0,
            recent_mistakes: 0,
            trend: "new".to_string(),
            history: Vec::new(),
        }
    }
}

/// A word the learner keeps missing, with a recurrence counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyGap {
    pub word: String,
    pub context: String,
    pub missed_count: u32,
    pub last_seen: NaiveDate,
}

/// Derived classification of weakness tags; always rebuilt, never hand-edited
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patterns {
    pub persistent_issues: Vec<String>,
    pub improving_areas: Vec<String>,
    pub new_issues: Vec<String>,
}

/// Derived severity buckets, capped; always rebuilt, never hand-edited
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusAreas {
    pub urgent: Vec<String>,
    pub practice: Vec<String>,
    pub maintain: Vec<String>,
}

/// One graded-review summary record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub date: NaiveDate,
    pub task_type: String,
    pub weaknesses_found: usize,
}

/// The learner profile aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub created_at: DateTime<Utc>,
    pub total_reviews: u32,
    pub grammar_weaknesses: Vec<WeaknessRecord>,
    pub translation_weaknesses: Vec<WeaknessRecord>,
    pub vocabulary_gaps: Vec<VocabularyGap>,
    pub patterns: Patterns,
    pub focus_areas: FocusAreas,
    pub review_history: Vec<ReviewEvent>,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            total_reviews: 0,
            grammar_weaknesses: Vec::new(),
            translation_weaknesses: Vec::new(),
            vocabulary_gaps: Vec::new(),
            patterns: Patterns::default(),
            focus_areas: FocusAreas::default(),
            review_history: Vec::new(),
        }
    }
}

impl LearnerProfile {
    /// Fold one extracted weakness report into the profile and rebuild the
    /// derived views. Each reported tag counts as exactly one mistake.
    pub fn apply_review(&mut self, report: &WeaknessReport, task_type: &str, date: NaiveDate) {
        for tag in &report.grammar {
            record_mistake(&mut self.grammar_weaknesses, tag, task_type, date);
        }
        for tag in &report.translation {
            record_mistake(&mut self.translation_weaknesses, tag, task_type, date);
        }

        for word in &report.vocabulary {
            match self.vocabulary_gaps.iter_mut().find(|g| &g.word == word) {
                Some(gap) => {
                    gap.missed_count += 1;
                    gap.last_seen = date;
                }
                None => self.vocabulary_gaps.push(VocabularyGap {
                    word: word.clone(),
                    context: "workplace_communication".to_string(),
                    missed_count: 1,
                    last_seen: date,
                }),
            }
        }

        self.review_history.push(ReviewEvent {
            date,
            task_type: task_type.to_string(),
            weaknesses_found: report.len(),
        });
        self.total_reviews += 1;

        self.derive_patterns();
        self.derive_focus_areas();
    }

    /// Rebuild pattern classes over the full weakness history.
    ///
    /// Precedence per tag: persistent, then new, then improving, so a tag
    /// lands in at most one bucket.
    fn derive_patterns(&mut self) {
        let mut patterns = Patterns::default();

        for record in self.grammar_weaknesses.iter().chain(&self.translation_weaknesses) {
            if record.total_mistakes >= PERSISTENT_AT {
                patterns.persistent_issues.push(record.tag.clone());
            } else if record.history.len() == 1 {
                patterns.new_issues.push(record.tag.clone());
            } else if is_improving(&record.history) {
                patterns.improving_areas.push(record.tag.clone());
            }
        }

        self.patterns = patterns;
    }

    /// Rebuild severity buckets over the full weakness maps, preserving
    /// insertion order, then truncate to the caps.
    fn derive_focus_areas(&mut self) {
        let mut focus = FocusAreas::default();

        for record in &self.grammar_weaknesses {
            if record.total_mistakes >= GRAMMAR_URGENT_AT {
                focus.urgent.push(record.tag.clone());
            } else if record.total_mistakes >= PRACTICE_AT {
                focus.practice.push(record.tag.clone());
            } else {
                focus.maintain.push(record.tag.clone());
            }
        }

        for record in &self.translation_weaknesses {
            if record.total_mistakes >= TRANSLATION_URGENT_AT {
                focus.urgent.push(record.tag.clone());
            } else if record.total_mistakes >= PRACTICE_AT {
                focus.practice.push(record.tag.clone());
            }
        }

        focus.urgent.truncate(URGENT_CAP);
        focus.practice.truncate(PRACTICE_CAP);
        focus.maintain.truncate(MAINTAIN_CAP);

        self.focus_areas = focus;
    }

    /// Natural-language digest of the profile for exercise personalization
    pub fn context_for_ai(&self) -> String {
        if self.total_reviews == 0 {
            return "New user - no previous weaknesses identified.".to_string();
        }

        let mut parts = Vec::new();

        if !self.focus_areas.urgent.is_empty() {
            parts.push(format!(
                "URGENT areas to focus on: {}",
                self.focus_areas.urgent.join(", ")
            ));
        }

        if !self.patterns.persistent_issues.is_empty() {
            parts.push(format!(
                "Persistent issues (3+ mistakes): {}",
                self.patterns.persistent_issues.join(", ")
            ));
        }

        if !self.vocabulary_gaps.is_empty() {
            let words: Vec<&str> = self
                .vocabulary_gaps
                .iter()
                .take(5)
                .map(|g| g.word.as_str())
                .collect();
            parts.push(format!("Vocabulary gaps: {}", words.join(", ")));
        }

        if !self.patterns.improving_areas.is_empty() {
            parts.push(format!(
                "Improving areas: {}",
                self.patterns.improving_areas.join(", ")
            ));
        }

        if parts.is_empty() {
            "User showing good progress overall.".to_string()
        } else {
            parts.join("\n")
        }
    }
}

fn record_mistake(records: &mut Vec<WeaknessRecord>, tag: &str, task_type: &str, date: NaiveDate) {
    let idx = match records.iter().position(|r| r.tag == tag) {
        Some(idx) => idx,
        None => {
            records.push(WeaknessRecord::new(tag));
            records.len() - 1
        }
    };
    let record = &mut records[idx];
    record.total_mistakes += 1;
    record.recent_mistakes += 1;
    record.history.push(MistakeEvent {
        date,
        count: 1,
        task_type: task_type.to_string(),
    });
}

/// Non-increasing mistake counts over the last three occurrences (ties count)
fn is_improving(history: &[MistakeEvent]) -> bool {
    if history.len() < 3 {
        return false;
    }
    let recent = &history[history.len() - 3..];
    recent.windows(2).all(|pair| pair[0].count >= pair[1].count)
}

/// Persistent profile store with an injected storage directory
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Create a store rooted at the given directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create profile directory")?;
        Ok(Self {
            path: dir.join(PROFILE_FILE),
        })
    }

    /// Load the profile, or the zeroed default when absent.
    ///
    /// A file that exists but fails to parse also degrades to the default so
    /// a broken profile never bricks the CLI, but the failure is logged;
    /// the previous history is effectively discarded at that point.
    pub fn load(&self) -> LearnerProfile {
        if !self.path.exists() {
            return LearnerProfile::default();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(
                        "Profile at {} is corrupt ({}); starting from a fresh profile",
                        self.path.display(),
                        e
                    );
                    LearnerProfile::default()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read profile at {} ({}); starting from a fresh profile",
                    self.path.display(),
                    e
                );
                LearnerProfile::default()
            }
        }
    }

    /// Persist the full profile
    pub fn save(&self, profile: &LearnerProfile) -> Result<()> {
        let json = serde_json::to_string_pretty(profile).context("Failed to serialize profile")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Load, fold in one review, persist, and hand back the updated profile
    pub fn update(
        &self,
        report: &WeaknessReport,
        task_type: &str,
        date: NaiveDate,
    ) -> Result<LearnerProfile> {
        let mut profile = self.load();
        profile.apply_review(report, task_type, date);
        self.save(&profile)?;
        Ok(profile)
    }

    /// The backing file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

//! SQLite-backed vocabulary mastery store
//!
//! One row per word, one row per word-form pair, one row per review. All five
//! canonical form slots exist for a word once it has been reviewed at least
//! once. Mastery is latest-wins: each review overwrites `accuracy_score` and
//! every form's `is_mastered` flag, so a regression after mastery shows up
//! immediately.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

/// The five form slots tracked per word, in display order
pub const CANONICAL_FORMS: [&str; 5] = ["verb", "noun", "adjective", "adverb", "opposite"];

const DB_FILE: &str = "vocabulary.db";
const MASTERY_THRESHOLD: u32 = 80;

/// One graded review folded into the store
#[derive(Debug, Clone, Default)]
pub struct MasteryUpdate {
    pub word: String,
    pub accuracy: u32,
    pub forms_correct: Vec<String>,
    pub forms_weak: Vec<String>,
    /// Overwrites the stored word type only when non-empty
    pub word_type: Option<String>,
    /// Overwrites the stored meaning only when non-empty
    pub meaning: Option<String>,
    /// Per-form values to record, e.g. ("noun", "facilitation")
    pub forms_data: Vec<(String, String)>,
    /// Per-form Indonesian meanings
    pub forms_meanings: Vec<(String, String)>,
}

/// Word row as returned by the list queries
#[derive(Debug, Clone)]
pub struct WordSummary {
    pub word: String,
    pub word_type: Option<String>,
    pub meaning: Option<String>,
    /// Provenance: "manual" for user additions, "task" for review-created rows
    pub source: String,
    pub accuracy_score: u32,
    pub total_reviews: u32,
    pub last_reviewed: Option<NaiveDate>,
}

/// One form slot of a word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStatus {
    pub form_type: String,
    pub value: Option<String>,
    pub meaning: Option<String>,
    pub is_mastered: bool,
}

/// One past review of a word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub date: NaiveDate,
    pub accuracy: u32,
}

/// Full per-word view: header, form slots, review history
#[derive(Debug, Clone)]
pub struct WordDetails {
    pub summary: WordSummary,
    pub forms: Vec<FormStatus>,
    pub history: Vec<ReviewRecord>,
}

impl WordDetails {
    /// Look up one form slot by name
    pub fn form(&self, form_type: &str) -> Option<&FormStatus> {
        self.forms.iter().find(|f| f.form_type == form_type)
    }
}

/// Aggregate counts across the store
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabStats {
    pub total: u32,
    pub mastered: u32,
    pub weak: u32,
    pub unreviewed: u32,
}

/// Vocabulary store rooted at an injected data directory
pub struct VocabStore {
    conn: Connection,
}

impl VocabStore {
    /// Open (or create) the store under the given directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create vocabulary directory")?;

        let path = dir.join(DB_FILE);
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::init_schema(&conn)?;

        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            -- One row per tracked word; word is the case-insensitive key
            CREATE TABLE IF NOT EXISTS vocabulary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE COLLATE NOCASE,
                word_type TEXT,
                meaning TEXT,
                source TEXT NOT NULL DEFAULT 'task',
                accuracy_score INTEGER NOT NULL DEFAULT 0,
                total_reviews INTEGER NOT NULL DEFAULT 0,
                last_reviewed TEXT,
                created_at TEXT NOT NULL
            );

            -- One row per word per canonical form
            CREATE TABLE IF NOT EXISTS forms_mastery (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word_id INTEGER NOT NULL,
                form_type TEXT NOT NULL,
                form_value TEXT,
                form_meaning TEXT,
                is_mastered INTEGER NOT NULL DEFAULT 0,
                UNIQUE(word_id, form_type),
                FOREIGN KEY (word_id) REFERENCES vocabulary(id) ON DELETE CASCADE
            );

            -- Append-only per-review accuracy log
            CREATE TABLE IF NOT EXISTS review_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word_id INTEGER NOT NULL,
                review_date TEXT NOT NULL,
                accuracy INTEGER NOT NULL,
                FOREIGN KEY (word_id) REFERENCES vocabulary(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_vocabulary_accuracy ON vocabulary(accuracy_score);
            CREATE INDEX IF NOT EXISTS idx_forms_word ON forms_mastery(word_id);
            CREATE INDEX IF NOT EXISTS idx_history_word ON review_history(word_id);
            "#,
        )?;
        Ok(())
    }

    /// Add a word without reviewing it. Returns false when it already exists;
    /// in that case the type and meaning are still filled in when supplied.
    pub fn add_word(
        &self,
        word: &str,
        word_type: Option<&str>,
        meaning: Option<&str>,
    ) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO vocabulary (word, word_type, meaning, source, created_at)
             VALUES (?1, ?2, ?3, 'manual', ?4)",
            params![word, word_type, meaning, Utc::now().to_rfc3339()],
        )?;
        if inserted == 0 && (word_type.is_some() || meaning.is_some()) {
            self.conn.execute(
                "UPDATE vocabulary
                 SET word_type = COALESCE(?2, word_type),
                     meaning = COALESCE(?3, meaning)
                 WHERE word = ?1 COLLATE NOCASE",
                params![word, word_type, meaning],
            )?;
        }
        Ok(inserted > 0)
    }

    /// Fold one graded review into the word's entry.
    ///
    /// Creates the entry if absent. The accuracy score is overwritten, not
    /// averaged. Every canonical form gets a mastery row; a form named in
    /// neither `forms_correct` nor `forms_weak` is recorded as not mastered.
    pub fn update_mastery(&self, update: &MasteryUpdate, date: NaiveDate) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO vocabulary (word, source, created_at) VALUES (?1, 'task', ?2)",
            params![update.word, Utc::now().to_rfc3339()],
        )?;
        let word_id = self
            .word_id(&update.word)?
            .context("Vocabulary row missing after insert")?;

        // Empty strings never overwrite an existing header field
        let word_type = update.word_type.as_deref().filter(|s| !s.is_empty());
        let meaning = update.meaning.as_deref().filter(|s| !s.is_empty());

        self.conn.execute(
            "UPDATE vocabulary
             SET accuracy_score = ?1,
                 total_reviews = total_reviews + 1,
                 last_reviewed = ?2,
                 word_type = COALESCE(?3, word_type),
                 meaning = COALESCE(?4, meaning)
             WHERE id = ?5",
            params![update.accuracy, date.to_string(), word_type, meaning, word_id],
        )?;

        let mut upsert_form = self.conn.prepare_cached(
            "INSERT INTO forms_mastery (word_id, form_type, form_value, form_meaning, is_mastered)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(word_id, form_type) DO UPDATE SET
                 is_mastered = excluded.is_mastered,
                 form_value = COALESCE(excluded.form_value, form_value),
                 form_meaning = COALESCE(excluded.form_meaning, form_meaning)",
        )?;

        for form in CANONICAL_FORMS {
            let is_mastered = update.forms_correct.iter().any(|f| f == form);
            let value = lookup(&update.forms_data, form);
            let form_meaning = lookup(&update.forms_meanings, form);
            upsert_form.execute(params![word_id, form, value, form_meaning, is_mastered])?;
        }

        self.conn.execute(
            "INSERT INTO review_history (word_id, review_date, accuracy) VALUES (?1, ?2, ?3)",
            params![word_id, date.to_string(), update.accuracy],
        )?;

        Ok(())
    }

    /// Manually set a form's value, unconditionally marking it mastered.
    /// Returns false when the word is unknown.
    pub fn set_form(&self, word: &str, form_type: &str, value: &str) -> Result<bool> {
        let Some(word_id) = self.word_id(word)? else {
            return Ok(false);
        };
        self.conn.execute(
            "INSERT INTO forms_mastery (word_id, form_type, form_value, is_mastered)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(word_id, form_type) DO UPDATE SET
                 form_value = excluded.form_value,
                 is_mastered = 1",
            params![word_id, form_type, value],
        )?;
        Ok(true)
    }

    /// Reviewed words at or above the threshold, best first
    pub fn mastered(&self, threshold: u32) -> Result<Vec<WordSummary>> {
        self.query_summaries(
            "SELECT word, word_type, meaning, source, accuracy_score, total_reviews, last_reviewed
             FROM vocabulary
             WHERE total_reviews > 0 AND accuracy_score >= ?1
             ORDER BY accuracy_score DESC",
            params![threshold],
        )
    }

    /// Reviewed words below the threshold, worst and stalest first
    pub fn weak(&self, threshold: u32) -> Result<Vec<WordSummary>> {
        self.query_summaries(
            "SELECT word, word_type, meaning, source, accuracy_score, total_reviews, last_reviewed
             FROM vocabulary
             WHERE total_reviews > 0 AND accuracy_score < ?1
             ORDER BY accuracy_score ASC, last_reviewed ASC",
            params![threshold],
        )
    }

    /// Words never reviewed, oldest additions first
    pub fn unreviewed(&self, limit: u32) -> Result<Vec<WordSummary>> {
        self.query_summaries(
            "SELECT word, word_type, meaning, source, accuracy_score, total_reviews, last_reviewed
             FROM vocabulary
             WHERE total_reviews = 0
             ORDER BY created_at ASC
             LIMIT ?1",
            params![limit],
        )
    }

    /// Aggregate counts at the default mastery threshold
    pub fn stats(&self) -> Result<VocabStats> {
        let row = self.conn.query_row(
            "SELECT COUNT(*),
                    SUM(total_reviews > 0 AND accuracy_score >= ?1),
                    SUM(total_reviews > 0 AND accuracy_score < ?1),
                    SUM(total_reviews = 0)
             FROM vocabulary",
            params![MASTERY_THRESHOLD],
            |row| {
                Ok(VocabStats {
                    total: row.get(0)?,
                    mastered: row.get::<_, Option<u32>>(1)?.unwrap_or(0),
                    weak: row.get::<_, Option<u32>>(2)?.unwrap_or(0),
                    unreviewed: row.get::<_, Option<u32>>(3)?.unwrap_or(0),
                })
            },
        )?;
        Ok(row)
    }

    /// Full view of one word, or None when untracked
    pub fn details(&self, word: &str) -> Result<Option<WordDetails>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, word, word_type, meaning, source, accuracy_score, total_reviews, last_reviewed
                 FROM vocabulary WHERE word = ?1 COLLATE NOCASE",
                params![word],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        WordSummary {
                            word: row.get(1)?,
                            word_type: row.get(2)?,
                            meaning: row.get(3)?,
                            source: row.get(4)?,
                            accuracy_score: row.get(5)?,
                            total_reviews: row.get(6)?,
                            last_reviewed: parse_date(row.get::<_, Option<String>>(7)?),
                        },
                    ))
                },
            )
            .optional()?;

        let Some((word_id, summary)) = header else {
            return Ok(None);
        };

        let mut forms = Vec::new();
        let mut stmt = self.conn.prepare_cached(
            "SELECT form_type, form_value, form_meaning, is_mastered
             FROM forms_mastery WHERE word_id = ?1",
        )?;
        let mut rows = stmt.query(params![word_id])?;
        while let Some(row) = rows.next()? {
            forms.push(FormStatus {
                form_type: row.get(0)?,
                value: row.get(1)?,
                meaning: row.get(2)?,
                is_mastered: row.get(3)?,
            });
        }
        // Canonical display order regardless of row order
        forms.sort_by_key(|f| {
            CANONICAL_FORMS
                .iter()
                .position(|c| *c == f.form_type)
                .unwrap_or(CANONICAL_FORMS.len())
        });

        let mut history = Vec::new();
        let mut stmt = self.conn.prepare_cached(
            "SELECT review_date, accuracy FROM review_history WHERE word_id = ?1 ORDER BY id ASC",
        )?;
        let mut rows = stmt.query(params![word_id])?;
        while let Some(row) = rows.next()? {
            let date: String = row.get(0)?;
            history.push(ReviewRecord {
                date: date.parse().context("Malformed review date in store")?,
                accuracy: row.get(1)?,
            });
        }

        Ok(Some(WordDetails {
            summary,
            forms,
            history,
        }))
    }

    fn word_id(&self, word: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM vocabulary WHERE word = ?1 COLLATE NOCASE",
                params![word],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn query_summaries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<WordSummary>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(WordSummary {
                word: row.get(0)?,
                word_type: row.get(1)?,
                meaning: row.get(2)?,
                source: row.get(3)?,
                accuracy_score: row.get(4)?,
                total_reviews: row.get(5)?,
                last_reviewed: parse_date(row.get::<_, Option<String>>(6)?),
            });
        }
        Ok(out)
    }
}

fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| s.parse().ok())
}

fn lookup<'a>(pairs: &'a [(String, String)], form: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(f, _)| f == form)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, VocabStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::with_dir(dir.path()).unwrap();
        (dir, store)
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, n).unwrap()
    }

    fn update_for(word: &str, accuracy: u32, correct: &[&str]) -> MasteryUpdate {
        MasteryUpdate {
            word: word.to_string(),
            accuracy,
            forms_correct: correct.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn new_word_gets_all_five_forms() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("mitigate", 60, &["verb", "noun"]), day(1))
            .unwrap();

        let details = store.details("mitigate").unwrap().unwrap();
        assert_eq!(details.forms.len(), 5);
        for form in CANONICAL_FORMS {
            let status = details.form(form).unwrap();
            assert_eq!(status.is_mastered, form == "verb" || form == "noun");
        }
    }

    #[test]
    fn accuracy_is_overwritten_not_averaged() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("facilitate", 40, &["verb"]), day(1))
            .unwrap();
        store
            .update_mastery(&update_for("facilitate", 90, &CANONICAL_FORMS), day(2))
            .unwrap();

        let details = store.details("facilitate").unwrap().unwrap();
        assert_eq!(details.summary.accuracy_score, 90);
        assert_eq!(details.summary.total_reviews, 2);
        assert_eq!(
            details.history,
            vec![
                ReviewRecord { date: day(1), accuracy: 40 },
                ReviewRecord { date: day(2), accuracy: 90 },
            ]
        );
    }

    #[test]
    fn regression_unmasters_a_form() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("alignment", 100, &CANONICAL_FORMS), day(1))
            .unwrap();
        store
            .update_mastery(&update_for("alignment", 20, &["noun"]), day(2))
            .unwrap();

        let details = store.details("alignment").unwrap().unwrap();
        assert!(details.form("noun").unwrap().is_mastered);
        assert!(!details.form("verb").unwrap().is_mastered);
        assert_eq!(details.summary.accuracy_score, 20);
    }

    #[test]
    fn mastered_and_weak_partition_reviewed_words() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("proactive", 95, &CANONICAL_FORMS), day(1))
            .unwrap();
        store
            .update_mastery(&update_for("mitigate", 40, &["verb"]), day(1))
            .unwrap();
        store.add_word("leverage", None, None).unwrap();

        for threshold in [0, 50, 80, 100] {
            let mastered = store.mastered(threshold).unwrap();
            let weak = store.weak(threshold).unwrap();
            assert!(mastered.iter().all(|m| !weak.iter().any(|w| w.word == m.word)));
            assert_eq!(mastered.len() + weak.len(), 2);
        }
    }

    #[test]
    fn weak_orders_by_accuracy_then_staleness() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("first", 30, &[]), day(5))
            .unwrap();
        store
            .update_mastery(&update_for("second", 30, &[]), day(2))
            .unwrap();
        store
            .update_mastery(&update_for("third", 10, &[]), day(9))
            .unwrap();

        let weak = store.weak(80).unwrap();
        let words: Vec<&str> = weak.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["third", "second", "first"]);
    }

    #[test]
    fn unreviewed_respects_limit_and_creation_order() {
        let (_dir, store) = store();
        for word in ["alpha", "beta", "gamma"] {
            store.add_word(word, None, None).unwrap();
        }
        let batch = store.unreviewed(2).unwrap();
        let words: Vec<&str> = batch.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn stats_count_all_buckets() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("proactive", 95, &CANONICAL_FORMS), day(1))
            .unwrap();
        store
            .update_mastery(&update_for("mitigate", 40, &["verb"]), day(1))
            .unwrap();
        store.add_word("leverage", None, None).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.mastered, 1);
        assert_eq!(stats.weak, 1);
        assert_eq!(stats.unreviewed, 1);
    }

    #[test]
    fn set_form_on_unknown_word_is_a_no_op() {
        let (_dir, store) = store();
        assert!(!store.set_form("unknownword", "noun", "x").unwrap());
        assert_eq!(store.stats().unwrap().total, 0);
    }

    #[test]
    fn set_form_overrides_value_and_mastery() {
        let (_dir, store) = store();
        store.add_word("known", None, None).unwrap();
        assert!(store.set_form("known", "noun", "x").unwrap());

        let details = store.details("known").unwrap().unwrap();
        let noun = details.form("noun").unwrap();
        assert_eq!(noun.value.as_deref(), Some("x"));
        assert!(noun.is_mastered);
    }

    #[test]
    fn word_lookup_is_case_insensitive() {
        let (_dir, store) = store();
        store
            .update_mastery(&update_for("Facilitate", 70, &["verb"]), day(1))
            .unwrap();
        store
            .update_mastery(&update_for("facilitate", 80, &["verb"]), day(2))
            .unwrap();

        let details = store.details("FACILITATE").unwrap().unwrap();
        assert_eq!(details.summary.total_reviews, 2);
    }

    #[test]
    fn empty_header_fields_never_clobber_existing_values() {
        let (_dir, store) = store();
        let mut first = update_for("mitigate", 60, &["verb"]);
        first.word_type = Some("verb".to_string());
        first.meaning = Some("mengurangi".to_string());
        store.update_mastery(&first, day(1)).unwrap();

        let mut second = update_for("mitigate", 80, &["verb"]);
        second.word_type = Some(String::new());
        store.update_mastery(&second, day(2)).unwrap();

        let details = store.details("mitigate").unwrap().unwrap();
        assert_eq!(details.summary.word_type.as_deref(), Some("verb"));
        assert_eq!(details.summary.meaning.as_deref(), Some("mengurangi"));
    }

    #[test]
    fn form_values_survive_updates_that_omit_them() {
        let (_dir, store) = store();
        let mut first = update_for("facilitate", 60, &["noun"]);
        first.forms_data = vec![("noun".to_string(), "facilitation".to_string())];
        store.update_mastery(&first, day(1)).unwrap();

        store
            .update_mastery(&update_for("facilitate", 80, &["noun"]), day(2))
            .unwrap();

        let details = store.details("facilitate").unwrap().unwrap();
        assert_eq!(
            details.form("noun").unwrap().value.as_deref(),
            Some("facilitation")
        );
    }

    #[test]
    fn provenance_distinguishes_manual_from_task_words() {
        let (_dir, store) = store();
        store.add_word("leverage", None, None).unwrap();
        store
            .update_mastery(&update_for("mitigate", 60, &["verb"]), day(1))
            .unwrap();

        let manual = store.details("leverage").unwrap().unwrap();
        let from_task = store.details("mitigate").unwrap().unwrap();
        assert_eq!(manual.summary.source, "manual");
        assert_eq!(from_task.summary.source, "task");
    }

    #[test]
    fn re_adding_a_word_fills_in_missing_header_fields() {
        let (_dir, store) = store();
        assert!(store.add_word("leverage", None, None).unwrap());
        assert!(!store
            .add_word("leverage", Some("verb"), Some("memanfaatkan"))
            .unwrap());

        let details = store.details("leverage").unwrap().unwrap();
        assert_eq!(details.summary.word_type.as_deref(), Some("verb"));
        assert_eq!(details.summary.meaning.as_deref(), Some("memanfaatkan"));
    }

    #[test]
    fn details_of_untracked_word_is_none() {
        let (_dir, store) = store();
        assert!(store.details("nothing").unwrap().is_none());
    }
}
